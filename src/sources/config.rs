use std::borrow::Cow;
use std::time::Duration;

use tracing::warn;

const OPENTARGETS_BASE: &str = "https://api.platform.opentargets.org/api/v4";
const REACTOME_ANALYSIS_BASE: &str = "https://reactome.org/AnalysisService";
const STRING_BASE: &str = "https://string-db.org/api";

const OPENTARGETS_BASE_ENV: &str = "PATHONET_OPENTARGETS_BASE";
const REACTOME_BASE_ENV: &str = "PATHONET_REACTOME_BASE";
const STRING_BASE_ENV: &str = "PATHONET_STRING_BASE";
const HTTP_TIMEOUT_ENV: &str = "PATHONET_HTTP_TIMEOUT_SECS";
const STAGE_TIMEOUT_ENV: &str = "PATHONET_STAGE_TIMEOUT_SECS";
const MAX_RETRIES_ENV: &str = "PATHONET_MAX_RETRIES";

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(45);

/// NCBI taxonomy id for Homo sapiens.
pub const HUMAN_TAXON: u32 = 9606;

/// Upstream endpoints and network budgets shared by every source client.
#[derive(Debug, Clone)]
pub struct SourcesConfig {
    pub opentargets_base: Cow<'static, str>,
    pub reactome_base: Cow<'static, str>,
    pub string_base: Cow<'static, str>,
    pub species: u32,
    pub http_timeout: Duration,
    pub connect_timeout: Duration,
    /// Upper bound for one pipeline stage, retries included.
    pub stage_timeout: Duration,
    /// Transient-failure retries per request. Zero disables retrying.
    pub max_retries: u32,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            opentargets_base: Cow::Borrowed(OPENTARGETS_BASE),
            reactome_base: Cow::Borrowed(REACTOME_ANALYSIS_BASE),
            string_base: Cow::Borrowed(STRING_BASE),
            species: HUMAN_TAXON,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            stage_timeout: DEFAULT_STAGE_TIMEOUT,
            max_retries: 0,
        }
    }
}

impl SourcesConfig {
    /// Reads overrides from `PATHONET_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`SourcesConfig::from_env`], reading each variable through `lookup`.
    ///
    /// Blank values are ignored; unparsable or zero-second values keep the
    /// default and log a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let settings = Settings { lookup };
        let defaults = Self::default();
        Self {
            opentargets_base: settings.base(OPENTARGETS_BASE, OPENTARGETS_BASE_ENV),
            reactome_base: settings.base(REACTOME_ANALYSIS_BASE, REACTOME_BASE_ENV),
            string_base: settings.base(STRING_BASE, STRING_BASE_ENV),
            http_timeout: settings.secs(HTTP_TIMEOUT_ENV).unwrap_or(defaults.http_timeout),
            stage_timeout: settings.secs(STAGE_TIMEOUT_ENV).unwrap_or(defaults.stage_timeout),
            max_retries: settings.number(MAX_RETRIES_ENV).unwrap_or(defaults.max_retries),
            ..defaults
        }
    }

    /// Points every source at one base URL, e.g. a mock server.
    pub fn with_base(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            opentargets_base: Cow::Owned(base.clone()),
            reactome_base: Cow::Owned(base.clone()),
            string_base: Cow::Owned(base),
            ..Self::default()
        }
    }
}

pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

struct Settings<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Settings<F> {
    fn value(&self, env_var: &str) -> Option<String> {
        (self.lookup)(env_var)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn base(&self, default: &'static str, env_var: &str) -> Cow<'static, str> {
        self.value(env_var)
            .map(Cow::Owned)
            .unwrap_or_else(|| Cow::Borrowed(default))
    }

    fn number<T: std::str::FromStr>(&self, env_var: &str) -> Option<T> {
        let raw = self.value(env_var)?;
        match raw.parse::<T>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(
                    env_var = env_var,
                    value = raw.as_str(),
                    "Ignoring invalid numeric setting; using default"
                );
                None
            }
        }
    }

    fn secs(&self, env_var: &str) -> Option<Duration> {
        match self.number::<u64>(env_var)? {
            0 => {
                warn!(env_var = env_var, "Ignoring zero timeout; using default");
                None
            }
            secs => Some(Duration::from_secs(secs)),
        }
    }
}
