use std::borrow::Cow;

use serde::Deserialize;

use crate::error::PathoNetError;
use crate::sources::SourcesConfig;
use crate::sources::config::endpoint;

const STRING_API: &str = "string";

/// STRING accepts a carriage-return separated identifier list (`%0D` once encoded).
const IDENTIFIER_SEPARATOR: &str = "\r";

pub struct StringClient {
    client: reqwest_middleware::ClientWithMiddleware,
    base: Cow<'static, str>,
    species: u32,
}

impl StringClient {
    pub fn new(config: &SourcesConfig) -> Result<Self, PathoNetError> {
        Ok(Self {
            client: crate::sources::http_client(config)?,
            base: config.string_base.clone(),
            species: config.species,
        })
    }

    /// Returns the interaction edges STRING reports among `symbols`, as listed upstream.
    pub async fn network(
        &self,
        symbols: &[String],
    ) -> Result<Vec<StringInteraction>, PathoNetError> {
        let identifiers = symbols
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(IDENTIFIER_SEPARATOR);
        if identifiers.is_empty() {
            return Err(PathoNetError::InvalidArgument(
                "STRING identifiers are required".into(),
            ));
        }

        let url = endpoint(&self.base, "json/network");
        let species = self.species.to_string();
        crate::sources::send_json(
            STRING_API,
            self.client.get(&url).query(&[
                ("identifiers", identifiers.as_str()),
                ("species", species.as_str()),
            ]),
        )
        .await
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StringInteraction {
    #[serde(rename = "preferredName_A", alias = "preferredNameA")]
    pub preferred_name_a: Option<String>,
    #[serde(rename = "preferredName_B", alias = "preferredNameB")]
    pub preferred_name_b: Option<String>,
    pub score: Option<f64>,
}
