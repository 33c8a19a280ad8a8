use serde::Serialize;

use crate::error::PathoNetError;

pub fn to_pretty<T: Serialize>(value: &T) -> Result<String, PathoNetError> {
    Ok(serde_json::to_string_pretty(value)?)
}
