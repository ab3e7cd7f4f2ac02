use serde::de::DeserializeOwned;

/// Deserialize a JSON tree with JSON-path context in error messages.
pub fn from_value_with_path<T: DeserializeOwned>(json: serde_json::Value) -> Result<T, String> {
    match serde_path_to_error::deserialize::<_, T>(json) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            Err(format!("at JSON path {path} → {}", err.into_inner()))
        }
    }
}
