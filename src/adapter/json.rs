use serde::de::DeserializeOwned;

use crate::error::AdapterError;

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(source_name: &str, src: &str) -> Result<T, AdapterError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    match serde_path_to_error::deserialize::<_, T>(de) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            Err(AdapterError::Json {
                source_name: source_name.to_string(),
                path,
                message: err.into_inner().to_string(),
            })
        }
    }
}
