use serde::de::DeserializeOwned;
use serde_json::Value;

/// Deserialize JSON text, reporting the JSON path of the first mismatch.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, String> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(describe_error)
}

/// Same as [`from_str_with_path`] for an already parsed value; `prefix` names
/// where `value` sits in the enclosing document.
pub fn from_value_with_path<T: DeserializeOwned>(prefix: &str, value: Value) -> Result<T, String> {
    serde_path_to_error::deserialize::<_, T>(value).map_err(|err| {
        format!("{prefix}: {}", describe_error(err))
    })
}

fn describe_error<E: std::fmt::Display>(err: serde_path_to_error::Error<E>) -> String {
    let path = err.path().to_string();
    format!("at JSON path {path} → {}", err.into_inner())
}
