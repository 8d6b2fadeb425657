pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Resolve command input: `--input` file first, then piped stdin.
/// Returns None when neither is present so the caller can fall back to flags.
pub fn load<T: DeserializeOwned>(path: Option<&str>) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(Some(file::read_input(path)?));
    }
    match stdin::read_stdin()? {
        Some(data) => Ok(Some(serde_json::from_value(data)?)),
        None => Ok(None),
    }
}
