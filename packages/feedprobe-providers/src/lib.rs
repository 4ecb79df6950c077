pub mod feed;
pub mod preprocessor;

mod error;

pub use error::{Error, Result};

use reqwest::header::{HeaderMap, HeaderName};
use serde_json::{Map, Value};

/// Builds the header set for one upstream call: the fixed pairs the
/// endpoint requires plus whatever the config adds on top.
pub fn request_headers(
	pairs: &[(&str, &str)],
	default_headers: &Map<String, Value>,
) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	for (key, value) in pairs {
		headers.insert(HeaderName::from_bytes(key.as_bytes())?, value.parse()?);
	}
	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidConfig {
				message: "Default header values must be strings.".to_string(),
			});
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}
