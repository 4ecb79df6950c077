use std::sync::OnceLock;

use base64::Engine;
use regex::Regex;
use serde_json::Value;

/// Routing information recovered from a decodable cursor token.
///
/// Strictly diagnostic. The continuity check compares raw tokens and
/// item keys; nothing may assume a cursor is decodable.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedCursor {
	pub dag_name: Option<String>,
	pub payload: Option<Value>,
}

/// Attempts to decode a cursor as base64-wrapped JSON and pull out the
/// routing `dag_name`. Opaque tokens decode to `None`, which is an
/// ordinary outcome rather than an error.
pub fn decode(token: &str) -> Option<DecodedCursor> {
	if token.is_empty() {
		return None;
	}

	let bytes = base64::engine::general_purpose::STANDARD.decode(token).ok()?;
	let decoded = String::from_utf8(bytes).ok()?;

	if let Ok(payload) = serde_json::from_str::<Value>(&decoded) {
		if !payload.is_object() {
			return None;
		}

		let dag_name = payload.get("dag_name").and_then(Value::as_str).map(str::to_string);

		return Some(DecodedCursor { dag_name, payload: Some(payload) });
	}

	// Some serving paths wrap the JSON in framing that breaks a strict
	// parse; the dag_name field is still recoverable textually.
	let dag_name = dag_name_pattern()
		.captures(&decoded)
		.and_then(|captures| captures.get(1))
		.map(|m| m.as_str().to_string())?;

	Some(DecodedCursor { dag_name: Some(dag_name), payload: None })
}

fn dag_name_pattern() -> &'static Regex {
	static PATTERN: OnceLock<Regex> = OnceLock::new();

	PATTERN.get_or_init(|| {
		Regex::new(r#""dag_name"\s*:\s*"([^"]+)""#).expect("Failed to compile the dag_name pattern.")
	})
}
