use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub preprocessor: PreprocessorConfig,
	pub feed: FeedConfig,
	pub check: CheckConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub log_level: String,
}

/// Query-understanding service: turns free text into the structured
/// preprocessor response embedded in every feed request.
#[derive(Debug, Clone, Deserialize)]
pub struct PreprocessorConfig {
	pub api_base: String,
	pub path: String,
	pub access_token: String,
	pub country_code: String,
	pub timeout_ms: u64,
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
	pub api_base: String,
	pub path: String,
	pub feed_type: String,
	pub feed_context: String,
	pub tenant_context: String,
	pub session_id: String,
	pub user_id: String,
	pub user_city: String,
	pub user_state_code: String,
	pub timeout_ms: u64,
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckConfig {
	/// Page size used by the continuity check. Must be at least 2 so
	/// every page carries a second-to-last item to take a cursor from.
	pub page_size: u32,
	/// Page size for plain single-page fetches outside the check.
	pub default_limit: u32,
}
