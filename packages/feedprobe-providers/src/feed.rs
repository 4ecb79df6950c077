use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use feedprobe_config::FeedConfig;

use crate::Result;

/// Fetches one page from the feed gateway. `cursor` absent means the
/// first page; `preprocessor_response` is the serialized
/// query-understanding result and must be identical across every page
/// of one check.
pub async fn fetch_page(
	cfg: &FeedConfig,
	query: &str,
	preprocessor_response: &str,
	page_size: u32,
	cursor: Option<&str>,
) -> Result<Value> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let headers = crate::request_headers(
		&[
			("user-id", cfg.user_id.as_str()),
			("user-context", "logged_in"),
			("user-state-code", cfg.user_state_code.as_str()),
			("user-city", cfg.user_city.as_str()),
			("tenant-context", cfg.tenant_context.as_str()),
		],
		&cfg.default_headers,
	)?;
	let body = build_page_body(cfg, query, preprocessor_response, page_size, cursor);
	let res = client.post(url).headers(headers).json(&body).send().await?;
	let json: Value = res.error_for_status()?.json().await?;

	Ok(json)
}

pub fn build_page_body(
	cfg: &FeedConfig,
	query: &str,
	preprocessor_response: &str,
	page_size: u32,
	cursor: Option<&str>,
) -> Value {
	let mut body = serde_json::json!({
		"feed_request_context": {
			"feed_type": cfg.feed_type,
			"feed_context": cfg.feed_context,
			"feed_id": query,
			"search_metadata": {
				"preprocessor_response": preprocessor_response,
			},
		},
		"limit": page_size,
		"session_context": {
			"session_id": cfg.session_id,
		},
		"tenant_request_context": {
			"tenant_context": cfg.tenant_context,
		},
		"sort_config": {
			"sort_by": "most_relevant",
			"sort_order": "desc",
		},
		"filter_config": {
			"applied_filters": {
				"filter_list": [],
			},
		},
	});

	if let Some(cursor) = cursor {
		body["cursor"] = Value::String(cursor.to_string());
	}

	body
}
