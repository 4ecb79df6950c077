use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use feedprobe_config::PreprocessorConfig;

use crate::Result;

/// Sends a free-text query to the query-understanding service and
/// returns its structured response verbatim. Called exactly once per
/// continuity check; the caller reuses the value across all pages.
pub async fn preprocess(cfg: &PreprocessorConfig, query: &str) -> Result<Value> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let headers = crate::request_headers(
		&[("access-token", cfg.access_token.as_str()), ("iso-country-code", cfg.country_code.as_str())],
		&cfg.default_headers,
	)?;
	let res = client.post(url).headers(headers).json(&build_preprocess_body(query)).send().await?;
	let json: Value = res.error_for_status()?.json().await?;

	Ok(json)
}

/// The preprocessing feature set requested for every query. Versions
/// and thresholds are the serving defaults the feed path is tested
/// against.
pub fn build_preprocess_body(query: &str) -> Value {
	serde_json::json!({
		"query": query,
		"normalization_config": {
			"enable": true,
			"version": 1,
			"async_process": true,
		},
		"expansion_config": {
			"enable": true,
			"version": 1,
			"required": 3,
			"threshold": 0.01,
		},
		"qcl_config": {
			"enable": true,
			"version": 2,
			"async_process": true,
			"sqcm_config": {
				"enable": true,
				"version": 1,
				"sqcm_prob": 0.8,
				"vol_threshold": 1000,
			},
		},
		"query_tagging_config": {
			"qcmct": 0.7,
			"qtmct": 0.0,
			"variant": 2.0,
			"enable": true,
			"version": 1,
			"model_url": "",
			"qta_model_url": "",
		},
		"intent_detection_config": {
			"enable": true,
			"version": 3,
		},
		"query_blacklist_config": {
			"enable": true,
		},
		"async_process": true,
		"query_attribute_dictionary_config": {
			"enable": true,
			"version": 1,
		},
	})
}
