use serde_json::Map;

#[test]
fn builds_fixed_and_config_headers() {
	let mut default_headers = Map::new();

	default_headers
		.insert("data_logging_enabled".to_string(), serde_json::Value::String("false".to_string()));

	let headers =
		feedprobe_providers::request_headers(&[("tenant-context", "organic")], &default_headers)
			.expect("Failed to build headers.");

	assert_eq!(headers.get("tenant-context").expect("Missing tenant header."), "organic");
	assert_eq!(headers.get("data_logging_enabled").expect("Missing config header."), "false");
}

#[test]
fn rejects_non_string_config_header_values() {
	let mut default_headers = Map::new();

	default_headers.insert("retries".to_string(), serde_json::Value::Number(3.into()));

	let err = feedprobe_providers::request_headers(&[], &default_headers)
		.expect_err("Non-string header values must be rejected.");

	assert!(err.to_string().contains("must be strings"), "Unexpected message: {err}");
}
