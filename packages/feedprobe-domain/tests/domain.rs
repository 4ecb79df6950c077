use serde_json::Value;

use feedprobe_domain::{ItemKey, cursor, extract_items, second_last_cursor};

fn item(catalog_id: u64, product_id: u64, cursor: &str) -> Value {
	serde_json::json!({
		"entity_response": { "catalog_id": catalog_id, "product_id": product_id },
		"cursor": cursor,
	})
}

#[test]
fn full_page_walk_extracts_boundary_keys_and_chaining_cursor() {
	let raw = serde_json::json!({
		"data": {
			"items": [
				item(1, 10, "c1"),
				item(2, 20, "c2"),
				item(3, 30, "c3"),
				item(4, 40, "c4"),
			]
		}
	});
	let items = extract_items(&raw);

	assert_eq!(items.len(), 4);
	// The token to chain with is the second-to-last item's, so the
	// next page starts at this page's last item.
	assert_eq!(second_last_cursor(items), Some("c3"));

	let last = ItemKey::of(&items[3]);
	let next_first = ItemKey::of(&item(4, 40, "c5"));

	assert!(last.matches(&next_first));
}

#[test]
fn mixed_spellings_compare_equal_across_pages() {
	let older = serde_json::json!({
		"entity_response": { "catalog_id": 77, "product_id": 700 },
		"Cursor": "tail",
	});
	let newer = serde_json::json!({
		"entityResponse": { "catalogId": 77, "productId": 700 },
		"cursor": "head",
	});

	assert!(ItemKey::of(&older).matches(&ItemKey::of(&newer)));
}

#[test]
fn decoded_cursor_is_diagnostic_only() {
	let payload = r#"{"dag_name":"organic_all_ss_sscat_route_cg","position":19}"#;
	let token = {
		use base64::Engine;

		base64::engine::general_purpose::STANDARD.encode(payload)
	};
	let decoded = cursor::decode(&token).expect("Token must decode.");

	assert_eq!(decoded.dag_name.as_deref(), Some("organic_all_ss_sscat_route_cg"));
	// An opaque token from the same backend is equally acceptable.
	assert!(cursor::decode("opaque-token-0019").is_none());
}
