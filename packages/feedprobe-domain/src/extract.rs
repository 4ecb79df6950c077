use serde_json::Value;

/// One way a feed response may nest its item list. Strategies are
/// tried in declaration order and the first match wins, so a new
/// response shape is a new entry here, not a new branch in callers.
struct ItemsStrategy {
	#[allow(dead_code)]
	name: &'static str,
	extract: fn(&Value) -> Option<&Vec<Value>>,
}

const ITEMS_STRATEGIES: &[ItemsStrategy] = &[
	ItemsStrategy { name: "items", extract: |raw| raw.get("items").and_then(Value::as_array) },
	ItemsStrategy {
		name: "data.items",
		extract: |raw| raw.get("data").and_then(|data| data.get("items")).and_then(Value::as_array),
	},
];

/// Locates the ordered item list in a raw feed response. A missing or
/// malformed structure is a valid "no items" outcome, never an error.
pub fn extract_items(raw: &Value) -> &[Value] {
	ITEMS_STRATEGIES
		.iter()
		.find_map(|strategy| (strategy.extract)(raw))
		.map(Vec::as_slice)
		.unwrap_or(&[])
}

/// Reads the pagination token off one item, tolerating both field
/// spellings the backend has been seen to emit.
pub fn extract_cursor(item: &Value) -> Option<&str> {
	item.get("cursor").or_else(|| item.get("Cursor")).and_then(Value::as_str)
}

/// Cursor of the second-to-last item. The backend resumes pagination
/// AT the item a cursor names, so chaining with this token makes the
/// next page start at the current page's last item.
pub fn second_last_cursor(items: &[Value]) -> Option<&str> {
	if items.len() < 2 {
		return None;
	}

	extract_cursor(&items[items.len() - 2])
}

/// Flattens the catalog identifiers out of any of the response shapes
/// the older and newer feed paths produce. Missing identifiers are
/// skipped rather than reported.
pub fn extract_catalog_ids(raw: &Value) -> Vec<Value> {
	let Some(root) = raw.as_object() else {
		return Vec::new();
	};

	if let Some(entities) = root.get("entities").and_then(Value::as_array) {
		return entity_ids(entities);
	}
	if let Some(catalogs) = root.get("catalogs").and_then(Value::as_array) {
		return catalog_ids(catalogs);
	}
	if let Some(data) = root.get("data").and_then(Value::as_object) {
		if let Some(catalogs) = data.get("catalogs").and_then(Value::as_array) {
			return catalog_ids(catalogs);
		}
		if let Some(entities) = data.get("entities").and_then(Value::as_array) {
			return entity_ids(entities);
		}
		if let Some(items) = data.get("items").and_then(Value::as_array) {
			return items
				.iter()
				.filter_map(|item| item.get("entityResponse"))
				.filter_map(|entity| entity.get("catalogId"))
				.filter(|id| !id.is_null())
				.cloned()
				.collect();
		}
	}

	Vec::new()
}

fn entity_ids(entities: &[Value]) -> Vec<Value> {
	entities
		.iter()
		.filter_map(|entity| {
			entity.get("entity_id").filter(|id| !id.is_null()).or_else(|| entity.get("catalog_id"))
		})
		.filter(|id| !id.is_null())
		.cloned()
		.collect()
}

fn catalog_ids(catalogs: &[Value]) -> Vec<Value> {
	catalogs
		.iter()
		.filter_map(|catalog| catalog.get("catalog_id"))
		.filter(|id| !id.is_null())
		.cloned()
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn prefers_top_level_items_over_nested() {
		let raw = serde_json::json!({
			"items": [{ "cursor": "top" }],
			"data": { "items": [{ "cursor": "nested" }] }
		});
		let items = extract_items(&raw);

		assert_eq!(items.len(), 1);
		assert_eq!(extract_cursor(&items[0]), Some("top"));
	}

	#[test]
	fn falls_back_to_data_items() {
		let raw = serde_json::json!({ "data": { "items": [{ "cursor": "a" }, { "cursor": "b" }] } });

		assert_eq!(extract_items(&raw).len(), 2);
	}

	#[test]
	fn malformed_response_yields_no_items() {
		assert!(extract_items(&serde_json::json!("not an object")).is_empty());
		assert!(extract_items(&serde_json::json!({ "data": { "items": 7 } })).is_empty());
	}

	#[test]
	fn cursor_tolerates_both_spellings() {
		assert_eq!(extract_cursor(&serde_json::json!({ "cursor": "x" })), Some("x"));
		assert_eq!(extract_cursor(&serde_json::json!({ "Cursor": "y" })), Some("y"));
		assert_eq!(extract_cursor(&serde_json::json!({})), None);
	}

	#[test]
	fn second_last_cursor_needs_two_items() {
		let one = vec![serde_json::json!({ "cursor": "only" })];
		let two = vec![serde_json::json!({ "cursor": "first" }), serde_json::json!({ "cursor": "last" })];

		assert_eq!(second_last_cursor(&one), None);
		assert_eq!(second_last_cursor(&two), Some("first"));
	}

	#[test]
	fn catalog_ids_from_entities_fall_back_to_catalog_id() {
		let raw = serde_json::json!({
			"entities": [
				{ "entity_id": 11 },
				{ "catalog_id": 22 },
				{ "name": "no id" }
			]
		});

		assert_eq!(extract_catalog_ids(&raw), vec![serde_json::json!(11), serde_json::json!(22)]);
	}

	#[test]
	fn catalog_ids_from_nested_entity_responses() {
		let raw = serde_json::json!({
			"data": {
				"items": [
					{ "entityResponse": { "catalogId": 5 } },
					{ "entityResponse": {} },
					{ "other": true }
				]
			}
		});

		assert_eq!(extract_catalog_ids(&raw), vec![serde_json::json!(5)]);
	}
}
