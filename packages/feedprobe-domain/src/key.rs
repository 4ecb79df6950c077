use std::fmt;

use serde_json::Value;

/// Identity key of one result item: its catalog and product
/// identifiers, kept as raw JSON values since the backend emits them
/// as either numbers or strings depending on the serving path.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemKey {
	pub catalog_id: Option<Value>,
	pub product_id: Option<Value>,
}

impl ItemKey {
	/// Reads the key off an item, tolerating both the snake_case and
	/// camelCase container/field spellings. Absent fields become
	/// `None`.
	pub fn of(item: &Value) -> Self {
		let container = item.get("entity_response").or_else(|| item.get("entityResponse"));
		let field = |snake: &str, camel: &str| {
			container
				.and_then(|entity| entity.get(snake).or_else(|| entity.get(camel)))
				.filter(|value| !value.is_null())
				.cloned()
		};

		Self {
			catalog_id: field("catalog_id", "catalogId"),
			product_id: field("product_id", "productId"),
		}
	}

	/// Componentwise equality with a guard: a key whose own catalog id
	/// is absent never matches, so two malformed items cannot produce
	/// a false positive.
	pub fn matches(&self, other: &ItemKey) -> bool {
		self.catalog_id.is_some()
			&& self.catalog_id == other.catalog_id
			&& self.product_id == other.product_id
	}
}

impl fmt::Display for ItemKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"catalog_id={}, product_id={}",
			display_field(&self.catalog_id),
			display_field(&self.product_id)
		)
	}
}

fn display_field(field: &Option<Value>) -> String {
	field.as_ref().map(Value::to_string).unwrap_or_else(|| "null".to_string())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reads_both_container_spellings() {
		let snake = serde_json::json!({ "entity_response": { "catalog_id": 1, "product_id": 2 } });
		let camel = serde_json::json!({ "entityResponse": { "catalogId": 1, "productId": 2 } });

		assert!(ItemKey::of(&snake).matches(&ItemKey::of(&camel)));
	}

	#[test]
	fn missing_catalog_id_never_matches() {
		let a = serde_json::json!({ "entity_response": { "product_id": 9 } });
		let b = serde_json::json!({ "entity_response": { "product_id": 9 } });

		assert!(!ItemKey::of(&a).matches(&ItemKey::of(&b)));
	}

	#[test]
	fn string_and_number_ids_do_not_match() {
		let number = serde_json::json!({ "entity_response": { "catalog_id": 7, "product_id": 1 } });
		let string =
			serde_json::json!({ "entity_response": { "catalog_id": "7", "product_id": 1 } });

		assert!(!ItemKey::of(&number).matches(&ItemKey::of(&string)));
	}

	#[test]
	fn displays_null_for_absent_fields() {
		let key = ItemKey::of(&serde_json::json!({}));

		assert_eq!(key.to_string(), "catalog_id=null, product_id=null");
	}
}
