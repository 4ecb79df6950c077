//! Scripted provider implementations and response builders shared by
//! checker and runner tests. Nothing here talks to a network.

use std::{
	collections::VecDeque,
	sync::{
		Mutex,
		atomic::{AtomicUsize, Ordering},
	},
};

use serde_json::{Map, Value};

use feedprobe_config::{CheckConfig, Config, FeedConfig, PreprocessorConfig, Service};
use feedprobe_service::{BoxFuture, Error, FeedPageProvider, PreprocessProvider, Result};

/// A feed item in the backend's snake_case shape.
pub fn item(catalog_id: u64, product_id: u64, cursor: &str) -> Value {
	serde_json::json!({
		"entity_response": { "catalog_id": catalog_id, "product_id": product_id },
		"cursor": cursor,
	})
}

/// The same item in the alternate camelCase shape some serving paths
/// emit.
pub fn camel_item(catalog_id: u64, product_id: u64, cursor: &str) -> Value {
	serde_json::json!({
		"entityResponse": { "catalogId": catalog_id, "productId": product_id },
		"Cursor": cursor,
	})
}

/// Wraps items in the `data.items` response nesting.
pub fn page(items: Vec<Value>) -> Value {
	serde_json::json!({ "data": { "items": items } })
}

/// Three pages that satisfy the boundary-overlap property for the
/// given page size, with per-item cursor tokens `p<page>-c<slot>`.
/// Page 2 starts at page 1's last item and page 3 at page 2's last,
/// exactly as a continuity-correct backend would respond to
/// second-to-last-cursor chaining.
pub fn overlapping_pages(page_size: u64) -> Vec<Value> {
	assert!(page_size >= 2, "Overlapping pages need a page size of at least 2.");

	let build = |page_no: u64, first_id: u64| {
		page(
			(0..page_size)
				.map(|slot| {
					let id = first_id + slot;

					item(id, id * 10, &format!("p{page_no}-c{slot}"))
				})
				.collect(),
		)
	};
	// Chaining with the second-to-last cursor advances by size - 1.
	let step = page_size - 1;

	vec![build(1, 1), build(2, 1 + step), build(3, 1 + 2 * step)]
}

/// Preprocessor stub returning a fixed structured response, or a
/// provider failure when constructed with [`ScriptedPreprocess::failing`].
pub struct ScriptedPreprocess {
	response: Option<Value>,
	calls: AtomicUsize,
}

impl ScriptedPreprocess {
	pub fn new(response: Value) -> Self {
		Self { response: Some(response), calls: AtomicUsize::new(0) }
	}

	pub fn failing() -> Self {
		Self { response: None, calls: AtomicUsize::new(0) }
	}

	pub fn call_count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

impl Default for ScriptedPreprocess {
	fn default() -> Self {
		Self::new(serde_json::json!({ "intent": "commerce", "normalized_query": "test" }))
	}
}

impl PreprocessProvider for ScriptedPreprocess {
	fn preprocess<'a>(
		&'a self,
		_cfg: &'a PreprocessorConfig,
		_query: &'a str,
	) -> BoxFuture<'a, Result<Value>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let response = self.response.clone();

		Box::pin(async move {
			response.ok_or_else(|| Error::Provider {
				message: "Scripted preprocessor is down.".to_string(),
			})
		})
	}
}

/// Arguments of one recorded `fetch_page` call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPageRequest {
	pub query: String,
	pub preprocessor_response: String,
	pub page_size: u32,
	pub cursor: Option<String>,
}

/// Feed stub replaying a fixed page script in order and recording
/// every request it receives. An exhausted script fails the call.
#[derive(Default)]
pub struct ScriptedFeed {
	script: Mutex<VecDeque<Result<Value>>>,
	requests: Mutex<Vec<RecordedPageRequest>>,
}

impl ScriptedFeed {
	pub fn new(pages: Vec<Value>) -> Self {
		Self {
			script: Mutex::new(pages.into_iter().map(Ok).collect()),
			requests: Mutex::new(Vec::new()),
		}
	}

	/// Appends a page the script will serve after everything queued so
	/// far.
	pub fn push_page(&self, page: Value) {
		self.script.lock().unwrap_or_else(|err| err.into_inner()).push_back(Ok(page));
	}

	/// Appends a transport-style failure to the script.
	pub fn push_failure(&self, message: &str) {
		self.script
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.push_back(Err(Error::Provider { message: message.to_string() }));
	}

	pub fn requests(&self) -> Vec<RecordedPageRequest> {
		self.requests.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}

	pub fn call_count(&self) -> usize {
		self.requests.lock().unwrap_or_else(|err| err.into_inner()).len()
	}
}

impl FeedPageProvider for ScriptedFeed {
	fn fetch_page<'a>(
		&'a self,
		_cfg: &'a FeedConfig,
		query: &'a str,
		preprocessor_response: &'a str,
		page_size: u32,
		cursor: Option<&'a str>,
	) -> BoxFuture<'a, Result<Value>> {
		self.requests.lock().unwrap_or_else(|err| err.into_inner()).push(RecordedPageRequest {
			query: query.to_string(),
			preprocessor_response: preprocessor_response.to_string(),
			page_size,
			cursor: cursor.map(str::to_string),
		});

		let next = self.script.lock().unwrap_or_else(|err| err.into_inner()).pop_front();

		Box::pin(async move {
			next.unwrap_or_else(|| {
				Err(Error::Provider { message: "Scripted feed has no more pages.".to_string() })
			})
		})
	}
}

/// A config pointing at nowhere, for tests that never leave the
/// scripted providers.
pub fn test_config() -> Config {
	Config {
		service: Service { log_level: "info".to_string() },
		preprocessor: PreprocessorConfig {
			api_base: "http://localhost".to_string(),
			path: "/internal/v2/preprocess/text".to_string(),
			access_token: "test-token".to_string(),
			country_code: "IN".to_string(),
			timeout_ms: 1_000,
			default_headers: Map::new(),
		},
		feed: FeedConfig {
			api_base: "http://localhost".to_string(),
			path: "/v1/feed/fetch".to_string(),
			feed_type: "text_search".to_string(),
			feed_context: "text_search_mall_v1".to_string(),
			tenant_context: "organic".to_string(),
			session_id: "session_id".to_string(),
			user_id: "376902237".to_string(),
			user_city: "bengaluru".to_string(),
			user_state_code: "KA".to_string(),
			timeout_ms: 1_000,
			default_headers: Map::new(),
		},
		check: CheckConfig { page_size: 20, default_limit: 10 },
	}
}
