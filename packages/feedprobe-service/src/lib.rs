pub mod checker;
pub mod runner;

mod error;

pub use checker::{Boundary, CheckFailure, CheckOutcome, ContinuityChecker};
pub use error::{Error, Result};
pub use runner::{
	BatchRunner, BatchSummary, QueryOutcome, RerunFilter, RerunReport, Status,
	is_transport_failure,
};

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::Value;

use feedprobe_config::{FeedConfig, PreprocessorConfig};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The query-understanding collaborator. One call per continuity
/// check; the checker reuses the returned value across all pages.
pub trait PreprocessProvider
where
	Self: Send + Sync,
{
	fn preprocess<'a>(
		&'a self,
		cfg: &'a PreprocessorConfig,
		query: &'a str,
	) -> BoxFuture<'a, Result<Value>>;
}

/// The paginated feed collaborator.
pub trait FeedPageProvider
where
	Self: Send + Sync,
{
	fn fetch_page<'a>(
		&'a self,
		cfg: &'a FeedConfig,
		query: &'a str,
		preprocessor_response: &'a str,
		page_size: u32,
		cursor: Option<&'a str>,
	) -> BoxFuture<'a, Result<Value>>;
}

#[derive(Clone)]
pub struct Providers {
	pub preprocess: Arc<dyn PreprocessProvider>,
	pub feed: Arc<dyn FeedPageProvider>,
}

impl Providers {
	pub fn new(preprocess: Arc<dyn PreprocessProvider>, feed: Arc<dyn FeedPageProvider>) -> Self {
		Self { preprocess, feed }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { preprocess: provider.clone(), feed: provider }
	}
}

struct DefaultProviders;

impl PreprocessProvider for DefaultProviders {
	fn preprocess<'a>(
		&'a self,
		cfg: &'a PreprocessorConfig,
		query: &'a str,
	) -> BoxFuture<'a, Result<Value>> {
		Box::pin(async move {
			feedprobe_providers::preprocessor::preprocess(cfg, query).await.map_err(Error::from)
		})
	}
}

impl FeedPageProvider for DefaultProviders {
	fn fetch_page<'a>(
		&'a self,
		cfg: &'a FeedConfig,
		query: &'a str,
		preprocessor_response: &'a str,
		page_size: u32,
		cursor: Option<&'a str>,
	) -> BoxFuture<'a, Result<Value>> {
		Box::pin(async move {
			feedprobe_providers::feed::fetch_page(cfg, query, preprocessor_response, page_size, cursor)
				.await
				.map_err(Error::from)
		})
	}
}
