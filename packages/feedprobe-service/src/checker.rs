use std::fmt;

use serde_json::Value;

use feedprobe_config::Config;
use feedprobe_domain::{ItemKey, extract_items, second_last_cursor};

use crate::Providers;

/// Substring present in every page-call failure detail and in no other
/// failure class; [`crate::is_transport_failure`] keys off it.
pub const TRANSPORT_FAILURE_MARKER: &str = "call failed";

/// Verifies pagination continuity for one query: three sequential
/// pages chained with the second-to-last-item cursor, then both
/// boundary overlaps checked by item key.
///
/// The walk is `Init -> Page1Fetched -> Page2Fetched -> Page3Fetched`
/// and ends in passed or failed; there is no retry inside one run.
pub struct ContinuityChecker {
	pub cfg: Config,
	pub providers: Providers,
}

/// Which page boundary an overlap check covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
	PageOneToTwo,
	PageTwoToThree,
}

impl Boundary {
	fn pages(self) -> (u8, u8) {
		match self {
			Self::PageOneToTwo => (1, 2),
			Self::PageTwoToThree => (2, 3),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckFailure {
	Preprocessor { detail: String },
	PageCall { page: u8, detail: String },
	InsufficientItems { page: u8, got: usize, need: usize },
	MissingCursor { page: u8 },
	BoundaryMismatch { boundary: Boundary, left: ItemKey, right: ItemKey },
}

impl fmt::Display for CheckFailure {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Preprocessor { detail } => {
				write!(f, "Failed to get preprocessor response: {detail}")
			},
			Self::PageCall { page, detail } => {
				write!(f, "Page {page} {TRANSPORT_FAILURE_MARKER}: {detail}")
			},
			Self::InsufficientItems { page, got, need } => {
				write!(f, "Insufficient items in page {page} (got {got}, need at least {need})")
			},
			Self::MissingCursor { page } => {
				write!(f, "Could not extract cursor from second-last item in page {page}")
			},
			Self::BoundaryMismatch { boundary, left, right } => {
				let (earlier, later) = boundary.pages();

				write!(f, "Page {earlier} last ({left}) != Page {later} first ({right})")
			},
		}
	}
}

/// Result of one continuity check. Ordinary backend failures are
/// folded in here rather than surfaced as errors; an empty failure
/// list means the query passed.
#[derive(Debug, Clone, Default)]
pub struct CheckOutcome {
	pub failures: Vec<CheckFailure>,
}

impl CheckOutcome {
	fn pass() -> Self {
		Self::default()
	}

	fn fail(failure: CheckFailure) -> Self {
		Self { failures: vec![failure] }
	}

	pub fn passed(&self) -> bool {
		self.failures.is_empty()
	}

	/// All failure diagnostics joined into the batch record's detail
	/// string; `None` iff the check passed.
	pub fn error_detail(&self) -> Option<String> {
		if self.failures.is_empty() {
			return None;
		}

		Some(
			self.failures
				.iter()
				.map(CheckFailure::to_string)
				.collect::<Vec<_>>()
				.join("; "),
		)
	}
}

impl ContinuityChecker {
	pub fn new(cfg: Config) -> Self {
		Self { cfg, providers: Providers::default() }
	}

	pub fn with_providers(cfg: Config, providers: Providers) -> Self {
		Self { cfg, providers }
	}

	pub async fn check(&self, query: &str) -> CheckOutcome {
		self.check_with_page_size(query, self.cfg.check.page_size).await
	}

	pub async fn check_with_page_size(&self, query: &str, page_size: u32) -> CheckOutcome {
		let preprocessor =
			match self.providers.preprocess.preprocess(&self.cfg.preprocessor, query).await {
				Ok(value) => value,
				Err(err) => {
					return CheckOutcome::fail(CheckFailure::Preprocessor {
						detail: err.to_string(),
					});
				},
			};
		// One preprocessor call per check; every page request carries
		// this same serialized value.
		let preprocessor_response = preprocessor.to_string();

		let page_1 = match self.fetch(query, &preprocessor_response, page_size, None, 1).await {
			Ok(page) => page,
			Err(failure) => return CheckOutcome::fail(failure),
		};
		let items_1 = extract_items(&page_1);

		if items_1.len() < 2 {
			return CheckOutcome::fail(CheckFailure::InsufficientItems {
				page: 1,
				got: items_1.len(),
				need: 2,
			});
		}

		// The second-to-last item's cursor, never the last: the
		// backend resumes AT the named item, so this aligns page 2's
		// first item with page 1's last.
		let Some(cursor_a) = second_last_cursor(items_1) else {
			return CheckOutcome::fail(CheckFailure::MissingCursor { page: 1 });
		};

		let page_2 =
			match self.fetch(query, &preprocessor_response, page_size, Some(cursor_a), 2).await {
				Ok(page) => page,
				Err(failure) => return CheckOutcome::fail(failure),
			};
		let items_2 = extract_items(&page_2);

		if items_2.len() < 2 {
			return CheckOutcome::fail(CheckFailure::InsufficientItems {
				page: 2,
				got: items_2.len(),
				need: 2,
			});
		}

		let Some(cursor_b) = second_last_cursor(items_2) else {
			return CheckOutcome::fail(CheckFailure::MissingCursor { page: 2 });
		};

		let page_3 =
			match self.fetch(query, &preprocessor_response, page_size, Some(cursor_b), 3).await {
				Ok(page) => page,
				Err(failure) => return CheckOutcome::fail(failure),
			};
		let items_3 = extract_items(&page_3);

		if items_3.is_empty() {
			return CheckOutcome::fail(CheckFailure::InsufficientItems {
				page: 3,
				got: 0,
				need: 1,
			});
		}

		// Both boundaries are always evaluated so a caller sees every
		// broken overlap at once.
		let mut failures = Vec::new();

		check_boundary(
			Boundary::PageOneToTwo,
			&items_1[items_1.len() - 1],
			&items_2[0],
			&mut failures,
		);
		check_boundary(
			Boundary::PageTwoToThree,
			&items_2[items_2.len() - 1],
			&items_3[0],
			&mut failures,
		);

		if failures.is_empty() { CheckOutcome::pass() } else { CheckOutcome { failures } }
	}

	async fn fetch(
		&self,
		query: &str,
		preprocessor_response: &str,
		page_size: u32,
		cursor: Option<&str>,
		page: u8,
	) -> Result<Value, CheckFailure> {
		let result = self
			.providers
			.feed
			.fetch_page(&self.cfg.feed, query, preprocessor_response, page_size, cursor)
			.await;

		match result {
			Ok(raw) => {
				tracing::debug!(page, items = extract_items(&raw).len(), "Fetched feed page.");

				Ok(raw)
			},
			Err(err) => Err(CheckFailure::PageCall { page, detail: err.to_string() }),
		}
	}
}

fn check_boundary(
	boundary: Boundary,
	last_of_earlier: &Value,
	first_of_later: &Value,
	failures: &mut Vec<CheckFailure>,
) {
	let left = ItemKey::of(last_of_earlier);
	let right = ItemKey::of(first_of_later);

	if !left.matches(&right) {
		failures.push(CheckFailure::BoundaryMismatch { boundary, left, right });
	}
}
