use serde::{Deserialize, Serialize};

use crate::{ContinuityChecker, checker::TRANSPORT_FAILURE_MARKER};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
	Passed,
	Failed,
}

/// One query's result within a batch. `index` is the query's original
/// row position, so duplicate query texts stay unambiguous across
/// reruns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutcome {
	pub index: usize,
	pub query: String,
	pub status: Status,
	/// Empty iff the status is PASSED.
	#[serde(default)]
	pub error_detail: String,
}

/// Which previously failed entries a rerun re-executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RerunFilter {
	AnyFailure,
	/// Only failures whose detail carries the page-call transport
	/// marker; invariant violations and malformed responses are left
	/// alone since retrying them will not change the verdict.
	TransportFailure,
}

impl RerunFilter {
	fn selects(self, outcome: &QueryOutcome) -> bool {
		if outcome.status != Status::Failed {
			return false;
		}

		match self {
			Self::AnyFailure => true,
			Self::TransportFailure => is_transport_failure(&outcome.error_detail),
		}
	}
}

pub fn is_transport_failure(detail: &str) -> bool {
	detail.to_lowercase().contains(TRANSPORT_FAILURE_MARKER)
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct BatchSummary {
	pub total: usize,
	pub passed: usize,
	pub failed: usize,
	pub success_rate_pct: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RerunReport {
	pub retried: usize,
	pub passed_after_retry: usize,
	pub still_failed: usize,
}

/// Drives the continuity check across a query list, one query at a
/// time. A failed query never stops the batch.
pub struct BatchRunner {
	checker: ContinuityChecker,
}

impl BatchRunner {
	pub fn new(checker: ContinuityChecker) -> Self {
		Self { checker }
	}

	pub fn checker(&self) -> &ContinuityChecker {
		&self.checker
	}

	pub async fn run_all(&self, queries: &[String], page_size: u32) -> Vec<QueryOutcome> {
		let mut outcomes = Vec::with_capacity(queries.len());

		for (index, query) in queries.iter().enumerate() {
			tracing::info!(index, total = queries.len(), query = %query, "Checking query.");

			let outcome = self.checker.check_with_page_size(query, page_size).await;
			let status = if outcome.passed() { Status::Passed } else { Status::Failed };
			let error_detail = outcome.error_detail().unwrap_or_default();

			if status == Status::Failed {
				tracing::warn!(index, query = %query, detail = %error_detail, "Query failed.");
			}

			outcomes.push(QueryOutcome { index, query: query.clone(), status, error_detail });
		}

		outcomes
	}

	/// Re-executes exactly the failed entries the filter selects and
	/// overwrites their status and detail in place; everything else is
	/// left untouched. Entries are matched by their own record, so
	/// duplicate query texts cannot collide.
	pub async fn rerun(
		&self,
		outcomes: &mut [QueryOutcome],
		filter: RerunFilter,
		page_size: u32,
	) -> RerunReport {
		let mut report = RerunReport::default();

		for outcome in outcomes.iter_mut() {
			if !filter.selects(outcome) {
				continue;
			}

			tracing::info!(index = outcome.index, query = %outcome.query, "Retrying query.");

			let rerun = self.checker.check_with_page_size(&outcome.query, page_size).await;

			report.retried += 1;

			if rerun.passed() {
				report.passed_after_retry += 1;
				outcome.status = Status::Passed;
				outcome.error_detail = String::new();
			} else {
				report.still_failed += 1;
				outcome.status = Status::Failed;
				outcome.error_detail = rerun.error_detail().unwrap_or_default();
			}
		}

		report
	}
}

pub fn summarize(outcomes: &[QueryOutcome]) -> BatchSummary {
	let total = outcomes.len();
	let passed = outcomes.iter().filter(|outcome| outcome.status == Status::Passed).count();
	let failed = total - passed;
	let success_rate_pct =
		if total == 0 { 0.0 } else { passed as f64 / total as f64 * 100.0 };

	BatchSummary { total, passed, failed, success_rate_pct }
}
