use std::sync::Arc;

use serde_json::Value;

use feedprobe_service::{
	BatchRunner, ContinuityChecker, Providers, QueryOutcome, RerunFilter, Status, runner,
};
use feedprobe_testkit::{ScriptedFeed, ScriptedPreprocess, overlapping_pages, page, test_config};

const PAGE_SIZE: u32 = 4;

fn runner_with_feed(feed: Arc<ScriptedFeed>) -> BatchRunner {
	BatchRunner::new(ContinuityChecker::with_providers(
		test_config(),
		Providers::new(Arc::new(ScriptedPreprocess::default()), feed),
	))
}

fn good_pages() -> Vec<Value> {
	overlapping_pages(PAGE_SIZE as u64)
}

fn queries(texts: &[&str]) -> Vec<String> {
	texts.iter().map(|text| text.to_string()).collect()
}

#[tokio::test]
async fn batch_aggregates_failures_without_aborting() {
	let feed = Arc::new(ScriptedFeed::default());

	// Queries #1, #3, #5 get full three-page scripts; #2 is cut off by
	// a transport failure and #4 by an empty page.
	for page_value in good_pages() {
		feed.push_page(page_value);
	}

	feed.push_failure("connection reset");

	for page_value in good_pages() {
		feed.push_page(page_value);
	}

	feed.push_page(page(Vec::new()));

	for page_value in good_pages() {
		feed.push_page(page_value);
	}

	let runner = runner_with_feed(feed);
	let outcomes = runner
		.run_all(&queries(&["saree", "cooker", "mobile", "kurti", "earrings"]), PAGE_SIZE)
		.await;

	assert_eq!(outcomes.len(), 5);
	assert_eq!(outcomes[0].status, Status::Passed);
	assert_eq!(outcomes[1].status, Status::Failed);
	assert_eq!(outcomes[2].status, Status::Passed);
	assert_eq!(outcomes[3].status, Status::Failed);
	assert_eq!(outcomes[4].status, Status::Passed);
	assert!(outcomes[1].error_detail.contains("Page 1 call failed"));
	assert!(outcomes[3].error_detail.contains("Insufficient items in page 1"));
	assert!(outcomes.iter().filter(|o| o.status == Status::Passed).all(|o| o.error_detail.is_empty()));

	let summary = runner::summarize(&outcomes);

	assert_eq!(summary.passed, 3);
	assert_eq!(summary.failed, 2);
	assert!((summary.success_rate_pct - 60.0).abs() < 1e-12);
}

#[tokio::test]
async fn transport_rerun_touches_only_transport_failures() {
	let feed = Arc::new(ScriptedFeed::new(good_pages()));
	let runner = runner_with_feed(feed.clone());
	let mut outcomes = vec![
		QueryOutcome {
			index: 0,
			query: "saree".to_string(),
			status: Status::Passed,
			error_detail: String::new(),
		},
		QueryOutcome {
			index: 1,
			query: "cooker".to_string(),
			status: Status::Failed,
			error_detail: "Page 2 call failed: connection reset".to_string(),
		},
		QueryOutcome {
			index: 2,
			query: "mobile".to_string(),
			status: Status::Failed,
			error_detail: "Page 1 last (catalog_id=1, product_id=10) != Page 2 first \
			 (catalog_id=2, product_id=20)"
				.to_string(),
		},
	];
	let report = runner.rerun(&mut outcomes, RerunFilter::TransportFailure, PAGE_SIZE).await;

	// Only the transport failure is retried; its script passes now.
	assert_eq!(report.retried, 1);
	assert_eq!(report.passed_after_retry, 1);
	assert_eq!(report.still_failed, 0);
	assert_eq!(outcomes[1].status, Status::Passed);
	assert!(outcomes[1].error_detail.is_empty());
	// The invariant violation is untouched.
	assert_eq!(outcomes[2].status, Status::Failed);
	assert!(outcomes[2].error_detail.contains("Page 1 last"));
	// Exactly one query's worth of page calls happened.
	assert_eq!(feed.call_count(), 3);
}

#[tokio::test]
async fn any_failure_rerun_updates_details_in_place() {
	let feed = Arc::new(ScriptedFeed::default());

	// First rerun candidate passes, the second still fails.
	for page_value in good_pages() {
		feed.push_page(page_value);
	}

	feed.push_failure("still unreachable");

	let runner = runner_with_feed(feed);
	let mut outcomes = vec![
		QueryOutcome {
			index: 0,
			query: "cooker".to_string(),
			status: Status::Failed,
			error_detail: "Page 3 call failed: timeout".to_string(),
		},
		QueryOutcome {
			index: 1,
			query: "cooker".to_string(),
			status: Status::Failed,
			error_detail: "Insufficient items in page 1 (got 0, need at least 2)".to_string(),
		},
	];
	let report = runner.rerun(&mut outcomes, RerunFilter::AnyFailure, PAGE_SIZE).await;

	assert_eq!(report.retried, 2);
	assert_eq!(report.passed_after_retry, 1);
	assert_eq!(report.still_failed, 1);
	// Duplicate query texts stay distinct because entries are updated
	// in place, not matched by text.
	assert_eq!(outcomes[0].status, Status::Passed);
	assert_eq!(outcomes[1].status, Status::Failed);
	assert!(outcomes[1].error_detail.contains("Page 1 call failed"));
}
