use std::{
	fs,
	path::{Path, PathBuf},
};

use clap::Parser;
use color_eyre::eyre;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use feedprobe_config::Config;
use feedprobe_service::{
	BatchRunner, BatchSummary, ContinuityChecker, QueryOutcome, RerunFilter, RerunReport, runner,
};

#[derive(Debug, Parser)]
#[command(
	version = feedprobe_cli::VERSION,
	rename_all = "kebab",
	styles = feedprobe_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// JSON dataset with the queries to check.
	#[arg(
		long,
		short = 'd',
		value_name = "FILE",
		required_unless_present_any = ["query", "rerun_failed", "rerun_transport_failed"]
	)]
	pub dataset: Option<PathBuf>,
	/// Check one query and print its outcome instead of running a
	/// dataset.
	#[arg(long, value_name = "TEXT", conflicts_with = "dataset")]
	pub query: Option<String>,
	/// Where per-query outcomes are written; required for rerun modes,
	/// which read and rewrite this file.
	#[arg(long, short = 'o', value_name = "FILE")]
	pub out: Option<PathBuf>,
	#[arg(long, value_name = "N")]
	pub page_size: Option<u32>,
	/// Process only the first N dataset queries.
	#[arg(long, value_name = "N")]
	pub limit: Option<usize>,
	/// Re-check every failed entry in the --out file.
	#[arg(long, requires = "out", conflicts_with_all = ["dataset", "query"])]
	pub rerun_failed: bool,
	/// Re-check only entries that failed at the transport layer.
	#[arg(long, requires = "out", conflicts_with_all = ["dataset", "query", "rerun_failed"])]
	pub rerun_transport_failed: bool,
}

#[derive(Debug, Deserialize)]
struct EvalDataset {
	name: Option<String>,
	queries: Vec<String>,
}

#[derive(Debug, Serialize)]
struct EvalOutput {
	dataset: DatasetInfo,
	settings: Settings,
	summary: BatchSummary,
	queries: Vec<QueryOutcome>,
}

#[derive(Debug, Serialize)]
struct DatasetInfo {
	name: String,
	query_count: usize,
}

#[derive(Debug, Serialize)]
struct Settings {
	config_path: String,
	page_size: u32,
}

#[derive(Debug, Serialize)]
struct RerunOutput {
	settings: Settings,
	filter: &'static str,
	report: RerunReport,
	summary: BatchSummary,
	queries: Vec<QueryOutcome>,
}

#[derive(Debug, Serialize)]
struct SingleQueryOutput {
	query: String,
	passed: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	error_detail: Option<String>,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = feedprobe_config::load(&args.config)?;
	let filter = EnvFilter::new(config.service.log_level.clone());

	tracing_subscriber::fmt().with_env_filter(filter).init();

	let page_size = resolve_page_size(args.page_size, &config)?;
	let settings = Settings {
		config_path: args.config.display().to_string(),
		page_size,
	};
	let batch = BatchRunner::new(ContinuityChecker::new(config));

	if let Some(query) = &args.query {
		return run_single(&batch, query, page_size).await;
	}

	if args.rerun_failed || args.rerun_transport_failed {
		let rerun_filter = if args.rerun_transport_failed {
			RerunFilter::TransportFailure
		} else {
			RerunFilter::AnyFailure
		};
		let out = args.out.as_ref().expect("clap enforces --out for rerun modes");

		return run_rerun(&batch, out.as_path(), rerun_filter, settings, page_size).await;
	}

	let dataset_path =
		args.dataset.as_ref().ok_or_else(|| eyre::eyre!("--dataset is required."))?;
	let dataset = load_dataset(dataset_path.as_path())?;
	let queries = limit_queries(dataset.queries, args.limit);
	let outcomes = batch.run_all(&queries, page_size).await;
	let summary = runner::summarize(&outcomes);

	if let Some(out) = &args.out {
		write_outcomes(out.as_path(), &outcomes)?;
	}

	let output = EvalOutput {
		dataset: DatasetInfo {
			name: dataset.name.unwrap_or_else(|| "eval".to_string()),
			query_count: queries.len(),
		},
		settings,
		summary,
		queries: outcomes,
	};
	let json = serde_json::to_string_pretty(&output)?;

	println!("{json}");

	Ok(())
}

async fn run_single(
	batch: &BatchRunner,
	query: &str,
	page_size: u32,
) -> color_eyre::Result<()> {
	let outcome = batch.checker().check_with_page_size(query, page_size).await;
	let output = SingleQueryOutput {
		query: query.to_string(),
		passed: outcome.passed(),
		error_detail: outcome.error_detail(),
	};
	let json = serde_json::to_string_pretty(&output)?;

	println!("{json}");

	if !output.passed {
		return Err(eyre::eyre!("Continuity check failed for query {query:?}."));
	}

	Ok(())
}

async fn run_rerun(
	batch: &BatchRunner,
	out: &Path,
	rerun_filter: RerunFilter,
	settings: Settings,
	page_size: u32,
) -> color_eyre::Result<()> {
	let mut outcomes = read_outcomes(out)?;
	let report = batch.rerun(&mut outcomes, rerun_filter, page_size).await;

	write_outcomes(out, &outcomes)?;

	let output = RerunOutput {
		settings,
		filter: match rerun_filter {
			RerunFilter::AnyFailure => "any-failure",
			RerunFilter::TransportFailure => "transport-failure",
		},
		report,
		summary: runner::summarize(&outcomes),
		queries: outcomes,
	};
	let json = serde_json::to_string_pretty(&output)?;

	println!("{json}");

	Ok(())
}

fn resolve_page_size(override_size: Option<u32>, config: &Config) -> color_eyre::Result<u32> {
	let page_size = override_size.unwrap_or(config.check.page_size);

	if page_size < 2 {
		return Err(eyre::eyre!("--page-size must be at least 2."));
	}

	Ok(page_size)
}

fn load_dataset(path: &Path) -> color_eyre::Result<EvalDataset> {
	let raw = fs::read_to_string(path)?;
	let mut dataset: EvalDataset = serde_json::from_str(&raw)?;

	dataset.queries.retain(|query| !query.trim().is_empty());

	if dataset.queries.is_empty() {
		return Err(eyre::eyre!("Dataset must include at least one non-empty query."));
	}

	Ok(dataset)
}

fn limit_queries(queries: Vec<String>, limit: Option<usize>) -> Vec<String> {
	match limit {
		Some(limit) if limit < queries.len() => queries.into_iter().take(limit).collect(),
		_ => queries,
	}
}

fn read_outcomes(path: &Path) -> color_eyre::Result<Vec<QueryOutcome>> {
	let raw = fs::read_to_string(path)
		.map_err(|err| eyre::eyre!("Failed to read results file at {path:?}: {err}."))?;
	let outcomes = serde_json::from_str(&raw)
		.map_err(|err| eyre::eyre!("Failed to parse results file at {path:?}: {err}."))?;

	Ok(outcomes)
}

fn write_outcomes(path: &Path, outcomes: &[QueryOutcome]) -> color_eyre::Result<()> {
	let json = serde_json::to_string_pretty(outcomes)?;

	fs::write(path, json)
		.map_err(|err| eyre::eyre!("Failed to write results file at {path:?}: {err}."))?;

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	use feedprobe_testkit::test_config;

	#[test]
	fn page_size_override_beats_config() {
		let config = test_config();

		assert_eq!(resolve_page_size(Some(5), &config).expect("Override must win."), 5);
		assert_eq!(resolve_page_size(None, &config).expect("Config must apply."), 20);
		assert!(resolve_page_size(Some(1), &config).is_err());
	}

	#[test]
	fn limit_truncates_only_when_smaller() {
		let queries = vec!["a".to_string(), "b".to_string(), "c".to_string()];

		assert_eq!(limit_queries(queries.clone(), Some(2)).len(), 2);
		assert_eq!(limit_queries(queries.clone(), Some(10)).len(), 3);
		assert_eq!(limit_queries(queries, None).len(), 3);
	}

	#[test]
	fn dataset_rejects_all_blank_queries() {
		let raw = r#"{ "queries": ["", "  "] }"#;
		let mut dataset: EvalDataset =
			serde_json::from_str(raw).expect("Dataset JSON must parse.");

		dataset.queries.retain(|query| !query.trim().is_empty());

		assert!(dataset.queries.is_empty());
	}

	#[test]
	fn outcomes_round_trip_through_the_results_file_format() {
		let outcomes = vec![QueryOutcome {
			index: 0,
			query: "saree".to_string(),
			status: feedprobe_service::Status::Failed,
			error_detail: "Page 1 call failed: timeout".to_string(),
		}];
		let json = serde_json::to_string_pretty(&outcomes).expect("Outcomes must serialize.");
		let parsed: Vec<QueryOutcome> =
			serde_json::from_str(&json).expect("Outcomes must parse back.");

		assert_eq!(parsed[0].query, "saree");
		assert_eq!(parsed[0].status, feedprobe_service::Status::Failed);
	}
}
