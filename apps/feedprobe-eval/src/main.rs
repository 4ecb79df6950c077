// crates.io
use clap::Parser;
// self
use feedprobe_eval::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = Args::parse();
	feedprobe_eval::run(args).await
}
