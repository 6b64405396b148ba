use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = fai_api::Args::parse();
	fai_api::run(args).await
}
