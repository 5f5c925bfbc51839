use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = pinvault_api::Args::parse();

	pinvault_api::run(args).await
}
