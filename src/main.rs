use archlens_core::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    archlens_core::init_tracing(&config.logging.level)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting archlens analyzer"
    );

    archlens::app::run(config).await
}
