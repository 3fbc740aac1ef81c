use tracing::{info, warn, Level};
use wetreminder::{AppError, Configuration, PipelineService};

fn init_logging(level: &str) {
    let level = level.parse::<Level>().unwrap_or(Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let configuration = Configuration::load()?;
    init_logging(&configuration.log_level);

    let service = PipelineService::builder(configuration).build()?;
    match service.discover_actuator().await {
        Some(port) => info!("Using actuator port {}", port),
        None => warn!("No actuator port configured or detected"),
    }
    info!("Health: {}", serde_json::to_string(&service.health())?);

    tokio::signal::ctrl_c().await?;
    service.shutdown().await;
    Ok(())
}
