use lazytask_smoke::checker::run_check;
use lazytask_smoke::config::CheckerConfig;
use lazytask_smoke::logging::init_logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CheckerConfig::load();
    let _guard = init_logging(config.logging.clone())?;

    tracing::info!(target_url = %config.target_url, "Starting frontend smoke check");

    let report = run_check(&config).await?;
    for line in report.transcript() {
        println!("{}", line);
    }

    Ok(())
}
