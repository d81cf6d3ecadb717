use anyhow::Result;
use clap::Parser;
use pr_service_loadtest::{cli::Cli, config::Config, metrics::reporter, runner, telemetry};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use validator::Validate;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    telemetry::init_tracing(cli.json_logs, cli.verbose);

    let mut cfg = Config::load(cli.config.as_deref())?;
    cli.apply(&mut cfg);
    cfg.validate()?;

    info!(
        base_url = %cfg.target.base_url,
        vus = cfg.load.vus,
        duration_secs = cfg.load.duration_secs,
        author_id = %cfg.payload.author_id,
        "PR service load test starting"
    );

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        telemetry::shutdown_signal().await;
        on_signal.cancel();
    });

    let summary = runner::execute(&cfg, cancel).await?;
    let breaches = cfg.thresholds.evaluate(&summary);
    reporter::print_final_report(&summary, &breaches);

    if let Some(path) = &cfg.report.summary_export {
        reporter::export_summary(&summary, path).await?;
    }

    if !breaches.is_empty() {
        for breach in &breaches {
            error!(%breach, "threshold breached");
        }
        anyhow::bail!("{} threshold(s) breached", breaches.len());
    }

    Ok(())
}
