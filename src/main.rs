use clap::Parser;
use moitt::utils::{logger, validation::Validate};
use moitt::{CliConfig, EnvConfig, MoittError, Orchestrator, ProcessRunner, RunOptions, Settings};
use std::sync::Arc;

fn fail(stage: &str, e: &MoittError) -> ! {
    tracing::error!(
        "❌ {} failed: {} (Category: {:?}, Severity: {:?})",
        stage,
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting moitt");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        fail("Configuration validation", &e);
    }

    let settings = match Settings::load(&config.config).and_then(|s| s.validate().map(|_| s)) {
        Ok(settings) => settings,
        Err(e) => fail("Loading settings", &e),
    };

    let orchestrator = match Orchestrator::new(
        Arc::new(ProcessRunner::new()),
        settings,
        EnvConfig::from_env(),
        RunOptions::from(&config),
    ) {
        Ok(orchestrator) => orchestrator,
        Err(e) => fail("Setup", &e),
    };

    match orchestrator.run().await {
        Ok(report) if report.performed => {
            println!(
                "✅ {} {} completed in {}s",
                report.operation,
                report
                    .component
                    .map(|c| c.to_string())
                    .unwrap_or_default(),
                report.elapsed_seconds()
            );
        }
        Ok(_) => {}
        Err(e) => fail(&config.operation().to_string(), &e),
    }

    Ok(())
}
