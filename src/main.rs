use clap::Parser;
use std::path::Path;
use mokhber::utils::{logger, monitor::RunMonitor};
use mokhber::{
    run_news, run_podcasts, AppConfig, CliConfig, Command, ImagePlan, MokhberError, Result,
    Services,
};

fn report_error(e: &MokhberError) -> ! {
    tracing::error!(
        "Run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("{}", e.user_friendly_message());
    std::process::exit(e.exit_code());
}

fn verify_image(dockerfile: &str) -> Result<bool> {
    let plan = ImagePlan::from_file(dockerfile)?;
    let context = match Path::new(dockerfile).parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut findings = plan.verify();
    findings.extend(plan.verify_context(context));
    if findings.is_empty() {
        println!("{}: OK ({})", dockerfile, plan.command().join(" "));
        return Ok(true);
    }
    for finding in &findings {
        println!("{}: {}", dockerfile, finding);
    }
    Ok(false)
}

async fn run(cli: &CliConfig) -> Result<()> {
    let config = AppConfig::from_file(&cli.config)?;
    config.validate_config()?;

    let services = Services::from_config(&config, &cli.data_dir, cli.dry_run)?;
    let monitor = RunMonitor::new(cli.monitor);
    if monitor.is_enabled() {
        tracing::info!("System monitoring enabled");
    }

    match &cli.command {
        Command::News { profile } => {
            let reports = run_news(&config, &services, profile.as_deref(), &monitor).await?;
            let posted: usize = reports.iter().map(|r| r.published.len()).sum();
            tracing::info!("News run finished: {} posts across {} profiles", posted, reports.len());
        }
        Command::Podcasts { only } => {
            let report = run_podcasts(&config, &services, only.as_deref(), &monitor).await?;
            tracing::info!("Podcast run finished: {} posts", report.published.len());
        }
        Command::VerifyImage { .. } => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_container_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Command::VerifyImage { dockerfile } = &cli.command {
        match verify_image(dockerfile) {
            Ok(true) => return,
            Ok(false) => std::process::exit(1),
            Err(e) => report_error(&e),
        }
    }

    tracing::info!("Starting mokhber");
    if let Err(e) = run(&cli).await {
        report_error(&e);
    }
}
