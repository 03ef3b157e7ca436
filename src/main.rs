use anyhow::Context;
use snap_mailer::utils::{logger, validation::Validate};
use snap_mailer::{
    CaptureError, CaptureSession, CliConfig, CommandMailer, FileConfig, HttpFetcher,
    PayloadStore, RunConfig, TokioSleeper,
};

#[tokio::main]
async fn main() {
    let cli = match CliConfig::try_parse_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(e) => {
            let code = CliConfig::exit_code_for(&e);
            let _ = e.print();
            std::process::exit(code);
        }
    };

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting snap-mailer");

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };
    tracing::debug!("Run config: {:?}", config);

    let (fetcher, mailer, store) = match preflight(&config) {
        Ok(parts) => parts,
        Err(e) => {
            tracing::error!("❌ {:#}", e);
            if let Some(capture_err) = e.downcast_ref::<CaptureError>() {
                tracing::error!("💡 Suggestion: {}", capture_err.recovery_suggestion());
            }
            eprintln!("❌ {:#}", e);
            std::process::exit(1);
        }
    };

    let sleeper = TokioSleeper;
    let tally = CaptureSession::new(&config, &fetcher, &mailer, &sleeper, &store)
        .run()
        .await;

    println!(
        "📊 Captures: {} total, {} succeeded, {} failed",
        config.total_captures, tally.success_count, tally.failure_count
    );

    if !tally.all_succeeded() {
        std::process::exit(1);
    }
}

fn load_config(cli: &CliConfig) -> snap_mailer::Result<RunConfig> {
    let file = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            Some(FileConfig::from_file(path)?)
        }
        None => None,
    };

    let config = cli.resolve(file.as_ref());
    config.validate()?;
    Ok(config)
}

/// Everything that must hold before the first capture. Failures here are fatal.
fn preflight(config: &RunConfig) -> anyhow::Result<(HttpFetcher, CommandMailer, PayloadStore)> {
    let mailer = CommandMailer::new(config.mail_program.clone());
    let mail_path = mailer
        .ensure_available()
        .context("mail program is not installed")?;
    tracing::debug!("Using mail program at {}", mail_path.display());

    let store = PayloadStore::new(config.temp_dir.clone());
    store
        .prepare()
        .context("temp storage could not be created")?;

    let fetcher = HttpFetcher::new(config.fetch_timeout())
        .context("HTTP client could not be initialised")?;

    Ok((fetcher, mailer, store))
}
