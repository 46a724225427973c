use anyhow::Context;
use clap::Parser;
use result_etl::core::ConfigProvider;
use result_etl::domain::request::ExtractionRequest;
use result_etl::utils::error::{ErrorSeverity, ExtractError};
use result_etl::utils::{logger, validation::Validate};
use result_etl::{
    generate_sessions, CliConfig, EtlEngine, LocalStorage, ResultPipeline, TomlConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let file_config = match &cli.config {
        Some(path) => {
            let mut config = TomlConfig::from_file(path)
                .with_context(|| format!("Failed to load config file '{}'", path))?;
            config.apply_cli_overrides(&cli);
            Some(config)
        }
        None => None,
    };

    let json_logs = file_config
        .as_ref()
        .map(|c| c.json_logging())
        .unwrap_or(cli.json_logs);
    if json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting result-etl");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let request = cli.request();
    match file_config {
        Some(config) => run(config, request, cli.dry_run).await,
        None => run(cli.clone(), request, cli.dry_run).await,
    }
}

async fn run<C>(config: C, request: ExtractionRequest, dry_run: bool) -> anyhow::Result<()>
where
    C: ConfigProvider + Validate + 'static,
{
    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        tracing::error!("Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config, &request);

    if dry_run {
        tracing::info!("DRY RUN MODE - no upstream calls will be made");
        if let Err(e) = perform_dry_run(&request) {
            exit_with(&e);
        }
        return Ok(());
    }

    let storage = LocalStorage::new(config.output_path());
    let pipeline = ResultPipeline::with_http_client(storage, config, request)
        .context("Failed to build the upstream client")?;
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("Extraction completed successfully");
            println!("✅ Extraction completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => exit_with(&e),
    }

    Ok(())
}

fn exit_with(e: &ExtractError) {
    tracing::error!(
        "Extraction failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };

    if exit_code > 0 {
        std::process::exit(exit_code);
    }
}

fn display_config_summary<C: ConfigProvider>(config: &C, request: &ExtractionRequest) {
    let policy = config.retry_policy();

    println!("📋 Configuration Summary:");
    println!("  Upstream: {}", config.api_endpoint());
    println!("  Output: {}", config.output_path());
    println!(
        "  Registration numbers: {} -> {}",
        request.start_reg_no, request.end_reg_no
    );
    println!(
        "  Sessions: {} -> {}",
        request.start_session,
        request.end_session()
    );
    println!("  Concurrent Requests: {}", config.concurrent_requests());
    println!(
        "  Retries: {} (base delay {:?}, timeout {:?})",
        policy.max_retries, policy.base_delay, policy.call_timeout
    );
    println!();
}

fn perform_dry_run(request: &ExtractionRequest) -> result_etl::Result<()> {
    let batch = request.clone().into_batch()?;
    let sessions = generate_sessions(&batch.start_session, &batch.end_session)?;

    println!("🔍 Dry Run Analysis:");
    println!("  Registration numbers: {}", batch.identifiers.len());
    println!("  Sessions ({}):", sessions.len());
    for session in &sessions {
        println!("    {}", session);
    }
    println!(
        "  Work units to dispatch: {}",
        batch.identifiers.len() * sessions.len()
    );
    println!();
    println!("✅ Dry run analysis complete.");

    Ok(())
}
