use anyhow::Context;
use chocan_simulator::app::import::{import_csv_file, TableName};
use chocan_simulator::config::{Cli, Command};
use chocan_simulator::domain::ports::ConfigProvider;
use chocan_simulator::utils::error::ErrorSeverity;
use chocan_simulator::utils::logger;
use chocan_simulator::{
    App, AppConfig, ChocAnError, Database, LocalStorage, ReportEngine, ReportWriter, StdTerminal,
};
use chrono::Local;
use clap::Parser;

fn exit_code(error: &ChocAnError) -> i32 {
    match error.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn build_app(config: &AppConfig) -> App<LocalStorage> {
    let database = Database::new(LocalStorage::new(config.data_dir()));
    let writer = ReportWriter::new(LocalStorage::new(config.report_dir()));
    let engine = ReportEngine::from_config(config, database.clone(), writer);
    App::new(database, engine)
}

async fn run(cli: Cli, config: AppConfig) -> chocan_simulator::Result<()> {
    let app = build_app(&config);

    match cli.command() {
        Command::Login => {
            let mut term = StdTerminal::new();
            app.login_menu(&mut term).await?;
        }
        Command::Import { table, csv } => {
            let table: TableName = table.parse()?;
            let count = import_csv_file(app.database(), table, &csv).await?;
            println!("CSV records successfully added to {} ({} rows)", table, count);
        }
        Command::Reports { date, .. } => {
            let today = date.unwrap_or_else(|| Local::now().date_naive());
            let run = app.reports().run(today).await?;
            if run.is_empty() {
                println!(
                    "No records found within the last {} days.",
                    config.window_days()
                );
            }
            for file in run.files().chain(run.archive.iter()) {
                println!("Report saved to {}", file.location);
            }
        }
        Command::Directory => {
            let file = app.reports().export_provider_directory().await?;
            println!("Provider directory saved to {}", file.location);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = cli
        .resolve_config()
        .context("Failed to load configuration")?;

    let interactive = matches!(cli.command(), Command::Login);
    logger::init_cli_logger(cli.verbose, interactive, config.log_format);
    tracing::info!("Starting chocan");
    tracing::debug!("Resolved config: {:?}", config);

    if let Err(e) = run(cli, config).await {
        tracing::error!(
            "Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("{}", e.user_friendly_message());
        eprintln!("Suggestion: {}", e.recovery_suggestion());

        let code = exit_code(&e);
        if code > 0 {
            std::process::exit(code);
        }
    }

    Ok(())
}
