use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use meeting_insight_lib::adapters::services::llm::GoogleService;
use meeting_insight_lib::adapters::storage::SqliteStorage;
use meeting_insight_lib::adapters::terminal::TerminalDialog;
use meeting_insight_lib::commands::{self, meeting::EditRequest};
use meeting_insight_lib::domain::modules::InsightModule;
use meeting_insight_lib::domain::stage::Stage;
use meeting_insight_lib::ports::llm::AnalysisGatewayPort;
use meeting_insight_lib::utils::keychain::{resolve_api_key, KeychainManager};
use meeting_insight_lib::{AppConfig, AppError, InsightController};
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "meeting-insight", version, about = "Meeting transcript correction and insight analysis")]
struct Cli {
    /// Directory holding config.json and the database
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Disable bold output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List meeting records, newest first
    List,
    /// Create a new meeting record
    New {
        #[arg(long)]
        title: Option<String>,
    },
    /// Rename a record
    Rename { id: String, title: String },
    /// Delete a record
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Edit a record's metadata or transcript
    Edit {
        id: String,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        keywords: Option<String>,
        #[arg(long)]
        speakers: Option<String>,
        #[arg(long)]
        terminology: Option<String>,
        #[arg(long)]
        length: Option<String>,
        /// Read the raw transcript from a file ("-" for stdin)
        #[arg(long)]
        transcript_file: Option<PathBuf>,
    },
    /// Correct a record's raw transcript
    Correct { id: String },
    /// Run an insight module on a record
    Analyze {
        id: String,
        #[arg(value_parser = parse_module)]
        module: InsightModule,
    },
    /// Ask a follow-up question in a module thread
    Chat {
        id: String,
        #[arg(value_parser = parse_module)]
        module: InsightModule,
        message: String,
    },
    /// Show a record or one of its module threads
    Show {
        id: String,
        #[arg(long, short, value_parser = parse_module)]
        module: Option<InsightModule>,
        /// Print the latest reply unformatted
        #[arg(long, requires = "module")]
        raw: bool,
    },
    /// Show a record's stage, or move to stage 1-3
    Stage {
        id: String,
        #[arg(value_parser = clap::value_parser!(u8).range(1..=3))]
        stage: Option<u8>,
    },
    /// List the insight modules
    Modules,
    /// List Gemini models available to the stored key
    Models,
    /// Render Markdown from a file or stdin
    Render { file: Option<PathBuf> },
    /// Show the effective configuration
    Config,
    /// Manage the Gemini API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(Subcommand)]
enum KeyAction {
    /// Store a key in the OS keychain
    Set { api_key: String },
    /// Show whether a key is stored
    Status,
    /// Remove the stored key
    Delete,
}

/// Module by letter id or keyword
fn parse_module(value: &str) -> Result<InsightModule, String> {
    value.parse().map_err(|e: AppError| e.to_string())
}

fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

fn build_gateway(config: &AppConfig) -> anyhow::Result<GoogleService> {
    let api_key = match resolve_api_key(&KeychainManager::new(), commands::config::PROVIDER) {
        Ok(key) => key,
        Err(e) => {
            log::debug!("No API key available: {}", e);
            String::new()
        }
    };
    Ok(GoogleService::new(api_key, config.llm.clone())?)
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        // The notifier has already reported the failure
        Err(e) if matches!(e.downcast_ref::<AppError>(), Some(AppError::RequestFailed(_))) => {
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let ansi = !cli.no_color && std::io::stdout().is_terminal();
    let config = AppConfig::load(cli.data_dir.clone())?;

    // Commands that never touch the record store
    match &cli.command {
        Command::Modules => {
            println!("{}", commands::llm::list_modules());
            return Ok(());
        }
        Command::Render { file } => {
            let text = read_input(file.as_deref())?;
            println!("{}", commands::llm::render_markdown(&text, ansi));
            return Ok(());
        }
        Command::Config => {
            println!("{}", commands::config::show_config(&config)?);
            return Ok(());
        }
        Command::Key { action } => {
            let keychain = KeychainManager::new();
            let output = match action {
                KeyAction::Set { api_key } => commands::config::save_api_key(&keychain, api_key)?,
                KeyAction::Status => commands::config::api_key_status(&keychain),
                KeyAction::Delete => commands::config::delete_api_key(&keychain)?,
            };
            println!("{}", output);
            return Ok(());
        }
        Command::Models => {
            let gateway = build_gateway(&config)?;
            if !gateway.is_configured() {
                bail!("No API key configured; run `meeting-insight key set <KEY>`");
            }
            println!("{}", commands::llm::fetch_models(&gateway).await?);
            return Ok(());
        }
        _ => {}
    }

    let storage = SqliteStorage::new(config.database_path())?;
    storage.run_migrations()?;

    let gateway = build_gateway(&config)?;
    let needs_gateway = matches!(
        cli.command,
        Command::Correct { .. } | Command::Analyze { .. } | Command::Chat { .. }
    );
    if needs_gateway && !gateway.is_configured() {
        bail!("No API key configured; run `meeting-insight key set <KEY>` or set GEMINI_API_KEY");
    }

    let assume_yes = matches!(cli.command, Command::Delete { yes: true, .. });
    let dialog = Arc::new(TerminalDialog::new().assume_yes(assume_yes));
    let controller = InsightController::new(Arc::new(storage), Arc::new(gateway), dialog.clone(), dialog)
        .with_storage_key(config.storage_key.clone());
    controller.load();

    let output = match cli.command {
        Command::List => commands::meeting::list_records(&controller.snapshot()),
        Command::New { title } => commands::meeting::create_record(&controller, title.as_deref()),
        Command::Rename { id, title } => commands::meeting::rename_record(&controller, &id, &title)?,
        Command::Delete { id, .. } => commands::meeting::delete_record(&controller, &id)?,
        Command::Edit {
            id,
            subject,
            keywords,
            speakers,
            terminology,
            length,
            transcript_file,
        } => {
            let transcript = match transcript_file {
                Some(path) => Some(read_input(Some(&path))?),
                None => None,
            };
            let request = EditRequest {
                subject,
                keywords,
                speakers,
                terminology,
                length,
                transcript,
            };
            commands::meeting::edit_record(&controller, &id, &request)?
        }
        Command::Correct { id } => commands::llm::correct_record(&controller, &id).await?,
        Command::Analyze { id, module } => {
            commands::llm::analyze_record(&controller, &id, module, ansi).await?
        }
        Command::Chat { id, module, message } => {
            commands::llm::chat(&controller, &id, module, &message, ansi).await?
        }
        Command::Show { id, module, raw } => {
            commands::meeting::show_record(&controller, &id, module, raw, ansi)?
        }
        Command::Stage { id, stage } => {
            commands::meeting::stage_record(&controller, &id, stage.and_then(Stage::from_number))?
        }
        Command::Modules | Command::Models | Command::Render { .. } | Command::Config | Command::Key { .. } => {
            unreachable!("handled before the record store is opened")
        }
    };

    println!("{}", output);
    Ok(())
}
