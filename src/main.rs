//! GemHook - Entry Point
//!
//! Stands in for the note-taking host: loads the vault's settings, boots the
//! model client and runs Hyper-Command blocks found in Markdown notes.

use clap::{ArgAction, Parser, Subcommand};
use gemhook::command::block::{HyperBlock, OutputSink, EXECUTING_PLACEHOLDER};
use gemhook::command::executor::{HyperCommandRequest, Notifier};
use gemhook::command::scanner::find_blocks;
use gemhook::core::config::{FileSettingsStore, Settings};
use gemhook::core::error::Result;
use gemhook::vault::FsVault;
use gemhook::GemHook;

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

/// Run Gemini Hyper-Command blocks embedded in Markdown notes
#[derive(Parser, Debug)]
#[command(name = "gemhook", version)]
struct Cli {
    /// Vault root; note and context paths are resolved against it
    #[arg(long, global = true, default_value = ".")]
    vault: PathBuf,

    /// Settings file (defaults to <vault>/.gemhook/settings.toml)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Announce readiness and construct the model client
    Boot,
    /// Run a Hyper-Command on TEXT, or on stdin when TEXT is omitted
    Exec {
        text: Option<String>,
        /// Context document overriding the configured one
        #[arg(long)]
        context: Option<String>,
    },
    /// Run one gemhook block of a note
    Run {
        note: PathBuf,
        /// 1-based position of the block in the note
        #[arg(long, default_value_t = 1)]
        block: usize,
    },
    /// Locate the last gemhook block of a note
    RunLast { note: PathBuf },
    /// List the gemhook blocks of a note
    Blocks { note: PathBuf },
    /// Show or edit settings
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    Show,
    SetKey { key: String },
    SetContext { path: String },
    SetGem { persona: String },
    SetModel { model: String },
    SetAutoBoot {
        #[arg(action = ArgAction::Set)]
        enabled: bool,
    },
    /// Set the request timeout in seconds; omit to wait indefinitely
    SetTimeout { secs: Option<u64> },
}

/// Notifications go to stderr so stdout carries only block output
struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, message: &str) {
        eprintln!("[notice] {}", message);
    }
}

/// The terminal's output area for a single block
struct TerminalOutput;

impl OutputSink for TerminalOutput {
    fn write(&self, text: &str) {
        if text == EXECUTING_PLACEHOLDER {
            eprintln!("{}", text);
        } else {
            println!("{}", text);
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "gemhook=debug"
    } else {
        "gemhook=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let store = match &cli.settings {
        Some(path) => FileSettingsStore::new(path),
        None => FileSettingsStore::for_vault(&cli.vault),
    };
    let vault = FsVault::new(&cli.vault);

    let mut app = GemHook::load(
        Box::new(store),
        Box::new(vault.clone()),
        Box::new(TerminalNotifier),
    )?;

    match cli.command {
        Command::Config(cmd) => configure(&mut app, cmd),
        Command::Blocks { note } => {
            let content = vault.read_note(&note)?;
            for (i, block) in find_blocks(&content).iter().enumerate() {
                println!("--- block {} ---", i + 1);
                println!("{}", block);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::RunLast { note } => {
            app.activate();
            let content = vault.read_note(&note)?;
            if app.run_last_block(&content).is_none() {
                tracing::info!(note = %note.display(), "no gemhook block found");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Boot => {
            app.boot();
            Ok(ExitCode::SUCCESS)
        }
        Command::Exec { text, context } => {
            let text = match text {
                Some(text) => text,
                None => {
                    let mut buf = String::new();
                    io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let mut request = HyperCommandRequest::new(text);
            if let Some(path) = context {
                request = request.with_context_document(path);
            }

            app.activate();
            let rt = Runtime::new()?;
            eprintln!("{}", EXECUTING_PLACEHOLDER);
            let result = rt.block_on(app.execute(&request));
            println!("{}", result.text_for_display());
            Ok(exit_code(result.is_success()))
        }
        Command::Run { note, block } => {
            let content = vault.read_note(&note)?;
            let blocks = find_blocks(&content);
            let Some(source) = block.checked_sub(1).and_then(|i| blocks.get(i)) else {
                eprintln!(
                    "{} has {} gemhook block(s); block {} does not exist",
                    note.display(),
                    blocks.len(),
                    block
                );
                return Ok(ExitCode::FAILURE);
            };

            app.activate();
            let rt = Runtime::new()?;
            let widget = HyperBlock::with_sink(source.clone(), TerminalOutput);
            let result = rt.block_on(app.run_block(&widget));
            Ok(exit_code(result.is_success()))
        }
    }
}

fn configure(app: &mut GemHook, cmd: ConfigCommand) -> Result<ExitCode> {
    match cmd {
        ConfigCommand::Show => print_settings(app.settings()),
        ConfigCommand::SetKey { key } => app.set_api_key(key)?,
        ConfigCommand::SetContext { path } => app.update_settings(|s| s.context_path = path)?,
        ConfigCommand::SetGem { persona } => app.update_settings(|s| s.default_gem = persona)?,
        ConfigCommand::SetModel { model } => app.update_settings(|s| s.model = model)?,
        ConfigCommand::SetAutoBoot { enabled } => {
            app.update_settings(|s| s.auto_boot = enabled)?
        }
        ConfigCommand::SetTimeout { secs } => {
            app.update_settings(|s| s.request_timeout_secs = secs.filter(|&n| n > 0))?
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_settings(settings: &Settings) {
    let key = if settings.is_configured() {
        "(set)"
    } else {
        "(not set)"
    };
    println!("api_key       {}", key);
    println!("default_gem   {}", settings.default_gem);
    println!("context_path  {}", settings.context_path);
    println!("auto_boot     {}", settings.auto_boot);
    println!("model         {}", settings.model);
    match settings.request_timeout_secs {
        Some(secs) => println!("timeout       {}s", secs),
        None => println!("timeout       none"),
    }
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
