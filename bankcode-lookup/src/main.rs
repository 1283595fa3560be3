//! bankcode-lookup - Look up Taiwanese bank branches

mod commands;
mod output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use libbankcode::catalog::mock::MockCatalog;
use libbankcode::logging::LoggingConfig;
use libbankcode::{
    BankcodeError, CatalogError, ClipboardError, ClipboardSink, Config, ExportKind, Location,
    LookupSession, MemoryClipboard, SystemClipboard,
};

use commands::{Command, HELP};
use output::{render_event, render_snapshot, OutputFormat};

#[derive(Parser, Debug)]
#[command(name = "bankcode-lookup")]
#[command(version, about = "Look up Taiwanese bank branches")]
#[command(long_about = r#"Look up Taiwanese bank branches by bank code and branch code.

EXAMPLES:
    # List banks
    bankcode-lookup

    # List the branches of a bank
    bankcode-lookup --bank 004

    # Show one branch and its shareable link
    bankcode-lookup --bank 004 --branch 0040001
    bankcode-lookup --link https://lookup.example.tw/banks/004/0040001

    # Copy the shareable link to the clipboard
    bankcode-lookup --bank 004 --branch 0040001 --copy url

    # JSON output for scripting
    bankcode-lookup --bank 004 --format json | jq '.branches[].branch_code'

    # Interactive session
    bankcode-lookup --interactive

EXIT CODES:
    0 - Success
    1 - Error (catalog unreachable, bad configuration, clipboard refused)
    2 - Linked branch not found
    3 - Invalid input
"#)]
struct Cli {
    /// Bank code to select
    #[arg(short, long, value_name = "CODE")]
    bank: Option<String>,

    /// Branch code to select (requires --bank)
    #[arg(long, value_name = "CODE", requires = "bank")]
    branch: Option<String>,

    /// Deep link to open, as a path or full URL
    #[arg(short, long, value_name = "LINK", conflicts_with_all = ["bank", "branch"])]
    link: Option<String>,

    /// Copy the selected branch to the clipboard
    #[arg(short, long, value_name = "WHAT")]
    #[arg(help = "Copy the selected branch code or shareable URL (code or url)")]
    copy: Option<ExportKind>,

    /// Output format
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    #[arg(value_parser = ["text", "json"])]
    format: String,

    /// Read commands from stdin
    #[arg(short, long)]
    interactive: bool,

    /// Catalog service base URL (overrides config)
    #[arg(long, value_name = "URL", env = "BANKCODE_API_URL")]
    api_url: Option<String>,

    /// Origin used for shareable links (overrides config)
    #[arg(long, value_name = "URL")]
    origin: Option<String>,

    /// Path to the configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Use a built-in sample catalog instead of the network
    #[arg(long)]
    demo: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    LoggingConfig::from_env(cli.verbose).init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        let code = e
            .downcast_ref::<BankcodeError>()
            .map(BankcodeError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let format: OutputFormat = cli.format.parse().map_err(BankcodeError::InvalidInput)?;
    let config = load_config(&cli)?;
    let initial = initial_location(&cli)?;

    let mut session = if cli.demo {
        tracing::info!("Using sample catalog");
        LookupSession::new(Arc::new(MockCatalog::sample()), config.share.origin.clone())
    } else {
        LookupSession::from_config(&config)?
    };

    if cli.interactive {
        return interactive(session, initial, format, cli.demo).await;
    }

    session.start(initial.clone());
    session.settle().await;

    let snapshot = session.snapshot();
    println!("{}", render_snapshot(&snapshot, session.origin(), format)?);

    if let Location::Branch {
        bank_code,
        branch_code,
    } = &initial
    {
        if snapshot.selection.authoritative_branch().is_none() {
            return Err(BankcodeError::from(CatalogError::NotFound(format!(
                "{}/{}",
                bank_code, branch_code
            )))
            .into());
        }
    }

    if let Some(kind) = cli.copy {
        let mut clipboard = open_clipboard(cli.demo).map_err(BankcodeError::from)?;
        let text = session
            .copy(kind, &mut *clipboard)
            .map_err(BankcodeError::from)?;
        eprintln!("Copied {}", text);
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    if let Some(api_url) = &cli.api_url {
        config.catalog.base_url = api_url.clone();
    }
    if let Some(origin) = &cli.origin {
        config.share.origin = origin.clone();
    }
    config.validate()?;
    Ok(config)
}

fn initial_location(cli: &Cli) -> Result<Location> {
    if let Some(link) = &cli.link {
        return Location::try_parse(link).ok_or_else(|| {
            BankcodeError::InvalidInput(format!("Not a branch link: {}", link)).into()
        });
    }

    match (cli.bank.as_deref().map(str::trim), cli.branch.as_deref().map(str::trim)) {
        (Some(""), _) => Err(BankcodeError::InvalidInput("Bank code cannot be empty".to_string()).into()),
        (Some(_), Some("")) => {
            Err(BankcodeError::InvalidInput("Branch code cannot be empty".to_string()).into())
        }
        (Some(bank), Some(branch)) => Ok(Location::branch(bank, branch)),
        (Some(bank), None) => Ok(Location::Bank(bank.to_string())),
        (None, _) => Ok(Location::Root),
    }
}

/// The demo never touches the desktop clipboard
fn open_clipboard(demo: bool) -> std::result::Result<Box<dyn ClipboardSink>, ClipboardError> {
    if demo {
        return Ok(Box::new(MemoryClipboard::new()));
    }
    Ok(Box::new(SystemClipboard::open()?))
}

async fn interactive(
    mut session: LookupSession,
    initial: Location,
    format: OutputFormat,
    demo: bool,
) -> Result<()> {
    let mut events = session.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    session.start(initial);

    loop {
        print_events(&mut events, session.origin(), format)?;

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read command")? else {
                    // End of a piped script: let pending lookups land first
                    session.settle().await;
                    break;
                };
                match Command::parse(&line) {
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(command)) => execute(&mut session, command, format, demo)?,
                    Ok(None) => {}
                    Err(message) => eprintln!("{}", message),
                }
            }
            Some(completion) = session.next_completion() => {
                session.handle_completion(completion);
            }
        }
    }

    print_events(&mut events, session.origin(), format)?;
    Ok(())
}

fn execute(
    session: &mut LookupSession,
    command: Command,
    format: OutputFormat,
    demo: bool,
) -> Result<()> {
    match command {
        Command::Bank(code) => session.select_bank(&code),
        Command::Branch(code) => session.select_branch(&code),
        Command::Open(link) => session.navigate(Location::parse(&link)),
        Command::Back => {
            if !session.back() {
                eprintln!("Already at the oldest address");
            }
        }
        Command::Forward => {
            if !session.forward() {
                eprintln!("Already at the newest address");
            }
        }
        Command::Clear => session.clear(),
        Command::Copy(kind) => match open_clipboard(demo) {
            // Success and failure both arrive as a notification
            Ok(mut clipboard) => {
                let _ = session.copy(kind, &mut *clipboard);
            }
            Err(e) => eprintln!("{}", e),
        },
        Command::Show => {
            println!("{}", render_snapshot(&session.snapshot(), session.origin(), format)?);
        }
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }
    Ok(())
}

fn print_events(
    events: &mut libbankcode::events::EventReceiver,
    origin: &str,
    format: OutputFormat,
) -> Result<()> {
    use tokio::sync::broadcast::error::TryRecvError;

    loop {
        match events.try_recv() {
            Ok(event) => println!("{}", render_event(&event, origin, format)?),
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Output fell behind, events dropped");
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return Ok(()),
        }
    }
}
