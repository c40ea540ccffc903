use std::io::Write;

use agentchat_core::{ChatClient, Config, Session};
use anyhow::{Context, Result};
use clap::Parser;

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::{App, APOLOGY};
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "agentchat")]
#[command(about = "Chat with a streaming agent backend from the terminal")]
struct Cli {
    /// Backend base URL (overrides config and AGENTCHAT_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Send a single query, print the reply as it streams, and exit
    #[arg(long, value_name = "QUERY")]
    once: Option<String>,

    /// Write logs to this file instead of the config directory
    #[arg(long)]
    log_file: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().context("Failed to load config")?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }

    let log_path = match cli.log_file.or_else(|| config.log_file.clone()) {
        Some(path) => path,
        None => logging::default_log_path(&Config::config_dir()?),
    };
    logging::init_logging(&log_path)?;

    let endpoint = config.endpoint();
    tracing::info!(%endpoint, "starting agentchat");
    let client = ChatClient::from_config(&config);

    match cli.once {
        Some(query) => run_once(&client, &query).await,
        None => run_tui(client, endpoint).await,
    }
}

async fn run_once(client: &ChatClient, query: &str) -> Result<()> {
    let mut session = Session::new();
    let mut stdout = std::io::stdout();

    let result = client
        .submit_query(&mut session, query, |delta| {
            let _ = write!(stdout, "{}", delta.delta);
            let _ = stdout.flush();
        })
        .await;

    match result {
        Ok(response) => {
            println!();
            tracing::info!(session_id = %response.session_id, "query finished");
            Ok(())
        }
        Err(err) => {
            println!();
            eprintln!("{}", APOLOGY);
            Err(err).context("Query failed")
        }
    }
}

async fn run_tui(client: ChatClient, endpoint: String) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let mut app = App::new(client, endpoint);

    let result = event_loop(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    result
}

async fn event_loop(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    let tx = events.sender();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event, &tx),
            None => break,
        }
    }
    Ok(())
}
