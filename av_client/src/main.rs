//! A command-line client for the aviator crash game.
//!
//! The client follows rounds over the server's push channel and places
//! bets and cashouts over HTTP, driven by commands typed on stdin.

use anyhow::{Context, Result, bail};
use av_client::{
    api_client::HttpBettingApi,
    commands::{COMMAND_HELP, Command, parse_command},
    config::{ClientConfig, DEFAULT_SERVER_URL, Overrides},
    display, logging,
    websocket_client::PushFeed,
};
use aviator::{GameSession, SessionError, SessionHandle};
use pico_args::Arguments;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

const HELP: &str = "\
Play the aviator crash game from the terminal

USAGE:
  av_client [OPTIONS]

OPTIONS:
  --server URL          Game server URL  [default: env CRASH_SERVER_URL or http://localhost:5000]
  --push-url URL        Push channel URL [default: derived from the server URL]
  --player ID           Player id        [default: env CRASH_PLAYER_ID or User1]
  --bet AMOUNT          Default bet amount [default: env CRASH_BET_AMOUNT or 100]
  --timeout-ms N        Request timeout in milliseconds [default: 10000]

FLAGS:
  -h, --help            Print help information

ENVIRONMENT:
  CRASH_INITIAL_BALANCE          Balance shown before the server reports one
  CRASH_RECONNECT_MAX_ATTEMPTS   Give up on the push channel after N failed attempts
  RUST_LOG                       Log filter (e.g., debug)
";

/// Capacity of the terminal's subscription to session updates
const UPDATE_BUFFER: usize = 256;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let overrides = Overrides {
        server_url: pargs.opt_value_from_str("--server")?,
        push_url: pargs.opt_value_from_str("--push-url")?,
        player_id: pargs.opt_value_from_str("--player")?,
        bet_amount: pargs.opt_value_from_str("--bet")?,
        request_timeout_ms: pargs.opt_value_from_str("--timeout-ms")?,
    };

    logging::init();

    let config = ClientConfig::from_env(overrides).context("Failed to load configuration")?;
    run(config).await
}

async fn run(config: ClientConfig) -> Result<()> {
    info!(
        "Connecting to {} (push: {})",
        config.server_url, config.push_url
    );
    if config.server_url == DEFAULT_SERVER_URL {
        info!("Using the default server URL; pass --server to change it");
    }

    let api = Arc::new(HttpBettingApi::new(&config.server_url));
    let (session, handle) = GameSession::new(config.session.clone(), api);
    let session_task = tokio::spawn(session.run());

    let mut updates = handle.subscribe(UPDATE_BUFFER).await?;
    let printer = tokio::spawn(async move {
        while let Some(update) = updates.recv().await {
            if let Some(record) = display::describe(&update) {
                println!("{record}");
            }
        }
    });

    let feed = PushFeed::new(config.push_url.clone(), handle.clone(), config.reconnect);
    let mut feed_task = tokio::spawn(feed.run());

    println!(
        "Playing as {}. Type 'help' for available commands.",
        config.session.player_id
    );

    let result = tokio::select! {
        result = command_loop(&handle) => result,
        feed = &mut feed_task => match feed {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e.context("Push channel unavailable")),
            Err(e) => Err(e.into()),
        },
    };

    let _ = handle.shutdown().await;
    feed_task.abort();
    let _ = session_task.await;
    let _ = printer.await;

    println!("\nDisconnected.");
    result
}

/// Read commands from stdin until `quit` or EOF.
async fn command_loop(handle: &SessionHandle) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        if line.trim().is_empty() {
            continue;
        }

        match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(Command::Help) => print!("{COMMAND_HELP}"),
            Ok(Command::Status) => println!("{}", display::status(&handle.snapshot().await?)),
            Ok(Command::Bet(amount)) => check_open(handle.place_bet(amount).await)?,
            Ok(Command::CashOut) => check_open(handle.cash_out().await)?,
            Ok(Command::SetAmount(amount)) => check_open(handle.set_bet_amount(amount).await)?,
            Err(e) => eprintln!("{e}"),
        }
    }

    Ok(())
}

/// Local rejections reach the terminal as updates; only a closed session
/// ends the loop.
fn check_open(result: Result<(), SessionError>) -> Result<()> {
    match result {
        Err(SessionError::Closed) => bail!("Session closed"),
        Ok(()) | Err(SessionError::Rejected(_)) => Ok(()),
    }
}
