use std::io;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use game_client::commands::HELP;
use game_client::transport::WebSocketConnector;
use game_client::{ApiClient, Command, Config, GameSession, TerminalRenderer, parse_command};
use game_persistence::{LocalStatsRepository, LocalStore};

#[tokio::main]
async fn main() {
    // Logs go to stderr so they don't interleave with the game output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = Config::new();
    info!("Starting Word Battle client against {}", config.server_url);

    // An unusable stats file only costs persistence, never the game.
    let stats = LocalStatsRepository::new(LocalStore::open(&config.stats_database_url).await);

    let api = match ApiClient::new(&config.server_url, config.request_timeout) {
        Ok(api) => Arc::new(api),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    let connector = Arc::new(WebSocketConnector::new(config.ws_url.clone()));

    let (mut session, mut inbound) = GameSession::new(
        api,
        connector,
        stats,
        TerminalRenderer::new(io::stdout()),
        config.notice_dismiss,
    );
    session.start().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let deadline = session.notice_deadline();

        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        error!("Failed to read input: {}", e);
                        break;
                    }
                };

                match parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => run_command(&mut session, command).await,
                    Err(e) => println!("{}", e),
                }
            }
            Some(event) = inbound.recv() => session.handle_inbound(event).await,
            _ = sleep_until(deadline) => {
                session.dismiss_expired_notice(tokio::time::Instant::now());
            }
        }
    }

    session.shutdown().await;
    info!("Client shutdown complete.");
}

async fn run_command<S, R>(session: &mut GameSession<S, R>, command: Command)
where
    S: game_persistence::KeyValueStore,
    R: game_client::RenderTarget,
{
    match command {
        Command::Register { username, password } => session.register(&username, &password).await,
        Command::Login { username, password } => session.login(&username, &password).await,
        Command::Logout => session.logout().await,
        Command::Play => session.play().await,
        Command::Guess(word) => session.submit_guess(&word).await,
        Command::Stats => session.show_stats().await,
        Command::ResetStats => session.reset_stats().await,
        Command::Help => println!("{}", HELP),
        Command::Quit | Command::Empty => {}
    }
}

/// Waits for the notice deadline, or forever when there is none.
async fn sleep_until(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
