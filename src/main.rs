use anyhow::Result;
use dotenvy::dotenv;
use movie_collection::catalog::{CatalogApi, KinopoiskClient};
use movie_collection::config::{report_env_file, AppConfig};
use movie_collection::controller::{MovieListController, UiEvent};
use movie_collection::credentials::CredentialStore;
use movie_collection::images::PosterLoader;
use movie_collection::login::{handle_login_line, LoginStep};
use movie_collection::terminal::{parse_browse_line, NoImages, TerminalNavigator, TerminalScreen};
use movie_collection::view::ImageLoader;
use std::io::{BufRead, Write};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn prompt(text: &str) {
    print!("{}", text);
    let _ = std::io::stdout().flush();
}

// Plain thread: a pending stdin read must not hold up shutdown.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_file = dotenv();
    init_tracing();
    report_env_file(&env_file);
    let config = AppConfig::from_env()?;
    let store = CredentialStore::open(&config.db_path)?;
    let mut input = spawn_stdin_reader();

    println!("{}", LoginStep::Usage.message());
    loop {
        prompt("login> ");
        let Some(line) = input.recv().await else {
            return Ok(());
        };
        let step = handle_login_line(&store, &line)?;
        println!("{}", step.message());
        match step {
            LoginStep::LoggedIn(_) => break,
            LoginStep::Quit => return Ok(()),
            _ => {}
        }
    }
    drop(store);

    let catalog: Arc<dyn CatalogApi> = Arc::new(KinopoiskClient::from_config(&config)?);
    let images: Arc<dyn ImageLoader> = if config.fetch_posters {
        Arc::new(PosterLoader::new()?)
    } else {
        Arc::new(NoImages)
    };
    let screen = TerminalScreen::new(std::io::stdout(), images);
    let mut controller = MovieListController::new(catalog, screen, Box::new(TerminalNavigator));

    println!("Type to search, empty line for popular, :open <n>, :clear, :quit");
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let input_events = events_tx.clone();
    tokio::spawn(async move {
        while let Some(line) = input.recv().await {
            if input_events.send(parse_browse_line(&line)).is_err() {
                return;
            }
        }
        let _ = input_events.send(UiEvent::Quit);
    });
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = events_tx.send(UiEvent::Quit);
    });

    controller.run(events_rx).await;
    Ok(())
}
