use anyhow::Result;
use clap::{Parser, Subcommand};
use kickcount::format::format_record_line;
use kickcount::{console, guide, history, Config, FileStore, RecordStore, SessionTimer};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "kickcount", version, about = "Time and record fetal movement counting sessions")]
struct Cli {
    /// Configuration file (extension optional)
    #[arg(long, default_value = "config/kickcount")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List past sessions, most recent first
    List,
    /// Time a new session
    Record,
    /// Show how to count kicks
    Guide,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("Data directory: {}", cfg.storage.data_dir);

    let backend = Arc::new(FileStore::new(&cfg.storage.data_dir));
    let store = Arc::new(RecordStore::new(backend, cfg.storage.records_key.clone()));

    match cli.command {
        Command::List => list(&store).await,
        Command::Record => record(&cfg, store).await?,
        Command::Guide => {
            println!("Steps to count fetal kicks");
            for step in guide::counting_steps(cfg.session.kick_target) {
                println!("{}. {}", step.number, step.text);
            }
        }
    }

    Ok(())
}

async fn list(store: &RecordStore) {
    let records = history::load_sorted(store).await;

    println!("Past records");
    if records.is_empty() {
        println!("No records yet");
        return;
    }
    for record in &records {
        println!("{}", format_record_line(record));
    }
}

async fn record(cfg: &Config, store: Arc<RecordStore>) -> Result<()> {
    let mut timer = SessionTimer::new(cfg.session_config(), store);
    timer.start()?;

    let commands = console::spawn_stdin_reader();
    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    let end = console::run_session(&mut timer, commands, shutdown, &mut std::io::stdout()).await?;
    info!("Recording finished: {:?}", end);

    Ok(())
}
