//! Interactive recording loop for the terminal
//!
//! Stdin is read on a plain OS thread and forwarded over a channel, so the
//! loop (and the process) can finish while a read is still blocked.

use anyhow::Result;
use std::future::Future;
use std::io::{BufRead, Write};
use tokio::sync::mpsc;
use tracing::info;

use crate::format::{format_timer, save_prompt};
use crate::record::DfmRecord;
use crate::session::{SaveOutcome, SessionTimer};

/// A line typed during a recording
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Save,
    Stop,
    Discard,
    Unknown(String),
}

impl ConsoleCommand {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "s" | "save" => ConsoleCommand::Save,
            "x" | "stop" => ConsoleCommand::Stop,
            "d" | "discard" => ConsoleCommand::Discard,
            other => ConsoleCommand::Unknown(other.to_string()),
        }
    }
}

/// How a recording loop ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    Saved(DfmRecord),
    /// Discarded by command or because input closed
    Discarded,
    /// Discarded because the shutdown signal fired
    Interrupted,
}

/// Forward stdin lines from a dedicated thread
///
/// The thread is never joined; it ends with the process or when stdin closes.
pub fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);

    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });

    rx
}

/// Drive a started timer from typed commands until it is saved or discarded
///
/// `shutdown` resolving (Ctrl-C in the binary) discards the session.
pub async fn run_session<W, F>(
    timer: &mut SessionTimer,
    mut commands: mpsc::Receiver<String>,
    shutdown: F,
    out: &mut W,
) -> Result<SessionEnd>
where
    W: Write,
    F: Future<Output = ()>,
{
    let kick_target = timer.config().kick_target;
    let minimum = timer.config().min_session_secs;

    writeln!(out, "Stop recording after {} kicks.", kick_target)?;
    writeln!(out, "Commands: s = save, x = stop, d = discard (Ctrl-C discards)")?;

    let mut elapsed = timer.subscribe();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            changed = elapsed.changed() => {
                if changed.is_err() {
                    timer.discard();
                    return Ok(SessionEnd::Discarded);
                }
                write!(out, "\r{}", format_timer(*elapsed.borrow_and_update()))?;
                out.flush()?;
            }
            line = commands.recv() => {
                let Some(line) = line else {
                    timer.discard();
                    writeln!(out, "\nInput closed, session discarded")?;
                    return Ok(SessionEnd::Discarded);
                };

                match ConsoleCommand::parse(&line) {
                    ConsoleCommand::Save => {
                        writeln!(out, "\n{}", save_prompt(kick_target, timer.elapsed_seconds()))?;
                        match timer.save().await {
                            SaveOutcome::Saved(record) => {
                                writeln!(out, "Saved session {}", record.id)?;
                                return Ok(SessionEnd::Saved(record));
                            }
                            SaveOutcome::TooShort { .. } => {
                                writeln!(
                                    out,
                                    "Session too short. Please record movements for at least {} before saving.",
                                    format_timer(minimum)
                                )?;
                            }
                            SaveOutcome::NotStarted => writeln!(out, "No session to save")?,
                            SaveOutcome::PersistFailed => {
                                writeln!(out, "Could not save the session, try again")?;
                            }
                        }
                    }
                    ConsoleCommand::Stop => {
                        timer.stop();
                        writeln!(out, "\nStopped at {}", format_timer(timer.elapsed_seconds()))?;
                    }
                    ConsoleCommand::Discard => {
                        timer.discard();
                        writeln!(out, "\nSession discarded")?;
                        return Ok(SessionEnd::Discarded);
                    }
                    ConsoleCommand::Unknown(other) => writeln!(out, "\nUnknown command: {}", other)?,
                }
            }
            _ = &mut shutdown => {
                timer.discard();
                writeln!(out, "\nSession discarded")?;
                info!("Recording interrupted");
                return Ok(SessionEnd::Interrupted);
            }
        }
    }
}
