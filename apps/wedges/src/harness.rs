//! Headless stand-in for the presentation layer: drives the ring through its
//! command surface and prints every event as a JSON line.

use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use shared::{domain::WedgeId, protocol::RingEvent};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
    task::JoinHandle,
};
use tracing::{info, warn};
use wedge_ring::RingService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplCommand {
    New,
    Remove(WedgeId),
    /// Remove the wedge at a display position, as tapping it would.
    Tap(usize),
    Clear,
    Walk(bool),
    Show,
    Quit,
}

pub fn parse_command(line: &str) -> Result<ReplCommand> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        bail!("empty command");
    };
    let arg = parts.next();
    if parts.next().is_some() {
        bail!("too many arguments for '{verb}'");
    }

    let command = match (verb.to_ascii_lowercase().as_str(), arg) {
        ("new" | "add", None) => ReplCommand::New,
        ("remove" | "rm", Some(id)) => ReplCommand::Remove(WedgeId(
            id.parse()
                .with_context(|| format!("invalid wedge id '{id}'"))?,
        )),
        ("tap", Some(index)) => ReplCommand::Tap(
            index
                .parse()
                .with_context(|| format!("invalid position '{index}'"))?,
        ),
        ("clear" | "reset", None) => ReplCommand::Clear,
        ("walk", Some(state)) => match state.to_ascii_lowercase().as_str() {
            "on" | "true" => ReplCommand::Walk(true),
            "off" | "false" => ReplCommand::Walk(false),
            other => bail!("walk expects on|off, got '{other}'"),
        },
        ("show", None) => ReplCommand::Show,
        ("quit" | "exit", None) => ReplCommand::Quit,
        (other, _) => return Err(anyhow!("unknown command '{other}'")),
    };
    Ok(command)
}

/// Applies one command. Returns `false` when the session should end.
pub async fn execute(service: &Arc<RingService>, command: ReplCommand) -> Result<bool> {
    match command {
        ReplCommand::New => {
            service.add_random_wedge().await?;
        }
        ReplCommand::Remove(id) => {
            service.remove_wedge(id).await;
        }
        ReplCommand::Tap(index) => match service.order().await.get(index).copied() {
            Some(id) => {
                service.remove_wedge(id).await;
            }
            None => warn!(index, "tap: no wedge at that position"),
        },
        ReplCommand::Clear => {
            service.reset().await;
        }
        ReplCommand::Walk(enabled) => {
            service.set_random_walk(enabled).await;
        }
        ReplCommand::Show => {
            let snapshot = service.snapshot().await;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        ReplCommand::Quit => return Ok(false),
    }
    Ok(true)
}

fn spawn_event_printer(mut events: mpsc::UnboundedReceiver<RingEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{line}"),
                Err(err) => warn!("failed to encode event {event:?}: {err}"),
            }
        }
    })
}

pub async fn run_demo(service: Arc<RingService>, initial: usize, duration: Duration) -> Result<()> {
    let printer = spawn_event_printer(service.subscribe().await);

    for _ in 0..initial {
        service.add_random_wedge().await?;
    }

    info!(
        initial,
        duration_ms = duration.as_millis() as u64,
        "demo: random walk running"
    );
    service.set_random_walk(true).await;
    tokio::time::sleep(duration).await;
    service.set_random_walk(false).await;

    let snapshot = service.snapshot().await;
    drop(service);
    printer.await.context("event printer task failed")?;

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

pub async fn run_repl(service: Arc<RingService>) -> Result<()> {
    let printer = spawn_event_printer(service.subscribe().await);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(err) => {
                warn!("repl: {err:#}");
                continue;
            }
        };
        if !execute(&service, command).await? {
            break;
        }
    }

    service.set_random_walk(false).await;
    drop(service);
    printer.await.context("event printer task failed")?;
    Ok(())
}
