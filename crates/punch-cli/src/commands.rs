use anyhow::Context;
use colored::Colorize;
use punch_server::{PunchServer, ServerConfig};
use punch_store::JournalEventStore;
use tracing::{debug, info};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::CheckConfig(args) => cmd_check_config(args),
        Command::Tags(args) => cmd_tags(args),
        Command::Latest(args) => cmd_latest(args),
    }
}

fn load_config(path: &std::path::Path) -> anyhow::Result<ServerConfig> {
    ServerConfig::load(path).with_context(|| format!("loading {}", path.display()))
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }

    println!(
        "{} punch relay on {} ({} tags, journal: {})",
        "▶".green().bold(),
        config.bind_addr.to_string().bold(),
        config.tags.len(),
        config
            .journal_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "in-memory".into())
            .cyan(),
    );

    let bind_addr = config.bind_addr;
    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    debug!(%bind_addr, "tokio runtime started");
    runtime.block_on(PunchServer::new(config).serve())?;
    Ok(())
}

fn cmd_check_config(args: ConfigArgs) -> anyhow::Result<()> {
    let config = load_config(&args.config)?;
    info!(path = %args.config.display(), tags = config.tags.len(), "config validated");
    println!("{} {} is valid", "✓".green().bold(), args.config.display());
    println!("  bind: {}", config.bind_addr);
    println!("  tags: {}", config.tags.len());
    println!("  subscriber queue: {} frames", config.subscriber_capacity);
    Ok(())
}

fn cmd_tags(args: ConfigArgs) -> anyhow::Result<()> {
    let config = load_config(&args.config)?;
    if config.tags.is_empty() {
        println!("No tags provisioned.");
        return Ok(());
    }
    for binding in &config.tags {
        println!(
            "  {}  {}  {}",
            binding.tag_uid.yellow(),
            binding.employee_id.cyan(),
            binding.name
        );
    }
    Ok(())
}

fn cmd_latest(args: LatestArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        args.journal.is_file(),
        "no journal at {}",
        args.journal.display()
    );
    // Read-only: the server may be appending to this file right now.
    let events = JournalEventStore::read_path(&args.journal)
        .with_context(|| format!("reading {}", args.journal.display()))?;
    debug!(path = %args.journal.display(), count = events.len(), "journal read");
    match events.iter().max_by_key(|event| event.timestamp) {
        Some(event) => {
            let action = match event.action {
                punch_types::ClockAction::In => "in".green(),
                punch_types::ClockAction::Out => "out".yellow(),
            };
            println!(
                "{} clocked {} via {} at {}",
                event.name.bold(),
                action,
                event.method,
                event.timestamp.to_rfc3339()
            );
            println!("  {} events in journal", events.len());
        }
        None => println!("Journal is empty."),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use punch_store::EventStore;
    use punch_types::{ClockAction, ClockEvent, EmployeeIdentity, DEFAULT_METHOD};
    use std::io::Write;

    #[tokio::test]
    async fn latest_does_not_touch_a_journal_being_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.journal");
        let journal = JournalEventStore::open(&path, false).unwrap();
        let event = ClockEvent::new(
            &EmployeeIdentity::new("e1", "John Doe"),
            ClockAction::In,
            DEFAULT_METHOD,
            Utc::now(),
        );
        journal.append(&event).await.unwrap();

        // Frame header written, payload still pending.
        {
            let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
            file.write_all(&[0x20, 0, 0, 0, 0xaa, 0xbb, 0xcc, 0xdd]).unwrap();
        }
        let len = std::fs::metadata(&path).unwrap().len();

        cmd_latest(LatestArgs {
            journal: path.clone(),
        })
        .unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), len);
    }

    #[test]
    fn latest_on_missing_journal_fails_without_creating_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.journal");
        assert!(cmd_latest(LatestArgs {
            journal: path.clone()
        })
        .is_err());
        assert!(!path.exists());
    }
}
