use std::fs;

use anyhow::Context;
use chrono::{DateTime, Utc};
use colored::Colorize;
use tracing::info;

use tally_billing::{compute_usage, UsageRecord};
use tally_server::{ServerConfig, TallyServer};
use tally_types::TimelinePoint;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::Usage(args) => cmd_usage(args, &cli.format),
    }
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading config file {path}"))?;
            ServerConfig::from_toml_str(&raw)
                .with_context(|| format!("parsing config file {path}"))?
        }
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind.parse().context("invalid bind address")?;
    }
    if let Some(token) = args.token {
        config.service_token = token;
    }

    info!(bind = %config.bind_addr, "starting tally server");
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(TallyServer::new(config).serve())?;
    Ok(())
}

fn cmd_usage(args: UsageArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let raw = fs::read_to_string(&args.timeline)
        .with_context(|| format!("reading timeline file {}", args.timeline))?;
    let timeline: Vec<TimelinePoint> =
        serde_json::from_str(&raw).context("parsing timeline JSON")?;
    let after = parse_time(&args.after).context("invalid --after")?;
    let before = parse_time(&args.before).context("invalid --before")?;

    let records = compute_usage(&timeline, after, before, args.details)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        OutputFormat::Text => print_usage(&records),
    }
    Ok(())
}

fn print_usage(records: &[UsageRecord]) {
    if records.is_empty() {
        println!("No usage in window.");
        return;
    }
    for record in records {
        let label = if record.name == "total" {
            record.name.green().bold()
        } else {
            record.name.normal()
        };
        println!(
            "{}  {}  {}  until {}  avg {}  total {}",
            record.target.bold(),
            record.resource.cyan(),
            label,
            record.end_time.to_rfc3339(),
            record.average,
            record.total,
        );
    }
}

fn parse_time(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_time_accepts_offsets() {
        let t = parse_time("2025-01-01T02:00:00+02:00").unwrap();
        assert_eq!(t, parse_time("2025-01-01T00:00:00Z").unwrap());
    }

    #[test]
    fn parse_time_rejects_garbage() {
        assert!(parse_time("yesterday").is_err());
    }

    #[test]
    fn usage_from_timeline_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let points = serde_json::json!([
            {
                "issue_time": "2025-01-01T00:00:00Z",
                "target": "alice",
                "resource": "diskspace",
                "name": "grant",
                "allocated": 10
            }
        ]);
        write!(file, "{points}").unwrap();

        let args = UsageArgs {
            timeline: file.path().to_string_lossy().into_owned(),
            after: "2025-01-01T00:00:00Z".into(),
            before: "2025-01-01T00:01:00Z".into(),
            details: false,
        };
        cmd_usage(args, &OutputFormat::Json).unwrap();
    }

    #[test]
    fn usage_fails_on_missing_file() {
        let args = UsageArgs {
            timeline: "/nonexistent/points.json".into(),
            after: "2025-01-01T00:00:00Z".into(),
            before: "2025-01-02T00:00:00Z".into(),
            details: false,
        };
        assert!(cmd_usage(args, &OutputFormat::Text).is_err());
    }
}
