use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tally",
    about = "Tally — resource quota and commission ledger",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the quota ledger server
    Serve(ServeArgs),
    /// Integrate an allocation timeline over a billing window
    Usage(UsageArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(long)]
    pub config: Option<String>,
    /// Override the bind address
    #[arg(long)]
    pub bind: Option<String>,
    /// Override the service token
    #[arg(long)]
    pub token: Option<String>,
}

#[derive(Args)]
pub struct UsageArgs {
    /// JSON file holding the allocation timeline, ordered by issue time
    #[arg(long)]
    pub timeline: String,
    /// Window start (exclusive), RFC 3339
    #[arg(long)]
    pub after: String,
    /// Window end (inclusive), RFC 3339
    #[arg(long)]
    pub before: String,
    /// Emit one record per consumed interval before the aggregate
    #[arg(long)]
    pub details: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_serve() {
        let cli = Cli::try_parse_from(["tally", "serve"]).unwrap();
        assert!(matches!(cli.command, Command::Serve(_)));
    }

    #[test]
    fn parse_serve_overrides() {
        let cli =
            Cli::try_parse_from(["tally", "serve", "--bind", "0.0.0.0:9090", "--token", "t"])
                .unwrap();
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.bind, Some("0.0.0.0:9090".into()));
            assert_eq!(args.token, Some("t".into()));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_usage() {
        let cli = Cli::try_parse_from([
            "tally",
            "usage",
            "--timeline",
            "points.json",
            "--after",
            "2025-01-01T00:00:00Z",
            "--before",
            "2025-02-01T00:00:00Z",
            "--details",
        ])
        .unwrap();
        if let Command::Usage(args) = cli.command {
            assert_eq!(args.timeline, "points.json");
            assert!(args.details);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn usage_requires_window() {
        assert!(Cli::try_parse_from(["tally", "usage", "--timeline", "p.json"]).is_err());
    }

    #[test]
    fn parse_json_format() {
        let cli = Cli::try_parse_from(["tally", "--format", "json", "serve"]).unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
    }
}
