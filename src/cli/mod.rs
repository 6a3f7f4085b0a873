pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

const DEFAULT_URL: &str = "http://localhost:3000";

#[derive(Parser)]
#[command(name = "portal")]
#[command(about = "Portal CLI - access decisions and record API client")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "Server base URL (defaults to PORTAL_API_URL or http://localhost:3000)")]
    pub url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Evaluate the page access rules for a path")]
    Decide(commands::decide::DecideArgs),

    #[command(about = "Record operations against a running server")]
    Data {
        #[command(subcommand)]
        cmd: commands::data::DataCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

impl Cli {
    pub fn base_url(&self) -> String {
        self.url
            .clone()
            .or_else(|| std::env::var("PORTAL_API_URL").ok())
            .unwrap_or_else(|| DEFAULT_URL.to_string())
            .trim_end_matches('/')
            .to_string()
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let base_url = cli.base_url();

    match cli.command {
        Commands::Decide(args) => commands::decide::handle(args, output_format),
        Commands::Data { cmd } => commands::data::handle(cmd, &base_url, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decide() {
        let cli = Cli::parse_from(["portal", "--json", "decide", "/dashboard", "--session", "--verified", "true"]);
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Json));
        match cli.command {
            Commands::Decide(args) => {
                assert_eq!(args.path, "/dashboard");
                assert!(args.session);
                assert_eq!(args.verified, Some(true));
            }
            _ => panic!("expected decide"),
        }
    }

    #[test]
    fn parses_data_update_with_url() {
        let cli = Cli::parse_from(["portal", "--url", "http://127.0.0.1:9000/", "data", "update", "3", "Y"]);
        assert_eq!(cli.base_url(), "http://127.0.0.1:9000");
        assert!(matches!(
            cli.command,
            Commands::Data { cmd: commands::data::DataCommands::Update { ref id, ref name } } if id == "3" && name == "Y"
        ));
    }
}
