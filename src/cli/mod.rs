pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "incidentctl")]
#[command(about = "Incident API administration - run the server, prepare the database, manage admins")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server")]
    Serve {
        #[arg(long, help = "Keep all data in process memory instead of PostgreSQL")]
        in_memory: bool,
    },

    #[command(about = "Create tables and seed reference data")]
    InitDb,

    #[command(about = "Create an administrator account unless the email is taken")]
    CreateAdmin {
        #[arg(long, env = "BOOTSTRAP_ADMIN_EMAIL")]
        email: String,
        #[arg(long, env = "BOOTSTRAP_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, default_value = "Admin")]
        first_name: String,
        #[arg(long, default_value = "User")]
        last_name: String,
    },

    #[command(about = "Print the Argon2 hash of a password")]
    HashPassword {
        #[arg(help = "Plaintext password")]
        plaintext: String,
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

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = AppConfig::from_env();

    match cli.command {
        Commands::Serve { in_memory } => commands::serve::handle(config, in_memory).await,
        Commands::InitDb => commands::database::init(config, output_format).await,
        Commands::CreateAdmin {
            email,
            password,
            first_name,
            last_name,
        } => {
            let admin = commands::admin::NewAdmin {
                email,
                password,
                first_name,
                last_name,
            };
            commands::admin::create(config, admin, output_format).await
        }
        Commands::HashPassword { plaintext } => {
            commands::password::hash(&config, &plaintext, output_format)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_create_admin() {
        let cli = Cli::try_parse_from([
            "incidentctl",
            "--json",
            "create-admin",
            "--email",
            "root@incidents.local",
            "--password",
            "hunter2",
        ])
        .unwrap();

        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Json));
        match cli.command {
            Commands::CreateAdmin { email, first_name, .. } => {
                assert_eq!(email, "root@incidents.local");
                assert_eq!(first_name, "Admin");
            }
            _ => panic!("expected create-admin"),
        }
    }

    #[test]
    fn parses_serve_in_memory() {
        let cli = Cli::try_parse_from(["incidentctl", "serve", "--in-memory"]).unwrap();
        assert!(matches!(cli.command, Commands::Serve { in_memory: true }));
    }
}
