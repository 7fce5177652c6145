pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};

use crate::client::ApiClient;

#[derive(Parser)]
#[command(name = "neuromate")]
#[command(about = "NeuroMate CLI - command-line access to the learning API")]
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
    #[command(about = "Manage the server URL and bearer token")]
    Config {
        #[command(subcommand)]
        cmd: commands::config::ConfigCommands,
    },

    #[command(about = "Check server health via /health")]
    Health,

    #[command(about = "List the caller's rows of a resource")]
    List {
        #[arg(help = "Resource name, e.g. documents, lessons, quiz-attempts")]
        resource: commands::resource::ResourceName,
    },

    #[command(about = "Show one row by id")]
    Get {
        resource: commands::resource::ResourceName,
        id: String,
    },

    #[command(about = "Create a row from a JSON body on stdin")]
    Create {
        resource: commands::resource::ResourceName,
    },

    #[command(about = "Patch a row with a JSON body on stdin")]
    Update {
        resource: commands::resource::ResourceName,
        id: String,
    },

    #[command(about = "Delete a row by id")]
    Delete {
        resource: commands::resource::ResourceName,
        id: String,
    },

    #[command(about = "The caller's profile")]
    Profile {
        #[command(subcommand)]
        cmd: Option<commands::singleton::SingletonCommands>,
    },

    #[command(about = "The caller's learning progress")]
    Progress {
        #[command(subcommand)]
        cmd: Option<commands::singleton::SingletonCommands>,
    },

    #[command(about = "Development token helpers")]
    Token {
        #[command(subcommand)]
        cmd: commands::token::TokenCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
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

/// Client for the configured server, carrying the saved token when present
pub fn client_from_config() -> anyhow::Result<ApiClient> {
    let config = config::load_cli_config()?;
    let client = ApiClient::new(config.server_url());
    Ok(match config.token {
        Some(token) => client.with_token(token),
        None => client,
    })
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Config { cmd } => commands::config::handle(cmd, output_format),
        Commands::Health => commands::health::handle(output_format).await,
        Commands::List { resource } => commands::resource::list(resource, output_format).await,
        Commands::Get { resource, id } => commands::resource::get(resource, &id, output_format).await,
        Commands::Create { resource } => commands::resource::create(resource, output_format).await,
        Commands::Update { resource, id } => commands::resource::update(resource, &id, output_format).await,
        Commands::Delete { resource, id } => commands::resource::delete(resource, &id, output_format).await,
        Commands::Profile { cmd } => {
            commands::singleton::handle("/api/profiles", cmd.unwrap_or_default(), output_format).await
        }
        Commands::Progress { cmd } => {
            commands::singleton::handle("/api/progress", cmd.unwrap_or_default(), output_format).await
        }
        Commands::Token { cmd } => commands::token::handle(cmd, output_format),
    }
}
