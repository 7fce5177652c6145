use clap::Subcommand;
use serde_json::json;

use crate::cli::config::{load_cli_config, save_cli_config};
use crate::cli::utils::{output_success, output_value};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ConfigCommands {
    #[command(about = "Set the API server base URL")]
    SetServer {
        #[arg(help = "Server URL, e.g. http://localhost:4000")]
        url: String,
    },

    #[command(about = "Save the bearer token used for /api requests")]
    SetToken {
        token: String,
    },

    #[command(about = "Show the current configuration")]
    Show,
}

pub fn handle(cmd: ConfigCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ConfigCommands::SetServer { url } => {
            let parsed = url::Url::parse(&url).map_err(|e| anyhow::anyhow!("invalid server URL '{}': {}", url, e))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                anyhow::bail!("server URL must use http or https");
            }

            let mut config = load_cli_config()?;
            config.server = Some(url.trim_end_matches('/').to_string());
            save_cli_config(&config)?;
            output_success(output_format, &format!("Server set to {}", config.server_url()))
        }
        ConfigCommands::SetToken { token } => {
            let mut config = load_cli_config()?;
            config.token = Some(token.trim().to_string());
            save_cli_config(&config)?;
            output_success(output_format, "Token saved")
        }
        ConfigCommands::Show => {
            let config = load_cli_config()?;
            output_value(
                output_format,
                &json!({
                    "server": config.server_url(),
                    "token": config.masked_token(),
                    "updated_at": config.updated_at,
                }),
            )
        }
    }
}
