use clap::Subcommand;
use serde_json::json;

use crate::auth::issue_token;
use crate::cli::config::{load_cli_config, save_cli_config};
use crate::cli::utils::output_value;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Sign an HS256 token with AUTH_JWT_SECRET (development only)")]
    Mint {
        #[arg(long, help = "User id to place in the sub claim")]
        user: String,

        #[arg(long, default_value_t = 24, help = "Lifetime in hours")]
        hours: i64,

        #[arg(long, help = "Also store the token in the CLI config")]
        save: bool,
    },
}

pub fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Mint { user, hours, save } => {
            let secret = std::env::var("AUTH_JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("AUTH_JWT_SECRET must be set to mint tokens"))?;
            let token = issue_token(&secret, &user, chrono::Duration::hours(hours))?;

            if save {
                let mut config = load_cli_config()?;
                config.token = Some(token.clone());
                save_cli_config(&config)?;
            }

            match output_format {
                OutputFormat::Json => output_value(output_format, &json!({ "user": user, "token": token })),
                OutputFormat::Text => {
                    println!("{}", token);
                    Ok(())
                }
            }
        }
    }
}
