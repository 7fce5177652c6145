use clap::Subcommand;
use serde_json::Value;

use crate::cli::utils::{output_success, output_value, read_json_stdin};
use crate::cli::{client_from_config, OutputFormat};

#[derive(Subcommand, Default, Clone, Copy)]
pub enum SingletonCommands {
    #[default]
    #[command(about = "Show the record, creating it on first access")]
    Show,

    #[command(about = "Patch the record with a JSON body on stdin")]
    Update,

    #[command(about = "Delete the record")]
    Delete,
}

pub async fn handle(path: &str, cmd: SingletonCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = client_from_config()?;
    match cmd {
        SingletonCommands::Show => {
            let row: Value = client.get(path).await?;
            output_value(output_format, &row)
        }
        SingletonCommands::Update => {
            let body = read_json_stdin()?;
            let row: Value = client.patch(path, &body).await?;
            output_value(output_format, &row)
        }
        SingletonCommands::Delete => {
            client.delete(path).await?;
            output_success(output_format, &format!("Deleted {}", path))
        }
    }
}
