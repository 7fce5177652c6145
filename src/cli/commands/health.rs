use crate::cli::utils::output_value;
use crate::cli::{client_from_config, OutputFormat};

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let client = client_from_config()?;
    let body = client
        .health()
        .await
        .map_err(|e| anyhow::anyhow!("{} is not healthy: {}", client.base_url(), e))?;
    output_value(output_format, &body)
}
