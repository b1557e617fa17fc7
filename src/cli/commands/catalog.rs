use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::store_from_config;

#[derive(Subcommand)]
pub enum CatalogCommands {
    #[command(about = "List permission codes and descriptions")]
    List,
}

pub async fn handle(cmd: CatalogCommands, config: AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        CatalogCommands::List => {
            let store = store_from_config(&config.database, config.environment)?;
            let entries = store.list_catalog().await?;

            match output_format {
                OutputFormat::Json => output_success(
                    output_format,
                    &format!("{} permissions", entries.len()),
                    Some(json!({ "permissions": entries })),
                ),
                OutputFormat::Text => {
                    let width = entries
                        .iter()
                        .map(|e| e.permission_code.len())
                        .max()
                        .unwrap_or(0);
                    for entry in &entries {
                        println!("{:width$}  {}", entry.permission_code, entry.description, width = width);
                    }
                    Ok(())
                }
            }
        }
    }
}
