use anyhow::Context;
use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{Principal, TokenCodec};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Issue a signed bearer token (development only)")]
    Issue {
        #[arg(long, help = "User id to embed in the token")]
        user_id: Uuid,
        #[arg(long, help = "Email to embed in the token")]
        email: String,
        #[arg(long, help = "Lifetime in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
        hours: Option<u64>,
    },

    #[command(about = "Verify a bearer token and show its principal")]
    Verify {
        #[arg(help = "Token to verify")]
        token: String,
    },
}

pub fn handle(cmd: TokenCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Issue { user_id, email, hours } => {
            if config.is_production() {
                anyhow::bail!("refusing to issue tokens with APP_ENV=production");
            }

            let mut security = config.security.clone();
            if let Some(hours) = hours {
                security.jwt_expiry_hours = hours;
            }
            let codec = TokenCodec::from_config(&security).context("cannot build token codec")?;

            let principal = Principal { user_id, email };
            let token = codec.issue(&principal)?;

            output_success(
                output_format,
                "Token issued",
                Some(json!({
                    "token": token,
                    "userId": principal.user_id,
                    "email": principal.email,
                    "expiresIn": codec.ttl_secs(),
                })),
            )
        }
        TokenCommands::Verify { token } => {
            let codec = TokenCodec::from_config(&config.security).context("cannot build token codec")?;
            let principal = codec.verify(token.trim()).context("token rejected")?;

            output_success(
                output_format,
                "Token valid",
                Some(json!({
                    "userId": principal.user_id,
                    "email": principal.email,
                })),
            )
        }
    }
}
