use crate::cli::{actions::Action, globals::GlobalArgs};
use crate::parere;
use anyhow::{Context, Result};
use url::Url;

/// Handle the server action
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    match action {
        Action::Server { port, dsn } => {
            // Fail on a malformed DSN before touching the pool
            let dsn = Url::parse(&dsn).context("Invalid database DSN")?;

            parere::new(port, dsn.to_string(), globals).await?;
        }
    }

    Ok(())
}
