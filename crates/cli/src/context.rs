//! Per-invocation state: the API client, the stored session and the output
//! mode.

use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use bazaryo_client::services::Session;
use bazaryo_client::{BazaryoClient, ClientConfig};
use bazaryo_core::User;
use secrecy::{ExposeSecret, SecretString};
use tokio::io::AsyncWriteExt;

use crate::commands::CommandError;
use crate::config::CliConfig;
use crate::output::Output;

pub struct Context {
    pub client: BazaryoClient,
    pub out: Output,
    session_file: PathBuf,
}

impl Context {
    /// Build the client, picking up a stored token unless
    /// `BAZARYO_API_TOKEN` already provides one.
    pub async fn load(config: CliConfig, json: bool) -> Result<Self, CommandError> {
        let client = BazaryoClient::new(&ClientConfig::from_env()?)?;

        if !client.has_token().await {
            match tokio::fs::read_to_string(&config.session_file).await {
                Ok(token) if !token.trim().is_empty() => {
                    tracing::debug!(path = %config.session_file.display(), "Loaded stored session");
                    client.set_token(SecretString::from(token.trim().to_owned())).await;
                }
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(CommandError::Io(e)),
            }
        }

        Ok(Self {
            client,
            out: Output::new(json),
            session_file: config.session_file,
        })
    }

    /// A session workflow over this invocation's client.
    pub fn session(&self) -> Session<BazaryoClient> {
        Session::new(self.client.clone())
    }

    /// The signed-in user, fetched from the backend.
    pub async fn current_user(&self) -> Result<User, CommandError> {
        Ok(self.session().refresh().await?)
    }

    /// Persist the client's token for later invocations.
    pub async fn save_session(&self) -> Result<(), CommandError> {
        let Some(token) = self.client.token().await else {
            return Ok(());
        };
        write_private(&self.session_file, token.expose_secret()).await?;
        tracing::debug!(path = %self.session_file.display(), "Saved session");
        Ok(())
    }

    pub async fn forget_session(&self) -> Result<(), CommandError> {
        match tokio::fs::remove_file(&self.session_file).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CommandError::Io(e)),
        }
    }
}

/// Write `contents` to an owner-only (0600) file. An existing file is
/// narrowed to 0600 before it is truncated.
async fn write_private(path: &Path, contents: &str) -> io::Result<()> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(false);
    #[cfg(unix)]
    options.mode(0o600);
    let mut file = options.open(path).await?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600)).await?;
    }

    file.set_len(0).await?;
    file.write_all(contents.as_bytes()).await?;
    file.flush().await
}
