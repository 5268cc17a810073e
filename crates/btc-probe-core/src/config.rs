//! Connection settings for the node, read from the process environment.
//!
//! A dotenv file is merged into the environment first (see
//! [`load_env_file`]); variables that are already set take precedence over
//! the file.

use std::path::Path;

use tracing::{debug, info};

use crate::error::ConfigError;

pub const ENV_HOST: &str = "BITCOIN_IP";
pub const ENV_PORT: &str = "BITCOIN_RPC_PORT";
pub const ENV_USER: &str = "BITCOIN_USERNAME";
pub const ENV_PASSWORD: &str = "BITCOIN_PASSWORD";

/// Everything needed to reach and authenticate against the node's RPC port.
#[derive(Clone, PartialEq, Eq)]
pub struct RpcConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

impl RpcConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config through an arbitrary variable lookup.
    ///
    /// Every variable is required and must be non-blank. The port must be a
    /// non-zero `u16`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank checks look at the trimmed value; credentials are kept verbatim.
        let get = |key: &'static str| -> Result<String, ConfigError> {
            let value = lookup(key).ok_or(ConfigError::MissingVar(key))?;
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyVar(key));
            }
            Ok(value)
        };

        let host = get(ENV_HOST)?.trim().to_owned();
        let port = parse_port(get(ENV_PORT)?.trim())?;
        let user = get(ENV_USER)?;
        let password = get(ENV_PASSWORD)?;

        Ok(Self {
            host,
            port,
            user,
            password,
        })
    }
}

impl std::fmt::Debug for RpcConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn parse_port(value: &str) -> Result<u16, ConfigError> {
    let port = value.parse::<u16>().map_err(|e| ConfigError::InvalidPort {
        value: value.to_owned(),
        reason: e.to_string(),
    })?;
    if port == 0 {
        return Err(ConfigError::InvalidPort {
            value: value.to_owned(),
            reason: "port must be non-zero".to_owned(),
        });
    }
    Ok(port)
}

/// Merge a dotenv file into the process environment.
///
/// With an explicit `path` the file must exist and parse. Without one, `.env`
/// is searched from the current directory upwards; not finding it is fine,
/// but a file that exists and fails to parse is an error.
pub fn load_env_file(path: Option<&Path>) -> Result<(), ConfigError> {
    match path {
        Some(path) => {
            dotenvy::from_path(path).map_err(|source| ConfigError::EnvFile {
                path: path.to_path_buf(),
                source,
            })?;
            info!(path = %path.display(), "loaded env file");
            Ok(())
        }
        None => match dotenvy::dotenv() {
            Ok(found) => {
                info!(path = %found.display(), "loaded env file");
                Ok(())
            }
            Err(err) if err.not_found() => {
                debug!("no .env file found; using process environment only");
                Ok(())
            }
            Err(source) => Err(ConfigError::EnvFile {
                path: ".env".into(),
                source,
            }),
        },
    }
}
