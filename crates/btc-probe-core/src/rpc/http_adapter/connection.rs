use reqwest::Url;

use crate::error::{ConfigError, CoreError};

/// Build the plain-HTTP RPC URL for `host:port`. IPv6 literals are bracketed.
pub(super) fn endpoint_url(host: &str, port: u16) -> Result<String, CoreError> {
    let host = host.trim();
    if host.is_empty() {
        return Err(ConfigError::InvalidEndpoint("rpc host is empty".to_owned()).into());
    }
    let authority = if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    };
    parse_connection(&format!("http://{authority}/"))
}

fn parse_connection(connection: &str) -> Result<String, CoreError> {
    let parsed = Url::parse(connection).map_err(|e| {
        ConfigError::InvalidEndpoint(format!(
            "invalid connection `{connection}`: expected HTTP URL ({e})"
        ))
    })?;
    if parsed.scheme() != "http" {
        return Err(ConfigError::InvalidEndpoint(format!(
            "unsupported connection scheme `{}`; expected http",
            parsed.scheme()
        ))
        .into());
    }
    if parsed.host_str().is_none() {
        return Err(
            ConfigError::InvalidEndpoint(format!("connection `{connection}` has no host")).into(),
        );
    }
    Ok(parsed.to_string())
}
