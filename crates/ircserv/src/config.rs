use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{SERVER_NAME, SERVER_VERSION};
use crate::errors::ServerError;

/// ircserv - a minimal RFC 1459/2812 chat server
#[derive(Debug, Parser)]
#[command(name = "ircserv")]
pub struct Cli {
    /// TCP port to listen on (1024-65535)
    pub port: String,
    /// Connection password clients must supply with PASS
    pub password: String,
    /// Optional TOML file overriding ambient settings
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub network: NetworkConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NetworkConfig {
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            name: SERVER_NAME.to_owned(),
            version: SERVER_VERSION.to_owned(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            // IPv4 only; the wildcard address mirrors INADDR_ANY.
            bind_address: "0.0.0.0".to_owned(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig::default(),
            network: NetworkConfig::default(),
        }
    }
}

impl Config {
    /// Loads and parses the TOML configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ServerError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ServerError::Config {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| ServerError::Config {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(config)
    }
}

/// Fully validated launch parameters.
#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub password: String,
    pub config: Config,
}

impl Settings {
    pub fn from_cli(cli: Cli) -> Result<Self, ServerError> {
        let port = validate_port(&cli.port)?;
        validate_password(&cli.password)?;
        let config = match cli.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        Ok(Settings {
            port,
            password: cli.password,
            config,
        })
    }
}

/// Port must be all digits and land in the unprivileged range.
pub fn validate_port(port: &str) -> Result<u16, ServerError> {
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ServerError::InvalidPort);
    }
    match port.parse::<u32>() {
        Ok(n) if (1024..=65535).contains(&n) => Ok(n as u16),
        _ => Err(ServerError::InvalidPort),
    }
}

/// Password must be non-empty printable ASCII with no whitespace.
pub fn validate_password(password: &str) -> Result<(), ServerError> {
    if password.is_empty()
        || !password
            .bytes()
            .all(|b| b.is_ascii_graphic())
    {
        return Err(ServerError::InvalidPassword);
    }
    Ok(())
}
