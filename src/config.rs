use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::error::{ChatboxError, Result};
use crate::history::MAX_HISTORY_LINES;

/// Default input hint.
pub const DEFAULT_PLACEHOLDER: &str = "Tab to start typing ...";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Number of chat lines to keep
    #[arg(long, env = "HISTORY_CAPACITY")]
    pub history_capacity: Option<usize>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub chatbox: ChatboxConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// Nickname of the local player in the demo world.
    pub local_nick: String,
}

/// Construction-time options of one chatbox.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ChatboxConfig {
    /// Input hint text.
    pub placeholder: String,
    /// Selector of the element the widget may be dragged within.
    #[serde(default)]
    pub containment: Option<String>,
    /// Resize floor.
    pub min_width: u32,
    pub min_height: u32,
    pub history_capacity: usize,
}

impl Default for ChatboxConfig {
    fn default() -> Self {
        Self {
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            containment: None,
            min_width: 200,
            min_height: 100,
            history_capacity: MAX_HISTORY_LINES,
        }
    }
}

impl ChatboxConfig {
    /// Reject options no chatbox can be built with.
    pub fn validate(&self) -> Result<()> {
        if self.history_capacity == 0 {
            return Err(ChatboxError::InvalidCapacity(self.history_capacity));
        }
        Ok(())
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli = Cli::try_parse_from(args)
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let defaults = ChatboxConfig::default();
        let mut builder = Config::builder();

        // 1. Defaults
        builder = builder
            .set_default("server.port", 3000)?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.local_nick", "guest")?
            .set_default("chatbox.placeholder", defaults.placeholder)?
            .set_default("chatbox.min_width", i64::from(defaults.min_width))?
            .set_default("chatbox.min_height", i64::from(defaults.min_height))?
            .set_default("chatbox.history_capacity", defaults.history_capacity as i64)?;

        // 2. Config file: explicit path, else ./frochat.{yaml,toml,json} if present
        builder = match &cli.config {
            Some(path) => builder.add_source(File::from(Path::new(path))),
            None => builder.add_source(File::with_name("frochat").required(false)),
        };

        // 3. Environment variables (prefixed with FROCHAT_)
        // E.g. FROCHAT_CHATBOX__HISTORY_CAPACITY=50
        builder = builder.add_source(
            Environment::with_prefix("FROCHAT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // 4. CLI overrides
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(capacity) = cli.history_capacity {
            builder = builder.set_override("chatbox.history_capacity", capacity as i64)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.chatbox.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chatbox_defaults() {
        let cfg = ChatboxConfig::default();
        assert_eq!(cfg.placeholder, "Tab to start typing ...");
        assert_eq!(cfg.history_capacity, 300);
        assert_eq!((cfg.min_width, cfg.min_height), (200, 100));
        assert!(cfg.containment.is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let cfg = ChatboxConfig {
            history_capacity: 0,
            ..ChatboxConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ChatboxError::InvalidCapacity(0))
        ));
    }
}
