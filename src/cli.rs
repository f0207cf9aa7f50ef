use crate::config::ChatConfig;
use crate::error::ChatError;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "hossbot")]
#[command(version)]
#[command(about = "Chat with HossBot from the terminal")]
pub struct Args {
    /// TOML file with backend addresses and display settings
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Base URL of the backend on the local network (overrides config)
    #[arg(long)]
    pub local_base: Option<String>,

    /// Base URL reachable through the tunnel (overrides config)
    #[arg(long)]
    pub tunnel_base: Option<String>,

    /// Name shown in front of bot replies (overrides config)
    #[arg(long)]
    pub bot_name: Option<String>,

    /// Log debug diagnostics to stderr
    #[arg(long, short)]
    pub verbose: bool,
}

impl Args {
    /// Built-in defaults, then the config file, then command-line flags.
    pub fn resolve_config(&self) -> Result<ChatConfig, ChatError> {
        let mut config = match &self.config {
            Some(path) => ChatConfig::load(path)?,
            None => ChatConfig::default(),
        };
        if let Some(url) = &self.local_base {
            config.local_base_url = url.clone();
        }
        if let Some(url) = &self.tunnel_base {
            config.tunnel_base_url = url.clone();
        }
        if let Some(name) = &self.bot_name {
            config.bot_name = name.clone();
        }
        Ok(config)
    }

    /// Default log filter when `RUST_LOG` is unset.
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "hossbot=debug"
        } else {
            "warn"
        }
    }
}
