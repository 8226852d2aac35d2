use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use crate::sink::{MESSAGE_LIMIT, RICH_MESSAGE_LIMIT};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Default destination for jobs and command replies.
    pub destination: String,
    /// File holding the gateway token on its first line.
    pub token_file: Option<PathBuf>,
    #[serde(default)]
    pub ready: ReadyConfig,
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderConfig>,
    #[serde(default)]
    pub jobs: Vec<JobConfig>,
    #[serde(default)]
    pub commands: Vec<CommandConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReadyConfig {
    /// Publish "<name> v<version> loaded." once ready.
    #[serde(default = "default_true")]
    pub announce: bool,
    /// Provider whose output greets the destination once ready.
    pub snapshot: Option<String>,
    #[serde(default = "default_rich_limit")]
    pub snapshot_limit: usize,
}

impl Default for ReadyConfig {
    fn default() -> Self {
        Self {
            announce: true,
            snapshot: None,
            snapshot_limit: RICH_MESSAGE_LIMIT,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderConfig {
    Price {
        url: String,
        asset: String,
        currency: String,
        symbol: Option<String>,
    },
    ExchangeRate {
        url: String,
        #[serde(default = "default_delimiter")]
        delimiter: char,
    },
    Verse {
        path: PathBuf,
    },
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default = "default_max_bytes")]
        max_bytes: usize,
    },
    Rss {
        url: String,
        #[serde(default = "default_limit")]
        budget: usize,
    },
    Emoji,
    Static {
        text: String,
    },
}

#[derive(Debug, Deserialize, Clone)]
pub struct JobConfig {
    pub name: String,
    pub provider: String,
    pub interval_s: u64,
    pub destination: Option<String>,
    #[serde(default)]
    pub prefix: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub auto_start: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CommandConfig {
    /// Call a provider and reply with its output.
    Reply {
        name: String,
        provider: String,
        #[serde(default)]
        prefix: String,
        #[serde(default = "default_limit")]
        limit: usize,
        /// Reply used instead of the error text when the provider fails.
        failure: Option<String>,
        /// Destination that also receives a successful reply.
        broadcast: Option<String>,
    },
    Start {
        name: String,
        job: String,
        started: Option<String>,
        already: Option<String>,
    },
    Stop {
        name: String,
        job: String,
        stopped: Option<String>,
        already: Option<String>,
    },
    /// List jobs and their state.
    Status { name: String },
}

impl CommandConfig {
    pub fn name(&self) -> &str {
        match self {
            CommandConfig::Reply { name, .. }
            | CommandConfig::Start { name, .. }
            | CommandConfig::Stop { name, .. }
            | CommandConfig::Status { name } => name,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_rich_limit() -> usize {
    RICH_MESSAGE_LIMIT
}

fn default_limit() -> usize {
    MESSAGE_LIMIT
}

fn default_delimiter() -> char {
    '|'
}

fn default_max_bytes() -> usize {
    2000
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .with_context(|| "Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Cross-reference jobs and commands against the declared providers.
    pub fn validate(&self) -> Result<()> {
        let job_names: HashSet<&str> = self.jobs.iter().map(|j| j.name.as_str()).collect();

        for job in &self.jobs {
            if !self.providers.contains_key(&job.provider) {
                anyhow::bail!("job `{}` uses unknown provider `{}`", job.name, job.provider);
            }
            if job.interval_s == 0 {
                anyhow::bail!("job `{}` has a zero interval", job.name);
            }
        }

        for command in &self.commands {
            match command {
                CommandConfig::Reply { name, provider, .. }
                    if !self.providers.contains_key(provider) =>
                {
                    anyhow::bail!("command `{}` uses unknown provider `{}`", name, provider);
                }
                CommandConfig::Start { name, job, .. } | CommandConfig::Stop { name, job, .. }
                    if !job_names.contains(job.as_str()) =>
                {
                    anyhow::bail!("command `{}` controls unknown job `{}`", name, job);
                }
                _ => {}
            }
        }

        if let Some(snapshot) = &self.ready.snapshot {
            if !self.providers.contains_key(snapshot) {
                anyhow::bail!("ready snapshot uses unknown provider `{}`", snapshot);
            }
        }

        Ok(())
    }
}

/// Read the gateway token: the first line of `path`, which must not be empty.
pub fn read_token(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read token file: {}", path.display()))?;
    let token = content
        .lines()
        .next()
        .map(|line| line.trim().trim_start_matches('\u{feff}').to_string())
        .unwrap_or_default();
    if token.is_empty() {
        anyhow::bail!("token file {} is empty", path.display());
    }
    Ok(token)
}
