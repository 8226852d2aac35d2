//! Command name → action table.
//!
//! A command either calls a provider and replies with its output, or starts
//! or stops a scheduled job and replies with a status line. Unknown names
//! produce no reply at all.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::CommandError;
use crate::scheduler::{JobControl, JobState, Scheduler};
use crate::sink::{truncate_chars, Destination, MESSAGE_LIMIT};
use crate::source::ContentProvider;

/// Text sent back to whoever issued the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    /// Extra destination that also receives the text.
    pub broadcast: Option<Destination>,
}

impl Reply {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            broadcast: None,
        }
    }
}

pub enum CommandAction {
    Provide {
        provider: Arc<dyn ContentProvider>,
        prefix: String,
        limit: usize,
        failure: Option<String>,
        broadcast: Option<Destination>,
    },
    Start {
        job: String,
        started: String,
        already: String,
    },
    Stop {
        job: String,
        stopped: String,
        already: String,
    },
    Status,
}

impl CommandAction {
    pub fn provide(provider: Arc<dyn ContentProvider>) -> Self {
        CommandAction::Provide {
            provider,
            prefix: String::new(),
            limit: MESSAGE_LIMIT,
            failure: None,
            broadcast: None,
        }
    }

    /// Start action with the default status lines.
    pub fn start(job: impl Into<String>) -> Self {
        let job = job.into();
        CommandAction::Start {
            started: format!("Job `{job}` started. 🕒"),
            already: format!("Job `{job}` is already running! 🕒"),
            job,
        }
    }

    /// Stop action with the default status lines.
    pub fn stop(job: impl Into<String>) -> Self {
        let job = job.into();
        CommandAction::Stop {
            stopped: format!("Job `{job}` stopped. 🛑"),
            already: format!("Job `{job}` is already stopped! 🛑"),
            job,
        }
    }
}

pub struct CommandRegistry {
    scheduler: Arc<Scheduler>,
    commands: HashMap<String, CommandAction>,
}

impl CommandRegistry {
    pub fn new(scheduler: Arc<Scheduler>) -> Self {
        Self {
            scheduler,
            commands: HashMap::new(),
        }
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        action: CommandAction,
    ) -> Result<(), CommandError> {
        let name = name.into();
        if self.commands.contains_key(&name) {
            return Err(CommandError::DuplicateCommand(name));
        }
        self.commands.insert(name, action);
        Ok(())
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Run `name`. `None` means the name is not registered.
    ///
    /// `args` is only read by `status`, which takes an optional job name.
    pub async fn dispatch(&self, name: &str, args: &[String]) -> Option<Reply> {
        let Some(action) = self.commands.get(name) else {
            tracing::debug!(command = name, "unknown command ignored");
            return None;
        };
        tracing::info!(command = name, "dispatching");

        let reply = match action {
            CommandAction::Provide {
                provider,
                prefix,
                limit,
                failure,
                broadcast,
            } => match provider.produce().await {
                Ok(payload) => {
                    let text = format!("{prefix}{payload}");
                    Reply {
                        text: truncate_chars(&text, *limit).to_string(),
                        broadcast: broadcast.clone(),
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        command = name,
                        provider = provider.name(),
                        error = %e,
                        "provider failed"
                    );
                    Reply::new(
                        failure
                            .clone()
                            .unwrap_or_else(|| format!("Error: could not get `{name}`: {e}")),
                    )
                }
            },
            CommandAction::Start { job, started, already } => match self.scheduler.start(job) {
                Ok(JobControl::Started) => Reply::new(started.as_str()),
                Ok(_) => Reply::new(already.as_str()),
                Err(e) => Reply::new(format!("Error: {e}")),
            },
            CommandAction::Stop { job, stopped, already } => match self.scheduler.stop(job) {
                Ok(JobControl::StopRequested) => Reply::new(stopped.as_str()),
                Ok(_) => Reply::new(already.as_str()),
                Err(e) => Reply::new(format!("Error: {e}")),
            },
            CommandAction::Status => self.status(args.first().map(String::as_str)),
        };

        Some(reply)
    }

    fn status(&self, only: Option<&str>) -> Reply {
        let lines: Vec<String> = self
            .scheduler
            .status()
            .into_iter()
            .filter(|s| only.map_or(true, |name| s.name == name))
            .map(|s| {
                let state = match s.state {
                    JobState::Idle => "idle",
                    JobState::Running => "running",
                    JobState::StopRequested => "stopping",
                };
                let last = s
                    .last_published
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                    .unwrap_or_else(|| "never".into());
                format!(
                    "{} [{}] every {}s, published {}, failed {}, last {}",
                    s.name,
                    state,
                    s.interval.as_secs(),
                    s.published,
                    s.failures,
                    last
                )
            })
            .collect();

        if lines.is_empty() {
            match only {
                Some(name) => Reply::new(format!("No job named `{name}`.")),
                None => Reply::new("No jobs registered."),
            }
        } else {
            Reply::new(lines.join("\n"))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
