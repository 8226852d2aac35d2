//! Application wiring.
//!
//! [`App`] turns a [`Config`] into providers, a [`Scheduler`] with its jobs
//! and a [`CommandRegistry`], then reacts to the two external events the bot
//! knows about: the one-shot ready signal and incoming commands.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::command::{CommandAction, CommandRegistry, Reply};
use crate::config::{CommandConfig, Config};
use crate::input;
use crate::scheduler::{JobControl, JobSpec, Scheduler};
use crate::sink::{truncate_chars, Destination, OutputSink};
use crate::source::{self, ContentProvider};

pub struct App {
    sink: Arc<dyn OutputSink>,
    destination: Destination,
    scheduler: Arc<Scheduler>,
    commands: CommandRegistry,
    providers: HashMap<String, Arc<dyn ContentProvider>>,
    auto_start: Vec<String>,
    config: Config,
}

impl App {
    pub fn from_config(config: Config, sink: Arc<dyn OutputSink>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;

        let providers: HashMap<String, Arc<dyn ContentProvider>> = config
            .providers
            .iter()
            .map(|(name, pc)| (name.clone(), source::build(name, pc, &http)))
            .collect();

        let provider = |name: &str| {
            providers
                .get(name)
                .cloned()
                .with_context(|| format!("unknown provider `{name}`"))
        };

        let destination = Destination::new(&config.destination);
        let scheduler = Arc::new(Scheduler::new(Arc::clone(&sink)));
        let mut auto_start = Vec::new();

        for job in &config.jobs {
            let dest = job
                .destination
                .as_deref()
                .map(Destination::new)
                .unwrap_or_else(|| destination.clone());
            let spec = JobSpec::new(
                &job.name,
                Duration::from_secs(job.interval_s),
                provider(&job.provider)?,
                dest,
            )
            .with_prefix(&job.prefix)
            .with_limit(job.limit);
            scheduler.register(spec)?;
            if job.auto_start {
                auto_start.push(job.name.clone());
            }
        }

        let mut commands = CommandRegistry::new(Arc::clone(&scheduler));
        for command in &config.commands {
            let action = match command {
                CommandConfig::Reply {
                    provider: p,
                    prefix,
                    limit,
                    failure,
                    broadcast,
                    ..
                } => CommandAction::Provide {
                    provider: provider(p)?,
                    prefix: prefix.clone(),
                    limit: *limit,
                    failure: failure.clone(),
                    broadcast: broadcast.as_deref().map(Destination::new),
                },
                CommandConfig::Start { job, started, already, .. } => {
                    let mut action = CommandAction::start(job);
                    if let CommandAction::Start { started: s, already: a, .. } = &mut action {
                        override_text(s, started);
                        override_text(a, already);
                    }
                    action
                }
                CommandConfig::Stop { job, stopped, already, .. } => {
                    let mut action = CommandAction::stop(job);
                    if let CommandAction::Stop { stopped: s, already: a, .. } = &mut action {
                        override_text(s, stopped);
                        override_text(a, already);
                    }
                    action
                }
                CommandConfig::Status { .. } => CommandAction::Status,
            };
            commands.register(command.name(), action)?;
        }

        tracing::info!(
            providers = providers.len(),
            jobs = config.jobs.len(),
            commands = ?commands.names(),
            "application configured"
        );

        Ok(Self {
            sink,
            destination,
            scheduler,
            commands,
            providers,
            auto_start,
            config,
        })
    }

    pub fn scheduler(&self) -> &Arc<Scheduler> {
        &self.scheduler
    }

    async fn publish(&self, text: &str) {
        self.publish_to(&self.destination, text).await;
    }

    async fn publish_to(&self, destination: &Destination, text: &str) {
        if let Err(e) = self.sink.publish(destination, text).await {
            tracing::warn!(%destination, error = %e, "publish failed");
        }
    }

    /// One-shot ready signal: announce, greet with a snapshot, start the
    /// auto-start jobs.
    pub async fn on_ready(&self) {
        if self.config.ready.announce {
            self.publish(&environment_info()).await;
        }

        if let Some(name) = &self.config.ready.snapshot {
            if let Some(provider) = self.providers.get(name) {
                match provider.produce().await {
                    Ok(text) => {
                        let limit = self.config.ready.snapshot_limit;
                        let text = format!("{}\n", truncate_chars(&text, limit));
                        self.publish(&text).await;
                    }
                    Err(e) => {
                        tracing::error!(provider = %name, error = %e, "ready snapshot failed");
                    }
                }
            }
        }

        for name in &self.auto_start {
            match self.scheduler.start(name) {
                Ok(JobControl::Started) => {}
                Ok(other) => tracing::debug!(job = %name, ?other, "auto-start skipped"),
                Err(e) => tracing::error!(job = %name, error = %e, "auto-start failed"),
            }
        }
    }

    /// Parse and dispatch one command line; the reply, if any, is published
    /// to the default destination (and its broadcast destination) and returned.
    pub async fn handle_line(&self, line: &str) -> Option<Reply> {
        let invocation = input::parse_line(line)?;
        let reply = self.commands.dispatch(&invocation.name, &invocation.args).await?;
        self.publish(&reply.text).await;
        if let Some(broadcast) = &reply.broadcast {
            self.publish_to(broadcast, &reply.text).await;
        }
        Some(reply)
    }

    pub async fn shutdown(&self) {
        self.scheduler.shutdown().await;
    }
}

fn override_text(slot: &mut String, configured: &Option<String>) {
    if let Some(text) = configured {
        slot.clone_from(text);
    }
}

pub fn environment_info() -> String {
    format!(
        "{} v{} 🛸 loaded.\n",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )
}
