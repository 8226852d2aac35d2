//! Error taxonomy shared by providers, the scheduler and the sinks.
//!
//! Provider failures are never fatal: a job logs them and keeps its schedule,
//! a synchronous command turns them into a reply. Only setup-time errors
//! (duplicate job names, bad configuration) stop the process.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Why a [`ContentProvider`](crate::source::ContentProvider) produced nothing.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("could not run `{program}`: {source}")]
    Exec {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("verse corpus contains no entries")]
    EmptyCorpus,

    #[error("malformed feed document: {0}")]
    MalformedDocument(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::Network(e.to_string())
    }
}

/// Setup and lookup failures raised by the [`Scheduler`](crate::scheduler::Scheduler).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("job `{0}` is already registered")]
    DuplicateName(String),

    #[error("no job named `{0}`")]
    UnknownJob(String),

    #[error("job `{name}` interval {interval:?} is shorter than one second")]
    IntervalTooShort { name: String, interval: Duration },
}

/// The destination refused or failed to accept a message.
#[derive(Debug, Error)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

impl From<std::io::Error> for TransportError {
    fn from(e: std::io::Error) -> Self {
        TransportError(e.to_string())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("command `{0}` is already registered")]
    DuplicateCommand(String),
}
