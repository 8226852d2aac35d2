//! relaybot — relays prices, exchange rates, quotes, verses and RSS feeds to
//! a chat destination on a schedule, and answers the same content on demand.
//!
//! ## Architecture overview
//!
//! ```text
//!                 start/stop            spawn            produce()
//! ┌────────────┐ ──────────► ┌─────────────┐ ───► ┌─────┐ ───────► ┌──────────┐
//! │ command.rs │             │ scheduler.rs│      │ Job │          │ source/  │
//! └────────────┘ ◄── reply ─ └─────────────┘      └─────┘          └──────────┘
//!       ▲     │                                      │ publish()
//!       │     └──────────── produce() ──────► source/ │
//! ┌──────────┐                                  ┌─────────┐
//! │ input.rs │                                  │ sink.rs │
//! └──────────┘                                  └─────────┘
//! ```
//!
//! * **`source/`** — the `ContentProvider` trait and concrete providers,
//!   including the RSS parser and the verse picker.
//! * **`scheduler`** — named jobs with start/stop control, one tokio task each.
//! * **`command`** — maps command names to provider calls or job control.
//! * **`input`** — parses command lines into invocations.
//! * **`sink`** — the `OutputSink` trait and the console implementation.
//! * **`app`** — builds everything from `config` and handles the ready event.

pub mod app;
pub mod command;
pub mod config;
pub mod error;
pub mod input;
pub mod scheduler;
pub mod sink;
pub mod source;
