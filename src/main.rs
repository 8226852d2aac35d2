use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use relaybot::app::App;
use relaybot::config::{self, Config};
use relaybot::sink::{ConsoleSink, OutputSink};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the relayed messages.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("relaybot=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // -- configuration --------------------------------------------------------
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".into());
    let config = Config::load(Path::new(&path))?;

    if let Some(token_file) = &config.token_file {
        let token = config::read_token(token_file)?;
        tracing::info!(chars = token.len(), "gateway token loaded");
    }

    // -- wiring ---------------------------------------------------------------
    let sink: Arc<dyn OutputSink> = Arc::new(ConsoleSink);
    let app = App::from_config(config, sink)?;
    app.on_ready().await;

    // -- command loop ---------------------------------------------------------
    // Each stdin line is one command. When stdin closes the jobs keep
    // running until Ctrl-C.
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => {
                    app.handle_line(&line).await;
                }
                Ok(None) => {
                    tracing::debug!("stdin closed");
                    stdin_open = false;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read command");
                    stdin_open = false;
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    tracing::info!("shutting down");
    app.shutdown().await;
    Ok(())
}
