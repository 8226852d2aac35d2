//! End-to-end flow: config → app → ready event → commands → jobs.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use relaybot::app::App;
use relaybot::config::Config;
use relaybot::error::TransportError;
use relaybot::sink::{Destination, OutputSink};

#[derive(Default)]
struct RecordingSink {
    messages: Mutex<Vec<(String, String)>>,
}

impl RecordingSink {
    fn messages(&self) -> Vec<(String, String)> {
        self.messages.lock().unwrap().clone()
    }

    fn count(&self, text: &str) -> usize {
        self.messages().iter().filter(|(_, t)| t == text).count()
    }
}

#[async_trait]
impl OutputSink for RecordingSink {
    async fn publish(&self, destination: &Destination, text: &str) -> Result<(), TransportError> {
        self.messages
            .lock()
            .unwrap()
            .push((destination.to_string(), text.to_string()));
        Ok(())
    }
}

const CONFIG: &str = r#"
destination = "dev"

[ready]
announce = true
snapshot = "hello"

[providers.hello]
kind = "static"
text = "hello from the host"

[providers.ping]
kind = "static"
text = "Pong! 🏓"

[providers.tick]
kind = "static"
text = "tick"

[providers.verse]
kind = "verse"
path = "/definitely/not/here.txt"

[[jobs]]
name = "ticker"
provider = "tick"
interval_s = 10
destination = "alerts"
prefix = "⏰ "
auto_start = true

[[jobs]]
name = "manual"
provider = "tick"
interval_s = 5

[[commands]]
action = "reply"
name = "ping"
provider = "ping"

[[commands]]
action = "reply"
name = "gang"
provider = "ping"
broadcast = "general"

[[commands]]
action = "reply"
name = "verse"
provider = "verse"
failure = "Error: Could not get the Czech Bible verse!"

[[commands]]
action = "start"
name = "go"
job = "manual"
started = "manual on"
already = "manual already on"

[[commands]]
action = "stop"
name = "halt"
job = "manual"

[[commands]]
action = "status"
name = "jobs"
"#;

fn app() -> (Arc<RecordingSink>, App) {
    let sink = Arc::new(RecordingSink::default());
    let config = Config::parse(CONFIG).unwrap();
    let app = App::from_config(config, sink.clone()).unwrap();
    (sink, app)
}

#[tokio::test(start_paused = true)]
async fn ready_announces_and_starts_auto_jobs() {
    let (sink, app) = app();
    app.on_ready().await;
    tokio::time::sleep(Duration::from_secs(1)).await;

    let messages = sink.messages();
    assert!(messages[0].1.starts_with("relaybot v"));
    assert_eq!(messages[1], ("dev".to_string(), "hello from the host\n".to_string()));
    assert!(messages.contains(&("alerts".to_string(), "⏰ tick".to_string())));

    assert!(app.scheduler().is_running("ticker"));
    assert!(!app.scheduler().is_running("manual"));
    app.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn commands_reply_to_default_destination() {
    let (sink, app) = app();

    let reply = app.handle_line("/ping").await.unwrap();
    assert_eq!(reply.text, "Pong! 🏓");
    assert_eq!(sink.messages(), [("dev".to_string(), "Pong! 🏓".to_string())]);

    assert!(app.handle_line("/unknown").await.is_none());
    assert!(app.handle_line("   ").await.is_none());
    assert_eq!(sink.messages().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn broadcast_reply_reaches_both_destinations() {
    let (sink, app) = app();
    app.handle_line("/gang").await.unwrap();
    assert_eq!(
        sink.messages(),
        [
            ("dev".to_string(), "Pong! 🏓".to_string()),
            ("general".to_string(), "Pong! 🏓".to_string()),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn provider_failure_is_a_readable_reply() {
    let (_, app) = app();
    let reply = app.handle_line("verse").await.unwrap();
    assert_eq!(reply.text, "Error: Could not get the Czech Bible verse!");
}

async fn reply(app: &App, line: &str) -> String {
    app.handle_line(line).await.unwrap().text
}

#[tokio::test(start_paused = true)]
async fn job_control_through_commands() {
    let (sink, app) = app();

    assert_eq!(reply(&app, "/halt").await, "Job `manual` is already stopped! 🛑");
    assert_eq!(reply(&app, "/go").await, "manual on");
    assert_eq!(reply(&app, "/go").await, "manual already on");

    // Ticks at 0, 5 and 10 seconds.
    tokio::time::sleep(Duration::from_secs(12)).await;
    assert_eq!(sink.count("tick"), 3);

    assert_eq!(reply(&app, "/halt").await, "Job `manual` stopped. 🛑");
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(sink.count("tick"), 3);

    let status = reply(&app, "jobs manual").await;
    assert!(status.starts_with("manual [idle] every 5s, published 3, failed 0"));
    app.shutdown().await;
}

#[test]
fn duplicate_job_names_fail_setup() {
    let config = Config::parse(
        r#"
destination = "dev"

[providers.tick]
kind = "static"
text = "tick"

[[jobs]]
name = "twice"
provider = "tick"
interval_s = 5

[[jobs]]
name = "twice"
provider = "tick"
interval_s = 10
"#,
    )
    .unwrap();

    let err = App::from_config(config, Arc::new(RecordingSink::default()))
        .err()
        .unwrap();
    assert!(err.to_string().contains("already registered"));
}
