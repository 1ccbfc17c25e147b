//! A terminal front end for the public-health chat service.
//!
//! Configuration comes from the environment:
//!
//! - `HEALTH_CHAT_BASE_URL`: where the service lives
//!   (default `http://127.0.0.1:5000`).
//! - `HEALTH_CHAT_PATH`: the path queries are posted to (default `/chat`).
//! - `HEALTH_CHAT_TIMEOUT_SECS`: optional per-request timeout.
//! - `HEALTH_CHAT_TRUST_MARKUP`: set to `1` to show the service's markup
//!   without sanitizing it.
//! - `RUST_LOG`: log filter.

#[macro_use]
extern crate tracing;

use std::env;
use std::io::Write as _;
use std::time::Duration;

use health_chat::core::render::{MarkupPolicy, render_entry};
use health_chat::core::transcript::Entry;
use health_chat::core::{INPUT_PLACEHOLDER, SendStatus, Trigger};
use health_chat::endpoint::{HttpEndpointConfig, HttpEndpointConfigBuilder};
use health_chat::terminal::{Prompt, paint};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::io;
use tokio::select;
use tokio::sync::mpsc;
use tokio::time::sleep;

enum SessionEvent {
    Entry(Entry),
    Idle,
}

const WIDTH: usize = 80;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let (config, markup_policy) = match config_from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return;
        }
    };
    info!("using endpoint {}", config.url());

    let builder = match health_chat::connect(config) {
        Ok(builder) => builder,
        Err(err) => {
            eprintln!("cannot set up the endpoint: {err}");
            return;
        }
    };

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let session = builder
        .with_markup_policy(markup_policy)
        .on_entry({
            let event_tx = event_tx.clone();
            move |entry| {
                event_tx.send(SessionEvent::Entry(entry.clone())).ok();
            }
        })
        .on_idle({
            let event_tx = event_tx.clone();
            move || {
                event_tx.send(SessionEvent::Idle).ok();
            }
        })
        .build();

    match session.render().await {
        Ok(descriptors) => {
            for descriptor in &descriptors {
                print!("{}", paint(descriptor, WIDTH));
            }
        }
        Err(err) => {
            error!("session is gone: {err}");
            return;
        }
    }
    println!("{}", INPUT_PLACEHOLDER.dimmed());

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    let mut prompt = Prompt::new(io::BufReader::new(io::stdin()));

    loop {
        print!("{} ", ">".bright_green());
        std::io::stdout().flush().ok();

        let Some(line) = prompt.next_query().await else {
            break;
        };
        if session.set_input(line).is_err() {
            break;
        }
        match session.send_from(Trigger::Enter).await {
            Ok(SendStatus::Ignored) => continue,
            Ok(status) => debug!("sent: {status:?}"),
            Err(err) => {
                error!("session is gone: {err}");
                break;
            }
        }

        if !show_reply(&mut event_rx, &progress_style, markup_policy).await {
            break;
        }
    }

    session.close();
}

fn config_from_env() -> Result<(HttpEndpointConfig, MarkupPolicy), String> {
    let mut builder = HttpEndpointConfigBuilder::new();
    if let Ok(base_url) = env::var("HEALTH_CHAT_BASE_URL") {
        builder = builder.with_base_url(base_url);
    }
    if let Ok(path) = env::var("HEALTH_CHAT_PATH") {
        builder = builder.with_path(path);
    }
    if let Ok(secs) = env::var("HEALTH_CHAT_TIMEOUT_SECS") {
        let Ok(secs) = secs.parse::<u64>() else {
            return Err(format!(
                "HEALTH_CHAT_TIMEOUT_SECS must be a whole number, got {secs:?}"
            ));
        };
        builder = builder.with_timeout(Duration::from_secs(secs));
    }

    let markup_policy = match env::var("HEALTH_CHAT_TRUST_MARKUP").as_deref() {
        Ok("1") => MarkupPolicy::Trusted,
        _ => MarkupPolicy::Sanitize,
    };

    Ok((builder.build(), markup_policy))
}

/// Prints entries as the session appends them, with a spinner while
/// waiting, until the session goes idle. Returns `false` if the session
/// has stopped reporting.
async fn show_reply(
    event_rx: &mut mpsc::UnboundedReceiver<SessionEvent>,
    progress_style: &ProgressStyle,
    markup_policy: MarkupPolicy,
) -> bool {
    let mut spinner: Option<ProgressBar> = None;

    loop {
        spinner
            .get_or_insert_with(|| {
                let spinner = ProgressBar::new_spinner();
                spinner.set_style(progress_style.clone());
                spinner.set_message("Looking that up...");
                spinner
            })
            .inc(1);

        let event = select! {
            event = event_rx.recv() => event,
            _ = sleep(Duration::from_millis(100)) => continue,
        };

        // Clear the spinner before printing anything else.
        if let Some(spinner) = spinner.take() {
            spinner.finish_and_clear();
        }

        match event {
            Some(SessionEvent::Entry(entry)) => {
                let descriptor = render_entry(&entry, markup_policy);
                print!("{}", paint(&descriptor, WIDTH));
            }
            Some(SessionEvent::Idle) => return true,
            None => return false,
        }
    }
}
