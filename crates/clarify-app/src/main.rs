//! Clarify command console.
//!
//! Runs the coordinator over an in-process tab hub and speaks the popup's
//! request/response contract on stdin/stdout: one JSON command per line in,
//! one JSON response per line out.

use clarify_app::TabHub;
use clarify_core::config::{default_data_dir, CoordinatorConfig, WriteThrottle};
use clarify_core::logging::{init_logging, LogConfig};
use clarify_core::protocol::{Command, CommandResponse, StateReport};
use clarify_coordinator::Coordinator;
use clarify_store::{JsonFileStore, StateStore, ThrottledStore};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    init_logging(LogConfig::default());
    info!("Starting Clarify...");

    let data_dir = default_data_dir();
    let store: Arc<dyn StateStore> = Arc::new(ThrottledStore::new(
        JsonFileStore::in_dir(&data_dir),
        WriteThrottle::default(),
    ));
    info!(dir = %data_dir.display(), "Persisting accessibility record");

    let (report_tx, mut report_rx) = mpsc::unbounded_channel::<StateReport>();
    let hub = Arc::new(TabHub::new(Arc::clone(&store), report_tx));

    // A couple of demo tabs so fan-out has something to reach. The
    // about: page exercises the skip path.
    for url in ["https://example.com/", "https://example.org/", "about:blank"] {
        match hub.open_tab(url) {
            Ok(tab) => info!(tab = %tab, url, "Opened tab"),
            Err(err) => error!(url, error = %err, "Failed to open tab"),
        }
    }

    let coordinator = Coordinator::new(
        Arc::clone(&store),
        Arc::clone(&hub),
        CoordinatorConfig::default(),
    )
    .await;
    let handle = clarify_coordinator::spawn(coordinator);

    // Agent reports flow back into the coordinator as telemetry.
    let report_handle = handle.clone();
    tokio::spawn(async move {
        while let Some(report) = report_rx.recv().await {
            report_handle.report(report);
        }
    });

    info!("Ready. One JSON command per line, e.g. {{\"action\":\"getState\"}}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                error!(error = %err, "Failed to read stdin");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Command>(line) {
            Ok(cmd) => match handle.command(cmd).await {
                Ok(response) => response,
                Err(err) => CommandResponse::error(err.to_string()),
            },
            // Unknown actions and unknown features are rejected here, before
            // anything can mutate.
            Err(err) => CommandResponse::error(format!("invalid command: {}", err)),
        };

        match serde_json::to_string(&response) {
            Ok(json) => println!("{}", json),
            Err(err) => error!(error = %err, "Failed to serialize response"),
        }
    }

    info!("Shutting down");
}
