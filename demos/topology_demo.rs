//! Demo: Live Topology Synchronization
//!
//! Loads a workflow definition, lays it out with a sub-agent overlay, then
//! drives the canvas from a simulated event stream and metadata poll while
//! printing which nodes each reconciliation pass actually touched.
//!
//! Running This Demo:
//! ```bash
//! cargo run --example topology_demo
//! ```

use miette::{IntoDiagnostic, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use toposync::events::{ExecutionEvent, StreamHandle, StreamSignal};
use toposync::graph::WorkflowDefinition;
use toposync::metadata::{MetadataMap, NodeMetadata};
use toposync::session::{CanvasSession, SessionOptions};
use toposync::types::RenderId;

fn init_tracing() {
    let fmt_layer = fmt::layer().with_target(false);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,toposync=debug"))
        .unwrap();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

const DEFINITION: &str = r#"{
    "nodes": [
        {"id": "root", "kind": "orchestrator", "label": "Root"},
        {"id": "coder", "kind": "agent", "label": "Coder", "modelId": "claude-sonnet-4-5"},
        {"id": "reviewer", "kind": "agent", "label": "Reviewer", "modelId": "gpt-4o"},
        {"id": "rescue", "kind": "error_handler", "label": "Rescue"}
    ],
    "edges": [
        {"id": "e1", "source": "root", "target": "coder"},
        {"id": "e2", "source": "coder", "target": "reviewer"},
        {"id": "e3", "source": "coder", "target": "rescue", "conditional": true, "label": "on failure"},
        {"id": "e4", "source": "reviewer", "target": "__end__"}
    ],
    "subgraphs": {
        "sub_agents": {
            "nodes": [
                {"id": "searcher", "kind": "sub_agent", "label": "Searcher"},
                {"id": "tester", "kind": "sub_agent", "label": "Tester"}
            ],
            "edges": [{"id": "se1", "source": "searcher", "target": "tester"}]
        }
    }
}"#;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    miette::set_panic_hook();

    let def: WorkflowDefinition = serde_json::from_str(DEFINITION).into_diagnostic()?;
    let mut session = CanvasSession::new(SessionOptions::default());
    let generation = session.load(&def, Some("sub_agents"))?;

    info!(
        nodes = session.diagram().nodes.len(),
        edges = session.diagram().edges.len(),
        "topology laid out"
    );
    for node in &session.diagram().nodes {
        info!("  {} at ({:.0}, {:.0})", node.render_id, node.x, node.y);
    }

    // The user drags a node; the position must survive every tick below.
    session.move_node(&RenderId::primary("reviewer"), 420.0, 260.0);

    // Simulated transport: a task publishing the run's event sequence.
    let (sender, handle) = StreamHandle::open();
    tokio::spawn(async move {
        sender.connected().ok();
        let script = [
            ExecutionEvent::entered("root", 1.0),
            ExecutionEvent::entered("coder", 1.2),
            ExecutionEvent::entered("searcher", 1.3),
            ExecutionEvent::exited("searcher", 2.0),
            ExecutionEvent::exited("coder", 2.4),
            ExecutionEvent::entered("reviewer", 2.5),
            ExecutionEvent::errored("reviewer", "style check failed", 3.0),
            ExecutionEvent::exited("root", 3.1),
        ];
        for event in script {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            if sender.event(event).is_err() {
                break;
            }
        }
        sender.disconnected().ok();
    });

    // One cooperative loop: stream signals and an interleaved metadata poll.
    let mut polled = false;
    while let Some(signal) = handle.recv_async().await {
        let disconnected = matches!(signal, StreamSignal::Disconnected);
        if let Some(outcome) = session.handle_signal(generation, signal) {
            if !outcome.is_clean() {
                info!(
                    changed = ?outcome.changed.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    active = session.active_nodes().len(),
                    "reconciled"
                );
            }
        }
        if disconnected {
            break;
        }

        if !polled && session.active_nodes().contains("coder") {
            polled = true;
            let mut poll = MetadataMap::default();
            poll.insert(
                "coder".into(),
                NodeMetadata::new("ch-42").with_version(7).with_latency_ms(830.0),
            );
            session.apply_metadata(generation, poll);
            info!("metadata poll applied");
        }
    }

    let reviewer = session.diagram().node(&RenderId::primary("reviewer")).unwrap();
    info!(
        x = reviewer.x,
        y = reviewer.y,
        "dragged position after full run (unchanged)"
    );
    info!(log = session.event_log().len(), "events retained");

    Ok(())
}
