//! Execution event ingestion: vocabulary, state machine, stream lifecycle.
//!
//! Three pieces, smallest first:
//!
//! - [`ExecutionEvent`]: the tagged event vocabulary on the wire
//! - [`EventIngestion`]: bounded log + active-node set, driven one event
//!   at a time in delivery order
//! - [`StreamHandle`]/[`StreamSender`]: the caller-owned channel between
//!   the transport and whoever drives ingestion
//!
//! Ingestion never blocks and never retries: transport concerns stay with
//! the transport, and a disconnect only flips the `connected` flag the
//! transport owner reports.

pub mod event;
pub mod ingest;
pub mod stream;

pub use event::ExecutionEvent;
pub use ingest::{EventIngestion, IngestionOptions, LogEntry};
pub use stream::{StreamClosed, StreamHandle, StreamSender, StreamSignal};
