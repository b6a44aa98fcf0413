//! OpenTelemetry tracing with file-based OTLP export.
//!
//! ```text
//! tracing-opentelemetry → OpenTelemetry SDK → FileSpanExporter → JSON lines
//! ```
//!
//! Trace files rotate at 10MB and keep 3 backups. The level is taken from
//! `RUST_LOG`, then `trace_level` in [`Config`](crate::Config), then `info`.
//! Without a trace file, events go to stderr.

mod exporter;
mod init;
mod otlp;
mod rotation;

pub use exporter::{file_tracer_provider, SCOPE};
pub use init::init_tracing;
pub use rotation::RotationPolicy;
