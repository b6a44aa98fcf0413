//! Span exporter writing OTLP/JSON lines to a rotating file.

use super::otlp::OtlpEncoder;
use super::rotation::{RotatingFile, RotationPolicy};
use futures_util::future::BoxFuture;
use opentelemetry::trace::TraceError;
use opentelemetry_sdk::export::trace::{ExportResult, SpanData, SpanExporter};
use opentelemetry_sdk::resource::Resource;
use opentelemetry_sdk::trace::TracerProvider;
use std::path::PathBuf;

/// Instrumentation scope name written with every batch.
pub const SCOPE: &str = "restaurant-admin";

struct FileSpanExporter {
    file: RotatingFile,
    encoder: OtlpEncoder,
    closed: bool,
}

impl FileSpanExporter {
    fn export_now(&self, batch: &[SpanData]) -> ExportResult {
        if self.closed {
            return Err(TraceError::from("trace file exporter is closed"));
        }
        let line = self.encoder.encode(batch).to_string();
        self.file
            .append_line(&line)
            .map_err(|e| TraceError::from(format!("writing {}: {e}", self.file.path().display())))
    }
}

impl SpanExporter for FileSpanExporter {
    fn export(&mut self, batch: Vec<SpanData>) -> BoxFuture<'static, ExportResult> {
        Box::pin(std::future::ready(self.export_now(&batch)))
    }

    fn shutdown(&mut self) {
        self.closed = true;
    }
}

impl std::fmt::Debug for FileSpanExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSpanExporter")
            .field("file", &self.file)
            .field("encoder", &self.encoder)
            .field("closed", &self.closed)
            .finish()
    }
}

/// Builds a tracer provider that writes every finished span to `path`.
///
/// Spans are exported one by one as they close, so nothing is lost if the
/// process exits without shutting the provider down.
#[must_use]
pub fn file_tracer_provider(path: PathBuf, resource: Resource) -> TracerProvider {
    let exporter = FileSpanExporter {
        file: RotatingFile::new(path, RotationPolicy::default()),
        encoder: OtlpEncoder::new(&resource, SCOPE),
        closed: false,
    };

    TracerProvider::builder()
        .with_config(opentelemetry_sdk::trace::Config::default().with_resource(resource))
        .with_simple_exporter(exporter)
        .build()
}
