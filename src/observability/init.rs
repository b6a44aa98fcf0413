//! Tracing subscriber setup.

use super::exporter::{file_tracer_provider, SCOPE};
use crate::infrastructure::paths;
use crate::Config;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::resource::Resource;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global tracing subscriber.
///
/// The filter comes from `RUST_LOG` when set, else from
/// `config.trace_level`, else `info`. With `config.trace_file` set, spans
/// are exported as OTLP JSON lines to that file (relative paths land in
/// the data directory); otherwise events are printed to stderr.
///
/// Only the first call in a process installs anything. Returns whether this
/// call did.
///
/// # Example
///
/// ```rust
/// use restaurant_admin::observability::init_tracing;
/// use restaurant_admin::Config;
///
/// let config = Config {
///     trace_level: Some("debug".to_string()),
///     ..Default::default()
/// };
///
/// init_tracing(&config);
/// tracing::debug!("tracing is now active");
/// ```
pub fn init_tracing(config: &Config) -> bool {
    let level = config.trace_level.as_deref().unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let mut setup_error = None;
    let trace_path = config.trace_file.as_deref().map(paths::resolve_data_file);
    let trace_path = trace_path.filter(|path| match path.parent() {
        Some(dir) => match std::fs::create_dir_all(dir) {
            Ok(()) => true,
            Err(e) => {
                setup_error = Some(format!("cannot create {}: {e}", dir.display()));
                false
            }
        },
        None => true,
    });

    let otel_layer = trace_path.as_ref().map(|path| {
        let resource = Resource::new(vec![
            opentelemetry::KeyValue::new("service.name", SCOPE),
            opentelemetry::KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
        ]);
        let provider = file_tracer_provider(path.clone(), resource);
        OpenTelemetryLayer::new(provider.tracer(SCOPE))
    });

    let stderr_layer = otel_layer
        .is_none()
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(otel_layer)
        .with(stderr_layer)
        .try_init()
        .is_ok();

    if installed {
        if let Some(error) = setup_error {
            tracing::warn!(%error, "trace file disabled");
        }
        tracing::debug!(trace_file = ?trace_path, "tracing initialized");
    }
    installed
}
