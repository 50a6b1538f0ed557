use std::{fs::OpenOptions, path::Path, sync::Arc};

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::Result;

/// Initialize logging for the relay.
///
/// Always writes to the configured log file (append); the console layer is
/// optional so the `--disable-console-log` flag can route output to the file
/// only. Default level is `info`, overridable with `RUST_LOG`.
pub fn init(service_name: &str, log_file: &Path, console: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("info,{service_name}=info")));

    let file = OpenOptions::new().create(true).append(true).open(log_file)?;
    let file_layer = fmt::layer()
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .with_target(false);

    let console_layer = console.then(|| fmt::layer().with_target(false).with_ansi(true));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    Ok(())
}
