/// Core error type for the relay.
///
/// Adapter crates map their specific errors into this type so the core can
/// handle failures consistently (fatal config error vs per-send delivery error).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
