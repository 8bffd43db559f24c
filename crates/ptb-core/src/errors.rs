/// Core error type.
///
/// The adapter crate maps its specific errors into this type so the core can
/// handle failures consistently. Countdown code treats a failed progress edit
/// as a normal value and drops it; nothing in here is fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
