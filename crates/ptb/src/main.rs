use std::sync::Arc;

use ptb_core::config::Config;

#[tokio::main]
async fn main() -> Result<(), ptb_core::Error> {
    ptb_core::logging::init("ptb")?;

    let cfg = Arc::new(Config::load()?);

    ptb_telegram::router::run_polling(cfg)
        .await
        .map_err(|e| ptb_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
