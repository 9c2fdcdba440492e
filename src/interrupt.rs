//! Ctrl+C handling for the binary
//!
//! An interrupt does not kill the process: it cancels the run through its
//! [`CancelToken`], the collector finalizes after the current round, and the
//! partial report is still delivered.

use crate::collector::CancelToken;
use anyhow::{Context, Result};
use std::thread;
use tracing::info;

/// Cancel `token` on the first Ctrl+C
///
/// The OS handler is installed before this returns, so an interrupt that
/// arrives right afterwards is not lost.
pub fn cancel_on_interrupt(token: CancelToken) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build signal runtime")?;

    #[cfg(unix)]
    let mut interrupt = {
        use tokio::signal::unix::{signal, SignalKind};
        let _guard = runtime.enter();
        signal(SignalKind::interrupt()).context("Failed to install Ctrl+C handler")?
    };

    thread::Builder::new()
        .name("callsweep-interrupt".to_string())
        .spawn(move || {
            runtime.block_on(async move {
                #[cfg(unix)]
                let received = interrupt.recv().await.is_some();
                #[cfg(not(unix))]
                let received = tokio::signal::ctrl_c().await.is_ok();

                if received {
                    info!("Ctrl+C received, finalizing partial report");
                    token.cancel();
                }
            });
        })
        .context("Failed to spawn interrupt listener")?;

    Ok(())
}
