// src/exec/interrupt.rs

//! External interrupt source for the supervisor.
//!
//! Signal handlers are installed synchronously when the listener is
//! created, so an interrupt that arrives right after the child is launched
//! is never lost to the default disposition.

use tokio::sync::mpsc;
use tracing::debug;

use crate::errors::Result;

/// An external request for the supervisor to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// SIGINT / Ctrl-C.
    CtrlC,
    /// SIGTERM.
    Terminate,
}

/// Install interrupt handlers and forward every interrupt into a channel.
///
/// The channel stays open for the whole process lifetime so repeated
/// interrupts are observable (and ignorable) while an abort is in flight.
pub fn spawn_interrupt_listener() -> Result<mpsc::Receiver<Interrupt>> {
    let (tx, rx) = mpsc::channel::<Interrupt>(8);

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::spawn(async move {
            loop {
                let interrupt = tokio::select! {
                    Some(()) = sigint.recv() => Interrupt::CtrlC,
                    Some(()) = sigterm.recv() => Interrupt::Terminate,
                    else => break,
                };
                debug!(?interrupt, "supervisor received interrupt");
                if tx.send(interrupt).await.is_err() {
                    break;
                }
            }
        });
    }

    #[cfg(not(unix))]
    {
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                debug!("supervisor received Ctrl-C");
                if tx.send(Interrupt::CtrlC).await.is_err() {
                    break;
                }
            }
        });
    }

    Ok(rx)
}
