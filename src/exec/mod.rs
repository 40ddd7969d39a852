// src/exec/mod.rs

//! Process execution layer.
//!
//! This module owns everything that touches the OS process table:
//!
//! - [`launcher`] starts the child with inherited stdio.
//! - [`backend`] provides the `ChildHandle` trait the supervisor drives, and
//!   the `TokioChild` implementation backed by `tokio::process` and `nix`.
//!   Tests replace it with a scripted fake.
//! - [`interrupt`] turns Ctrl-C / SIGTERM into `Interrupt` values on a
//!   channel.

pub mod backend;
pub mod interrupt;
pub mod launcher;

pub use backend::{ChildHandle, TokioChild};
pub use interrupt::{Interrupt, spawn_interrupt_listener};
pub use launcher::launch;
