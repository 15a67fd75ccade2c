//! Background tasks spawned by the server binary.
//!
//! Each submodule provides a long-running async function intended to be
//! spawned via `tokio::spawn` and stopped through a [`CancellationToken`].
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

pub mod session_sweeper;
