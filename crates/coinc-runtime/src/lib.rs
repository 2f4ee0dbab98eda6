//! Wires `coinc-core`'s grouping engine to concrete I/O: a bus-facing
//! [`collaborators::TcpObservationSource`] / in-process
//! [`collaborators::ChannelObservationSource`], JSONL-file sinks, `tracing`
//! based logging, and a [`lifecycle::Reactor`] that bootstraps everything
//! from a [`coinc_config::CoincConfig`] and owns graceful shutdown.

#[macro_use]
mod log_macros;

pub(crate) mod alert_task;
pub mod collaborators;
pub mod consumer_loop;
pub mod error;
pub mod lifecycle;
pub mod tracing_init;

pub use error::{RuntimeError, RuntimeReason, RuntimeResult};
