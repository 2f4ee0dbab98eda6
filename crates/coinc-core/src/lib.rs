//! The coincidence grouping engine: the data structure that maintains
//! active sub-groups of coincident neutrino observations, the rules by
//! which an incoming message is classified as add / update / retraction,
//! and the logic that decides which alerts to emit after each message.
//!
//! Everything here is synchronous and side-effect free beyond mutating an
//! owned [`cache::Cache`] — transport, persistence and the consumer loop
//! that drives this engine live in `coinc-runtime`.

pub mod alert;
pub mod cache;
pub mod classifier;
pub mod collaborators;
pub mod decider;
pub mod error;
pub mod grouping;
pub mod observation;
pub mod subgroup;

pub use alert::{Alert, AlertKind};
pub use cache::Cache;
pub use classifier::{classify, Classification};
pub use collaborators::{
    AlertPublisher, BusError, FalseAlarmRate, HeartbeatSnapshot, HeartbeatSource, ObservationSource,
    ObservationStorage, PublishError, StorageError,
};
pub use decider::decide;
pub use error::{CoreError, CoreReason, CoreResult};
pub use observation::{Observation, RawMessage};
pub use subgroup::{SubGroup, TransitionFlag};
