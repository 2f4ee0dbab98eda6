//! Concrete collaborator implementations. `coinc-core` only names the
//! trait boundaries (`ObservationSource`, `AlertPublisher`, …); everything
//! that actually touches a socket, a file, or a clock lives here.

mod channel_source;
mod file_sinks;
mod heartbeat;
mod tcp_source;

pub use channel_source::{ChannelObservationSource, ChannelProducer};
pub use file_sinks::{FileAlertPublisher, FileObservationStorage};
pub use heartbeat::{StaticHeartbeatSource, UniformFalseAlarmRate};
pub use tcp_source::TcpObservationSource;
