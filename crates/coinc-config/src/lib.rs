pub mod alert;
pub mod bus;
pub mod coincidence;
pub mod config;
pub mod heartbeat;
pub mod logging;
pub mod server;
pub mod storage;
pub mod types;
pub mod validate;

pub use alert::AlertConfig;
pub use bus::BusConfig;
pub use coincidence::CoincidenceConfig;
pub use config::CoincConfig;
pub use heartbeat::HeartbeatConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use server::ServerConfig;
pub use storage::StorageConfig;
pub use types::HumanDuration;
