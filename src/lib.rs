pub mod error;
pub mod logger;
pub mod report;
pub mod results;
pub mod stats;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
