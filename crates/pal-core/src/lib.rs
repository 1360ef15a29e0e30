pub mod config;
pub mod messages;
pub mod types;
pub mod validation;

pub use config::*;
pub use messages::*;
pub use types::*;
pub use validation::*;
