//! Task store contract and the adapters shipped with the palette.

pub mod adapter;
pub mod error;
pub mod memory;
pub mod sqlite;

pub use adapter::*;
pub use error::*;
pub use memory::*;
pub use sqlite::*;
