pub mod address;
pub mod error;
pub mod io;
pub mod logging;
pub mod mapping;
pub mod merge;
pub mod model;

pub use error::{Result, ToolError};
