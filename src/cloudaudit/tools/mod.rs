pub mod compare;
pub mod config;
pub mod error;
pub mod flatten;
pub mod io;
pub mod join;
pub mod model;
pub mod resolve;
pub mod sync;
pub mod transform;

pub use error::{Result, ToolError};
