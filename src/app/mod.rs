pub mod context;
pub mod error;
pub mod repl;

pub use context::AppContext;
pub use error::{GemletError, Result};
