pub mod link;
pub mod session;

pub use link::Link;
pub use session::Session;
