pub mod engine;
pub mod session;
pub mod templates;

pub use engine::*;
pub use session::*;
pub use templates::*;
