//! Document store: documents, their bounded version history and persistence.

pub mod types;
pub mod state;
pub mod storage;
pub mod store;

pub use types::*;
pub use state::StoreState;
pub use storage::STORE_SLOT_KEY;
pub use store::DocumentStore;
