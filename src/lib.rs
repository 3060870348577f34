pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod store;
pub mod sync;
pub mod tracing;
pub mod transform;

pub mod util {
    pub mod env;
}

pub use error::SyncError;
pub use store::{QueryStore, StoreHandle};
