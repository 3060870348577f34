// Read-only HTTP query API over the in-memory store

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;

pub use handlers::ApiState;
pub use server::ApiServer;
