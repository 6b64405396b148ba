pub mod client;
pub mod models;
pub mod queries;

mod error;

pub use client::GraphQlStore;
pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
