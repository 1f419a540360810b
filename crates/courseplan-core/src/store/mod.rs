//! Persistence adapter: the `PersistenceStore` trait and its HTTP
//! implementation.

mod http;
mod trait_def;

pub use http::HttpStore;
pub use trait_def::PersistenceStore;
