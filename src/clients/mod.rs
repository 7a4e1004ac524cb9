//! Type-safe wrappers around [`StoreClient`](crate::framework::StoreClient).

pub mod collection_client;

pub use collection_client::*;
