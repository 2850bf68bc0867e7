//! API endpoint implementations.

mod discover;

pub use discover::DiscoverApi;
