//! Client facades.
//!
//! [`HttpClient`] blocks; [`HttpAsyncClient`] hands requests to engine
//! workers and reports through a [`Callback`]. Both dispatch the same verb
//! set through the same execution adapter, so validation and error
//! classification are identical on both paths.

mod async_client;
mod builder;
mod callback;
mod core;
pub mod error_classification;
mod execution;
#[cfg(test)]
mod testing;

pub use async_client::HttpAsyncClient;
pub use builder::HttpClientBuilder;
pub use callback::{Callback, ResponseFuture};
pub use self::core::HttpClient;
pub use error_classification::classify;
