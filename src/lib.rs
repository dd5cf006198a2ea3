//! Client side of the Emergency Leak Service intake workflow: collect the
//! request, submit it, and look up prior service orders and their status.

pub mod api;
pub mod error;
pub mod fetch;
pub mod form;
mod lenient;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod payload;
pub mod prefill;
pub mod report;
pub mod settings;

#[cfg(test)]
pub(crate) mod test_support;

pub use api::ServiceOrderApi;
pub use error::{FetchError, TransportError};
pub use fetch::{FetchOptions, Fetcher, ReqwestTransport, Transport};
pub use model::LookupResult;
pub use normalize::normalize_lookup_response;
