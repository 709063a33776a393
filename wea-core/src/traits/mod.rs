//! Abstract interfaces for exchange array storage
//!
//! Traits are pure interfaces; concrete storage lives in the `wea` crate.

pub mod backend;
pub mod element;

pub use backend::{SegmentStorage, SegmentStorageMut};
pub use element::ExchangeElement;
