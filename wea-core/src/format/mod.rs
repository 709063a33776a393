//! Binary format definitions for exchange array segments
//!
//! This module contains the wire-level pieces of the format: constants,
//! the element type registry and the header codec. No I/O.

pub mod constants;
pub mod element_type;
pub mod header;

pub use element_type::{ElementType, UnknownElementType};
pub use header::{declared_fields_size, encode, HeaderRef};
#[cfg(feature = "alloc")]
pub use header::{decode, ExchangeHeader};
