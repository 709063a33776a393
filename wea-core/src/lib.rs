#![no_std]

//! WEA Core - Wrapped Exchange Array Format Definitions
//!
//! This crate provides the segment layout arithmetic, the element type
//! registry and the header codec for exchanging column-major numeric
//! arrays between processes. Everything here works on byte slices; the
//! `wea` crate adds the storage backends.

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod error;
pub mod format;
pub mod layout;
pub mod traits;

pub use error::*;
pub use format::*;
pub use layout::{align_to_boundary, element_count, header_size, segment_size, SegmentLayout};
pub use traits::*;
