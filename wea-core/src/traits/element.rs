//! Element type constraints for exchange payloads
//!
//! This module defines the trait that ties a Rust numeric type to the
//! element type ordinal stored in the header.

use crate::format::ElementType;
use num_complex::Complex;

/// Trait for types that can be stored as payload elements
///
/// Elements must be plain old data so payload bytes can be reinterpreted
/// as typed slices without copying.
pub trait ExchangeElement: bytemuck::Pod + PartialEq {
    /// Get the element type representation for this Rust type
    fn element_type() -> ElementType;

    /// Get the size in bytes of this element type
    fn size_bytes() -> usize {
        core::mem::size_of::<Self>()
    }
}

macro_rules! impl_exchange_element {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl ExchangeElement for $ty {
                fn element_type() -> ElementType {
                    ElementType::$variant
                }
            }
        )*
    };
}

impl_exchange_element! {
    i8 => Int8,
    u8 => UInt8,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
    Complex<f64> => ComplexF64,
}

// No impl for Complex<f32>: its ordinal is registered but never exchanged.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes_match_registry() {
        fn check<T: ExchangeElement>() {
            assert_eq!(T::size_bytes(), T::element_type().byte_width());
            assert!(T::element_type().is_supported());
        }
        check::<i8>();
        check::<u8>();
        check::<i16>();
        check::<u16>();
        check::<i32>();
        check::<u32>();
        check::<i64>();
        check::<u64>();
        check::<f32>();
        check::<f64>();
        check::<Complex<f64>>();
    }
}
