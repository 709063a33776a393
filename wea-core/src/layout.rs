//! Segment size and offset arithmetic
//!
//! Pure functions deriving a segment's header size, payload offset and
//! total size from a shape and element type. No I/O.

use crate::format::constants::{ALIGNMENT, BASE_HEADER_SIZE, DIM_SIZE, MAX_DIMENSIONS};
use crate::{ElementType, Result, WeaError};

/// Round `offset` up to a multiple of `boundary` (a power of two)
pub const fn align_to_boundary(offset: usize, boundary: usize) -> usize {
    (offset + boundary - 1) & !(boundary - 1)
}

/// Size of the header region for `ndims` dimensions, i.e. the payload offset.
///
/// The header fields plus `ALIGNMENT - 1` bytes of slack are rounded up to
/// the next alignment boundary. Reference producers use this rule, so a
/// 2-d header occupies 128 bytes even though its fields only need 32.
pub const fn header_size(ndims: usize) -> Result<usize> {
    if ndims > MAX_DIMENSIONS {
        return Err(WeaError::InvalidShape);
    }
    let fields = BASE_HEADER_SIZE + ndims * DIM_SIZE;
    Ok(align_to_boundary(fields + ALIGNMENT - 1, ALIGNMENT))
}

/// Number of bytes the header fields occupy (without padding)
pub const fn header_fields_size(ndims: usize) -> usize {
    BASE_HEADER_SIZE + ndims * DIM_SIZE
}

/// Number of elements described by `shape`; the empty shape is a scalar
pub fn element_count(shape: &[usize]) -> Result<usize> {
    shape
        .iter()
        .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
        .ok_or(WeaError::SizeOverflow)
}

/// Size breakdown of one segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentLayout {
    /// Total segment size in bytes (header region + payload)
    pub total_size: usize,
    /// Offset of the first payload byte
    pub payload_offset: usize,
    /// Number of dimensions
    pub ndims: usize,
    /// Number of elements in the payload
    pub element_count: usize,
    /// Payload size in bytes
    pub payload_size: usize,
}

impl SegmentLayout {
    /// Compute the layout of a segment holding `shape` elements of `element_type`
    pub fn compute(shape: &[usize], element_type: ElementType) -> Result<Self> {
        let ndims = shape.len();
        let payload_offset = header_size(ndims)?;

        // Dimensions are stored as signed 64-bit values
        if shape.iter().any(|&dim| dim as u64 > i64::MAX as u64) {
            return Err(WeaError::InvalidShape);
        }

        let element_count = element_count(shape)?;
        let payload_size = element_count
            .checked_mul(element_type.byte_width())
            .ok_or(WeaError::SizeOverflow)?;
        let total_size = payload_offset
            .checked_add(payload_size)
            .ok_or(WeaError::SizeOverflow)?;

        Ok(Self {
            total_size,
            payload_offset,
            ndims,
            element_count,
            payload_size,
        })
    }
}

/// `(total, payload_offset, ndims)` for a segment holding `shape` elements of `element_type`
pub fn segment_size(shape: &[usize], element_type: ElementType) -> Result<(usize, usize, usize)> {
    let layout = SegmentLayout::compute(shape, element_type)?;
    Ok((layout.total_size, layout.payload_offset, layout.ndims))
}

#[cfg(test)]
mod tests {
    extern crate alloc;
    use super::*;

    #[test]
    fn test_align_to_boundary() {
        assert_eq!(align_to_boundary(0, 64), 0);
        assert_eq!(align_to_boundary(1, 64), 64);
        assert_eq!(align_to_boundary(64, 64), 64);
        assert_eq!(align_to_boundary(65, 64), 128);
    }

    #[test]
    fn test_reference_shape() {
        assert_eq!(header_size(2), Ok(128));
        assert_eq!(
            segment_size(&[5, 2], ElementType::Float64),
            Ok((208, 128, 2))
        );
        let layout = SegmentLayout::compute(&[5, 2], ElementType::Float64).unwrap();
        assert_eq!(layout.element_count, 10);
        assert_eq!(layout.payload_size, 80);
    }

    #[test]
    fn test_header_size_steps() {
        assert_eq!(header_size(0), Ok(128));
        assert_eq!(header_size(5), Ok(128));
        assert_eq!(header_size(6), Ok(128));
        assert_eq!(header_size(7), Ok(192));
    }

    #[test]
    fn test_header_size_is_monotonic_and_aligned() {
        let mut previous = 0;
        for ndims in 0..=2048 {
            let size = header_size(ndims).unwrap();
            assert_eq!(size % ALIGNMENT, 0);
            assert!(size >= header_fields_size(ndims));
            assert!(size >= BASE_HEADER_SIZE);
            assert!(size >= previous);
            previous = size;
        }
        assert!(header_size(MAX_DIMENSIONS).is_ok());
    }

    #[test]
    fn test_too_many_dimensions() {
        assert_eq!(header_size(MAX_DIMENSIONS + 1), Err(WeaError::InvalidShape));
        let shape = alloc::vec![1usize; MAX_DIMENSIONS + 1];
        assert_eq!(
            SegmentLayout::compute(&shape, ElementType::UInt8),
            Err(WeaError::InvalidShape)
        );
    }

    #[test]
    fn test_element_count() {
        assert_eq!(element_count(&[]), Ok(1));
        assert_eq!(element_count(&[5, 2]), Ok(10));
        assert_eq!(element_count(&[5, 2, 3]), Ok(30));
        assert_eq!(element_count(&[7, 0, 3]), Ok(0));
        assert_eq!(
            element_count(&[usize::MAX, 2]),
            Err(WeaError::SizeOverflow)
        );
    }

    #[test]
    fn test_overflow_is_reported() {
        // Element count fits, byte size does not
        assert_eq!(
            SegmentLayout::compute(&[usize::MAX / 8, 1], ElementType::ComplexF64),
            Err(WeaError::SizeOverflow)
        );
        assert_eq!(
            SegmentLayout::compute(&[usize::MAX / 4, 1], ElementType::Float64),
            Err(WeaError::SizeOverflow)
        );
        assert!(SegmentLayout::compute(&[usize::MAX / 8, 1], ElementType::UInt8).is_ok());
    }

    #[test]
    fn test_dimension_must_fit_signed_field() {
        assert_eq!(
            SegmentLayout::compute(&[usize::MAX, 0], ElementType::UInt8),
            Err(WeaError::InvalidShape)
        );
    }

    #[test]
    fn test_total_matches_formula() {
        for ty in ElementType::ALL {
            for shape in [&[][..], &[3][..], &[4, 5][..], &[2, 3, 4, 5][..]] {
                let (total, off, ndims) = segment_size(shape, ty).unwrap();
                assert_eq!(ndims, shape.len());
                assert_eq!(off, header_size(shape.len()).unwrap());
                assert_eq!(
                    total,
                    off + element_count(shape).unwrap() * ty.byte_width()
                );
            }
        }
    }
}
