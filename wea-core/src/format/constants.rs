//! Format constants for the wrapped exchange array layout

/// Magic number stored at offset 0 of every segment ("WA-1")
pub const MAGIC: u32 = 0x5741_2D31;

/// Payload alignment boundary in bytes
pub const ALIGNMENT: usize = 64;

/// Size of the fixed header fields: magic, type code, dimension count, payload offset
pub const BASE_HEADER_SIZE: usize = 16;

/// Size of one dimension entry
pub const DIM_SIZE: usize = 8;

/// Largest dimension count the 16-bit count field can carry
pub const MAX_DIMENSIONS: usize = u16::MAX as usize;

/// Byte offsets of the fixed header fields
pub mod offsets {
    pub const MAGIC: usize = 0;
    pub const TYPE_CODE: usize = 4;
    pub const NDIMS: usize = 6;
    pub const PAYLOAD_OFFSET: usize = 8;
    pub const DIMS: usize = 16;
}
