//! WEA - Wrapped Exchange Arrays
//!
//! Zero-copy exchange of typed, column-major numeric arrays between
//! processes. Each segment is a small fixed-layout header followed by the
//! raw payload at a 64-byte boundary, so any peer that speaks the header
//! layout can view the same bytes as an array.
//!
//! ## Architecture
//!
//! WEA keeps format definitions apart from I/O:
//!
//! - **wea-core**: element type registry, layout arithmetic and header codec (no I/O)
//! - **wea**: storage backends, exchange handles and ndarray views
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wea::{attach_shared_array, create_shared_array, ElementType};
//!
//! fn example() -> wea::Result<()> {
//!     // Producer
//!     let mut producer = create_shared_array("/features", ElementType::Float64, &[5, 2])?;
//!     producer.view_mut::<f64>()?.fill(1.5);
//!
//!     // Consumer, typically in another process
//!     let consumer = attach_shared_array("/features")?;
//!     assert_eq!(consumer.shape(), &[5, 2]);
//!     println!("sum = {}", consumer.view::<f64>()?.sum());
//!
//!     consumer.close();
//!     producer.unlink()
//! }
//! ```
//!
//! ## Features
//!
//! - **Shared memory** (`shm`): named POSIX segments with explicit close/unlink
//! - **Memory-mapped files** (`mmap`): map exported segments without copying
//! - **Buffered segments**: aligned in-process buffers for files and sockets
//! - **ndarray views**: Fortran-ordered views straight over the payload

// Re-export core abstractions and format definitions
pub use wea_core::{
    // Format definitions
    decode, encode, ElementType, ExchangeHeader, HeaderRef, UnknownElementType,
    // Layout arithmetic
    header_size, segment_size, SegmentLayout,
    // Traits
    ExchangeElement, SegmentStorage, SegmentStorageMut,
    // Codec errors
    WeaError,
};

pub mod buffered;
pub mod error;
pub mod handle;
#[cfg(feature = "mmap")]
pub mod mapped;
#[cfg(all(unix, feature = "shm"))]
pub mod shared;
mod view;

pub use buffered::{AlignedBuffer, BufferedExchange};
pub use error::{Error, Result};
pub use handle::ExchangeHandle;

#[cfg(feature = "mmap")]
pub use mapped::{create_exchange_file, open_exchange_file, MappedFile, MappedFileMut};

#[cfg(all(unix, feature = "shm"))]
pub use shared::{
    attach_shared_array, create_shared_array, shared_array_exists, unlink_shared_array,
    SharedExchange,
};
