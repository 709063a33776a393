//! Named shared memory backend (POSIX `shm_open`)

mod exchange;
pub mod segment;

pub use exchange::{
    attach_shared_array, create_shared_array, shared_array_exists, unlink_shared_array,
    SharedExchange,
};
pub use segment::{normalize_name, ShmSegment};
