//! Exchange arrays in named shared memory
//!
//! Handle states:
//!
//! ```text
//! create / attach ──► live ──close──► detached   (object persists)
//!                      │ ▲
//!                      │ └─reopen
//!                      └──unlink──► released   (object destroyed)
//! ```
//!
//! `close` and `unlink` consume the handle, so a terminal handle cannot be
//! used again. Dropping a handle is the same as `close`.

use super::segment::ShmSegment;
use crate::error::Result;
use crate::handle::ExchangeHandle;
use std::ops::{Deref, DerefMut};
use tracing::{debug, warn};
use wea_core::{ElementType, SegmentLayout, WeaError};

/// Exchange handle over a named shared memory segment
#[derive(Debug)]
pub struct SharedExchange {
    inner: ExchangeHandle<ShmSegment>,
}

/// Create a named segment for `shape` elements of `element_type`.
///
/// The payload starts zeroed. Fails with `NameInUse` if the name is taken;
/// a failed call leaves no object behind.
pub fn create_shared_array(
    name: &str,
    element_type: ElementType,
    shape: &[usize],
) -> Result<SharedExchange> {
    // Reject bad shapes and types before an OS object exists
    let layout = SegmentLayout::compute(shape, element_type)?;
    if !element_type.is_supported() {
        return Err(WeaError::UnsupportedType {
            code: element_type.code(),
        }
        .into());
    }

    let segment = ShmSegment::create(name, layout.total_size)?;
    let name = segment.name().to_string();
    match ExchangeHandle::create_in(segment, element_type, shape) {
        Ok(inner) => {
            debug!(name = %name, %element_type, ?shape, "Created shared exchange array");
            Ok(SharedExchange { inner })
        }
        Err(err) => {
            if let Err(unlink_err) = ShmSegment::unlink(&name) {
                warn!(name = %name, error = %unlink_err, "Failed to remove segment after create error");
            }
            Err(err)
        }
    }
}

/// Attach to an existing named segment and validate its header
pub fn attach_shared_array(name: &str) -> Result<SharedExchange> {
    let inner = ExchangeHandle::from_storage(ShmSegment::open(name)?)?;
    debug!(
        name = %inner.storage().name(),
        element_type = %inner.element_type(),
        shape = ?inner.shape(),
        "Attached shared exchange array"
    );
    Ok(SharedExchange { inner })
}

/// Remove a named segment without holding a handle to it
pub fn unlink_shared_array(name: &str) -> Result<()> {
    ShmSegment::unlink(name)
}

/// Whether a named segment currently exists
pub fn shared_array_exists(name: &str) -> bool {
    ShmSegment::exists(name)
}

impl SharedExchange {
    /// Normalised segment name
    pub fn name(&self) -> &str {
        self.inner.storage().name()
    }

    /// Map the segment again under the same name and re-validate its header.
    ///
    /// On failure the current mapping is kept.
    pub fn reopen(&mut self) -> Result<()> {
        let fresh = attach_shared_array(self.name())?;
        self.inner = fresh.inner;
        debug!(name = %self.name(), "Reopened shared exchange array");
        Ok(())
    }

    /// Detach from the segment; other handles keep working
    pub fn close(self) {
        debug!(name = %self.name(), "Closing shared exchange array");
    }

    /// Destroy the named segment for every process.
    ///
    /// Other processes' existing mappings stay readable until they detach,
    /// but no new attach succeeds.
    pub fn unlink(self) -> Result<()> {
        let name = self.name().to_string();
        drop(self);
        ShmSegment::unlink(&name)
    }

    /// Release the handle wrapper and keep the mapped handle
    pub fn into_inner(self) -> ExchangeHandle<ShmSegment> {
        self.inner
    }
}

impl Deref for SharedExchange {
    type Target = ExchangeHandle<ShmSegment>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for SharedExchange {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}
