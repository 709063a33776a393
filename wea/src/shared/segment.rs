//! POSIX shared memory segment management
//!
//! Safe wrappers around `shm_open`, `ftruncate`, `fstat` and `mmap`.
//!
//! # Segment Lifecycle
//!
//! 1. The producer creates a segment with `ShmSegment::create()`
//! 2. Consumers map it with `ShmSegment::open()`
//! 3. Every mapping is unmapped on drop
//! 4. The named object lives until `ShmSegment::unlink()` is called
//!
//! # Naming
//!
//! Names are normalised to start with `/` and may not contain any other
//! `/`. Example: `/wea_features_0`

use crate::error::{Error, Result};
use std::ffi::CString;
use std::io;
use std::ptr;
use tracing::{debug, warn};
use wea_core::format::constants::BASE_HEADER_SIZE;
use wea_core::{SegmentStorage, SegmentStorageMut};

const MAX_NAME_LEN: usize = 255;

/// Turn a user supplied name into a POSIX shared memory object name
pub fn normalize_name(name: &str) -> Result<String> {
    let name = if name.starts_with('/') {
        name.to_string()
    } else {
        format!("/{name}")
    };

    if name.len() == 1 {
        return Err(Error::InvalidName(name));
    }
    if name[1..].contains('/') || name.contains('\0') {
        return Err(Error::InvalidName(name));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(Error::InvalidName(name));
    }
    Ok(name)
}

fn c_name(name: &str) -> Result<CString> {
    CString::new(name).map_err(|_| Error::InvalidName(name.to_string()))
}

/// A mapped POSIX shared memory object
///
/// Unmaps the region on drop. Never unlinks the object; that is always
/// an explicit call.
pub struct ShmSegment {
    ptr: *mut u8,
    size: usize,
    name: String,
}

// SAFETY: the mapping is plain bytes owned by this value until drop. Any
// cross-process synchronisation of the payload is the caller's concern.
unsafe impl Send for ShmSegment {}
unsafe impl Sync for ShmSegment {}

impl ShmSegment {
    /// Create a new named segment of `size` zeroed bytes.
    ///
    /// Fails with `NameInUse` if an object with this name already exists.
    /// If anything fails after the object was created, it is unlinked
    /// again before returning.
    pub fn create(name: &str, size: usize) -> Result<Self> {
        let name = normalize_name(name)?;
        let c_name = c_name(&name)?;

        // SAFETY:
        // - c_name is a valid NUL terminated string
        // - O_CREAT | O_EXCL fails instead of reusing an existing object
        // - shm_open returns a valid fd or -1 (checked below)
        let fd = unsafe {
            libc::shm_open(
                c_name.as_ptr(),
                libc::O_CREAT | libc::O_RDWR | libc::O_EXCL,
                0o600,
            )
        };
        if fd < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::AlreadyExists {
                return Err(Error::NameInUse(name));
            }
            return Err(Error::io("Failed to create shared segment", err));
        }

        match Self::size_and_map(fd, size, &name) {
            Ok(segment) => {
                debug!(name = %segment.name, size, "Created shared segment");
                Ok(segment)
            }
            Err(err) => {
                // SAFETY: c_name is valid; only the name we just created is removed
                if unsafe { libc::shm_unlink(c_name.as_ptr()) } < 0 {
                    warn!(
                        name = %name,
                        error = %io::Error::last_os_error(),
                        "Failed to unlink partially created segment"
                    );
                }
                Err(err)
            }
        }
    }

    fn size_and_map(fd: libc::c_int, size: usize, name: &str) -> Result<Self> {
        let result = match libc::off_t::try_from(size) {
            Err(_) => Err(Error::Format(wea_core::WeaError::SizeOverflow)),
            // SAFETY: fd is a valid descriptor from shm_open; a new object is
            // extended with zero bytes
            Ok(len) if unsafe { libc::ftruncate(fd, len) } < 0 => Err(Error::io(
                "Failed to size shared segment",
                io::Error::last_os_error(),
            )),
            Ok(_) => Self::map(fd, size, name),
        };

        // SAFETY: fd is valid and not used after this point; the mapping keeps
        // its own reference to the object
        unsafe { libc::close(fd) };
        result
    }

    /// Map an existing named segment.
    ///
    /// The mapping covers the object's current size as reported by the OS.
    pub fn open(name: &str) -> Result<Self> {
        let name = normalize_name(name)?;
        let c_name = c_name(&name)?;

        // SAFETY: c_name is valid; without O_CREAT the mode is ignored
        let fd = unsafe { libc::shm_open(c_name.as_ptr(), libc::O_RDWR, 0) };
        if fd < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::NotFound {
                return Err(Error::NotFound(name));
            }
            return Err(Error::io("Failed to open shared segment", err));
        }

        let result = Self::object_size(fd).and_then(|size| {
            if size < BASE_HEADER_SIZE {
                return Err(Error::MemoryTooSmall {
                    required: BASE_HEADER_SIZE,
                    actual: size,
                });
            }
            Self::map(fd, size, &name)
        });

        // SAFETY: fd is valid and not used after this point
        unsafe { libc::close(fd) };

        let segment = result?;
        debug!(name = %segment.name, size = segment.size, "Mapped shared segment");
        Ok(segment)
    }

    fn object_size(fd: libc::c_int) -> Result<usize> {
        // SAFETY: an all-zero stat is a valid value to be overwritten by fstat
        let mut stat: libc::stat = unsafe { std::mem::zeroed() };
        // SAFETY: fd is valid and stat points to writable memory of the right type
        if unsafe { libc::fstat(fd, &mut stat) } < 0 {
            return Err(Error::io(
                "Failed to query shared segment size",
                io::Error::last_os_error(),
            ));
        }
        usize::try_from(stat.st_size).map_err(|_| Error::Format(wea_core::WeaError::SizeOverflow))
    }

    fn map(fd: libc::c_int, size: usize, name: &str) -> Result<Self> {
        // SAFETY:
        // - a null address lets the kernel choose the placement
        // - size is non-zero and no larger than the object
        // - fd is valid and opened read/write, matching PROT_READ | PROT_WRITE
        // - MAP_FAILED is checked below
        let ptr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                size,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                fd,
                0,
            )
        };
        if ptr == libc::MAP_FAILED {
            return Err(Error::io(
                "Failed to map shared segment",
                io::Error::last_os_error(),
            ));
        }

        Ok(Self {
            ptr: ptr as *mut u8,
            size,
            name: name.to_string(),
        })
    }

    /// Remove a named segment.
    ///
    /// Existing mappings stay valid; new `open` calls fail with `NotFound`.
    pub fn unlink(name: &str) -> Result<()> {
        let name = normalize_name(name)?;
        let c_name = c_name(&name)?;

        // SAFETY: c_name is valid; shm_unlink only touches the object namespace
        if unsafe { libc::shm_unlink(c_name.as_ptr()) } < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::NotFound {
                return Err(Error::NotFound(name));
            }
            return Err(Error::io("Failed to unlink shared segment", err));
        }
        debug!(name = %name, "Unlinked shared segment");
        Ok(())
    }

    /// Check whether a named segment exists
    pub fn exists(name: &str) -> bool {
        let Ok(name) = normalize_name(name) else {
            return false;
        };
        let Ok(c_name) = CString::new(name) else {
            return false;
        };

        // SAFETY: c_name is valid; O_RDONLY without O_CREAT never creates
        let fd = unsafe { libc::shm_open(c_name.as_ptr(), libc::O_RDONLY, 0) };
        if fd >= 0 {
            // SAFETY: fd is valid and not used afterwards
            unsafe { libc::close(fd) };
            true
        } else {
            false
        }
    }

    /// Normalised object name
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size of the mapping in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether the mapping is empty; never true for a live segment
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

impl SegmentStorage for ShmSegment {
    fn as_slice(&self) -> &[u8] {
        // SAFETY: ptr maps exactly `size` bytes for as long as self is alive
        unsafe { std::slice::from_raw_parts(self.ptr, self.size) }
    }
}

impl SegmentStorageMut for ShmSegment {
    fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: as above, and &mut self guarantees no other borrow in this process
        unsafe { std::slice::from_raw_parts_mut(self.ptr, self.size) }
    }
}

impl std::fmt::Debug for ShmSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShmSegment")
            .field("name", &self.name)
            .field("size", &self.size)
            .finish()
    }
}

impl Drop for ShmSegment {
    fn drop(&mut self) {
        // SAFETY: ptr and size come from a successful mmap and are unmapped once
        let ret = unsafe { libc::munmap(self.ptr as *mut libc::c_void, self.size) };
        if ret < 0 {
            warn!(
                name = %self.name,
                error = %io::Error::last_os_error(),
                "Failed to unmap shared segment"
            );
        }
    }
}
