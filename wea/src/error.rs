//! Error type for segment backends

use wea_core::{ElementType, WeaError};

/// Errors raised by exchange handles and their storage backends
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The header codec rejected the segment
    #[error(transparent)]
    Format(#[from] WeaError),

    /// A shared segment with this name already exists
    #[error("Shared segment {0} already exists")]
    NameInUse(String),

    /// No shared segment with this name exists
    #[error("Shared segment {0} not found")]
    NotFound(String),

    /// The name is not a valid shared segment name
    #[error("Invalid shared segment name: {0}")]
    InvalidName(String),

    /// The region is smaller than its header declares
    #[error("Segment region too small: {required} bytes required, {actual} available")]
    MemoryTooSmall { required: usize, actual: usize },

    /// The allocator could not provide a buffer of this size
    #[error("Failed to allocate {size} bytes for segment")]
    AllocationFailed { size: usize },

    /// A typed access asked for a different element type than the segment stores
    #[error("Element type mismatch: segment stores {stored}, requested {requested}")]
    ElementMismatch {
        stored: ElementType,
        requested: ElementType,
    },

    /// The payload is not aligned for the requested element type
    #[error("Payload is not aligned for the requested element type")]
    Misaligned,

    /// Source and destination arrays have different shapes
    #[error("Array shape does not match the segment shape")]
    ShapeMismatch,

    /// A header could not be rendered as JSON
    #[cfg(feature = "serde")]
    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// An operating system call failed
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Error::Io { context, source }
    }
}

/// Result type for segment backends
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_errors_pass_through() {
        let err: Error = WeaError::BadMagic { found: 0 }.into();
        assert!(matches!(err, Error::Format(WeaError::BadMagic { found: 0 })));
        assert_eq!(
            err.to_string(),
            WeaError::BadMagic { found: 0 }.to_string()
        );
    }

    #[test]
    fn test_messages() {
        let err = Error::ElementMismatch {
            stored: ElementType::Float64,
            requested: ElementType::Int32,
        };
        assert_eq!(
            err.to_string(),
            "Element type mismatch: segment stores float64, requested int32"
        );
        assert_eq!(
            Error::NotFound("/x".into()).to_string(),
            "Shared segment /x not found"
        );
    }

    #[test]
    fn test_allocation_message() {
        assert_eq!(
            Error::AllocationFailed { size: 1 << 40 }.to_string(),
            "Failed to allocate 1099511627776 bytes for segment"
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_errors_convert() {
        // JSON object keys must be strings
        fn render(key: Vec<u8>) -> Result<String> {
            let map = std::collections::BTreeMap::from([(key, 1.0)]);
            Ok(serde_json::to_string(&map)?)
        }
        let err = render(vec![1, 2]).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
        assert!(err.to_string().starts_with("Failed to render JSON: "));
    }
}
