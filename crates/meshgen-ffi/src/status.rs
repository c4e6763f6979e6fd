//! Status codes and the per-thread last error message.

use std::cell::RefCell;
use std::ffi::{CString, c_char};

use meshgen_chunk::{ChunkError, ErrorKind};

/// Result of every fallible boundary call. `Ok` is zero.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MeshgenStatus {
    Ok = 0,
    /// Invalid dimensions or parameters.
    Configuration = 1,
    /// Buffer lengths or call order do not match the session.
    Contract = 2,
    /// The engine could not allocate working memory.
    Resource = 3,
    /// Unknown or already destroyed handle.
    InvalidHandle = 4,
    /// A required pointer argument was null or misaligned.
    NullPointer = 5,
    /// A panic was caught at the boundary.
    Panic = 6,
}

impl From<ErrorKind> for MeshgenStatus {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Configuration => MeshgenStatus::Configuration,
            ErrorKind::Contract => MeshgenStatus::Contract,
            ErrorKind::Resource => MeshgenStatus::Resource,
        }
    }
}

/// Everything a boundary call can fail with.
#[derive(Debug, thiserror::Error)]
pub(crate) enum FfiError {
    #[error(transparent)]
    Chunk(#[from] ChunkError),

    #[error("unknown chunk generator handle {0}")]
    InvalidHandle(u64),

    #[error("`{0}` must not be null")]
    NullPointer(&'static str),

    #[error("`{0}` is not aligned for its element type")]
    Misaligned(&'static str),

    #[error("unknown noise basis {0}, expected 0 to 3")]
    InvalidBasis(i32),

    #[error("chunk generator {0} was left poisoned by an earlier panic")]
    Poisoned(u64),
}

impl FfiError {
    pub(crate) fn status(&self) -> MeshgenStatus {
        match self {
            FfiError::Chunk(err) => err.kind().into(),
            FfiError::InvalidHandle(_) => MeshgenStatus::InvalidHandle,
            FfiError::NullPointer(_) | FfiError::Misaligned(_) => MeshgenStatus::NullPointer,
            FfiError::InvalidBasis(_) => MeshgenStatus::Configuration,
            FfiError::Poisoned(_) => MeshgenStatus::Panic,
        }
    }
}

thread_local! {
    static LAST_ERROR: RefCell<CString> = RefCell::new(CString::default());
}

pub(crate) fn set_last_error(message: &str) {
    let message = CString::new(message.replace('\0', " ")).unwrap_or_default();
    LAST_ERROR.with(|slot| *slot.borrow_mut() = message);
}

pub(crate) fn clear_last_error() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = CString::default());
}

/// Pointer to the calling thread's last error message, or an empty string.
///
/// Valid until the next boundary call on the same thread.
pub(crate) fn last_error_ptr() -> *const c_char {
    LAST_ERROR.with(|slot| slot.borrow().as_ptr())
}

/// Copy of the calling thread's last error message.
pub fn last_error_message() -> String {
    LAST_ERROR.with(|slot| slot.borrow().to_string_lossy().into_owned())
}
