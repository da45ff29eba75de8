// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Error type for document operations.
///
/// Carries a non-exhaustive [`ErrorKind`] plus the offending range and the
/// length of the document at the time of failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    /// The non-exhaustive category describing this error.
    kind: ErrorKind,

    /// The start offset of the caller-provided range.
    start: usize,

    /// The end offset (exclusive) of the caller-provided range.
    end: usize,

    /// The length of the document, or of the block for block-relative positions.
    len: usize,
}

#[expect(
    clippy::len_without_is_empty,
    reason = "`Error::len` reports document length context; an `is_empty` method would be misleading and unused."
)]
impl Error {
    /// The machine-readable category for this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The start offset of the range provided by the caller.
    pub fn start(&self) -> usize {
        self.start
    }

    /// The end offset of the range provided by the caller.
    pub fn end(&self) -> usize {
        self.end
    }

    /// The length of the document (or block) at the time of the error.
    pub fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn out_of_bounds(start: usize, end: usize, len: usize) -> Self {
        Self {
            kind: ErrorKind::OutOfBounds,
            start,
            end,
            len,
        }
    }

    pub(crate) fn invalid_range(start: usize, end: usize, len: usize) -> Self {
        Self {
            kind: ErrorKind::InvalidRange,
            start,
            end,
            len,
        }
    }

    pub(crate) fn no_such_block(block: usize, len: usize) -> Self {
        Self {
            kind: ErrorKind::NoSuchBlock,
            start: block,
            end: block,
            len,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.kind {
            ErrorKind::OutOfBounds => write!(
                f,
                "range {}..{} out of bounds for len {}",
                self.start, self.end, self.len
            ),
            ErrorKind::InvalidRange => {
                write!(f, "invalid range {}..{}: start > end", self.start, self.end)
            }
            ErrorKind::NoSuchBlock => {
                write!(f, "block {} out of bounds for {} blocks", self.start, self.len)
            }
        }
    }
}

impl core::error::Error for Error {}

/// The non-exhaustive category of an error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Provided offsets were out of bounds relative to the document length.
    OutOfBounds,

    /// The provided range had `start > end`.
    InvalidRange,

    /// A block index did not name an existing block.
    NoSuchBlock,
}
