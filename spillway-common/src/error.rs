// Copyright 2025 spillway Project Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

/// Error type returned by all spillway functions.
///
/// None of the variants is recoverable in place: a spill file that fails
/// verification is never partially decoded, and callers are expected to
/// propagate or abort.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Underlying file I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Binary codec failure.
    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),
    /// Textual codec failure.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// The spill file does not start with the spillway magic number.
    #[error("magic mismatch, magic: {magic}, expected: {expected}")]
    MagicMismatch {
        /// Magic number found in the file.
        magic: u32,
        /// Expected magic number.
        expected: u32,
    },
    /// The spill file was written with a different file format.
    #[error("file format mismatch, format: {format}, expected: {expected}")]
    FormatMismatch {
        /// Format tag found in the file.
        format: u8,
        /// Format tag the cache is configured with.
        expected: u8,
    },
    /// The spill file payload does not match its checksum.
    #[error("checksum mismatch, checksum: {checksum}, expected: {expected}")]
    ChecksumMismatch {
        /// Checksum calculated over the payload.
        checksum: u64,
        /// Checksum recorded in the file header.
        expected: u64,
    },
    /// The spill file embeds a different key than the one requested.
    ///
    /// Two distinct keys rendered to the same file name.
    #[error("key mismatch, expected: {expected}, found: {found}")]
    KeyMismatch {
        /// Textual form of the requested key.
        expected: String,
        /// Textual form of the key found in the file.
        found: String,
    },
    /// The key renders to a string unusable as a file name.
    #[error("invalid spill file name: {0:?}")]
    InvalidFileName(String),
    /// An unimplemented configuration was exercised.
    #[error("unsupported: {0}")]
    Unsupported(&'static str),
    /// Other error.
    #[error("other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Wrap an arbitrary error.
    pub fn other(e: impl Into<anyhow::Error>) -> Self {
        Self::Other(e.into())
    }
}

/// Result type for spillway.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn is_send_sync_static<T: Send + Sync + 'static>() {}

    #[test]
    fn test_send_sync_static() {
        is_send_sync_static::<Error>();
    }

    #[test]
    fn test_error_display() {
        let err = Error::ChecksumMismatch {
            checksum: 1,
            expected: 2,
        };
        assert_eq!(err.to_string(), "checksum mismatch, checksum: 1, expected: 2");

        let err = Error::from(std::io::Error::other("some I/O error"));
        assert_eq!(err.to_string(), "io error: some I/O error");
    }
}
