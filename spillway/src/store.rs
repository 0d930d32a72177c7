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

use std::{
    fs,
    marker::PhantomData,
    path::{Path, PathBuf},
};

use spillway_common::{
    code::{StorageKey, StorageValue},
    error::{Error, Result},
};

use crate::serde::{Checksummer, EntryDeserializer, EntryHeader, EntrySerializer, FileFormat, HEADER_LEN};

/// Suffix of per-key spill files.
const ENTRY_SUFFIX: &str = ".psave";

/// Per-key spill file store under one directory.
///
/// The directory belongs exclusively to this store: [`FileStore::clear`]
/// deletes every file found in it, so nothing else may live there.
#[derive(Debug)]
pub struct FileStore<K, V> {
    dir: PathBuf,
    format: FileFormat,
    _marker: PhantomData<(K, V)>,
}

impl<K, V> FileStore<K, V>
where
    K: StorageKey,
    V: StorageValue,
{
    /// Open a store over `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>, format: FileFormat) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            format,
            _marker: PhantomData,
        })
    }

    /// Directory holding the spill files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the spill file for `key`: `<dir>/<key>.psave`.
    ///
    /// The key's `Display` rendering must be usable as a file name; an
    /// empty rendering or one containing a path separator is rejected.
    pub fn entry_path(&self, key: &K) -> Result<PathBuf> {
        let name = key.to_string();
        if name.is_empty() || name.contains(['/', std::path::MAIN_SEPARATOR]) {
            return Err(Error::InvalidFileName(name));
        }
        Ok(self.dir.join(format!("{name}{ENTRY_SUFFIX}")))
    }

    /// Serialize an entry into its spill file, overwriting any previous one.
    pub fn store(&self, key: &K, value: &V) -> Result<()> {
        let path = self.entry_path(key)?;

        let mut buffer = vec![0u8; HEADER_LEN];
        let info = EntrySerializer::serialize(key, value, self.format, &mut buffer)?;
        let checksum = Checksummer::checksum(&buffer[HEADER_LEN..]);
        let header = EntryHeader {
            format_tag: self.format.tag(),
            key_len: info.key_len,
            value_len: info.value_len,
            checksum,
        };
        header.write(&mut buffer[..HEADER_LEN]);

        fs::write(&path, &buffer)?;
        tracing::debug!(path = ?path, len = buffer.len(), "spill entry");
        Ok(())
    }

    /// Read back the value spilled for `key`, `Ok(None)` if no file exists.
    ///
    /// The file is fully verified before the value is returned: magic,
    /// format tag, payload checksum, and the embedded key, which must equal
    /// the requested one. Any mismatch is an error, never a corrupt value.
    pub fn load(&self, key: &K) -> Result<Option<V>> {
        let path = self.entry_path(key)?;
        let buffer = match fs::read(&path) {
            Ok(buffer) => buffer,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let header = EntryHeader::read(&buffer[..])?;
        if header.format_tag != self.format.tag() {
            return Err(Error::FormatMismatch {
                format: header.format_tag,
                expected: self.format.tag(),
            });
        }

        let payload = &buffer[HEADER_LEN..];
        if payload.len() != header.key_len + header.value_len {
            return Err(Error::other(anyhow::anyhow!(
                "spill file corrupt: payload holds {} bytes, header claims {}: {}",
                payload.len(),
                header.key_len + header.value_len,
                path.display()
            )));
        }
        let checksum = Checksummer::checksum(payload);
        if checksum != header.checksum {
            return Err(Error::ChecksumMismatch {
                checksum,
                expected: header.checksum,
            });
        }

        let (stored, value): (K, V) =
            EntryDeserializer::deserialize(payload, header.key_len, header.value_len, self.format)?;
        if &stored != key {
            return Err(Error::KeyMismatch {
                expected: key.to_string(),
                found: stored.to_string(),
            });
        }

        tracing::debug!(path = ?path, "reload entry");
        Ok(Some(value))
    }

    /// Whether a spill file exists for `key`.
    pub fn contains(&self, key: &K) -> Result<bool> {
        Ok(self.entry_path(key)?.exists())
    }

    /// Delete every file in the spill directory.
    pub fn clear(&self) -> Result<()> {
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                fs::remove_file(entry.path())?;
            }
        }
        tracing::debug!(dir = ?self.dir, "clear spill directory");
        Ok(())
    }
}
