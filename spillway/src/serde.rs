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

use std::hash::Hasher;

use bytes::{Buf, BufMut};
use spillway_common::{
    code::{StorageKey, StorageValue},
    error::{Error, Result},
};
use twox_hash::XxHash64;

/// Magic number opening every spill file.
pub(crate) const MAGIC: u32 = 0x7053_6176;

/// Serialized length of [`EntryHeader`].
pub(crate) const HEADER_LEN: usize = 4 + 1 + 8 + 8 + 8;

/// Serialization format of spill file payloads.
///
/// A cache applies one format consistently for both write and read; a file
/// written with a different format fails with [`Error::FormatMismatch`]
/// instead of being decoded with the stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileFormat {
    /// Human-readable JSON records.
    #[default]
    Text,
    /// Compact bincode records.
    Binary,
}

impl FileFormat {
    pub(crate) fn tag(self) -> u8 {
        match self {
            Self::Text => 0,
            Self::Binary => 1,
        }
    }
}

#[derive(Debug)]
pub(crate) struct Checksummer;

impl Checksummer {
    pub(crate) fn checksum(buf: &[u8]) -> u64 {
        let mut hasher = XxHash64::with_seed(0);
        hasher.write(buf);
        hasher.finish()
    }
}

#[derive(Debug)]
pub(crate) struct KvInfo {
    pub key_len: usize,
    pub value_len: usize,
}

/// Fixed-size header preceding the payload of every spill file.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct EntryHeader {
    pub format_tag: u8,
    pub key_len: usize,
    pub value_len: usize,
    pub checksum: u64,
}

impl EntryHeader {
    pub(crate) fn write(&self, mut buf: impl BufMut) {
        buf.put_u32(MAGIC);
        buf.put_u8(self.format_tag);
        buf.put_u64(self.key_len as u64);
        buf.put_u64(self.value_len as u64);
        buf.put_u64(self.checksum);
    }

    pub(crate) fn read(mut buf: impl Buf) -> Result<Self> {
        if buf.remaining() < HEADER_LEN {
            return Err(Error::other(anyhow::anyhow!(
                "spill file truncated: {} bytes, header needs {}",
                buf.remaining(),
                HEADER_LEN
            )));
        }
        let magic = buf.get_u32();
        if magic != MAGIC {
            return Err(Error::MagicMismatch {
                magic,
                expected: MAGIC,
            });
        }
        let format_tag = buf.get_u8();
        let key_len = buf.get_u64() as usize;
        let value_len = buf.get_u64() as usize;
        let checksum = buf.get_u64();
        Ok(Self {
            format_tag,
            key_len,
            value_len,
            checksum,
        })
    }
}

#[derive(Debug)]
pub(crate) struct EntrySerializer;

impl EntrySerializer {
    /// Append the serialized key then value to `buffer` and report their
    /// lengths.
    pub(crate) fn serialize<K, V>(
        key: &K,
        value: &V,
        format: FileFormat,
        buffer: &mut Vec<u8>,
    ) -> Result<KvInfo>
    where
        K: StorageKey,
        V: StorageValue,
    {
        let mut cursor = buffer.len();

        match format {
            FileFormat::Text => serde_json::to_writer(&mut *buffer, key)?,
            FileFormat::Binary => bincode::serialize_into(&mut *buffer, key)?,
        }
        let key_len = buffer.len() - cursor;
        cursor = buffer.len();

        match format {
            FileFormat::Text => serde_json::to_writer(&mut *buffer, value)?,
            FileFormat::Binary => bincode::serialize_into(&mut *buffer, value)?,
        }
        let value_len = buffer.len() - cursor;

        Ok(KvInfo { key_len, value_len })
    }
}

#[derive(Debug)]
pub(crate) struct EntryDeserializer;

impl EntryDeserializer {
    pub(crate) fn deserialize<K, V>(
        buffer: &[u8],
        key_len: usize,
        value_len: usize,
        format: FileFormat,
    ) -> Result<(K, V)>
    where
        K: StorageKey,
        V: StorageValue,
    {
        if buffer.len() < key_len + value_len {
            return Err(Error::other(anyhow::anyhow!(
                "spill file truncated: payload holds {} bytes, lengths claim {}",
                buffer.len(),
                key_len + value_len
            )));
        }
        let key = Self::deserialize_key(&buffer[..key_len], format)?;
        let value = Self::deserialize_value(&buffer[key_len..key_len + value_len], format)?;
        Ok((key, value))
    }

    fn deserialize_key<K>(buf: &[u8], format: FileFormat) -> Result<K>
    where
        K: StorageKey,
    {
        match format {
            FileFormat::Text => serde_json::from_slice(buf).map_err(Error::from),
            FileFormat::Binary => bincode::deserialize(buf).map_err(Error::from),
        }
    }

    fn deserialize_value<V>(buf: &[u8], format: FileFormat) -> Result<V>
    where
        V: StorageValue,
    {
        match format {
            FileFormat::Text => serde_json::from_slice(buf).map_err(Error::from),
            FileFormat::Binary => bincode::deserialize(buf).map_err(Error::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_roundtrip() {
        for format in [FileFormat::Text, FileFormat::Binary] {
            let mut buffer = Vec::new();
            let info =
                EntrySerializer::serialize(&42u64, &"value".to_string(), format, &mut buffer).unwrap();
            assert_eq!(info.key_len + info.value_len, buffer.len());

            let (key, value): (u64, String) =
                EntryDeserializer::deserialize(&buffer, info.key_len, info.value_len, format).unwrap();
            assert_eq!(key, 42);
            assert_eq!(value, "value");
        }
    }

    #[test]
    fn test_header_roundtrip() {
        let header = EntryHeader {
            format_tag: FileFormat::Binary.tag(),
            key_len: 8,
            value_len: 1024,
            checksum: 0xdead_beef,
        };
        let mut buf = Vec::new();
        header.write(&mut buf);
        assert_eq!(buf.len(), HEADER_LEN);

        let decoded = EntryHeader::read(&buf[..]).unwrap();
        assert_eq!(decoded, header);
    }

    #[test]
    fn test_header_rejects_bad_magic() {
        let mut buf = vec![0u8; HEADER_LEN];
        let res = EntryHeader::read(&buf[..]);
        assert!(matches!(res, Err(Error::MagicMismatch { .. })));

        buf.truncate(3);
        let res = EntryHeader::read(&buf[..]);
        assert!(matches!(res, Err(Error::Other(_))));
    }

    #[test]
    fn test_checksum_is_stable() {
        let a = Checksummer::checksum(b"payload");
        let b = Checksummer::checksum(b"payload");
        assert_eq!(a, b);
        assert_ne!(a, Checksummer::checksum(b"payloae"));
    }

    #[test]
    fn test_text_format_is_ascii() {
        let mut buffer = Vec::new();
        let info = EntrySerializer::serialize(
            &"key".to_string(),
            &vec![1u32, 2, 3],
            FileFormat::Text,
            &mut buffer,
        )
        .unwrap();
        assert_eq!(&buffer[..info.key_len], b"\"key\"");
        assert_eq!(&buffer[info.key_len..], b"[1,2,3]");
    }
}
