//! Compiled script tables (`.lpsd`).
//!
//! Layout: `LPSD` magic, one version byte, CRC-32 of the body (LE u32),
//! then the bincode-encoded [`ScriptTable`].

use std::fs;
use std::io;
use std::path::Path;

use super::ScriptTable;

pub const MAGIC: &[u8; 4] = b"LPSD";
pub const VERSION: u8 = 1;
const HEADER_LEN: usize = 9;

#[derive(Debug, thiserror::Error)]
pub enum ScriptIoError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("file shorter than the 9-byte header")]
    InvalidHeader,

    #[error("not a compiled script table (bad magic)")]
    InvalidMagic,

    #[error("unsupported table format version {0}")]
    UnsupportedVersion(u8),

    #[error("checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    Checksum { expected: u32, actual: u32 },

    #[error("encoding script table: {0}")]
    Serialize(bincode::Error),

    #[error("decoding script table: {0}")]
    Deserialize(bincode::Error),
}

impl ScriptTable {
    pub fn to_bytes(&self) -> Result<Vec<u8>, ScriptIoError> {
        let body = bincode::serialize(self).map_err(ScriptIoError::Serialize)?;
        let crc = crc32fast::hash(&body);

        let mut buf = Vec::with_capacity(HEADER_LEN + body.len());
        buf.extend_from_slice(MAGIC);
        buf.push(VERSION);
        buf.extend_from_slice(&crc.to_le_bytes());
        buf.extend_from_slice(&body);
        Ok(buf)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ScriptIoError> {
        if bytes.len() < HEADER_LEN {
            return Err(ScriptIoError::InvalidHeader);
        }
        if &bytes[0..4] != MAGIC {
            return Err(ScriptIoError::InvalidMagic);
        }
        if bytes[4] != VERSION {
            return Err(ScriptIoError::UnsupportedVersion(bytes[4]));
        }
        let expected = u32::from_le_bytes([bytes[5], bytes[6], bytes[7], bytes[8]]);
        let body = &bytes[HEADER_LEN..];
        let actual = crc32fast::hash(body);
        if expected != actual {
            return Err(ScriptIoError::Checksum { expected, actual });
        }
        bincode::deserialize(body).map_err(ScriptIoError::Deserialize)
    }

    /// Atomic write: write to .tmp then rename.
    pub fn save(&self, path: &Path) -> Result<(), ScriptIoError> {
        let bytes = self.to_bytes()?;
        let tmp = path.with_extension("tmp");
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn open(path: &Path) -> Result<Self, ScriptIoError> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{embedded, parse_script_toml};

    fn devanagari() -> ScriptTable {
        parse_script_toml(embedded("de").unwrap()).unwrap()
    }

    #[test]
    fn bytes_round_trip() {
        let table = devanagari();
        let bytes = table.to_bytes().unwrap();
        assert_eq!(&bytes[0..4], MAGIC);
        assert_eq!(bytes[4], VERSION);
        assert_eq!(ScriptTable::from_bytes(&bytes).unwrap(), table);
    }

    #[test]
    fn rejects_short_input() {
        assert!(matches!(
            ScriptTable::from_bytes(b"LPSD"),
            Err(ScriptIoError::InvalidHeader)
        ));
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = devanagari().to_bytes().unwrap();
        bytes[0] = b'X';
        assert!(matches!(
            ScriptTable::from_bytes(&bytes),
            Err(ScriptIoError::InvalidMagic)
        ));
    }

    #[test]
    fn rejects_future_version() {
        let mut bytes = devanagari().to_bytes().unwrap();
        bytes[4] = VERSION + 1;
        assert!(matches!(
            ScriptTable::from_bytes(&bytes),
            Err(ScriptIoError::UnsupportedVersion(v)) if v == VERSION + 1
        ));
    }

    #[test]
    fn rejects_corrupted_body() {
        let mut bytes = devanagari().to_bytes().unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        assert!(matches!(
            ScriptTable::from_bytes(&bytes),
            Err(ScriptIoError::Checksum { .. })
        ));
    }

    #[test]
    fn save_and_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("de.lpsd");
        let table = devanagari();
        table.save(&path).unwrap();
        assert!(!path.with_extension("tmp").exists());
        assert_eq!(ScriptTable::open(&path).unwrap(), table);
    }

    #[test]
    fn open_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ScriptTable::open(&dir.path().join("none.lpsd")).unwrap_err();
        assert!(matches!(err, ScriptIoError::Io(_)));
    }
}
