//! Directory-backed key-value store
//!
//! Layout:
//! ```text
//! {root}/
//! ├── pc_capsules_index.json
//! ├── pc_capsule_{id}.json
//! └── pc_progress_{id}.json
//! ```
//!
//! Keys are escaped before becoming file names: ASCII alphanumerics, `_`
//! and `-` pass through, every other byte becomes `~XX` (uppercase hex).
//! Escaped names longer than [`MAX_ESCAPED_LEN`] are replaced by `~~` and a
//! UUID v5 of the key, which keeps every name under filesystem limits.
//! Values are written to a `.tmp` sibling and renamed into place.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::{check_quota, KeyValueStore, Result};

const EXTENSION: &str = "json";
const TEMP_EXTENSION: &str = "tmp";

/// Longest escaped key used verbatim as a file stem
const MAX_ESCAPED_LEN: usize = 200;

/// Namespace for hashed file names of long keys
const KEY_NAMESPACE: Uuid = Uuid::from_u128(0x5c1a_7e0d_3b4f_4c2a_9e61_d08f_2b7a_41c3);

pub struct FileStore {
    root: PathBuf,
    quota_bytes: Option<u64>,
    available: bool,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    ///
    /// A directory that cannot be created leaves the store unavailable
    /// instead of failing.
    pub fn open(root: PathBuf) -> Self {
        let available = match fs::create_dir_all(&root) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Storage directory {:?} unavailable: {}", root, e);
                false
            }
        };
        Self {
            root,
            quota_bytes: None,
            available,
        }
    }

    pub fn with_quota(mut self, quota_bytes: Option<u64>) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.{}", escape_key(key), EXTENSION))
    }

    fn used_bytes(&self) -> Result<u64> {
        let mut total = 0;
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().map_or(false, |ext| ext == EXTENSION) {
                total += fs::metadata(&path)?.len();
            }
        }
        Ok(total)
    }
}

impl KeyValueStore for FileStore {
    fn is_available(&self) -> bool {
        self.available
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.key_path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key);
        if self.quota_bytes.is_some() {
            let previous = match fs::metadata(&path) {
                Ok(meta) => meta.len(),
                Err(e) if e.kind() == ErrorKind::NotFound => 0,
                Err(e) => return Err(e.into()),
            };
            check_quota(key, self.used_bytes()?, previous, value.len() as u64, self.quota_bytes)?;
        }
        let temp_path = path.with_extension(TEMP_EXTENSION);
        fs::write(&temp_path, value)?;
        if let Err(e) = fs::rename(&temp_path, &path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn escape_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("~{:02X}", byte));
        }
    }
    if out.len() > MAX_ESCAPED_LEN {
        // Escaped names never contain "~~", so hashed names cannot collide with them
        return format!("~~{}", Uuid::new_v5(&KEY_NAMESPACE, key.as_bytes()));
    }
    out
}
