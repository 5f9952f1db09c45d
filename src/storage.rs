use nanoid::nanoid;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// A blob persisted by the content store, referenced from an attachment
/// record by `storage_path`.
#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub stored_name: String,
    pub storage_path: String,
    pub byte_size: i64,
}

/// Filesystem-backed content store for attachment blobs. Stored names are
/// generated server-side, so paths never contain client input.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(FileStore { root })
    }

    fn full_path(&self, storage_path: &str) -> PathBuf {
        self.root.join(storage_path)
    }

    pub fn save(&self, original_name: &str, data: &[u8]) -> io::Result<StoredBlob> {
        let stored_name = match sanitized_extension(original_name) {
            Some(ext) => format!("{}.{}", nanoid!(21), ext),
            None => nanoid!(21),
        };

        let mut file = fs::File::create(self.full_path(&stored_name))?;
        file.write_all(data)?;

        Ok(StoredBlob {
            storage_path: stored_name.clone(),
            stored_name,
            byte_size: data.len() as i64,
        })
    }

    /// Deletes the blob behind `storage_path`. Fails when the reference
    /// does not exist, so callers can refuse to drop a record whose blob
    /// was never removed.
    pub fn delete(&self, storage_path: &str) -> io::Result<()> {
        fs::remove_file(self.full_path(storage_path))
    }

    pub fn exists(&self, storage_path: &str) -> bool {
        self.full_path(storage_path).exists()
    }
}

fn sanitized_extension(original_name: &str) -> Option<String> {
    let ext = Path::new(original_name).extension()?.to_str()?;
    if ext.is_empty() || ext.len() > 16 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_delete_round_trip() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        let blob = store.save("report.pdf", b"binary payload").unwrap();
        assert!(blob.stored_name.ends_with(".pdf"));
        assert_eq!(blob.byte_size, 14);
        assert!(store.exists(&blob.storage_path));

        store.delete(&blob.storage_path).unwrap();
        assert!(!store.exists(&blob.storage_path));
    }

    #[test]
    fn test_delete_of_missing_reference_fails() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        let res = store.delete("does-not-exist.bin");
        assert!(res.is_err());
    }

    #[test]
    fn test_stored_names_are_unique() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        let a = store.save("a.txt", b"one").unwrap();
        let b = store.save("a.txt", b"two").unwrap();
        assert_ne!(a.stored_name, b.stored_name);
        assert!(store.exists(&a.storage_path));
        assert!(store.exists(&b.storage_path));
    }

    #[test]
    fn test_extension_sanitizing() {
        assert_eq!(sanitized_extension("photo.JPG"), Some("jpg".to_string()));
        assert_eq!(sanitized_extension("archive.tar.gz"), Some("gz".to_string()));
        assert_eq!(sanitized_extension("no-extension"), None);
        assert_eq!(sanitized_extension("weird.ex!t"), None);
        assert_eq!(sanitized_extension("trailing."), None);
    }
}
