//! Crash-safe file output.
//!
//! Bytes go to a hidden sibling file first and are renamed over the
//! destination only once fully written. The sibling is removed on every
//! other exit path, including early returns and panics.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Distinguishes temp files created by one process.
static NEXT_TEMP_ID: AtomicU64 = AtomicU64::new(0);

/// A temporary file that deletes itself on drop unless persisted.
pub struct ScopedTempFile {
    path: PathBuf,
    target: PathBuf,
    file: Option<File>,
}

impl ScopedTempFile {
    /// Create `.<name>.<pid>-<seq>.tmp` next to `target`.
    ///
    /// `seq` is unique per call, so writers in one process never share a
    /// temp file even when they aim at the same target.
    pub fn create_for(target: &Path) -> io::Result<Self> {
        let name = target
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "output path has no file name"))?;
        let seq = NEXT_TEMP_ID.fetch_add(1, Ordering::Relaxed);
        let tmp_name = format!(
            ".{}.{}-{}.tmp",
            name.to_string_lossy(),
            std::process::id(),
            seq
        );
        let path = target.with_file_name(tmp_name);
        let file = File::create(&path)?;
        Ok(ScopedTempFile {
            path,
            target: target.to_path_buf(),
            file: Some(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush, then atomically move the file onto its target.
    pub fn persist(mut self) -> io::Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
            file.sync_all()?;
        }
        fs::rename(&self.path, &self.target)?;
        // Renamed: nothing left for Drop to clean.
        self.path = PathBuf::new();
        Ok(())
    }
}

impl Write for ScopedTempFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.file.as_mut() {
            Some(file) => file.write(buf),
            None => Err(io::Error::new(io::ErrorKind::Other, "temporary file already closed")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for ScopedTempFile {
    fn drop(&mut self) {
        self.file.take();
        if !self.path.as_os_str().is_empty() {
            let _ = fs::remove_file(&self.path);
        }
    }
}

/// Write `bytes` to `target` through a [`ScopedTempFile`].
pub fn write_atomically(target: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut tmp = ScopedTempFile::create_for(target)?;
    tmp.write_all(bytes)?;
    tmp.persist()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cutpath-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn persisted_file_replaces_target() {
        let dir = scratch_dir("persist");
        let target = dir.join("out.svg");
        fs::write(&target, b"old").unwrap();
        write_atomically(&target, b"new contents").unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"new contents");
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 1, "no temporary file left behind");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn dropped_file_is_cleaned_up() {
        let dir = scratch_dir("drop");
        let target = dir.join("out.svg");
        let tmp_path = {
            let mut tmp = ScopedTempFile::create_for(&target).unwrap();
            tmp.write_all(b"partial").unwrap();
            tmp.path().to_path_buf()
        };
        assert!(!tmp_path.exists());
        assert!(!target.exists());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_directory_is_an_error() {
        let target = Path::new("/nonexistent/cutpath/dir/out.svg");
        assert!(write_atomically(target, b"x").is_err());
    }

    #[test]
    fn temp_files_for_one_target_are_distinct() {
        let dir = scratch_dir("distinct");
        let target = dir.join("out.svg");
        let a = ScopedTempFile::create_for(&target).unwrap();
        let b = ScopedTempFile::create_for(&target).unwrap();
        assert_ne!(a.path(), b.path());
        drop((a, b));
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn concurrent_writers_to_one_target_all_succeed() {
        let dir = scratch_dir("concurrent");
        let target = dir.join("out.svg");
        let payloads: Vec<Vec<u8>> = (0..8).map(|i| vec![b'a' + i; 64 * 1024]).collect();
        std::thread::scope(|scope| {
            for payload in &payloads {
                let target = &target;
                scope.spawn(move || write_atomically(target, payload).unwrap());
            }
        });
        let written = fs::read(&target).unwrap();
        assert!(payloads.contains(&written), "target holds one complete payload");
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 1, "no temporary file left behind");
        fs::remove_dir_all(&dir).unwrap();
    }
}
