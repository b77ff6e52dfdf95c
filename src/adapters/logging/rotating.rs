//! Size-rotated log file
//!
//! Writes go to `path`; once the next write would take the file to
//! `max_bytes`, the current file is shifted to `path.1`, older backups move
//! up one slot and anything beyond `path.<backup_count>` is dropped.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    backup_count: u32,
    file: File,
    written: u64,
}

impl RotatingFile {
    /// Open `path` for appending. A zero `max_bytes` or `backup_count`
    /// disables rotation.
    pub fn open(path: impl Into<PathBuf>, max_bytes: u64, backup_count: u32) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = append(&path)?;
        let written = file.metadata()?.len();

        Ok(Self {
            path,
            max_bytes,
            backup_count,
            file,
            written,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes in the current (unrotated) file
    pub fn len(&self) -> u64 {
        self.written
    }

    pub fn is_empty(&self) -> bool {
        self.written == 0
    }

    fn rotation_enabled(&self) -> bool {
        self.max_bytes > 0 && self.backup_count > 0
    }

    fn should_rollover(&self, incoming: usize) -> bool {
        self.rotation_enabled()
            && self.written > 0
            && self.written + incoming as u64 >= self.max_bytes
    }

    fn backup_path(&self, index: u32) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".{}", index));
        PathBuf::from(name)
    }

    fn rollover(&mut self) -> io::Result<()> {
        self.file.flush()?;

        for index in (1..self.backup_count).rev() {
            let src = self.backup_path(index);
            if src.exists() {
                let dst = self.backup_path(index + 1);
                remove_if_exists(&dst)?;
                fs::rename(&src, &dst)?;
            }
        }

        let first = self.backup_path(1);
        remove_if_exists(&first)?;
        fs::rename(&self.path, &first)?;

        self.file = append(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.should_rollover(buf.len()) {
            self.rollover()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_rotates_and_keeps_backup_count() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut file = RotatingFile::open(&path, 10, 2).unwrap();

        file.write_all(b"aaaaaaaa\n").unwrap();
        file.write_all(b"bbbbbbbb\n").unwrap();
        file.write_all(b"cccccccc\n").unwrap();
        file.write_all(b"dddddddd\n").unwrap();

        assert_eq!(read(&path), "dddddddd\n");
        assert_eq!(read(&dir.path().join("app.log.1")), "cccccccc\n");
        assert_eq!(read(&dir.path().join("app.log.2")), "bbbbbbbb\n");
        assert!(!dir.path().join("app.log.3").exists());
    }

    #[test]
    fn test_zero_limits_disable_rotation() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");

        let mut no_size = RotatingFile::open(&path, 0, 3).unwrap();
        no_size.write_all(b"0123456789\n").unwrap();
        no_size.write_all(b"0123456789\n").unwrap();
        drop(no_size);

        let mut no_backups = RotatingFile::open(&path, 5, 0).unwrap();
        no_backups.write_all(b"0123456789\n").unwrap();

        assert_eq!(read(&path).lines().count(), 3);
        assert!(!dir.path().join("app.log.1").exists());
    }

    #[test]
    fn test_reopen_counts_existing_bytes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("app.log");
        {
            let mut file = RotatingFile::open(&path, 100, 1).unwrap();
            file.write_all(b"hello\n").unwrap();
        }

        let file = RotatingFile::open(&path, 100, 1).unwrap();
        assert_eq!(file.len(), 6);
        assert!(!file.is_empty());
    }
}
