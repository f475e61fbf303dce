use super::ReadAt;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tokio::task;

/// Local file reader with random access support.
///
/// Reads are positional, so one reader never moves a shared cursor and
/// independent readers over the same path do not interfere. Async reads
/// run on tokio's blocking pool.
pub struct LocalFileReader {
    file: Arc<File>,
    size: u64,
}

impl LocalFileReader {
    pub fn new(path: &Path) -> Result<Self> {
        let open = || -> io::Result<(File, u64)> {
            let file = File::open(path)?;
            let metadata = file.metadata()?;
            if metadata.is_dir() {
                return Err(io::Error::other("is a directory"));
            }
            Ok((file, metadata.len()))
        };

        let (file, size) = open().map_err(|source| Error::ArchiveOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            file: Arc::new(file),
            size,
        })
    }
}

fn pread(file: &File, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::FileExt;
        file.read_at(buf, offset)
    }

    #[cfg(windows)]
    {
        use std::os::windows::fs::FileExt;
        file.seek_read(buf, offset)
    }

    #[cfg(not(any(unix, windows)))]
    {
        use std::io::{Read, Seek, SeekFrom};
        let mut file = file;
        file.seek(SeekFrom::Start(offset))?;
        file.read(buf)
    }
}

#[async_trait]
impl ReadAt for LocalFileReader {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let file = self.file.clone();
        let len = buf.len();
        let (data, n) = task::spawn_blocking(move || {
            let mut data = vec![0u8; len];
            let n = pread(&file, offset, &mut data)?;
            Ok::<_, io::Error>((data, n))
        })
        .await
        .map_err(io::Error::other)??;

        buf[..n].copy_from_slice(&data[..n]);
        Ok(n)
    }

    fn read_at_blocking(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        pread(&self.file, offset, buf)
    }

    fn size(&self) -> u64 {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.zip");
        let err = LocalFileReader::new(&path).err().unwrap();
        assert!(matches!(err, Error::ArchiveOpen { ref path, .. } if path.ends_with("nope.zip")));
    }

    #[test]
    fn directory_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LocalFileReader::new(dir.path()).err().unwrap();
        assert!(matches!(err, Error::ArchiveOpen { .. }));
    }

    #[tokio::test]
    async fn reads_at_offset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, b"0123456789").unwrap();

        let reader = LocalFileReader::new(&path).unwrap();
        assert_eq!(reader.size(), 10);

        let mut buf = [0u8; 4];
        reader.read_exact_at(3, &mut buf).await.unwrap();
        assert_eq!(&buf, b"3456");

        reader.read_exact_at_blocking(6, &mut buf).unwrap();
        assert_eq!(&buf, b"6789");
    }
}
