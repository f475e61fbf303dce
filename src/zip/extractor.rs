use flate2::Crc;
use flate2::write::DeflateDecoder;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::{fs, task};
use tracing::debug;

use crate::error::{Error, Result};
use crate::io::ReadAt;

use super::parser::ArchiveParser;
use super::sanitize::sanitize_entry_name;
use super::structures::{CompressionMethod, EntryDescriptor};

/// Compressed bytes pulled from the archive per read
const CHUNK_SIZE: usize = 64 * 1024;

/// ZIP entry extractor over a single open archive handle
pub struct ZipExtractor<R: ReadAt> {
    parser: ArchiveParser<R>,
}

impl<R: ReadAt + 'static> ZipExtractor<R> {
    pub fn new(reader: Arc<R>) -> Self {
        Self {
            parser: ArchiveParser::new(reader),
        }
    }

    /// List all entries in the archive
    pub async fn list_entries(&self) -> Result<Vec<EntryDescriptor>> {
        self.parser.list_entries().await
    }

    /// Extract entry to `output_path`, truncating any existing file.
    ///
    /// Returns the number of bytes written. Reading, inflating and writing
    /// the data happen on the blocking pool. A partially written file is
    /// removed if decompression or checksum validation fails.
    pub async fn extract_to_file(&self, entry: &EntryDescriptor, output_path: &Path) -> Result<u64> {
        check_supported(entry)?;
        let data_offset = self.parser.data_offset(entry).await?;

        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let reader = self.parser.reader().clone();
        let entry = entry.clone();
        let output_path = output_path.to_path_buf();
        task::spawn_blocking(move || write_entry(&*reader, data_offset, &entry, &output_path))
            .await
            .map_err(|e| Error::Io(io::Error::other(e)))?
    }

    /// Extract entry beneath `destination_dir`.
    ///
    /// Directory entries only create the directory. Returns the entry's
    /// sanitized path relative to `destination_dir`.
    pub async fn extract_into(
        &self,
        entry: &EntryDescriptor,
        destination_dir: &Path,
    ) -> Result<PathBuf> {
        let relative = sanitize_entry_name(&entry.name)?;
        let target = destination_dir.join(&relative);

        if entry.is_directory {
            fs::create_dir_all(&target).await?;
            debug!(entry = %entry.name, "created directory");
            return Ok(relative);
        }

        if relative.as_os_str().is_empty() {
            return Err(Error::InvalidEntryName {
                entry: entry.name.clone(),
            });
        }

        let written = self.extract_to_file(entry, &target).await?;
        debug!(entry = %entry.name, bytes = written, "extracted file");
        Ok(relative)
    }
}

fn write_entry<R: ReadAt + ?Sized>(
    reader: &R,
    data_offset: u64,
    entry: &EntryDescriptor,
    output_path: &Path,
) -> Result<u64> {
    let mut file = File::create(output_path)?;
    let copied = copy_entry(reader, data_offset, entry, &mut file)
        .and_then(|n| file.flush().map(|_| n).map_err(Error::from));
    drop(file);

    if copied.is_err() {
        let _ = std::fs::remove_file(output_path);
    }
    copied
}

/// Stream the entry's data through the right decoder into `out`,
/// validating length and CRC-32 against the central directory.
fn copy_entry<R, W>(reader: &R, data_offset: u64, entry: &EntryDescriptor, out: &mut W) -> Result<u64>
where
    R: ReadAt + ?Sized,
    W: Write,
{
    if entry.compression_method == CompressionMethod::Stored
        && entry.compressed_size != entry.uncompressed_size
    {
        return Err(Error::corrupt(format!(
            "stored entry '{}' has mismatched sizes",
            entry.name
        )));
    }

    let mut offset = data_offset;
    let mut remaining = entry.compressed_size;
    let mut chunk = vec![0u8; CHUNK_SIZE.min(remaining as usize)];
    let mut inflater = match entry.compression_method {
        CompressionMethod::Deflate => Some(DeflateDecoder::new(Vec::new())),
        _ => None,
    };
    let mut sink = CheckedWriter::new(entry, out);
    let inflate_error =
        |e: io::Error| Error::corrupt(format!("'{}' failed to decompress: {e}", entry.name));

    while remaining > 0 {
        let n = CHUNK_SIZE.min(remaining as usize);
        let input = &mut chunk[..n];
        reader
            .read_exact_at_blocking(offset, input)
            .map_err(Error::from_archive_read)?;
        offset += n as u64;
        remaining -= n as u64;

        match inflater.as_mut() {
            Some(decoder) => {
                decoder.write_all(input).map_err(inflate_error)?;
                sink.push(decoder.get_ref())?;
                decoder.get_mut().clear();
            }
            None => sink.push(input)?,
        }
    }

    if let Some(decoder) = inflater {
        let tail = decoder.finish().map_err(inflate_error)?;
        sink.push(&tail)?;
    }

    sink.finish()
}

fn check_supported(entry: &EntryDescriptor) -> Result<()> {
    if entry.is_encrypted() {
        return Err(Error::UnsupportedEntry {
            entry: entry.name.clone(),
            reason: "encrypted entries are not supported".to_string(),
        });
    }
    if let CompressionMethod::Unknown(method) = entry.compression_method {
        return Err(Error::UnsupportedEntry {
            entry: entry.name.clone(),
            reason: format!("compression method {method} (only STORED and DEFLATE are supported)"),
        });
    }
    Ok(())
}

/// Writes decoded bytes while tracking length and CRC-32.
struct CheckedWriter<'a, W> {
    entry: &'a EntryDescriptor,
    out: &'a mut W,
    crc: Crc,
    written: u64,
}

impl<'a, W: Write> CheckedWriter<'a, W> {
    fn new(entry: &'a EntryDescriptor, out: &'a mut W) -> Self {
        Self {
            entry,
            out,
            crc: Crc::new(),
            written: 0,
        }
    }

    fn push(&mut self, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        self.written += data.len() as u64;
        // Stop a lying header from inflating without bound
        if self.written > self.entry.uncompressed_size {
            return Err(Error::corrupt(format!(
                "'{}' inflates past its declared size of {} bytes",
                self.entry.name, self.entry.uncompressed_size
            )));
        }
        self.crc.update(data);
        self.out.write_all(data)?;
        Ok(())
    }

    fn finish(self) -> Result<u64> {
        if self.written != self.entry.uncompressed_size {
            return Err(Error::corrupt(format!(
                "'{}' is {} bytes, expected {}",
                self.entry.name, self.written, self.entry.uncompressed_size
            )));
        }
        if self.crc.sum() != self.entry.crc32 {
            return Err(Error::corrupt(format!(
                "'{}' failed CRC-32 check (expected {:08x}, got {:08x})",
                self.entry.name,
                self.entry.crc32,
                self.crc.sum()
            )));
        }
        Ok(self.written)
    }
}
