//! Hand-built archives and an in-memory reader for unit tests.

use async_trait::async_trait;
use std::io;

use super::structures::*;
use crate::io::ReadAt;

pub(crate) struct Memory(pub Vec<u8>);

#[async_trait]
impl ReadAt for Memory {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        self.read_at_blocking(offset, buf)
    }

    fn read_at_blocking(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let start = (offset as usize).min(self.0.len());
        let n = buf.len().min(self.0.len() - start);
        buf[..n].copy_from_slice(&self.0[start..start + n]);
        Ok(n)
    }

    fn size(&self) -> u64 {
        self.0.len() as u64
    }
}

/// Local header, data and central directory for one STORED entry named
/// `hi.txt` holding `hello`. Returns the bytes with the directory's
/// offset and size.
fn entry_and_directory() -> (Vec<u8>, u32, u32) {
    let name = b"hi.txt";
    let data = b"hello";
    let crc = {
        let mut crc = flate2::Crc::new();
        crc.update(data);
        crc.sum()
    };

    let mut out = Vec::new();
    out.extend_from_slice(LFH_SIGNATURE);
    out.extend_from_slice(&20u16.to_le_bytes()); // version needed
    out.extend_from_slice(&0u16.to_le_bytes()); // flags
    out.extend_from_slice(&0u16.to_le_bytes()); // method
    out.extend_from_slice(&0u32.to_le_bytes()); // time + date
    out.extend_from_slice(&crc.to_le_bytes());
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(&(name.len() as u16).to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(name);
    out.extend_from_slice(data);

    let cd_offset = out.len() as u32;
    out.extend_from_slice(CDFH_SIGNATURE);
    out.extend_from_slice(&20u16.to_le_bytes()); // version made by
    out.extend_from_slice(&20u16.to_le_bytes()); // version needed
    out.extend_from_slice(&0u16.to_le_bytes()); // flags
    out.extend_from_slice(&0u16.to_le_bytes()); // method
    out.extend_from_slice(&0u32.to_le_bytes()); // time + date
    out.extend_from_slice(&crc.to_le_bytes());
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(&(name.len() as u16).to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes()); // extra
    out.extend_from_slice(&0u16.to_le_bytes()); // comment
    out.extend_from_slice(&0u16.to_le_bytes()); // disk
    out.extend_from_slice(&0u16.to_le_bytes()); // internal attrs
    out.extend_from_slice(&0u32.to_le_bytes()); // external attrs
    out.extend_from_slice(&0u32.to_le_bytes()); // lfh offset
    out.extend_from_slice(name);
    let cd_size = out.len() as u32 - cd_offset;

    (out, cd_offset, cd_size)
}

/// A single STORED entry named `hi.txt` holding `hello`.
pub(crate) fn single_entry_archive(comment: &[u8]) -> Vec<u8> {
    let (mut out, cd_offset, cd_size) = entry_and_directory();

    out.extend_from_slice(EndOfCentralDirectory::SIGNATURE);
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&cd_size.to_le_bytes());
    out.extend_from_slice(&cd_offset.to_le_bytes());
    out.extend_from_slice(&(comment.len() as u16).to_le_bytes());
    out.extend_from_slice(comment);
    out
}

/// The same entry behind ZIP64 end records.
///
/// `total_disks` goes into the locator and `disk_with_cd` into the ZIP64
/// end record; a well-formed single-file archive uses 1 and 0.
pub(crate) fn zip64_single_entry_archive(total_disks: u32, disk_with_cd: u32) -> Vec<u8> {
    let (mut out, cd_offset, cd_size) = entry_and_directory();

    let eocd64_offset = out.len() as u64;
    out.extend_from_slice(Zip64EOCD::SIGNATURE);
    out.extend_from_slice(&44u64.to_le_bytes()); // size of the remaining record
    out.extend_from_slice(&45u16.to_le_bytes()); // version made by
    out.extend_from_slice(&45u16.to_le_bytes()); // version needed
    out.extend_from_slice(&0u32.to_le_bytes()); // this disk
    out.extend_from_slice(&disk_with_cd.to_le_bytes());
    out.extend_from_slice(&1u64.to_le_bytes()); // entries on this disk
    out.extend_from_slice(&1u64.to_le_bytes()); // total entries
    out.extend_from_slice(&(cd_size as u64).to_le_bytes());
    out.extend_from_slice(&(cd_offset as u64).to_le_bytes());

    out.extend_from_slice(Zip64EOCDLocator::SIGNATURE);
    out.extend_from_slice(&0u32.to_le_bytes()); // disk holding the ZIP64 record
    out.extend_from_slice(&eocd64_offset.to_le_bytes());
    out.extend_from_slice(&total_disks.to_le_bytes());

    out.extend_from_slice(EndOfCentralDirectory::SIGNATURE);
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0xFFFFu16.to_le_bytes());
    out.extend_from_slice(&0xFFFFu16.to_le_bytes());
    out.extend_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
    out.extend_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out
}
