//! Archive extraction
//!
//! Content archives are tar streams under one of several compressions. Which
//! one is not recorded anywhere, so the installer simply tries each codec in
//! turn.

use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::Path;

use thiserror::Error;
use xz2::read::XzDecoder;
use zstd::stream::Decoder as ZstdDecoder;

/// Errors produced while unpacking an archive.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Reading the archive or writing an entry failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The archive is empty or contains an entry escaping the destination.
    #[error("Archive error: {0}")]
    Archive(String),
}

/// Anything that can unpack an archive into a directory.
///
/// Implementations must only write below `dest_dir`.
pub trait ArchiveExtractor: Send + Sync + std::fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Unpack `archive` into `dest_dir`, which already exists and is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive is not in this extractor's format or
    /// cannot be unpacked.
    fn extract(&self, archive: &Path, dest_dir: &Path) -> Result<(), ExtractError>;
}

/// Compression wrapped around the tar stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TarCodec {
    /// `.tar.xz` / `.txz`
    Xz,
    /// `.tar.zst` / `.tzst`
    Zstd,
    /// `.tar.gz` / `.tgz`
    Gzip,
}

impl TarCodec {
    /// Preference order used by the installer.
    pub const PREFERENCE: [TarCodec; 3] = [Self::Xz, Self::Zstd, Self::Gzip];

    fn decoder(self, reader: BufReader<File>) -> io::Result<Box<dyn Read>> {
        Ok(match self {
            Self::Xz => Box::new(XzDecoder::new(reader)),
            Self::Zstd => Box::new(ZstdDecoder::with_buffer(reader)?),
            Self::Gzip => Box::new(flate2::read::GzDecoder::new(reader)),
        })
    }
}

impl ArchiveExtractor for TarCodec {
    fn name(&self) -> &str {
        match self {
            Self::Xz => "xz",
            Self::Zstd => "zstd",
            Self::Gzip => "gzip",
        }
    }

    fn extract(&self, archive: &Path, dest_dir: &Path) -> Result<(), ExtractError> {
        let file = File::open(archive)?;
        let decoder = self.decoder(BufReader::new(file))?;
        extract_tar(decoder, dest_dir)
    }
}

/// The default extractors, in preference order.
pub fn default_extractors() -> Vec<Box<dyn ArchiveExtractor>> {
    TarCodec::PREFERENCE
        .into_iter()
        .map(|codec| Box::new(codec) as Box<dyn ArchiveExtractor>)
        .collect()
}

/// Extract a tar archive from a reader
fn extract_tar<R: Read>(reader: R, dest_dir: &Path) -> Result<(), ExtractError> {
    fs::create_dir_all(dest_dir)?;

    let mut archive = tar::Archive::new(reader);
    let mut count = 0usize;

    for entry in archive.entries()? {
        let mut entry = entry?;

        // Reject anything that would land outside dest_dir (Zip Slip).
        if !entry.unpack_in(dest_dir)? {
            return Err(ExtractError::Archive(format!(
                "Invalid path in archive: {}",
                entry.path()?.display()
            )));
        }
        count += 1;
    }

    if count == 0 {
        return Err(ExtractError::Archive("Archive is empty".to_string()));
    }
    Ok(())
}
