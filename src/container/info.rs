use super::error::CatError;
use super::format::{Header, HEADER_SIZE, MAGIC};
use chrono::{DateTime, Local, TimeZone};

/// Metadata of a CAT file, derived from its header and size alone.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    /// Total size of the container on disk, header included.
    pub file_size: u64,
    /// Stored payload size as a percentage of the raw RGBA size implied by
    /// the header dimensions.
    pub compression_ratio: f64,
    /// Unix seconds at encode time.
    pub timestamp: u32,
}

impl ImageInfo {
    /// The encode time in the local time zone.
    pub fn created(&self) -> Option<DateTime<Local>> {
        Local.timestamp_opt(self.timestamp as i64, 0).single()
    }

    /// The encode time as human-readable local date and time.
    pub fn created_string(&self) -> String {
        match self.created() {
            Some(created) => created.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => format!("@{}", self.timestamp),
        }
    }
}

/// Builds an `ImageInfo` from a parsed header.
///
/// Only the magic is checked. The ratio is computed against the size the
/// header dimensions imply, it is never checked against the real payload.
pub fn info_from_header(header: &Header, file_size: u64) -> Result<ImageInfo, CatError> {
    if header.magic != MAGIC {
        return Err(CatError::BadMagic(header.magic));
    }

    let uncompressed = header.width as f64 * header.height as f64 * 4.0;
    let stored = file_size as f64 - HEADER_SIZE as f64;

    Ok(ImageInfo {
        width: header.width,
        height: header.height,
        file_size,
        compression_ratio: stored / uncompressed * 100.0,
        timestamp: header.timestamp,
    })
}

/// Reads the metadata of a container without touching its payload.
///
/// No checksum verification or decompression happens here, so a corrupt
/// payload does not make this fail.
pub fn inspect(container: &[u8], file_size: u64) -> Result<ImageInfo, CatError> {
    if container.len() < HEADER_SIZE {
        return Err(CatError::TruncatedContainer(container.len()));
    }
    let header = Header::from_bytes(&container[..HEADER_SIZE])?;
    info_from_header(&header, file_size)
}
