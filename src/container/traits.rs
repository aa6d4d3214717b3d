use super::error::CatError;
use miniz_oxide::deflate::{self, CompressionLevel};
use miniz_oxide::inflate::{self, TINFLStatus};

/// A lossless byte compressor used for the container payload.
///
/// `compress` and `decompress` must be inverse of each other.
pub trait PayloadCodec {
    /// The value stored in the header's compression field.
    const TAG: u32;

    fn compress(&self, data: &[u8]) -> Vec<u8>;

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CatError>;

    /// Decompresses at most `limit` bytes, output past the limit is dropped.
    fn decompress_limited(&self, data: &[u8], limit: usize) -> Result<Vec<u8>, CatError> {
        let mut data = self.decompress(data)?;
        data.truncate(limit);
        Ok(data)
    }
}

/// zlib-wrapped deflate, as produced by most deflate libraries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zlib {
    level: u8,
}

impl Zlib {
    /// Creates a codec compressing at `level` (0-10, clamped).
    pub fn new(level: u8) -> Zlib {
        Zlib {
            level: level.min(CompressionLevel::UberCompression as u8),
        }
    }

    pub fn level(&self) -> u8 {
        self.level
    }
}

impl Default for Zlib {
    /// Maximum standard effort, zlib level 9.
    fn default() -> Zlib {
        Zlib::new(CompressionLevel::BestCompression as u8)
    }
}

impl PayloadCodec for Zlib {
    const TAG: u32 = super::format::COMPRESSION_DEFLATE;

    fn compress(&self, data: &[u8]) -> Vec<u8> {
        deflate::compress_to_vec_zlib(data, self.level)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CatError> {
        inflate::decompress_to_vec_zlib(data)
            .map_err(|err| CatError::Decompress(format!("{:?}", err.status)))
    }

    fn decompress_limited(&self, data: &[u8], limit: usize) -> Result<Vec<u8>, CatError> {
        match inflate::decompress_to_vec_zlib_with_limit(data, limit) {
            Ok(data) => Ok(data),
            // The stream holds more than `limit` bytes, keep what fits.
            Err(err) if err.status == TINFLStatus::HasMoreOutput => {
                let mut data = err.output;
                data.truncate(limit);
                Ok(data)
            }
            Err(err) => Err(CatError::Decompress(format!("{:?}", err.status))),
        }
    }
}
