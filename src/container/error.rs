use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The raster image could not be read or written by the image codec.
    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),

    /// The container is shorter than its fixed-size header.
    #[error("container is truncated: {0} bytes, header needs 32")]
    TruncatedContainer(usize),

    /// Fewer bytes than a header were handed to the header decoder.
    #[error("malformed header: {0} bytes, expected 32")]
    MalformedInput(usize),

    /// The signature of the file does not match a CAT file.
    #[error("invalid CAT signature: {0:?}")]
    BadMagic([u8; 4]),

    #[error("unsupported CAT version: {0}")]
    UnsupportedVersion(u32),

    /// The payload checksum does not match the one stored in the header.
    #[error("checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { stored: u32, computed: u32 },

    /// The payload is not a valid compressed stream.
    #[error("payload decompression failed: {0}")]
    Decompress(String),

    /// `width * height * 4` does not fit in memory addressing.
    #[error("image dimensions {width}x{height} are too large")]
    DimensionsTooLarge { width: u32, height: u32 },

    /// The pixel buffer length does not match the image dimensions.
    #[error("pixel buffer holds {len} bytes, {width}x{height} RGBA needs {expected}")]
    BufferSize {
        width: u32,
        height: u32,
        len: usize,
        expected: usize,
    },

    /// A preview scale that is not a finite positive number.
    #[error("invalid scale: {0}")]
    InvalidScale(f32),

    #[error("directory not found: {0}")]
    DirectoryNotFound(PathBuf),
}
