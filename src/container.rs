pub use checksum::checksum;
pub use error::CatError;
pub use format::{
    read_header, Header, COMPRESSION_DEFLATE, HEADER_SIZE, MAGIC, VERSION,
};
use image::RgbaImage;
pub use info::{info_from_header, inspect, ImageInfo};
use log::{debug, error, info};
pub use optimize::{luma, optimize, optimize_pixel};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
pub use traits::{PayloadCodec, Zlib};

mod checksum;
mod error;
mod format;
mod info;
mod optimize;
mod traits;

/// An uncompressed image: `width * height` pixels in row-major RGBA8888.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

/// Returns `width * height * 4`, or `None` if it overflows `usize`.
fn rgba_len(width: u32, height: u32) -> Option<usize> {
    (width as usize).checked_mul(height as usize)?.checked_mul(4)
}

impl RawImage {
    /// Wraps an RGBA8888 buffer, which must hold exactly `width * height` pixels.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<RawImage, CatError> {
        let expected =
            rgba_len(width, height).ok_or(CatError::DimensionsTooLarge { width, height })?;
        if pixels.len() != expected {
            return Err(CatError::BufferSize {
                width,
                height,
                len: pixels.len(),
                expected,
            });
        }
        Ok(RawImage {
            width,
            height,
            pixels,
        })
    }

    /// Decodes a raster image file (PNG or any other format `image` reads)
    /// and converts it to RGBA8888.
    pub fn open<P>(path: P) -> Result<RawImage, CatError>
    where
        P: AsRef<Path>,
    {
        let rgba = image::open(path)?.to_rgba8();
        Ok(RawImage::from(rgba))
    }

    /// Encodes the image to `path`, the format is picked from its extension.
    pub fn save<P>(&self, path: P) -> Result<(), CatError>
    where
        P: AsRef<Path>,
    {
        self.to_rgba_image()?.save(path)?;
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    pub fn to_rgba_image(&self) -> Result<RgbaImage, CatError> {
        RgbaImage::from_raw(self.width, self.height, self.pixels.clone()).ok_or(
            CatError::BufferSize {
                width: self.width,
                height: self.height,
                len: self.pixels.len(),
                expected: rgba_len(self.width, self.height).unwrap_or(usize::MAX),
            },
        )
    }
}

impl From<RgbaImage> for RawImage {
    fn from(image: RgbaImage) -> RawImage {
        let (width, height) = image.dimensions();
        RawImage {
            width,
            height,
            pixels: image.into_raw(),
        }
    }
}

/// Current time in Unix seconds, saturated to the header's 32 bits.
fn unix_timestamp() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().min(u32::MAX as u64) as u32)
        .unwrap_or(0)
}

/// Encodes an image into a CAT container, stamped with the current time and
/// compressed with zlib at maximum effort.
pub fn encode(image: &RawImage) -> Vec<u8> {
    encode_with(image, &Zlib::default(), unix_timestamp())
}

/// Encodes an image into a CAT container using the given payload codec and
/// timestamp.
///
/// The pixels go through `optimize` before compression, so colors close to
/// gray are not preserved exactly.
pub fn encode_with<C>(image: &RawImage, codec: &C, timestamp: u32) -> Vec<u8>
where
    C: PayloadCodec,
{
    let optimized = optimize(&image.pixels);
    let payload = codec.compress(&optimized);
    debug!(
        "Compressed {}x{} image: {} -> {} bytes",
        image.width,
        image.height,
        optimized.len(),
        payload.len()
    );

    let header = Header {
        magic: MAGIC,
        version: VERSION,
        width: image.width,
        height: image.height,
        compression: C::TAG,
        timestamp,
        checksum: checksum(&payload),
    };

    let mut container = Vec::with_capacity(HEADER_SIZE + payload.len());
    container.extend_from_slice(&header.to_bytes());
    container.extend_from_slice(&payload);
    container
}

/// Decodes a CAT container with the default zlib codec.
pub fn decode(container: &[u8]) -> Result<RawImage, CatError> {
    decode_with(container, &Zlib::default())
}

/// Decodes a CAT container.
///
/// The header is validated and the payload checksum verified before any
/// decompression happens. Pixels are laid out in raster order on a zeroed
/// `width x height` canvas; data beyond the last row is dropped.
pub fn decode_with<C>(container: &[u8], codec: &C) -> Result<RawImage, CatError>
where
    C: PayloadCodec,
{
    if container.len() < HEADER_SIZE {
        error!("Container too short: {} bytes", container.len());
        return Err(CatError::TruncatedContainer(container.len()));
    }

    let (header_bytes, payload) = container.split_at(HEADER_SIZE);
    let header = Header::from_bytes(header_bytes)?;

    if header.magic != MAGIC {
        return Err(CatError::BadMagic(header.magic));
    }
    if header.version != VERSION {
        return Err(CatError::UnsupportedVersion(header.version));
    }

    let computed = checksum(payload);
    if computed != header.checksum {
        error!(
            "Checksum mismatch: stored {:#010x}, computed {:#010x}",
            header.checksum, computed
        );
        return Err(CatError::ChecksumMismatch {
            stored: header.checksum,
            computed,
        });
    }

    let (width, height) = (header.width, header.height);
    let canvas_len =
        rgba_len(width, height).ok_or(CatError::DimensionsTooLarge { width, height })?;

    // Header dimensions are untrusted.
    let mut pixels: Vec<u8> = Vec::new();
    if pixels.try_reserve_exact(canvas_len).is_err() {
        error!("Cannot allocate a {}x{} canvas", width, height);
        return Err(CatError::DimensionsTooLarge { width, height });
    }
    pixels.resize(canvas_len, 0);

    // Output past the canvas would be dropped, so it is never inflated.
    let data = if payload.is_empty() || canvas_len == 0 {
        Vec::new()
    } else {
        codec.decompress_limited(payload, canvas_len)?
    };
    debug!(
        "Decompressed payload: {} -> {} bytes",
        payload.len(),
        data.len()
    );

    // A zero-width canvas has no rows, nothing lands on it.
    if width > 0 {
        for (i, pixel) in data.chunks_exact(4).enumerate() {
            let (x, y) = (i % width as usize, i / width as usize);
            if y >= height as usize {
                break;
            }
            let offset = (y * width as usize + x) * 4;
            pixels[offset..offset + 4].copy_from_slice(pixel);
        }
    }

    Ok(RawImage {
        width,
        height,
        pixels,
    })
}

/// Converts a raster image file into a CAT file.
pub fn png_to_cat<P, Q>(input: P, output: Q) -> Result<(), CatError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let image = RawImage::open(&input)?;
    let container = encode(&image);
    fs::write(&output, &container)?;
    info!(
        "Encoded {} -> {} ({} bytes)",
        input.as_ref().display(),
        output.as_ref().display(),
        container.len()
    );
    Ok(())
}

/// Converts a CAT file into a raster image file, the output format is picked
/// from the extension of `output`.
pub fn cat_to_png<P, Q>(input: P, output: Q) -> Result<(), CatError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let container = fs::read(&input)?;
    let image = decode(&container)?;
    image.save(&output)?;
    info!(
        "Decoded {} -> {} ({}x{})",
        input.as_ref().display(),
        output.as_ref().display(),
        image.width,
        image.height
    );
    Ok(())
}

/// Reads the metadata of a CAT file. Only the header is read from disk.
pub fn read_info<P>(path: P) -> Result<ImageInfo, CatError>
where
    P: AsRef<Path>,
{
    let file = File::open(&path)?;
    let file_size = file.metadata()?.len();
    let header = match read_header(BufReader::new(file)) {
        Err(CatError::MalformedInput(len)) => return Err(CatError::TruncatedContainer(len)),
        other => other?,
    };
    info_from_header(&header, file_size)
}
