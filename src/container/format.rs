use super::error::CatError;
use byteorder::{ByteOrder, LittleEndian};
use std::io::Read;

/// The signature every CAT file starts with.
pub const MAGIC: [u8; 4] = *b"CAT1";

/// The only container revision this crate reads and writes.
pub const VERSION: u32 = 1;

/// Size of the fixed header that precedes the payload.
pub const HEADER_SIZE: usize = 32;

/// Compression tag for a zlib (deflate) payload.
pub const COMPRESSION_DEFLATE: u32 = 1;

/// The fixed-size header of a CAT container.
///
/// On disk every integer is little-endian:
///
/// | offset | field       |
/// |--------|-------------|
/// | 0      | magic       |
/// | 4      | version     |
/// | 8      | width       |
/// | 12     | height      |
/// | 16     | compression |
/// | 20     | timestamp   |
/// | 24     | checksum    |
/// | 28     | reserved    |
///
/// The reserved word is written as zero and ignored when reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub magic: [u8; 4],
    pub version: u32,
    pub width: u32,
    pub height: u32,
    /// Informational only, decoding never branches on it.
    pub compression: u32,
    /// Unix seconds at encode time.
    pub timestamp: u32,
    /// Additive checksum of the compressed payload.
    pub checksum: u32,
}

impl Header {
    /// Packs the header into its 32-byte on-disk form.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0; HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.magic);
        LittleEndian::write_u32(&mut buf[4..8], self.version);
        LittleEndian::write_u32(&mut buf[8..12], self.width);
        LittleEndian::write_u32(&mut buf[12..16], self.height);
        LittleEndian::write_u32(&mut buf[16..20], self.compression);
        LittleEndian::write_u32(&mut buf[20..24], self.timestamp);
        LittleEndian::write_u32(&mut buf[24..28], self.checksum);
        buf
    }

    /// Unpacks a header from the first 32 bytes of `bytes`.
    ///
    /// This is a plain reinterpretation: neither the magic nor the version
    /// is checked here.
    pub fn from_bytes(bytes: &[u8]) -> Result<Header, CatError> {
        if bytes.len() < HEADER_SIZE {
            return Err(CatError::MalformedInput(bytes.len()));
        }

        let mut magic = [0; 4];
        magic.copy_from_slice(&bytes[0..4]);

        Ok(Header {
            magic,
            version: LittleEndian::read_u32(&bytes[4..8]),
            width: LittleEndian::read_u32(&bytes[8..12]),
            height: LittleEndian::read_u32(&bytes[12..16]),
            compression: LittleEndian::read_u32(&bytes[16..20]),
            timestamp: LittleEndian::read_u32(&bytes[20..24]),
            checksum: LittleEndian::read_u32(&bytes[24..28]),
        })
    }
}

/// Reads at most one header worth of bytes from `from` and unpacks it.
///
/// Short input fails with `CatError::MalformedInput`.
pub fn read_header<T>(from: T) -> Result<Header, CatError>
where
    T: Read,
{
    let mut buf = Vec::with_capacity(HEADER_SIZE);
    from.take(HEADER_SIZE as u64).read_to_end(&mut buf)?;
    Header::from_bytes(&buf)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    fn sample() -> Header {
        Header {
            magic: MAGIC,
            version: VERSION,
            width: 640,
            height: 480,
            compression: COMPRESSION_DEFLATE,
            timestamp: 1_700_000_000,
            checksum: 0xdead_beef,
        }
    }

    #[test]
    fn test_layout() {
        let bytes = sample().to_bytes();
        assert_eq!(bytes.len(), HEADER_SIZE);
        assert_eq!(&bytes[0..4], b"CAT1");
        assert_eq!(&bytes[4..8], &[1, 0, 0, 0]);
        assert_eq!(&bytes[8..12], &[0x80, 0x02, 0, 0]);
        assert_eq!(&bytes[12..16], &[0xe0, 0x01, 0, 0]);
        assert_eq!(&bytes[16..20], &[1, 0, 0, 0]);
        assert_eq!(&bytes[24..28], &[0xef, 0xbe, 0xad, 0xde]);
        assert_eq!(&bytes[28..32], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_read_header_from_stream() {
        let header = sample();
        let mut stream = header.to_bytes().to_vec();
        stream.extend_from_slice(&[9; 16]);
        assert_eq!(read_header(Cursor::new(stream)).unwrap(), header);
    }

    #[test]
    fn test_round_trip_extremes() {
        let headers = [
            Header {
                width: 0,
                height: 0,
                timestamp: 0,
                checksum: 0,
                ..sample()
            },
            Header {
                magic: *b"\xff\xff\xff\xff",
                version: u32::MAX,
                width: u32::MAX,
                height: u32::MAX,
                compression: u32::MAX,
                timestamp: u32::MAX,
                checksum: u32::MAX,
            },
        ];
        for header in headers {
            assert_eq!(Header::from_bytes(&header.to_bytes()).unwrap(), header);
        }
    }

    #[test]
    fn test_reserved_ignored() {
        let mut bytes = sample().to_bytes();
        bytes[28..32].copy_from_slice(&[1, 2, 3, 4]);
        assert_eq!(Header::from_bytes(&bytes).unwrap(), sample());
    }

    #[test]
    fn test_no_validation() {
        let header = Header {
            magic: *b"PNG\0",
            version: 7,
            ..sample()
        };
        assert_eq!(Header::from_bytes(&header.to_bytes()).unwrap(), header);
    }

    #[test]
    fn test_short_input() {
        let bytes = sample().to_bytes();
        assert!(matches!(
            Header::from_bytes(&bytes[..31]),
            Err(CatError::MalformedInput(31))
        ));
        assert!(matches!(
            read_header(Cursor::new(&bytes[..10])),
            Err(CatError::MalformedInput(10))
        ));
    }
}
