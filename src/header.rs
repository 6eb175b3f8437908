//! Fixed-layout BMP headers: the 14-byte file header and the 40-byte
//! `BITMAPINFOHEADER`.
//!
//! Both records are serialized field by field, little-endian, at the offsets
//! below. Nothing here depends on in-memory struct layout.
//!
//! | Offset | Size | Field |
//! |---|---|---|
//! | 0  | 2 | signature `BM` |
//! | 2  | 4 | file size |
//! | 6  | 4 | reserved |
//! | 10 | 4 | pixel data offset |
//! | 14 | 4 | info header size |
//! | 18 | 4 | width (signed) |
//! | 22 | 4 | height (signed) |
//! | 26 | 2 | planes |
//! | 28 | 2 | bits per pixel |
//! | 30 | 4 | compression |
//! | 34 | 4 | pixel data byte count |
//! | 38 | 4 | horizontal resolution (signed) |
//! | 42 | 4 | vertical resolution (signed) |
//! | 46 | 4 | colors used |
//! | 50 | 4 | significant colors |

use crate::error::BmpError;

/// File signature, the first two bytes of every BMP.
pub const SIGNATURE: [u8; 2] = *b"BM";
/// Size of [`FileHeader`] on disk.
pub const FILE_HEADER_SIZE: usize = 14;
/// Size of [`InfoHeader`] on disk.
pub const INFO_HEADER_SIZE: usize = 40;
/// Offset of the first pixel row from the start of the file.
pub const DATA_OFFSET: usize = FILE_HEADER_SIZE + INFO_HEADER_SIZE;
pub const PLANES: u16 = 1;
pub const BITS_PER_PIXEL: u16 = 24;
/// `BI_RGB`: no compression.
pub const COMPRESSION_NONE: u32 = 0;
/// Pixels per meter written for both axes (300 DPI).
pub const RESOLUTION: i32 = 11811;
pub const SIGNIFICANT_COLORS: u32 = 0x0100_0000;

/// Bytes per encoded pixel (B, G, R).
pub(crate) const BYTES_PER_PIXEL: u64 = 3;

/// Padded byte length of one encoded row: `3 * width` rounded up to a
/// multiple of 4.
///
/// ```
/// assert_eq!(bmp24::stride(1), 4);
/// assert_eq!(bmp24::stride(4), 12);
/// assert_eq!(bmp24::stride(5), 16);
/// ```
pub const fn stride(width: u32) -> u64 {
    4 * ((width as u64 * BYTES_PER_PIXEL).div_ceil(4))
}

fn le_u16(b: &[u8], off: usize) -> u16 {
    u16::from_le_bytes([b[off], b[off + 1]])
}

fn le_u32(b: &[u8], off: usize) -> u32 {
    u32::from_le_bytes([b[off], b[off + 1], b[off + 2], b[off + 3]])
}

fn le_i32(b: &[u8], off: usize) -> i32 {
    i32::from_le_bytes([b[off], b[off + 1], b[off + 2], b[off + 3]])
}

/// The 14-byte `BITMAPFILEHEADER`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileHeader {
    pub signature: [u8; 2],
    /// Total file size in bytes.
    pub size: u32,
    pub reserved: u32,
    /// Offset from the start of the file to the pixel data.
    pub data_offset: u32,
}

impl FileHeader {
    /// File header for a file whose pixel data is `image_size` bytes.
    ///
    /// `image_size` must leave room for the headers within `u32`; see
    /// [`layout_for`].
    pub fn new(image_size: u32) -> Self {
        Self {
            signature: SIGNATURE,
            size: DATA_OFFSET as u32 + image_size,
            reserved: 0,
            data_offset: DATA_OFFSET as u32,
        }
    }

    pub fn has_signature(&self) -> bool {
        self.signature == SIGNATURE
    }

    pub fn to_bytes(&self) -> [u8; FILE_HEADER_SIZE] {
        let mut b = [0u8; FILE_HEADER_SIZE];
        b[0..2].copy_from_slice(&self.signature);
        b[2..6].copy_from_slice(&self.size.to_le_bytes());
        b[6..10].copy_from_slice(&self.reserved.to_le_bytes());
        b[10..14].copy_from_slice(&self.data_offset.to_le_bytes());
        b
    }

    /// Read the fields verbatim. No validation happens here.
    pub fn parse(b: &[u8; FILE_HEADER_SIZE]) -> Self {
        Self {
            signature: [b[0], b[1]],
            size: le_u32(b, 2),
            reserved: le_u32(b, 6),
            data_offset: le_u32(b, 10),
        }
    }
}

/// The 40-byte `BITMAPINFOHEADER`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InfoHeader {
    pub header_size: u32,
    pub width: i32,
    /// Positive = bottom-up rows.
    pub height: i32,
    pub planes: u16,
    pub bits_per_pixel: u16,
    pub compression: u32,
    /// Pixel data byte count (`stride * height`).
    pub image_size: u32,
    pub x_pixels_per_meter: i32,
    pub y_pixels_per_meter: i32,
    pub colors_used: u32,
    pub important_colors: u32,
}

impl InfoHeader {
    pub fn new(width: i32, height: i32, image_size: u32) -> Self {
        Self {
            header_size: INFO_HEADER_SIZE as u32,
            width,
            height,
            planes: PLANES,
            bits_per_pixel: BITS_PER_PIXEL,
            compression: COMPRESSION_NONE,
            image_size,
            x_pixels_per_meter: RESOLUTION,
            y_pixels_per_meter: RESOLUTION,
            colors_used: 0,
            important_colors: SIGNIFICANT_COLORS,
        }
    }

    pub fn to_bytes(&self) -> [u8; INFO_HEADER_SIZE] {
        let mut b = [0u8; INFO_HEADER_SIZE];
        b[0..4].copy_from_slice(&self.header_size.to_le_bytes());
        b[4..8].copy_from_slice(&self.width.to_le_bytes());
        b[8..12].copy_from_slice(&self.height.to_le_bytes());
        b[12..14].copy_from_slice(&self.planes.to_le_bytes());
        b[14..16].copy_from_slice(&self.bits_per_pixel.to_le_bytes());
        b[16..20].copy_from_slice(&self.compression.to_le_bytes());
        b[20..24].copy_from_slice(&self.image_size.to_le_bytes());
        b[24..28].copy_from_slice(&self.x_pixels_per_meter.to_le_bytes());
        b[28..32].copy_from_slice(&self.y_pixels_per_meter.to_le_bytes());
        b[32..36].copy_from_slice(&self.colors_used.to_le_bytes());
        b[36..40].copy_from_slice(&self.important_colors.to_le_bytes());
        b
    }

    /// Read the fields verbatim. No validation happens here.
    pub fn parse(b: &[u8; INFO_HEADER_SIZE]) -> Self {
        Self {
            header_size: le_u32(b, 0),
            width: le_i32(b, 4),
            height: le_i32(b, 8),
            planes: le_u16(b, 12),
            bits_per_pixel: le_u16(b, 14),
            compression: le_u32(b, 16),
            image_size: le_u32(b, 20),
            x_pixels_per_meter: le_i32(b, 24),
            y_pixels_per_meter: le_i32(b, 28),
            colors_used: le_u32(b, 32),
            important_colors: le_u32(b, 36),
        }
    }
}

/// Build both headers for a `width` x `height` image.
///
/// Fails when the dimensions don't fit the signed 32-bit header fields or
/// the file size overflows `u32`.
pub fn layout_for(width: u32, height: u32) -> Result<(FileHeader, InfoHeader), BmpError> {
    let too_large = || BmpError::DimensionsTooLarge {
        width: u64::from(width),
        height: u64::from(height),
    };
    let w = i32::try_from(width).map_err(|_| too_large())?;
    let h = i32::try_from(height).map_err(|_| too_large())?;
    let image_size = stride(width)
        .checked_mul(u64::from(height))
        .filter(|&n| n + DATA_OFFSET as u64 <= u64::from(u32::MAX))
        .ok_or_else(too_large)? as u32;

    Ok((FileHeader::new(image_size), InfoHeader::new(w, h, image_size)))
}
