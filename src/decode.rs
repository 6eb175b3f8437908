//! BMP decoder: uncompressed bottom-up 24-bit BMP into an [`ImgVec<RGB8>`].
//!
//! Headers are read in file order (14-byte file header, then the 40-byte
//! info header) and validated before any pixel memory is allocated.

use alloc::vec::Vec;
use std::io::{self, Read};

use enough::Stop;
use imgref::ImgVec;
use rgb::RGB8;

use crate::error::BmpError;
use crate::header::{
    self, BITS_PER_PIXEL, COMPRESSION_NONE, DATA_OFFSET, FILE_HEADER_SIZE, FileHeader,
    INFO_HEADER_SIZE, InfoHeader, PLANES,
};
use crate::limits::Limits;

// ── Permissiveness ──────────────────────────────────────────────────

/// Controls how strictly the decoder validates input.
///
/// Bit depth (24) and compression (none) are required at every level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Permissiveness {
    /// Everything in `Standard`, plus the pixel data must start right after
    /// the headers and the file size and pixel data size fields must agree
    /// with the dimensions.
    Strict,

    /// Default. Requires info header size 40 and planes == 1. Size fields
    /// are ignored. Truncated pixel data is an error.
    #[default]
    Standard,

    /// Ignore the info header size and planes fields. Rows missing from a
    /// truncated file decode as black, so the output is allocated at the
    /// size the header declares; set [`Limits`] for untrusted input.
    Permissive,
}

// ── Validated header ────────────────────────────────────────────────

/// Header fields the decoder relies on, after validation.
#[derive(Clone, Copy, Debug)]
pub(crate) struct BmpHeader {
    pub width: u32,
    pub height: u32,
    pub stride: u64,
    pub data_offset: u64,
}

impl BmpHeader {
    pub fn image_size(&self) -> u64 {
        self.stride * u64::from(self.height)
    }
}

/// Check the parsed headers against what this codec can decode.
pub(crate) fn validate(
    file_header: &FileHeader,
    info_header: &InfoHeader,
    permissiveness: Permissiveness,
) -> Result<BmpHeader, BmpError> {
    if !file_header.has_signature() {
        return Err(BmpError::UnrecognizedFormat);
    }
    let is_strict = permissiveness == Permissiveness::Strict;
    let is_permissive = permissiveness == Permissiveness::Permissive;

    if !is_permissive && info_header.header_size != INFO_HEADER_SIZE as u32 {
        return Err(BmpError::InvalidHeader(alloc::format!(
            "info header size is {}, expected {INFO_HEADER_SIZE}",
            info_header.header_size
        )));
    }
    if !is_permissive && info_header.planes != PLANES {
        return Err(BmpError::InvalidHeader(alloc::format!(
            "planes field is {}, expected {PLANES}",
            info_header.planes
        )));
    }
    if info_header.bits_per_pixel != BITS_PER_PIXEL {
        return Err(BmpError::UnsupportedVariant(alloc::format!(
            "{} bits per pixel (only 24 is supported)",
            info_header.bits_per_pixel
        )));
    }
    if info_header.compression != COMPRESSION_NONE {
        return Err(BmpError::UnsupportedVariant(alloc::format!(
            "compression type {} (only uncompressed is supported)",
            info_header.compression
        )));
    }
    if info_header.height < 0 {
        return Err(BmpError::UnsupportedVariant(
            "top-down row order (negative height)".into(),
        ));
    }
    if info_header.width <= 0 || info_header.height == 0 {
        return Err(BmpError::InvalidHeader(alloc::format!(
            "invalid dimensions {}x{}",
            info_header.width,
            info_header.height
        )));
    }
    let data_offset = u64::from(file_header.data_offset);
    if data_offset < DATA_OFFSET as u64 {
        return Err(BmpError::InvalidHeader(alloc::format!(
            "pixel data offset {data_offset} overlaps the headers"
        )));
    }

    let header = BmpHeader {
        width: info_header.width as u32,
        height: info_header.height as u32,
        stride: header::stride(info_header.width as u32),
        data_offset,
    };

    if is_strict {
        if data_offset != DATA_OFFSET as u64 {
            return Err(BmpError::InvalidHeader(alloc::format!(
                "pixel data offset {data_offset}, expected {DATA_OFFSET}"
            )));
        }
        let expected_file_size = data_offset + header.image_size();
        if u64::from(file_header.size) != expected_file_size {
            return Err(BmpError::InvalidHeader(alloc::format!(
                "file size field ({}) doesn't match expected ({expected_file_size})",
                file_header.size
            )));
        }
        if info_header.image_size != 0 && u64::from(info_header.image_size) != header.image_size()
        {
            return Err(BmpError::InvalidHeader(alloc::format!(
                "image data size field ({}) doesn't match expected ({})",
                info_header.image_size,
                header.image_size()
            )));
        }
    }

    Ok(header)
}

/// Read and validate both headers from the start of `reader`.
///
/// Stops after the file header if the signature doesn't match.
pub(crate) fn read_headers<R: Read>(
    reader: &mut R,
    permissiveness: Permissiveness,
) -> Result<BmpHeader, BmpError> {
    let mut fh = [0u8; FILE_HEADER_SIZE];
    reader.read_exact(&mut fh).map_err(BmpError::from_read)?;
    let file_header = FileHeader::parse(&fh);
    if !file_header.has_signature() {
        return Err(BmpError::UnrecognizedFormat);
    }

    let mut ih = [0u8; INFO_HEADER_SIZE];
    reader.read_exact(&mut ih).map_err(BmpError::from_read)?;
    let info_header = InfoHeader::parse(&ih);

    let header = validate(&file_header, &info_header, permissiveness)?;
    log::debug!(
        "bmp header: {}x{}, stride {}, data at {}",
        header.width,
        header.height,
        header.stride,
        header.data_offset
    );
    Ok(header)
}

// ── Decode request ──────────────────────────────────────────────────

/// Configurable BMP decode.
///
/// ```
/// use bmp24::{DecodeRequest, Limits, Permissiveness, Unstoppable};
///
/// let limits = Limits { max_pixels: Some(4096 * 4096), ..Default::default() };
/// let request = DecodeRequest::new()
///     .with_limits(&limits)
///     .with_permissiveness(Permissiveness::Strict);
/// assert!(request.decode(b"not a bitmap", Unstoppable).is_err());
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct DecodeRequest<'a> {
    limits: Option<&'a Limits>,
    permissiveness: Permissiveness,
}

impl<'a> DecodeRequest<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn with_permissiveness(mut self, permissiveness: Permissiveness) -> Self {
        self.permissiveness = permissiveness;
        self
    }

    /// Decode a complete in-memory BMP file.
    pub fn decode(&self, data: &[u8], stop: impl Stop) -> Result<ImgVec<RGB8>, BmpError> {
        let mut cursor = data;
        let header = read_headers(&mut cursor, self.permissiveness)?;

        // Reject short input before allocating for it.
        let needed = header.data_offset + header.image_size();
        if self.permissiveness != Permissiveness::Permissive && (data.len() as u64) < needed {
            return Err(BmpError::UnexpectedEof);
        }

        self.decode_pixels(&header, &mut cursor, &stop)
    }

    /// Decode a BMP file streamed from `reader`.
    ///
    /// Reads exactly up to the end of the last pixel row. Pixel memory is
    /// only committed once the row data has actually been read.
    pub fn read<R: Read>(&self, mut reader: R, stop: impl Stop) -> Result<ImgVec<RGB8>, BmpError> {
        let header = read_headers(&mut reader, self.permissiveness)?;
        self.decode_pixels(&header, &mut reader, &stop)
    }

    fn decode_pixels<R: Read>(
        &self,
        header: &BmpHeader,
        reader: &mut R,
        stop: &dyn Stop,
    ) -> Result<ImgVec<RGB8>, BmpError> {
        let w = header.width as usize;
        let h = header.height as usize;
        let pixel_count = u64::from(header.width) * u64::from(header.height);

        if let Some(limits) = self.limits {
            limits.check(header.width, header.height)?;
            limits.check_memory(pixel_count * size_of::<RGB8>() as u64)?;
        }
        stop.check()?;

        let too_large = || BmpError::DimensionsTooLarge {
            width: u64::from(header.width),
            height: u64::from(header.height),
        };
        let pixel_count = usize::try_from(pixel_count).map_err(|_| too_large())?;
        let row_stride = usize::try_from(header.stride).map_err(|_| too_large())?;
        let image_size = usize::try_from(header.image_size()).map_err(|_| too_large())?;
        let is_permissive = self.permissiveness == Permissiveness::Permissive;

        let gap = header.data_offset - DATA_OFFSET as u64;
        if gap > 0 {
            let skipped = io::copy(&mut reader.by_ref().take(gap), &mut io::sink())?;
            if skipped < gap && !is_permissive {
                return Err(BmpError::UnexpectedEof);
            }
        }

        // Grows with the bytes actually present, not with what the header claims.
        let mut raw = Vec::new();
        reader
            .by_ref()
            .take(image_size as u64)
            .read_to_end(&mut raw)?;
        if raw.len() < image_size {
            if !is_permissive {
                return Err(BmpError::UnexpectedEof);
            }
            log::warn!(
                "bmp pixel data truncated: {} of {image_size} bytes; missing rows left black",
                raw.len()
            );
        }
        stop.check()?;

        let mut pixels: Vec<RGB8> = Vec::new();
        pixels
            .try_reserve_exact(pixel_count)
            .map_err(|_| BmpError::OutOfMemory)?;
        pixels.resize(pixel_count, RGB8::new(0, 0, 0));

        for (read, y) in (0..h).rev().enumerate() {
            let start = read * row_stride;
            if start >= raw.len() {
                break;
            }
            if read % 16 == 0 {
                stop.check()?;
            }

            let src = &raw[start..(start + row_stride).min(raw.len())];
            let row = &mut pixels[y * w..(y + 1) * w];
            for (px, bgr) in row.iter_mut().zip(src.chunks_exact(3)) {
                px.b = bgr[0];
                px.g = bgr[1];
                px.r = bgr[2];
            }
        }

        Ok(ImgVec::new(pixels, w, h))
    }
}

/// Decode an in-memory BMP file with default settings.
pub fn decode_bmp(data: &[u8], stop: impl Stop) -> Result<ImgVec<RGB8>, BmpError> {
    DecodeRequest::new().decode(data, stop)
}

/// Decode a BMP file streamed from `reader` with default settings.
pub fn read_bmp<R: Read>(reader: R, stop: impl Stop) -> Result<ImgVec<RGB8>, BmpError> {
    DecodeRequest::new().read(reader, stop)
}
