use crate::decode::{self, Permissiveness};
use crate::error::BmpError;

/// Image metadata read from the BMP headers without decoding pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    /// Padded bytes per encoded row.
    pub stride: u64,
    /// Offset of the first pixel row from the start of the file.
    pub data_offset: u64,
}

impl ImageInfo {
    /// Probe the headers at the start of `data`.
    ///
    /// Uses [`Permissiveness::Permissive`] so a caller can inspect a file
    /// before choosing how strictly to decode it.
    pub fn from_bytes(mut data: &[u8]) -> Result<Self, BmpError> {
        let header = decode::read_headers(&mut data, Permissiveness::Permissive)?;
        Ok(Self {
            width: header.width,
            height: header.height,
            stride: header.stride,
            data_offset: header.data_offset,
        })
    }

    /// Bytes of pixel data the headers describe (`stride * height`).
    pub fn image_size(&self) -> u64 {
        self.stride * u64::from(self.height)
    }
}
