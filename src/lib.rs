//! # bmp24
//!
//! Encoder and decoder for uncompressed, bottom-up, 24-bit BMP files.
//!
//! A file is a 14-byte file header, a 40-byte `BITMAPINFOHEADER`, then one
//! row per scanline, bottom row first. Each row stores `B, G, R` per pixel
//! and is zero-padded to a multiple of 4 bytes (see [`stride`]).
//!
//! Pixels are [`rgb::RGB8`]; images are [`imgref::ImgVec`] / [`imgref::ImgRef`].
//!
//! ## Non-Goals
//!
//! - Compressed BMP (RLE, bitfields)
//! - Bit depths other than 24
//! - Top-down row order (negative height is rejected)
//! - Palettes / indexed color
//!
//! ## Usage
//!
//! ```no_run
//! use bmp24::{load_bmp, save_bmp};
//! use imgref::ImgVec;
//! use rgb::RGB8;
//!
//! let img = ImgVec::new(vec![RGB8::new(255, 0, 0), RGB8::new(0, 255, 0)], 2, 1);
//! save_bmp("out.bmp", img.as_ref())?;
//!
//! let loaded = load_bmp("out.bmp")?;
//! assert_eq!(loaded.width(), 2);
//! assert_eq!(loaded.buf()[1], RGB8::new(0, 255, 0));
//! # Ok::<(), bmp24::BmpError>(())
//! ```

#![forbid(unsafe_code)]

extern crate alloc;

mod decode;
mod encode;
mod error;
pub mod header;
mod info;
mod limits;

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use imgref::{ImgRef, ImgVec};
use rgb::RGB8;

// Re-exports
pub use decode::{DecodeRequest, Permissiveness, decode_bmp, read_bmp};
pub use encode::{encode_bmp, write_bmp};
pub use enough::{Stop, Unstoppable};
pub use error::BmpError;
pub use header::stride;
pub use info::ImageInfo;
pub use limits::Limits;

/// Write `img` to a BMP file at `path`, creating or truncating it.
///
/// Returns `Ok(())` only if every byte reached the file.
pub fn save_bmp(path: impl AsRef<Path>, img: ImgRef<'_, RGB8>) -> Result<(), BmpError> {
    let path = path.as_ref();
    log::debug!(
        "saving {}x{} bmp to {}",
        img.width(),
        img.height(),
        path.display()
    );
    let file = File::create(path)?;
    write_bmp(BufWriter::new(file), img, Unstoppable)
}

/// Read the BMP file at `path`.
///
/// Any failure (missing file, bad signature, truncated headers, an
/// unsupported variant) is an `Err`; a successful load always has
/// non-zero width and height.
pub fn load_bmp(path: impl AsRef<Path>) -> Result<ImgVec<RGB8>, BmpError> {
    let path = path.as_ref();
    log::debug!("loading bmp from {}", path.display());
    let file = File::open(path)?;
    read_bmp(BufReader::new(file), Unstoppable)
}
