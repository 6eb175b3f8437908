//! BMP encoder: uncompressed bottom-up 24-bit BMP.

use alloc::vec;
use alloc::vec::Vec;
use std::io::Write;

use enough::Stop;
use imgref::ImgRef;
use rgb::RGB8;

use crate::error::BmpError;
use crate::header;

/// Stream `img` as a BMP file into `out`.
///
/// Writes the file header, the info header, then one `stride`-byte row per
/// scanline starting with the bottom row. Padding bytes are zero. `out` is
/// flushed before returning.
pub fn write_bmp<W: Write>(
    mut out: W,
    img: ImgRef<'_, RGB8>,
    stop: impl Stop,
) -> Result<(), BmpError> {
    let (width, height) = dimensions(img)?;
    let (file_header, info_header) = header::layout_for(width, height)?;

    out.write_all(&file_header.to_bytes())?;
    out.write_all(&info_header.to_bytes())?;

    stop.check()?;

    // layout_for bounds stride * height by u32::MAX.
    let row_stride = header::stride(width) as usize;
    let mut buf = vec![0u8; row_stride];
    let src = img.buf();
    let w = img.width();
    for (written, y) in (0..img.height()).rev().enumerate() {
        if written % 16 == 0 {
            stop.check()?;
        }
        let start = y * img.stride();
        let row = &src[start..start + w];
        for (dst, px) in buf.chunks_exact_mut(3).zip(row.iter()) {
            dst[0] = px.b;
            dst[1] = px.g;
            dst[2] = px.r;
        }
        out.write_all(&buf)?;
    }

    out.flush()?;
    Ok(())
}

/// Encode `img` to an in-memory BMP file.
pub fn encode_bmp(img: ImgRef<'_, RGB8>, stop: impl Stop) -> Result<Vec<u8>, BmpError> {
    let (width, height) = dimensions(img)?;
    let (file_header, _) = header::layout_for(width, height)?;
    let mut out = Vec::with_capacity(file_header.size as usize);
    write_bmp(&mut out, img, stop)?;
    debug_assert_eq!(out.len(), file_header.size as usize);
    Ok(out)
}

fn dimensions(img: ImgRef<'_, RGB8>) -> Result<(u32, u32), BmpError> {
    let too_large = || BmpError::DimensionsTooLarge {
        width: img.width() as u64,
        height: img.height() as u64,
    };
    let width = u32::try_from(img.width()).map_err(|_| too_large())?;
    let height = u32::try_from(img.height()).map_err(|_| too_large())?;
    Ok((width, height))
}
