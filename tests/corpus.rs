//! Test corpus: roundtrips over patterns and sizes, plus malformed input.

use std::sync::atomic::{AtomicUsize, Ordering};

use bmp24::*;
use enough::StopReason;
use imgref::ImgVec;
use rgb::RGB8;

fn checkerboard(w: usize, h: usize) -> ImgVec<RGB8> {
    let mut pixels = Vec::with_capacity(w * h);
    for y in 0..h {
        for x in 0..w {
            if (x + y) % 2 == 0 {
                pixels.push(RGB8::new(200, 220, 240));
            } else {
                pixels.push(RGB8::new(10, 40, 70));
            }
        }
    }
    ImgVec::new(pixels, w, h)
}

fn noise_pattern(w: usize, h: usize) -> ImgVec<RGB8> {
    let mut state: u32 = 0xDEAD_BEEF;
    let mut next = || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        state as u8
    };
    let pixels = (0..w * h)
        .map(|_| RGB8::new(next(), next(), next()))
        .collect();
    ImgVec::new(pixels, w, h)
}

/// A valid 4x3 file, for corrupting.
fn sample_file() -> Vec<u8> {
    encode_bmp(noise_pattern(4, 3).as_ref(), Unstoppable).unwrap()
}

// ── Roundtrips ───────────────────────────────────────────────────────

#[test]
fn noise_roundtrip_all_paddings() {
    // Widths 1..=8 cover every padding amount (0..=3 bytes) twice.
    for w in 1..=9 {
        for h in [1, 2, 7] {
            let img = noise_pattern(w, h);
            let encoded = encode_bmp(img.as_ref(), Unstoppable).unwrap();
            assert_eq!(encoded.len() as u64, 54 + stride(w as u32) * h as u64);

            let decoded = decode_bmp(&encoded, Unstoppable).unwrap();
            assert_eq!(decoded.width(), w);
            assert_eq!(decoded.height(), h);
            assert_eq!(decoded.buf(), img.buf(), "{w}x{h}");
        }
    }
}

#[test]
fn padding_bytes_are_zero() {
    let img = checkerboard(5, 4);
    let encoded = encode_bmp(img.as_ref(), Unstoppable).unwrap();
    let row_stride = stride(5) as usize;
    for row in encoded[54..].chunks_exact(row_stride) {
        assert_eq!(&row[15..], &[0]);
    }
}

#[test]
fn checkerboard_roundtrip_tall() {
    // Enough rows to cross several cancellation checkpoints.
    let img = checkerboard(3, 50);
    let encoded = encode_bmp(img.as_ref(), Unstoppable).unwrap();
    let decoded = decode_bmp(&encoded, Unstoppable).unwrap();
    assert_eq!(decoded.buf(), img.buf());
}

// ── Malformed input ──────────────────────────────────────────────────

#[test]
fn empty_input() {
    assert!(matches!(
        decode_bmp(&[], Unstoppable),
        Err(BmpError::UnexpectedEof)
    ));
}

#[test]
fn bad_signature() {
    let mut data = sample_file();
    data[1] = b'A';
    assert!(matches!(
        decode_bmp(&data, Unstoppable),
        Err(BmpError::UnrecognizedFormat)
    ));
    assert!(matches!(
        ImageInfo::from_bytes(&data),
        Err(BmpError::UnrecognizedFormat)
    ));
}

#[test]
fn truncated_at_every_offset() {
    let data = sample_file();
    for len in 0..data.len() {
        let result = decode_bmp(&data[..len], Unstoppable);
        assert!(
            matches!(result, Err(BmpError::UnexpectedEof)),
            "len {len}: {result:?}"
        );
        let result = read_bmp(&data[..len], Unstoppable);
        assert!(
            matches!(result, Err(BmpError::UnexpectedEof)),
            "len {len}: {result:?}"
        );
    }
}

#[test]
fn permissive_fills_truncated_rows_with_black() {
    let img = noise_pattern(4, 3);
    let data = encode_bmp(img.as_ref(), Unstoppable).unwrap();
    let row_stride = stride(4) as usize;

    // Keep only the bottom row plus half of the middle one.
    let cut = 54 + row_stride + row_stride / 2;
    let decoded = DecodeRequest::new()
        .with_permissiveness(Permissiveness::Permissive)
        .decode(&data[..cut], Unstoppable)
        .unwrap();

    let black = RGB8::new(0, 0, 0);
    let px = decoded.buf();
    assert_eq!(&px[8..12], &img.buf()[8..12]);
    assert_eq!(&px[4..6], &img.buf()[4..6]);
    assert_eq!(&px[6..8], &[black, black]);
    assert!(px[0..4].iter().all(|&p| p == black));
}

#[test]
fn permissive_still_needs_full_headers() {
    let data = sample_file();
    let result = DecodeRequest::new()
        .with_permissiveness(Permissiveness::Permissive)
        .decode(&data[..53], Unstoppable);
    assert!(matches!(result, Err(BmpError::UnexpectedEof)));
}

fn set_u16(data: &mut [u8], off: usize, v: u16) {
    data[off..off + 2].copy_from_slice(&v.to_le_bytes());
}

fn set_u32(data: &mut [u8], off: usize, v: u32) {
    data[off..off + 4].copy_from_slice(&v.to_le_bytes());
}

#[test]
fn unsupported_bit_depth() {
    for bpp in [1, 4, 8, 16, 32] {
        let mut data = sample_file();
        set_u16(&mut data, 28, bpp);
        assert!(
            matches!(
                decode_bmp(&data, Unstoppable),
                Err(BmpError::UnsupportedVariant(_))
            ),
            "bpp {bpp}"
        );
    }
}

#[test]
fn unsupported_compression() {
    for compression in [1, 2, 3, 4, 5, 6] {
        let mut data = sample_file();
        set_u32(&mut data, 30, compression);
        assert!(matches!(
            decode_bmp(&data, Unstoppable),
            Err(BmpError::UnsupportedVariant(_))
        ));
    }
}

#[test]
fn negative_height_rejected() {
    let mut data = sample_file();
    data[22..26].copy_from_slice(&(-3i32).to_le_bytes());
    assert!(matches!(
        decode_bmp(&data, Unstoppable),
        Err(BmpError::UnsupportedVariant(_))
    ));
}

#[test]
fn zero_dimensions_rejected() {
    let mut data = sample_file();
    set_u32(&mut data, 18, 0);
    assert!(matches!(
        decode_bmp(&data, Unstoppable),
        Err(BmpError::InvalidHeader(_))
    ));
}

#[test]
fn wrong_planes_rejected_unless_permissive() {
    let mut data = sample_file();
    set_u16(&mut data, 26, 3);
    assert!(matches!(
        decode_bmp(&data, Unstoppable),
        Err(BmpError::InvalidHeader(_))
    ));
    let decoded = DecodeRequest::new()
        .with_permissiveness(Permissiveness::Permissive)
        .decode(&data, Unstoppable)
        .unwrap();
    assert_eq!(decoded.buf(), noise_pattern(4, 3).buf());
}

#[test]
fn strict_rejects_wrong_file_size_field() {
    let mut data = sample_file();
    set_u32(&mut data, 2, 1234);
    assert!(decode_bmp(&data, Unstoppable).is_ok());
    let result = DecodeRequest::new()
        .with_permissiveness(Permissiveness::Strict)
        .decode(&data, Unstoppable);
    assert!(matches!(result, Err(BmpError::InvalidHeader(_))));
}

#[test]
fn data_offset_gap_is_skipped() {
    let img = noise_pattern(3, 2);
    let plain = encode_bmp(img.as_ref(), Unstoppable).unwrap();

    let mut data = plain[..54].to_vec();
    data.extend_from_slice(&[0xEE; 10]);
    data.extend_from_slice(&plain[54..]);
    set_u32(&mut data, 10, 64);
    let len = data.len() as u32;
    set_u32(&mut data, 2, len);

    let decoded = decode_bmp(&data, Unstoppable).unwrap();
    assert_eq!(decoded.buf(), img.buf());
    let decoded = read_bmp(&data[..], Unstoppable).unwrap();
    assert_eq!(decoded.buf(), img.buf());
}

#[test]
fn strict_rejects_data_offset_gap() {
    let img = noise_pattern(3, 2);
    let plain = encode_bmp(img.as_ref(), Unstoppable).unwrap();

    // Gap with every size field consistent: only the offset itself is off.
    let mut data = plain[..54].to_vec();
    data.extend_from_slice(&[0; 10]);
    data.extend_from_slice(&plain[54..]);
    set_u32(&mut data, 10, 64);
    let len = data.len() as u32;
    set_u32(&mut data, 2, len);

    assert!(decode_bmp(&data, Unstoppable).is_ok());
    let result = DecodeRequest::new()
        .with_permissiveness(Permissiveness::Strict)
        .decode(&data, Unstoppable);
    assert!(matches!(result, Err(BmpError::InvalidHeader(_))));
}

#[test]
fn data_offset_inside_headers_rejected() {
    let mut data = sample_file();
    set_u32(&mut data, 10, 20);
    assert!(matches!(
        decode_bmp(&data, Unstoppable),
        Err(BmpError::InvalidHeader(_))
    ));
}

#[test]
fn huge_dimensions_with_tiny_body_do_not_allocate() {
    let mut data = sample_file();
    set_u32(&mut data, 18, i32::MAX as u32);
    set_u32(&mut data, 22, i32::MAX as u32);
    assert!(matches!(
        decode_bmp(&data, Unstoppable),
        Err(BmpError::UnexpectedEof)
    ));
}

#[test]
fn header_only_file_with_huge_dimensions_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    for (w, h) in [(i32::MAX, 1), (20_000, 20_000), (i32::MAX, i32::MAX)] {
        let mut data = sample_file();
        data.truncate(54);
        data[18..22].copy_from_slice(&w.to_le_bytes());
        data[22..26].copy_from_slice(&h.to_le_bytes());

        let path = dir.path().join(format!("{w}x{h}.bmp"));
        std::fs::write(&path, &data).unwrap();
        assert!(
            matches!(load_bmp(&path), Err(BmpError::UnexpectedEof)),
            "{w}x{h}"
        );
        assert!(matches!(
            read_bmp(&data[..], Unstoppable),
            Err(BmpError::UnexpectedEof)
        ));
    }
}

// ── Cancellation ─────────────────────────────────────────────────────

/// Lets `n` checks pass, then cancels.
struct StopAfter {
    remaining: AtomicUsize,
}

impl StopAfter {
    fn new(n: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(n),
        }
    }
}

impl Stop for StopAfter {
    fn check(&self) -> Result<(), StopReason> {
        self.remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .map(|_| ())
            .map_err(|_| StopReason::Cancelled)
    }
}

#[test]
fn encode_cancelled_mid_image() {
    let img = checkerboard(3, 50);
    assert!(matches!(
        encode_bmp(img.as_ref(), StopAfter::new(2)),
        Err(BmpError::Cancelled(_))
    ));
    assert!(encode_bmp(img.as_ref(), StopAfter::new(100)).is_ok());
}

#[test]
fn decode_cancelled_mid_image() {
    let img = checkerboard(3, 50);
    let encoded = encode_bmp(img.as_ref(), Unstoppable).unwrap();
    assert!(matches!(
        decode_bmp(&encoded, StopAfter::new(2)),
        Err(BmpError::Cancelled(_))
    ));
    assert!(matches!(
        read_bmp(&encoded[..], StopAfter::new(0)),
        Err(BmpError::Cancelled(_))
    ));
    let decoded = decode_bmp(&encoded, StopAfter::new(100)).unwrap();
    assert_eq!(decoded.buf(), img.buf());
}

// ── Limits ───────────────────────────────────────────────────────────

#[test]
fn limits_reject_large() {
    let data = sample_file();
    let limits = Limits {
        max_pixels: Some(11), // 4x3 = 12
        ..Default::default()
    };
    let result = DecodeRequest::new()
        .with_limits(&limits)
        .decode(&data, Unstoppable);
    match result {
        Err(BmpError::LimitExceeded(_)) => {}
        other => panic!("expected LimitExceeded, got {other:?}"),
    }
}

#[test]
fn limits_memory() {
    let data = sample_file();
    let limits = Limits {
        max_memory_bytes: Some(35), // 12 pixels * 3 bytes = 36
        ..Default::default()
    };
    assert!(matches!(
        DecodeRequest::new()
            .with_limits(&limits)
            .decode(&data, Unstoppable),
        Err(BmpError::LimitExceeded(_))
    ));

    let limits = Limits {
        max_memory_bytes: Some(36),
        max_width: Some(4),
        max_height: Some(3),
        ..Default::default()
    };
    assert!(
        DecodeRequest::new()
            .with_limits(&limits)
            .decode(&data, Unstoppable)
            .is_ok()
    );
}
