#!/usr/bin/env -S cargo +nightly -Zscript
//! Generate seed corpus files for fuzzing.
//! Run: cargo +nightly -Zscript fuzz/generate_seeds.rs

fn bmp(width: i32, height: i32, pixels: &[u8]) -> Vec<u8> {
    let stride = 4 * ((width as usize * 3 + 3) / 4);
    let image_size = stride * height.unsigned_abs() as usize;
    let mut bmp = vec![0u8; 54];
    bmp[0] = b'B'; bmp[1] = b'M';
    bmp[2..6].copy_from_slice(&((54 + image_size) as u32).to_le_bytes()); // file size
    bmp[10..14].copy_from_slice(&54u32.to_le_bytes()); // data offset
    bmp[14..18].copy_from_slice(&40u32.to_le_bytes()); // DIB header size
    bmp[18..22].copy_from_slice(&width.to_le_bytes());
    bmp[22..26].copy_from_slice(&height.to_le_bytes());
    bmp[26..28].copy_from_slice(&1u16.to_le_bytes()); // planes
    bmp[28..30].copy_from_slice(&24u16.to_le_bytes()); // bpp
    bmp[34..38].copy_from_slice(&(image_size as u32).to_le_bytes());
    bmp[38..42].copy_from_slice(&11811i32.to_le_bytes());
    bmp[42..46].copy_from_slice(&11811i32.to_le_bytes());
    bmp[50..54].copy_from_slice(&0x0100_0000u32.to_le_bytes());
    bmp.extend_from_slice(pixels);
    bmp
}

fn main() {
    use std::fs;
    for dir in ["fuzz/corpus/fuzz_decode", "fuzz/corpus/fuzz_roundtrip"] {
        fs::create_dir_all(dir).unwrap();

        // 1x1: 3 pixel bytes + 1 padding
        fs::write(format!("{dir}/bmp_1x1.bmp"), bmp(1, 1, &[0x00, 0x00, 0xff, 0x00])).unwrap();

        // 2x1 red, green: 6 pixel bytes + 2 padding
        fs::write(
            format!("{dir}/bmp_2x1.bmp"),
            bmp(2, 1, &[0x00, 0x00, 0xff, 0x00, 0xff, 0x00, 0x00, 0x00]),
        )
        .unwrap();

        // 4x2: stride == 12, no padding
        let pixels: Vec<u8> = (0..24).collect();
        fs::write(format!("{dir}/bmp_4x2.bmp"), bmp(4, 2, &pixels)).unwrap();
    }

    // Truncated/malformed seeds for edge coverage
    let dir = "fuzz/corpus/fuzz_decode";
    let full = bmp(4, 2, &[0x80; 24]);
    fs::write(format!("{dir}/truncated_header.bmp"), &full[..30]).unwrap();
    fs::write(format!("{dir}/truncated_pixels.bmp"), &full[..60]).unwrap();
    fs::write(format!("{dir}/top_down.bmp"), bmp(4, -2, &[0x80; 24])).unwrap();
    let mut bad_bpp = full.clone();
    bad_bpp[28..30].copy_from_slice(&32u16.to_le_bytes());
    fs::write(format!("{dir}/bpp32.bmp"), bad_bpp).unwrap();
}
