#![no_main]
use bmp24::*;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // If we can decode it, re-encoding and decoding again must produce identical pixels
    let Ok(decoded) = decode_bmp(data, enough::Unstoppable) else {
        return;
    };

    let reencoded = encode_bmp(decoded.as_ref(), enough::Unstoppable)
        .expect("decoded image failed to re-encode");
    assert_eq!(
        reencoded.len() as u64,
        54 + stride(decoded.width() as u32) * decoded.height() as u64
    );

    let Ok(decoded2) = decode_bmp(&reencoded, enough::Unstoppable) else {
        panic!("re-encoded data failed to decode");
    };

    assert_eq!(decoded.buf(), decoded2.buf(), "roundtrip pixel mismatch");
    assert_eq!(decoded.width(), decoded2.width());
    assert_eq!(decoded.height(), decoded2.height());
});
