#![no_main]
use bmp24::{DecodeRequest, ImageInfo, Limits, Permissiveness};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Keep permissive zero-fill from allocating gigabytes for a tiny input.
    let limits = Limits {
        max_pixels: Some(1 << 22),
        ..Default::default()
    };

    // Must never panic, at any strictness, from a slice or a reader.
    let _ = ImageInfo::from_bytes(data);
    for p in [
        Permissiveness::Strict,
        Permissiveness::Standard,
        Permissiveness::Permissive,
    ] {
        let request = DecodeRequest::new()
            .with_limits(&limits)
            .with_permissiveness(p);
        let _ = request.decode(data, enough::Unstoppable);
        let _ = request.read(data, enough::Unstoppable);
    }
});
