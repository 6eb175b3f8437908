/// Caps applied to a BMP's declared dimensions before any pixel buffer is
/// allocated. Pass to [`crate::DecodeRequest::with_limits`].
///
/// Every field is optional; `Limits::default()` accepts any size.
#[derive(Clone, Debug, Default)]
pub struct Limits {
    pub max_width: Option<u64>,
    pub max_height: Option<u64>,
    /// Upper bound on `width * height` from the info header.
    pub max_pixels: Option<u64>,
    /// Upper bound on the decoded `RGB8` buffer, in bytes (3 per pixel).
    pub max_memory_bytes: Option<u64>,
}

impl Limits {
    /// Reject header dimensions over any cap.
    pub(crate) fn check(&self, width: u32, height: u32) -> Result<(), crate::BmpError> {
        if let Some(max_w) = self.max_width
            && u64::from(width) > max_w
        {
            return Err(crate::BmpError::LimitExceeded(alloc::format!(
                "width {width} exceeds limit {max_w}"
            )));
        }
        if let Some(max_h) = self.max_height
            && u64::from(height) > max_h
        {
            return Err(crate::BmpError::LimitExceeded(alloc::format!(
                "height {height} exceeds limit {max_h}"
            )));
        }
        if let Some(max_px) = self.max_pixels {
            let pixels = u64::from(width) * u64::from(height);
            if pixels > max_px {
                return Err(crate::BmpError::LimitExceeded(alloc::format!(
                    "pixel count {pixels} exceeds limit {max_px}"
                )));
            }
        }
        Ok(())
    }

    /// Reject an output buffer of `bytes` over `max_memory_bytes`.
    pub(crate) fn check_memory(&self, bytes: u64) -> Result<(), crate::BmpError> {
        if let Some(max_mem) = self.max_memory_bytes
            && bytes > max_mem
        {
            return Err(crate::BmpError::LimitExceeded(alloc::format!(
                "allocation {bytes} bytes exceeds memory limit {max_mem}"
            )));
        }
        Ok(())
    }
}
