//! Procedural region waveforms.
//!
//! Regions carry no audio; their waveform is a pure function of the region
//! seed and the horizontal pixel offset, so redrawing never flickers.

/// Peak deflection from the lane centre, in pixels.
pub const WAVEFORM_AMPLITUDE: f64 = 20.0;

/// Horizontal spacing between waveform points, in pixels.
pub const WAVEFORM_STEP: f64 = 2.0;

/// Normalised sample in `-1.0..=1.0`.
pub fn sample(seed: u32, offset_px: f64) -> f64 {
    let carrier = (offset_px * 0.1).sin();
    carrier * noise(seed, offset_px.max(0.0) as u64)
}

/// Hash of `(seed, index)` mapped into `0.0..1.0`.
fn noise(seed: u32, index: u64) -> f64 {
    // splitmix64 finaliser
    let mut z = ((u64::from(seed) << 32) ^ index).wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    (z >> 11) as f64 / (1u64 << 53) as f64
}

/// Polyline across a region `width` pixels wide centred on `centre_y`.
///
/// Points are relative to the region's left edge.
pub fn points(seed: u32, width: f64, centre_y: f64) -> Vec<(f64, f64)> {
    if width <= 0.0 {
        return Vec::new();
    }
    let steps = (width / WAVEFORM_STEP).ceil() as usize;
    (0..=steps)
        .map(|i| {
            let x = (i as f64 * WAVEFORM_STEP).min(width);
            (x, centre_y + sample(seed, x) * WAVEFORM_AMPLITUDE)
        })
        .collect()
}
