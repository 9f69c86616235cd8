//! Float → 16-bit PCM conversion.
//!
//! Speech engines produce `f32` samples nominally in `[-1.0, 1.0]`. The wire
//! format is signed 16-bit little-endian, mono.

/// Multiplier applied to a clamped sample before truncation.
pub const PCM16_SCALE: f32 = 32767.0;

/// Bytes per encoded sample.
pub const PCM16_SAMPLE_BYTES: usize = 2;

/// Convert one sample to a signed 16-bit value.
///
/// The sample is clamped to `[-1.0, 1.0]`, scaled by [`PCM16_SCALE`], and
/// truncated toward zero. `NaN` maps to `0`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn sample_to_i16(sample: f32) -> i16 {
    // `as` saturates and maps NaN to 0
    (sample.clamp(-1.0, 1.0) * PCM16_SCALE) as i16
}

/// Encode samples as little-endian 16-bit PCM bytes.
///
/// Never fails: out-of-range input is clamped.
#[must_use]
pub fn encode_pcm16(samples: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * PCM16_SAMPLE_BYTES);
    for &sample in samples {
        bytes.extend_from_slice(&sample_to_i16(sample).to_le_bytes());
    }
    bytes
}
