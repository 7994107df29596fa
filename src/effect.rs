//! Vibration effect model
//!
//! The three effect shapes accepted by actuator services: one-shot
//! buzzes, amplitude waveforms, and compositions of predefined
//! primitives. Waveforms can also be parsed from serialized JSON for
//! callers that hand over pre-built patterns as bytes.

use serde::{Deserialize, Serialize};

use crate::actuator::HapticError;
use crate::primitive::Primitive;

/// Scale an amplitude by a weight factor
///
/// Truncates toward zero like the integer cast it replaces, then clamps
/// into the valid 0-255 range. Directional weights can exceed 1.0 when
/// horizontal and vertical components land on the same actuator, so the
/// clamp keeps the result dispatchable.
pub fn scale_amplitude(amplitude: u8, factor: f64) -> u8 {
    let scaled = (amplitude as f64 * factor) as i64;
    scaled.clamp(0, u8::MAX as i64) as u8
}

// ============================================================================
// One-Shot
// ============================================================================

/// Single vibration of fixed duration and amplitude
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OneShot {
    /// Duration in milliseconds
    pub duration_ms: u32,
    /// Amplitude (0-255)
    pub amplitude: u8,
}

impl OneShot {
    /// Create a new one-shot effect
    pub fn new(duration_ms: u32, amplitude: u8) -> Self {
        Self {
            duration_ms,
            amplitude,
        }
    }

    /// Copy of this effect with the amplitude scaled by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            duration_ms: self.duration_ms,
            amplitude: scale_amplitude(self.amplitude, factor),
        }
    }
}

// ============================================================================
// Waveform
// ============================================================================

/// Amplitude waveform played once, segment by segment
///
/// `timings_ms[i]` is how long `amplitudes[i]` is held. Both arrays must
/// have the same non-zero length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waveform {
    /// Segment durations in milliseconds
    pub timings_ms: Vec<u32>,
    /// Segment amplitudes (0-255)
    pub amplitudes: Vec<u8>,
}

impl Waveform {
    /// Create a validated waveform
    pub fn new(timings_ms: Vec<u32>, amplitudes: Vec<u8>) -> Result<Self, HapticError> {
        if timings_ms.is_empty() {
            return Err(HapticError::InvalidRequest(
                "waveform has no segments".to_string(),
            ));
        }
        if timings_ms.len() != amplitudes.len() {
            return Err(HapticError::InvalidRequest(format!(
                "waveform length mismatch: {} timings, {} amplitudes",
                timings_ms.len(),
                amplitudes.len()
            )));
        }

        Ok(Self {
            timings_ms,
            amplitudes,
        })
    }

    /// Parse a waveform from serialized JSON bytes
    ///
    /// Expected shape: `{"timings_ms": [...], "amplitudes": [...]}`.
    pub fn from_json(bytes: &[u8]) -> Result<Self, HapticError> {
        let parsed: Waveform = serde_json::from_slice(bytes)
            .map_err(|e| HapticError::InvalidRequest(format!("pattern data: {}", e)))?;
        Self::new(parsed.timings_ms, parsed.amplitudes)
    }

    /// Total playback time in milliseconds
    pub fn total_duration_ms(&self) -> u64 {
        self.timings_ms.iter().map(|t| *t as u64).sum()
    }

    /// Copy of this waveform with every amplitude scaled by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            timings_ms: self.timings_ms.clone(),
            amplitudes: self
                .amplitudes
                .iter()
                .map(|a| scale_amplitude(*a, factor))
                .collect(),
        }
    }
}

// ============================================================================
// Composition
// ============================================================================

/// One primitive within a composition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimitiveSegment {
    /// The predefined effect to render
    pub primitive: Primitive,
    /// Intensity scale (0.0-1.0)
    pub scale: f32,
    /// Pause before this segment in milliseconds
    pub delay_ms: u32,
}

impl PrimitiveSegment {
    /// Create a segment, clamping the scale into 0.0-1.0
    pub fn new(primitive: Primitive, scale: f32, delay_ms: u32) -> Self {
        let scale = if scale.is_finite() {
            scale.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            primitive,
            scale,
            delay_ms,
        }
    }
}

/// Ordered chain of primitive segments dispatched as one effect
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Composition {
    segments: Vec<PrimitiveSegment>,
}

impl Composition {
    /// Create an empty composition
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a primitive segment
    pub fn add(mut self, primitive: Primitive, scale: f32, delay_ms: u32) -> Self {
        self.segments
            .push(PrimitiveSegment::new(primitive, scale, delay_ms));
        self
    }

    /// The segments in playback order
    pub fn segments(&self) -> &[PrimitiveSegment] {
        &self.segments
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the composition has no segments
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The primitives used, in segment order
    pub fn primitives(&self) -> Vec<Primitive> {
        self.segments.iter().map(|s| s.primitive).collect()
    }
}

// ============================================================================
// Effect
// ============================================================================

/// Any effect shape an actuator service can play
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Fixed duration and amplitude
    OneShot(OneShot),
    /// Amplitude waveform
    Waveform(Waveform),
    /// Chain of predefined primitives
    Composed(Composition),
}

impl Effect {
    /// Copy of this effect scaled by a directional weight
    ///
    /// Compositions carry their own per-segment scales and pass through
    /// unchanged; directional weighting applies to amplitudes only.
    pub fn scaled(&self, factor: f64) -> Self {
        match self {
            Effect::OneShot(one_shot) => Effect::OneShot(one_shot.scaled(factor)),
            Effect::Waveform(waveform) => Effect::Waveform(waveform.scaled(factor)),
            Effect::Composed(composition) => Effect::Composed(composition.clone()),
        }
    }

    /// Short label for log lines
    pub fn kind(&self) -> &'static str {
        match self {
            Effect::OneShot(_) => "one-shot",
            Effect::Waveform(_) => "waveform",
            Effect::Composed(_) => "composition",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_amplitude_truncates() {
        // 200 * 0.5 = 100 exactly; 201 * 0.5 = 100.5 truncates down
        assert_eq!(scale_amplitude(200, 0.5), 100);
        assert_eq!(scale_amplitude(201, 0.5), 100);
        assert_eq!(scale_amplitude(255, 0.999), 254);
    }

    #[test]
    fn test_scale_amplitude_clamps_to_max() {
        // Diagonal weights can reach sqrt(2)
        assert_eq!(scale_amplitude(200, std::f64::consts::SQRT_2), 255);
        assert_eq!(scale_amplitude(255, 2.0), 255);
    }

    #[test]
    fn test_scale_amplitude_zero_factor() {
        assert_eq!(scale_amplitude(255, 0.0), 0);
        assert_eq!(scale_amplitude(0, 1.0), 0);
    }

    #[test]
    fn test_one_shot_scaled() {
        let effect = OneShot::new(40, 128);
        let scaled = effect.scaled(0.5);
        assert_eq!(scaled.duration_ms, 40);
        assert_eq!(scaled.amplitude, 64);
    }

    #[test]
    fn test_waveform_rejects_empty() {
        let result = Waveform::new(vec![], vec![]);
        assert!(result.is_err());
    }

    #[test]
    fn test_waveform_rejects_length_mismatch() {
        let result = Waveform::new(vec![10, 20], vec![100]);
        assert!(result.is_err());
        let message = result.unwrap_err().to_string();
        assert!(message.contains("2 timings"));
        assert!(message.contains("1 amplitudes"));
    }

    #[test]
    fn test_waveform_total_duration() {
        let waveform = Waveform::new(vec![10, 20, 30], vec![50, 100, 150]).unwrap();
        assert_eq!(waveform.total_duration_ms(), 60);
    }

    #[test]
    fn test_waveform_scaled_per_sample() {
        let waveform = Waveform::new(vec![10, 20], vec![100, 201]).unwrap();
        let scaled = waveform.scaled(0.5);
        assert_eq!(scaled.timings_ms, vec![10, 20]);
        assert_eq!(scaled.amplitudes, vec![50, 100]);
    }

    #[test]
    fn test_waveform_from_json() {
        let json = br#"{"timings_ms": [10, 20], "amplitudes": [100, 200]}"#;
        let waveform = Waveform::from_json(json).unwrap();
        assert_eq!(waveform.timings_ms, vec![10, 20]);
        assert_eq!(waveform.amplitudes, vec![100, 200]);
    }

    #[test]
    fn test_waveform_from_json_rejects_garbage() {
        assert!(Waveform::from_json(b"not json").is_err());
        assert!(Waveform::from_json(b"{}").is_err());
        // Parses but fails validation
        let mismatched = br#"{"timings_ms": [10], "amplitudes": []}"#;
        assert!(Waveform::from_json(mismatched).is_err());
    }

    #[test]
    fn test_segment_clamps_scale() {
        assert_eq!(PrimitiveSegment::new(Primitive::Click, 1.5, 0).scale, 1.0);
        assert_eq!(PrimitiveSegment::new(Primitive::Click, -0.5, 0).scale, 0.0);
        assert_eq!(
            PrimitiveSegment::new(Primitive::Click, f32::NAN, 0).scale,
            0.0
        );
    }

    #[test]
    fn test_composition_builder() {
        let composition = Composition::new()
            .add(Primitive::Click, 1.0, 0)
            .add(Primitive::Tick, 0.5, 100);

        assert_eq!(composition.len(), 2);
        assert_eq!(
            composition.primitives(),
            vec![Primitive::Click, Primitive::Tick]
        );
        assert_eq!(composition.segments()[1].delay_ms, 100);
    }

    #[test]
    fn test_effect_scaled_leaves_composition_untouched() {
        let composition = Composition::new().add(Primitive::Thud, 0.8, 0);
        let effect = Effect::Composed(composition.clone());
        assert_eq!(effect.scaled(0.5), Effect::Composed(composition));
    }

    #[test]
    fn test_effect_kind_labels() {
        assert_eq!(Effect::OneShot(OneShot::new(10, 255)).kind(), "one-shot");
        assert_eq!(Effect::Composed(Composition::new()).kind(), "composition");
    }
}
