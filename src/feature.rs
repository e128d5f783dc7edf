//! Landmark normalization and feature vector assembly.
//!
//! The gesture classifier expects a fixed-width vector per hand: one handedness flag followed by
//! two values (x and y) per landmark. [`normalize`] makes the landmark coordinates origin- and
//! scale-invariant, [`assemble`] packs them into the classifier's input layout.

use crate::landmark::{Handedness, Landmarks};

/// Selects how raw landmark coordinates are mapped before scale normalization.
///
/// The two modes correspond to different classifier model families and are not numerically
/// comparable; a classifier is trained against exactly one of them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NormalizationMode {
    /// Expresses every landmark relative to the first one.
    ///
    /// The first landmark (the wrist) always normalizes to `(0, 0)`.
    Relative,
    /// Scales normalized image coordinates into pixel space, without origin subtraction.
    ImageScaled { width: u32, height: u32 },
}

/// Normalizes a landmark list into a flat `[x0, y0, x1, y1, ..]` value sequence.
///
/// After the mode-specific coordinate mapping, every value is divided by the maximum absolute
/// value of the sequence. If that maximum is zero (all landmarks coincide with the origin), the
/// result is all zeros rather than NaN.
///
/// This is a pure function; identical inputs produce identical outputs.
pub fn normalize(landmarks: &Landmarks, mode: NormalizationMode) -> Vec<f32> {
    let mut values = Vec::with_capacity(landmarks.len() * 2);
    match mode {
        NormalizationMode::Relative => {
            let Some(base) = landmarks.positions().first().copied() else {
                return values;
            };
            for pos in landmarks.iter() {
                values.push(pos.x - base.x);
                values.push(pos.y - base.y);
            }
        }
        NormalizationMode::ImageScaled { width, height } => {
            for pos in landmarks.iter() {
                values.push(pos.x * width as f32);
                values.push(pos.y * height as f32);
            }
        }
    }

    let max = values.iter().fold(0.0_f32, |max, v| max.max(v.abs()));
    if max != 0.0 {
        for value in &mut values {
            *value /= max;
        }
    }

    values
}

/// Assembles the classifier input vector for one hand.
///
/// Slot 0 holds the handedness flag (`1.0` for [`Handedness::Right`], `0.0` for
/// [`Handedness::Left`]), the remaining slots hold `normalized` in landmark order.
///
/// Returns an error if the result would not be exactly `input_len` values wide. A mismatch means
/// the classifier model and the landmark source disagree about the landmark count, so this is a
/// configuration error, not a per-frame condition.
pub fn assemble(
    handedness: Handedness,
    normalized: &[f32],
    input_len: usize,
) -> anyhow::Result<Vec<f32>> {
    if normalized.len() + 1 != input_len {
        anyhow::bail!(
            "incomplete classifier input: {} landmark values + handedness, but the model expects \
            {} inputs",
            normalized.len(),
            input_len,
        );
    }

    let mut features = Vec::with_capacity(input_len);
    features.push(match handedness {
        Handedness::Right => 1.0,
        Handedness::Left => 0.0,
    });
    features.extend_from_slice(normalized);
    Ok(features)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn relative_mode_concrete() {
        let lms = Landmarks::from_coords([(0.5, 0.5), (0.6, 0.5), (0.5, 0.6)]);
        let normalized = normalize(&lms, NormalizationMode::Relative);
        assert_eq!(normalized.len(), 6);
        let expected = [0.0, 0.0, 1.0, 0.0, 0.0, 1.0];
        for (value, expected) in normalized.iter().zip(&expected) {
            assert_relative_eq!(value, expected, max_relative = 1e-6);
        }

        let features = assemble(Handedness::Right, &normalized, 7).unwrap();
        assert_relative_eq!(features[0], 1.0);
        assert_eq!(features.len(), 7);
    }

    #[test]
    fn relative_mode_is_scale_invariant() {
        let coords = [(0.2, 0.3), (0.25, 0.35), (0.1, 0.9), (0.2, 0.2)];
        let k = 17.5;
        let a = normalize(&Landmarks::from_coords(coords), NormalizationMode::Relative);
        let b = normalize(
            &Landmarks::from_coords(coords.map(|(x, y)| (x * k, y * k))),
            NormalizationMode::Relative,
        );
        for (a, b) in a.iter().zip(&b) {
            assert_relative_eq!(a, b, max_relative = 1e-5);
        }
    }

    #[test]
    fn degenerate_input_yields_zeros() {
        let lms = Landmarks::from_coords([(0.4, 0.7); 21]);
        let normalized = normalize(&lms, NormalizationMode::Relative);
        assert_eq!(normalized, vec![0.0; 42]);
        assert!(normalized.iter().all(|v| !v.is_nan()));
    }

    #[test]
    fn empty_landmarks() {
        let lms = Landmarks::from_coords(std::iter::empty::<(f32, f32)>());
        assert_eq!(normalize(&lms, NormalizationMode::Relative), Vec::<f32>::new());
    }

    #[test]
    fn image_scaled_mode() {
        let lms = Landmarks::from_coords([(0.5, 0.25), (1.0, 0.5)]);
        let normalized = normalize(
            &lms,
            NormalizationMode::ImageScaled {
                width: 100,
                height: 200,
            },
        );
        // Pixel values 50, 50, 100, 100; max abs 100.
        let expected = [0.5, 0.5, 1.0, 1.0];
        for (value, expected) in normalized.iter().zip(&expected) {
            assert_relative_eq!(value, expected, max_relative = 1e-6);
        }
    }

    #[test]
    fn negative_coordinates_use_absolute_maximum() {
        let lms = Landmarks::from_coords([(0.5, 0.5), (0.1, 0.5)]);
        let normalized = normalize(&lms, NormalizationMode::Relative);
        // Largest magnitude is -0.4, so that value maps to -1.0.
        assert_relative_eq!(normalized[2], -1.0, max_relative = 1e-6);
        assert!(normalized.iter().all(|v| v.abs() <= 1.0));
    }

    #[test]
    fn feature_vector_width() {
        for num_landmarks in [1, 2, 21] {
            let lms = Landmarks::from_coords(vec![(0.1, 0.2); num_landmarks]);
            let normalized = normalize(&lms, NormalizationMode::Relative);
            let features =
                assemble(Handedness::Left, &normalized, 1 + 2 * num_landmarks).unwrap();
            assert_eq!(features.len(), 1 + 2 * num_landmarks);
            assert_relative_eq!(features[0], 0.0);
        }
    }

    #[test]
    fn width_mismatch_is_an_error() {
        let normalized = vec![0.0; 42];
        assert!(assemble(Handedness::Left, &normalized, 42).is_err());
        assert!(assemble(Handedness::Left, &normalized, 44).is_err());
        assert!(assemble(Handedness::Left, &normalized, 43).is_ok());
    }
}
