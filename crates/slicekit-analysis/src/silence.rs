//! Silence detection.
//!
//! Levels are mean-square power in dBFS: a full-scale square wave reads
//! 0 dB, digital silence reads negative infinity.

/// Default silence threshold in dBFS
pub const DEFAULT_SILENCE_THRESHOLD_DB: f32 = -70.0;

/// Level of `samples` in dBFS.
pub fn level_db(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return f32::NEG_INFINITY;
    }
    let sum_sq: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    let mean_square = sum_sq / samples.len() as f64;
    (10.0 * mean_square.log10()) as f32
}

/// Whether `samples` are below `threshold_db`.
pub fn is_silent(samples: &[f32], threshold_db: f32) -> bool {
    level_db(samples) < threshold_db
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_level_of_full_scale_square() {
        let square: Vec<f32> = (0..256)
            .map(|i| if i % 2 == 0 { 1.0 } else { -1.0 })
            .collect();
        assert_relative_eq!(level_db(&square), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_level_of_half_amplitude() {
        assert_relative_eq!(level_db(&[0.5; 64]), -6.0206, epsilon = 1e-3);
    }

    #[test]
    fn test_digital_silence() {
        assert_eq!(level_db(&[0.0; 64]), f32::NEG_INFINITY);
        assert_eq!(level_db(&[]), f32::NEG_INFINITY);
        assert!(is_silent(&[0.0; 64], DEFAULT_SILENCE_THRESHOLD_DB));
    }

    #[test]
    fn test_threshold() {
        // -80 dBFS
        let quiet = [1e-4f32; 128];
        assert!(is_silent(&quiet, -70.0));
        assert!(!is_silent(&quiet, -90.0));
    }
}
