//! Confidence scoring and segment normalization.
//!
//! Confidence is the proxy `1 - no_speech_prob`, not a calibrated score.
//! Downstream consumers rely on its range, so the formula stays as is.

use thiserror::Error;

use super::raw_transcription::RawSegment;
use super::segment::Segment;

/// No-speech probability assumed when the recognizer omits one.
pub const DEFAULT_NO_SPEECH_PROB: f64 = 0.5;

pub const CONFIDENCE_DECIMALS: i32 = 3;
pub const TIMING_DECIMALS: i32 = 2;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DerivationError {
    #[error("segment {id} has non-finite no-speech probability {value}")]
    NonFiniteProbability { id: usize, value: f64 },
    #[error("segment {id} has non-finite timing ({start}, {end})")]
    NonFiniteTiming { id: usize, start: f64, end: f64 },
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Unrounded `1 - p`, clamped to [0, 1].
fn confidence_term(segment: &RawSegment) -> Result<f64, DerivationError> {
    let p = segment.no_speech_prob.unwrap_or(DEFAULT_NO_SPEECH_PROB);
    if !p.is_finite() {
        return Err(DerivationError::NonFiniteProbability {
            id: segment.id,
            value: p,
        });
    }
    Ok((1.0 - p).clamp(0.0, 1.0))
}

/// Per-segment confidence, rounded to three decimals.
pub fn segment_confidence(segment: &RawSegment) -> Result<f64, DerivationError> {
    confidence_term(segment).map(|c| round_to(c, CONFIDENCE_DECIMALS))
}

/// Mean segment confidence, rounded to three decimals. Zero segments yield 0.0.
pub fn aggregate_confidence(segments: &[RawSegment]) -> Result<f64, DerivationError> {
    if segments.is_empty() {
        return Ok(0.0);
    }

    let mut total = 0.0;
    for segment in segments {
        total += confidence_term(segment)?;
    }
    Ok(round_to(total / segments.len() as f64, CONFIDENCE_DECIMALS))
}

/// Map raw segments to envelope segments: trimmed text, timing at two
/// decimals, confidence at three.
pub fn normalize_segments(segments: &[RawSegment]) -> Result<Vec<Segment>, DerivationError> {
    segments
        .iter()
        .map(|raw| {
            if !raw.start.is_finite() || !raw.end.is_finite() {
                return Err(DerivationError::NonFiniteTiming {
                    id: raw.id,
                    start: raw.start,
                    end: raw.end,
                });
            }
            Ok(Segment {
                id: raw.id,
                text: raw.text.trim().to_string(),
                start: round_to(raw.start, TIMING_DECIMALS),
                end: round_to(raw.end, TIMING_DECIMALS),
                confidence: segment_confidence(raw)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn raw(id: usize, no_speech_prob: Option<f64>) -> RawSegment {
        RawSegment {
            id,
            text: format!("  segment {id} "),
            start: id as f64 * 1.004,
            end: id as f64 * 1.004 + 0.996,
            no_speech_prob,
        }
    }

    #[rstest]
    #[case(0.12345, 3, 0.123)]
    #[case(0.1235, 2, 0.12)]
    #[case(1.005, 0, 1.0)]
    #[case(2.675, 1, 2.7)]
    #[case(0.0, 3, 0.0)]
    fn test_round_to(#[case] value: f64, #[case] decimals: i32, #[case] expected: f64) {
        assert_relative_eq!(round_to(value, decimals), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_aggregate_of_no_segments_is_zero() {
        assert_eq!(aggregate_confidence(&[]).unwrap(), 0.0);
    }

    #[test]
    fn test_aggregate_is_mean_of_inverse_no_speech() {
        let segments = vec![raw(0, Some(0.1)), raw(1, Some(0.3)), raw(2, Some(0.2))];
        assert_relative_eq!(aggregate_confidence(&segments).unwrap(), 0.8, epsilon = 1e-12);
    }

    #[test]
    fn test_aggregate_rounds_to_three_decimals() {
        let segments = vec![raw(0, Some(0.0)), raw(1, Some(0.0)), raw(2, Some(1.0))];
        assert_relative_eq!(aggregate_confidence(&segments).unwrap(), 0.667, epsilon = 1e-12);
    }

    #[test]
    fn test_aggregate_uses_default_for_missing_probability() {
        let segments = vec![raw(0, None), raw(1, Some(0.0))];
        assert_relative_eq!(aggregate_confidence(&segments).unwrap(), 0.75, epsilon = 1e-12);
    }

    #[rstest]
    #[case(Some(-0.4), 1.0)]
    #[case(Some(1.7), 0.0)]
    #[case(None, 0.5)]
    #[case(Some(0.2501), 0.75)]
    fn test_segment_confidence_is_clamped_and_rounded(
        #[case] prob: Option<f64>,
        #[case] expected: f64,
    ) {
        let c = segment_confidence(&raw(0, prob)).unwrap();
        assert_relative_eq!(c, expected, epsilon = 1e-12);
        assert!((0.0..=1.0).contains(&c));
    }

    #[test]
    fn test_non_finite_probability_is_an_error() {
        let segments = vec![raw(0, Some(0.1)), raw(1, Some(f64::NAN))];
        let err = aggregate_confidence(&segments).unwrap_err();
        assert!(matches!(err, DerivationError::NonFiniteProbability { id: 1, .. }));
    }

    #[test]
    fn test_normalize_trims_and_rounds() {
        let segments = normalize_segments(&[raw(3, Some(0.04))]).unwrap();
        assert_eq!(segments.len(), 1);
        let seg = &segments[0];
        assert_eq!(seg.id, 3);
        assert_eq!(seg.text, "segment 3");
        assert_relative_eq!(seg.start, 3.01, epsilon = 1e-12);
        assert_relative_eq!(seg.end, 4.01, epsilon = 1e-12);
        assert_relative_eq!(seg.confidence, 0.96, epsilon = 1e-12);
    }

    #[test]
    fn test_normalize_preserves_order_and_count() {
        let input: Vec<_> = (0..5).map(|i| raw(i, Some(0.1))).collect();
        let out = normalize_segments(&input).unwrap();
        let ids: Vec<_> = out.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_normalize_missing_probability_gives_neutral_confidence() {
        let out = normalize_segments(&[raw(0, None)]).unwrap();
        assert_eq!(out[0].confidence, 0.5);
    }

    #[test]
    fn test_normalize_rejects_non_finite_timing() {
        let mut bad = raw(0, Some(0.1));
        bad.end = f64::INFINITY;
        let err = normalize_segments(&[bad]).unwrap_err();
        assert!(matches!(err, DerivationError::NonFiniteTiming { id: 0, .. }));
    }
}
