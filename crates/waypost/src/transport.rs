//! Outbound finishing for SMS-shaped transports.

use tracing::warn;

/// Hard per-message character limit enforced just before handoff to the
/// transport. Matches the long-message concatenation ceiling of common SMS
/// gateways.
pub const TRANSPORT_SEGMENT_LIMIT: usize = 1600;

/// Finish reply segments for sending: number them `i/n: ` when there is more
/// than one, then clamp each to [`TRANSPORT_SEGMENT_LIMIT`] characters. The
/// clamp counts characters, never splitting a code point.
pub fn finalize_segments(segments: Vec<String>) -> Vec<String> {
    let total = segments.len();
    segments
        .into_iter()
        .enumerate()
        .map(|(i, segment)| {
            let numbered = if total > 1 {
                format!("{}/{total}: {segment}", i + 1)
            } else {
                segment
            };
            clamp_chars(numbered)
        })
        .collect()
}

fn clamp_chars(text: String) -> String {
    if text.chars().count() <= TRANSPORT_SEGMENT_LIMIT {
        return text;
    }
    warn!(
        chars = text.chars().count(),
        limit = TRANSPORT_SEGMENT_LIMIT,
        "Clamping oversized outbound segment"
    );
    text.chars().take(TRANSPORT_SEGMENT_LIMIT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_segment_is_untouched() {
        let finished = finalize_segments(vec!["Found 2 shelters near 68850:".to_string()]);
        assert_eq!(finished, vec!["Found 2 shelters near 68850:"]);
    }

    #[test]
    fn test_multiple_segments_are_numbered() {
        let finished = finalize_segments(vec!["first".to_string(), "second".to_string()]);
        assert_eq!(finished, vec!["1/2: first", "2/2: second"]);
    }

    #[test]
    fn test_empty_input_yields_empty() {
        assert!(finalize_segments(Vec::new()).is_empty());
    }

    #[test]
    fn test_oversized_segment_is_clamped() {
        let long = "x".repeat(TRANSPORT_SEGMENT_LIMIT + 50);
        let finished = finalize_segments(vec![long]);
        assert_eq!(finished[0].chars().count(), TRANSPORT_SEGMENT_LIMIT);
    }

    #[test]
    fn test_numbering_counts_toward_the_limit() {
        let long = "x".repeat(TRANSPORT_SEGMENT_LIMIT);
        let finished = finalize_segments(vec![long.clone(), "short".to_string()]);
        assert_eq!(finished[0].chars().count(), TRANSPORT_SEGMENT_LIMIT);
        assert!(finished[0].starts_with("1/2: "));
        assert_eq!(finished[1], "2/2: short");
    }

    #[test]
    fn test_clamp_respects_char_boundaries() {
        // Multibyte characters: clamping counts chars, not bytes
        let long = "ñ".repeat(TRANSPORT_SEGMENT_LIMIT + 10);
        let finished = finalize_segments(vec![long]);
        assert_eq!(finished[0].chars().count(), TRANSPORT_SEGMENT_LIMIT);
        assert!(finished[0].chars().all(|c| c == 'ñ'));
    }
}
