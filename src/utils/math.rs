//! # Scoring Mathematics
//!
//! Small numeric helpers shared by validation and quality analysis.

/// Maps a value onto a score using ascending upper-bound thresholds.
///
/// The first `(limit, score)` pair whose limit is `>= value` wins; values
/// above every limit get `fallback`.
///
/// # Examples
///
/// ```
/// use delve::utils::threshold_score;
///
/// let table = [(5.0, 100.0), (8.0, 80.0)];
/// assert_eq!(threshold_score(4.0, &table, 20.0), 100.0);
/// assert_eq!(threshold_score(8.0, &table, 20.0), 80.0);
/// assert_eq!(threshold_score(9.0, &table, 20.0), 20.0);
/// ```
pub fn threshold_score(value: f64, table: &[(f64, f64)], fallback: f64) -> f64 {
    table
        .iter()
        .find(|(limit, _)| value <= *limit)
        .map(|&(_, score)| score)
        .unwrap_or(fallback)
}

/// Sum of `score * weight` over all pairs.
pub fn weighted_sum(parts: &[(f64, f64)]) -> f64 {
    parts.iter().map(|(score, weight)| score * weight).sum()
}

/// Clamps a score into `[0, 100]`.
pub fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}

/// Share of `part` in `whole` as a percentage, 100 when `whole` is zero.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        100.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_score_boundaries() {
        let table = [(5.0, 100.0), (8.0, 80.0), (12.0, 60.0)];
        assert_eq!(threshold_score(0.0, &table, 20.0), 100.0);
        assert_eq!(threshold_score(5.0, &table, 20.0), 100.0);
        assert_eq!(threshold_score(5.5, &table, 20.0), 80.0);
        assert_eq!(threshold_score(12.0, &table, 20.0), 60.0);
        assert_eq!(threshold_score(12.1, &table, 20.0), 20.0);
    }

    #[test]
    fn test_weighted_sum() {
        assert_eq!(weighted_sum(&[(100.0, 0.5), (50.0, 0.5)]), 75.0);
        assert_eq!(weighted_sum(&[]), 0.0);
    }

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(42.5), 42.5);
        assert_eq!(clamp_score(120.0), 100.0);
        assert_eq!(clamp_score(-5.0), 0.0);
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(1, 4), 25.0);
        assert_eq!(percentage(0, 0), 100.0);
    }
}
