//! Vector distance functions and the [`Distance`] metric seam.
//!
//! Ranking uses [`squared_l2`] (monotonic in the true distance, no `sqrt`
//! per candidate); reported distances use [`l2_distance`].

/// A metric pluggable into [`FlatIndex`](crate::index::FlatIndex).
///
/// [`score`](Distance::score) ranks candidates (smaller is closer) and must
/// be monotonic in [`report`](Distance::report)ed distance, so a metric can
/// rank on a cheaper quantity than the one it reports.
pub trait Distance: Send + Sync + 'static {
    fn score(a: &[f32], b: &[f32]) -> f32;

    /// Convert a ranking score into the distance returned to callers.
    fn report(score: f32) -> f32 {
        score
    }
}

/// Euclidean distance: ranks on squared L2, reports L2.
#[derive(Debug, Clone, Copy, Default)]
pub struct L2;

impl Distance for L2 {
    fn score(a: &[f32], b: &[f32]) -> f32 {
        squared_l2(a, b)
    }

    fn report(score: f32) -> f32 {
        score.sqrt()
    }
}

/// Squared Euclidean distance.
///
/// Callers must pass equal-length slices; extra trailing elements of the
/// longer slice are ignored.
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Euclidean (L2) distance.
///
/// ```text
/// d(a, b) = sqrt( Σ (aᵢ - bᵢ)² )
/// ```
pub fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    squared_l2(a, b).sqrt()
}

/// Scale `v` to unit length in place. Zero vectors are left untouched.
pub fn normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm < f32::EPSILON {
        return;
    }
    for x in v.iter_mut() {
        *x /= norm;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_l2_identical_is_zero() {
        let v = vec![0.5, -1.0, 2.0];
        assert_eq!(l2_distance(&v, &v), 0.0);
    }

    #[test]
    fn test_l2_three_four_five() {
        let a = vec![0.0, 0.0];
        let b = vec![3.0, 4.0];
        assert!((l2_distance(&a, &b) - 5.0).abs() < 1e-6);
        assert!((squared_l2(&a, &b) - 25.0).abs() < 1e-6);
    }

    #[test]
    fn test_l2_symmetric() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![-1.0, 0.5, 7.0];
        assert_eq!(l2_distance(&a, &b), l2_distance(&b, &a));
    }

    #[test]
    fn test_l2_metric_reports_euclidean() {
        let a = [0.0, 0.0];
        let b = [3.0, 4.0];
        let score = L2::score(&a, &b);
        assert!((score - 25.0).abs() < 1e-6);
        assert!((L2::report(score) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_unit_length() {
        let mut v = vec![3.0, 4.0];
        normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_zero_vector() {
        let mut v = vec![0.0, 0.0, 0.0];
        normalize(&mut v);
        assert_eq!(v, vec![0.0, 0.0, 0.0]);
    }
}
