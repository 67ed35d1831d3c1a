//! Evenly spaced sequences.

/// Generate `count` linearly spaced points between `start` and `end` (inclusive).
///
/// - `count == 0` yields an empty vector.
/// - `count == 1` yields `[start]`.
/// - Otherwise the first value is exactly `start` and the last exactly `end`.
///
/// No ordering is imposed on `start`/`end`: a descending range produces a
/// descending sequence.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let last = count - 1;
            let span = end - start;
            let mut out = Vec::with_capacity(count);
            for i in 0..last {
                out.push(start + span * (i as f64 / last as f64));
            }
            out.push(end);
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_includes_endpoints() {
        let v = linspace(1e-4, 0.02, 1000);
        assert_eq!(v.len(), 1000);
        assert_eq!(v[0], 1e-4);
        assert_eq!(v[999], 0.02);
    }

    #[test]
    fn linspace_single_point_is_start() {
        assert_eq!(linspace(0.3, 0.7, 1), vec![0.3]);
        assert!(linspace(0.3, 0.7, 0).is_empty());
    }

    #[test]
    fn linspace_is_evenly_spaced() {
        let v = linspace(0.0, 1.0, 5);
        for (i, x) in v.iter().enumerate() {
            assert!((x - i as f64 * 0.25).abs() < 1e-15);
        }
    }

    #[test]
    fn linspace_allows_descending_range() {
        let v = linspace(0.02, 1e-4, 3);
        assert!(v[0] > v[1] && v[1] > v[2]);
    }
}
