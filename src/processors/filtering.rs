//! Longitude window filtering of projected vote map rows.

/// Rows of a projected vote map that fall inside a longitude window.
///
/// Borrows the full longitude, depth and vote columns and keeps only the
/// selected row indices, in their original order.
#[derive(Debug, Clone)]
pub struct RegionView<'a> {
    lon: &'a [f64],
    depth: &'a [f64],
    votes: &'a [u32],
    rows: Vec<usize>,
}

impl<'a> RegionView<'a> {
    /// Number of rows in the view.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Indices of the selected rows in the source columns.
    #[inline]
    pub fn row_indices(&self) -> &[usize] {
        &self.rows
    }

    /// Iterate over `(lon, depth, votes)` for each selected row.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64, u32)> + '_ {
        self.rows
            .iter()
            .map(move |&i| (self.lon[i], self.depth[i], self.votes[i]))
    }
}

/// Keep rows whose longitude lies in `[lon_min, lon_max]` (inclusive).
///
/// # Arguments
///
/// * `lon` - Longitude in degrees per row
/// * `depth` - Depth in km per row
/// * `votes` - Vote count per row
/// * `lon_min` - Western bound
/// * `lon_max` - Eastern bound
///
/// # Returns
///
/// A view over the matching rows. An empty view is a valid result.
pub fn filter_by_longitude<'a>(
    lon: &'a [f64],
    depth: &'a [f64],
    votes: &'a [u32],
    lon_min: f64,
    lon_max: f64,
) -> RegionView<'a> {
    debug_assert!(
        lon.len() == depth.len() && lon.len() == votes.len(),
        "lon, depth and votes must have same length"
    );

    let n = lon.len().min(depth.len()).min(votes.len());
    let rows: Vec<usize> = (0..n)
        .filter(|&i| lon[i] >= lon_min && lon[i] <= lon_max)
        .collect();

    RegionView {
        lon,
        depth,
        votes,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_membership() {
        let lon = vec![-60.0, -90.0, -80.0, -40.0, -39.999, -80.001];
        let depth = vec![100.0, 200.0, 300.0, 400.0, 500.0, 600.0];
        let votes = vec![1, 2, 3, 4, 5, 6];

        let view = filter_by_longitude(&lon, &depth, &votes, -80.0, -40.0);

        assert_eq!(view.row_indices(), &[0, 2, 3]);
        let rows: Vec<(f64, f64, u32)> = view.iter().collect();
        assert_eq!(
            rows,
            vec![(-60.0, 100.0, 1), (-80.0, 300.0, 3), (-40.0, 400.0, 4)]
        );
    }

    #[test]
    fn test_preserves_order() {
        let lon = vec![-45.0, -75.0, -50.0, -70.0];
        let depth = vec![1.0, 2.0, 3.0, 4.0];
        let votes = vec![0, 0, 0, 0];

        let view = filter_by_longitude(&lon, &depth, &votes, -80.0, -40.0);
        let depths: Vec<f64> = view.iter().map(|(_, d, _)| d).collect();
        assert_eq!(depths, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_no_matches_is_empty() {
        let lon = vec![10.0, 20.0];
        let depth = vec![1.0, 2.0];
        let votes = vec![1, 1];

        let view = filter_by_longitude(&lon, &depth, &votes, -80.0, -40.0);
        assert!(view.is_empty());
        assert_eq!(view.len(), 0);
        assert_eq!(view.iter().count(), 0);
    }

    #[test]
    fn test_empty_input() {
        let view = filter_by_longitude(&[], &[], &[], -80.0, -40.0);
        assert!(view.is_empty());
    }
}
