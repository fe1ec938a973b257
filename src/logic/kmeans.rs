//! Seeded k-means clustering (Lloyd's iteration)
//!
//! Centroids start as k distinct rows sampled with a seeded RNG, so the
//! same seed and input always produce the same assignments. Nearest
//! centroid ties break toward the lowest centroid index.

use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{AppError, AppResult};

const MAX_ITERATIONS: usize = 300;

/// Partition rows of `data` into `k` clusters; returns one cluster id
/// in `[0, k)` per row
pub fn kmeans(data: &Array2<f64>, k: usize, seed: u64) -> AppResult<Vec<usize>> {
    let n = data.nrows();
    if k < 1 || k > n {
        return Err(AppError::InvalidClusterCount(format!(
            "k={} must be in [1, {}]",
            k, n
        )));
    }

    // Seeded init: k distinct rows as starting centroids
    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut rng);

    let dims = data.ncols();
    let mut centroids = Array2::<f64>::zeros((k, dims));
    for (c, &row) in indices.iter().take(k).enumerate() {
        centroids.row_mut(c).assign(&data.row(row));
    }

    let mut assignments = vec![0usize; n];
    for _ in 0..MAX_ITERATIONS {
        // Assignment step
        let mut changed = false;
        for (i, point) in data.rows().into_iter().enumerate() {
            let nearest = nearest_centroid(point, &centroids);
            if assignments[i] != nearest {
                assignments[i] = nearest;
                changed = true;
            }
        }
        if !changed {
            break;
        }

        // Update step: mean of assigned rows; empty clusters keep their
        // previous centroid
        let mut sums = Array2::<f64>::zeros((k, dims));
        let mut counts = vec![0usize; k];
        for (i, point) in data.rows().into_iter().enumerate() {
            let c = assignments[i];
            let mut sum_row = sums.row_mut(c);
            sum_row += &point;
            counts[c] += 1;
        }
        for c in 0..k {
            if counts[c] > 0 {
                let mean = sums.row(c).mapv(|v| v / counts[c] as f64);
                centroids.row_mut(c).assign(&mean);
            }
        }
    }

    Ok(assignments)
}

/// Index of the closest centroid by Euclidean distance; strict `<`
/// keeps the lowest index on ties
fn nearest_centroid(point: ArrayView1<f64>, centroids: &Array2<f64>) -> usize {
    let mut best = 0usize;
    let mut best_dist = f64::INFINITY;
    for (c, centroid) in centroids.rows().into_iter().enumerate() {
        let dist = point
            .iter()
            .zip(centroid.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>();
        if dist < best_dist {
            best_dist = dist;
            best = c;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn two_blobs() -> Array2<f64> {
        array![
            [0.0, 0.1],
            [0.1, 0.0],
            [0.05, 0.05],
            [10.0, 10.1],
            [10.1, 10.0],
            [9.95, 10.05],
        ]
    }

    #[test]
    fn test_assignments_in_range() {
        let data = two_blobs();
        let assignments = kmeans(&data, 2, 42).unwrap();
        assert_eq!(assignments.len(), data.nrows());
        assert!(assignments.iter().all(|&c| c < 2));
    }

    #[test]
    fn test_separates_well_spaced_blobs() {
        let assignments = kmeans(&two_blobs(), 2, 42).unwrap();
        assert_eq!(assignments[0], assignments[1]);
        assert_eq!(assignments[1], assignments[2]);
        assert_eq!(assignments[3], assignments[4]);
        assert_eq!(assignments[4], assignments[5]);
        assert_ne!(assignments[0], assignments[3]);
    }

    #[test]
    fn test_same_seed_same_assignments() {
        let data = two_blobs();
        let a = kmeans(&data, 2, 7).unwrap();
        let b = kmeans(&data, 2, 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_k_one_puts_everything_together() {
        let assignments = kmeans(&two_blobs(), 1, 42).unwrap();
        assert!(assignments.iter().all(|&c| c == 0));
    }

    #[test]
    fn test_invalid_cluster_count() {
        let data = two_blobs();
        assert!(matches!(
            kmeans(&data, 0, 42),
            Err(AppError::InvalidClusterCount(_))
        ));
        assert!(matches!(
            kmeans(&data, 7, 42),
            Err(AppError::InvalidClusterCount(_))
        ));
    }

    #[test]
    fn test_tie_breaks_to_lowest_index() {
        // Two identical centroid candidates: every point is equidistant
        let data = array![[1.0, 1.0], [1.0, 1.0]];
        let assignments = kmeans(&data, 2, 42).unwrap();
        // First assignment pass sees identical centroids, so everything
        // lands on centroid 0
        assert_eq!(assignments, vec![0, 0]);
    }
}
