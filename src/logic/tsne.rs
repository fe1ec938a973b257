//! t-SNE projection to 2D
//!
//! Converts pairwise distances in the TF-IDF space into conditional
//! Gaussian affinities (bandwidth found per point by binary search
//! against the target perplexity), symmetrizes them, and runs momentum
//! gradient descent with per-coordinate gains on a Student-t layout.
//! Seeded, so one seed gives one layout; coordinates are only
//! meaningful relative to each other within a single run.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{AppError, AppResult};

const MAX_ITERATIONS: usize = 500;
const EXAGGERATION_ITERATIONS: usize = 100;
const EXAGGERATION: f64 = 4.0;
const LEARNING_RATE: f64 = 100.0;
const INITIAL_MOMENTUM: f64 = 0.5;
const FINAL_MOMENTUM: f64 = 0.8;
const MIN_PROB: f64 = 1e-12;

/// Project rows of `data` to 2D
pub fn tsne(data: &Array2<f64>, perplexity: f64, seed: u64) -> AppResult<Array2<f64>> {
    let n = data.nrows();
    if perplexity <= 0.0 || perplexity >= n as f64 {
        return Err(AppError::InvalidPerplexity(format!(
            "perplexity {} must be in (0, {})",
            perplexity, n
        )));
    }

    let distances = pairwise_squared_distances(data);
    let p = joint_probabilities(&distances, perplexity);

    // Small seeded Gaussian starting layout
    let mut rng = StdRng::seed_from_u64(seed);
    let mut layout = Array2::<f64>::zeros((n, 2));
    layout.mapv_inplace(|_| gaussian(&mut rng) * 1e-4);

    let mut velocity = Array2::<f64>::zeros((n, 2));
    let mut gains = Array2::<f64>::ones((n, 2));

    for iteration in 0..MAX_ITERATIONS {
        let exaggeration = if iteration < EXAGGERATION_ITERATIONS {
            EXAGGERATION
        } else {
            1.0
        };
        let momentum = if iteration < EXAGGERATION_ITERATIONS {
            INITIAL_MOMENTUM
        } else {
            FINAL_MOMENTUM
        };

        // Student-t affinities in the layout
        let mut num = Array2::<f64>::zeros((n, n));
        let mut num_sum = 0.0;
        for i in 0..n {
            for j in (i + 1)..n {
                let dx = layout[[i, 0]] - layout[[j, 0]];
                let dy = layout[[i, 1]] - layout[[j, 1]];
                let q = 1.0 / (1.0 + dx * dx + dy * dy);
                num[[i, j]] = q;
                num[[j, i]] = q;
                num_sum += 2.0 * q;
            }
        }

        // Gradient of the KL divergence
        let mut gradient = Array2::<f64>::zeros((n, 2));
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let q = (num[[i, j]] / num_sum).max(MIN_PROB);
                let coeff = 4.0 * (exaggeration * p[[i, j]] - q) * num[[i, j]];
                gradient[[i, 0]] += coeff * (layout[[i, 0]] - layout[[j, 0]]);
                gradient[[i, 1]] += coeff * (layout[[i, 1]] - layout[[j, 1]]);
            }
        }

        // Gain-adjusted momentum update
        for i in 0..n {
            for d in 0..2 {
                let same_sign = gradient[[i, d]].signum() == velocity[[i, d]].signum();
                gains[[i, d]] = if same_sign {
                    (gains[[i, d]] * 0.8).max(0.01)
                } else {
                    gains[[i, d]] + 0.2
                };
                velocity[[i, d]] = momentum * velocity[[i, d]]
                    - LEARNING_RATE * gains[[i, d]] * gradient[[i, d]];
                layout[[i, d]] += velocity[[i, d]];
            }
        }

        // Keep the layout centered
        for d in 0..2 {
            let mean = layout.column(d).mean().unwrap_or(0.0);
            layout.column_mut(d).mapv_inplace(|v| v - mean);
        }
    }

    Ok(layout)
}

/// Symmetrized joint probabilities from squared distances
fn joint_probabilities(distances: &Array2<f64>, perplexity: f64) -> Array2<f64> {
    let n = distances.nrows();
    let target_entropy = perplexity.ln();
    let mut conditional = Array2::<f64>::zeros((n, n));

    for i in 0..n {
        // Binary search the Gaussian precision for this point
        let mut beta = 1.0;
        let mut beta_min = f64::NEG_INFINITY;
        let mut beta_max = f64::INFINITY;

        for _ in 0..50 {
            let (entropy, row) = row_affinities(distances, i, beta);
            let diff = entropy - target_entropy;
            if diff.abs() < 1e-5 {
                conditional.row_mut(i).assign(&row);
                break;
            }
            if diff > 0.0 {
                beta_min = beta;
                beta = if beta_max.is_infinite() { beta * 2.0 } else { (beta + beta_max) / 2.0 };
            } else {
                beta_max = beta;
                beta = if beta_min.is_infinite() { beta / 2.0 } else { (beta + beta_min) / 2.0 };
            }
            conditional.row_mut(i).assign(&row);
        }
    }

    // Symmetrize and normalize to joint probabilities
    let mut joint = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            joint[[i, j]] =
                ((conditional[[i, j]] + conditional[[j, i]]) / (2.0 * n as f64)).max(MIN_PROB);
        }
    }
    for i in 0..n {
        joint[[i, i]] = MIN_PROB;
    }
    joint
}

/// Shannon entropy and normalized affinities of row `i` at precision `beta`
fn row_affinities(
    distances: &Array2<f64>,
    i: usize,
    beta: f64,
) -> (f64, ndarray::Array1<f64>) {
    let n = distances.nrows();
    let mut row = ndarray::Array1::<f64>::zeros(n);
    let mut sum = 0.0;
    for j in 0..n {
        if j != i {
            let p = (-beta * distances[[i, j]]).exp();
            row[j] = p;
            sum += p;
        }
    }

    if sum <= 0.0 {
        return (0.0, row);
    }

    let mut entropy = 0.0;
    for j in 0..n {
        row[j] /= sum;
        if row[j] > MIN_PROB {
            entropy -= row[j] * row[j].ln();
        }
    }
    (entropy, row)
}

fn pairwise_squared_distances(data: &Array2<f64>) -> Array2<f64> {
    let n = data.nrows();
    let mut distances = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in (i + 1)..n {
            let dist = data
                .row(i)
                .iter()
                .zip(data.row(j).iter())
                .map(|(a, b)| (a - b) * (a - b))
                .sum::<f64>();
            distances[[i, j]] = dist;
            distances[[j, i]] = dist;
        }
    }
    distances
}

/// Box-Muller standard normal draw
fn gaussian(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample_data() -> Array2<f64> {
        array![
            [1.0, 0.0, 0.0],
            [0.9, 0.1, 0.0],
            [0.95, 0.05, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.1, 0.9],
            [0.05, 0.0, 0.95],
        ]
    }

    #[test]
    fn test_output_row_per_input_row() {
        let layout = tsne(&sample_data(), 2.0, 42).unwrap();
        assert_eq!(layout.dim(), (6, 2));
    }

    #[test]
    fn test_coordinates_are_finite() {
        let layout = tsne(&sample_data(), 2.0, 42).unwrap();
        assert!(layout.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_same_seed_same_layout() {
        let data = sample_data();
        let a = tsne(&data, 2.0, 42).unwrap();
        let b = tsne(&data, 2.0, 42).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_perplexity() {
        let data = sample_data();
        assert!(matches!(
            tsne(&data, 6.0, 42),
            Err(AppError::InvalidPerplexity(_))
        ));
        assert!(matches!(
            tsne(&data, 30.0, 42),
            Err(AppError::InvalidPerplexity(_))
        ));
        assert!(matches!(
            tsne(&data, 0.0, 42),
            Err(AppError::InvalidPerplexity(_))
        ));
    }

    #[test]
    fn test_pairwise_distances_symmetric() {
        let distances = pairwise_squared_distances(&sample_data());
        for i in 0..6 {
            assert_eq!(distances[[i, i]], 0.0);
            for j in 0..6 {
                assert_eq!(distances[[i, j]], distances[[j, i]]);
            }
        }
    }

    #[test]
    fn test_joint_probabilities_sum_to_one() {
        let distances = pairwise_squared_distances(&sample_data());
        let p = joint_probabilities(&distances, 2.0);
        let total: f64 = p.iter().sum();
        assert!((total - 1.0).abs() < 1e-3);
    }
}
