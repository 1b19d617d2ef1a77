//! Bound-constrained Nelder-Mead simplex minimizer.
//!
//! The fitter's objective (one-step-ahead squared error over smoothing
//! weights plus the full initial state) is non-smooth at the box edges, so a
//! derivative-free simplex with clamping is used rather than gradient code.

/// Per-coordinate box constraints.
#[derive(Debug, Clone)]
pub struct Bounds {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl Bounds {
    pub fn clamp(&self, point: &mut [f64]) {
        for (i, v) in point.iter_mut().enumerate() {
            *v = v.clamp(self.lower[i], self.upper[i]);
        }
    }
}

#[derive(Debug, Clone)]
pub struct MinimizeOptions {
    pub max_iterations: usize,
    /// Relative spread of objective values across the simplex below which
    /// the search is considered converged.
    pub tolerance: f64,
}

impl Default for MinimizeOptions {
    fn default() -> Self {
        Self {
            max_iterations: 50_000,
            tolerance: 1e-6,
        }
    }
}

/// Result of a minimization run.
#[derive(Debug, Clone)]
pub struct Minimum {
    pub point: Vec<f64>,
    pub value: f64,
    pub converged: bool,
    pub iterations: usize,
}

/// Fraction of each coordinate's bound range used for the initial simplex.
const INITIAL_STEP_FRACTION: f64 = 0.1;
/// Objective values at or below this are treated as an exact optimum.
const ABSOLUTE_FLOOR: f64 = 1e-12;

/// Minimize `f` over the box `bounds`, starting from `start`.
///
/// Deterministic: identical inputs always produce identical output.
pub fn minimize<F>(f: F, start: &[f64], bounds: &Bounds, options: &MinimizeOptions) -> Minimum
where
    F: Fn(&[f64]) -> f64,
{
    let dim = start.len();
    let n_vertices = dim + 1;

    let mut origin = start.to_vec();
    bounds.clamp(&mut origin);

    // Initial simplex: origin plus one perturbed vertex per coordinate.
    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n_vertices);
    simplex.push(origin.clone());
    for i in 0..dim {
        let mut vertex = origin.clone();
        let step = (bounds.upper[i] - bounds.lower[i]) * INITIAL_STEP_FRACTION;
        vertex[i] = (vertex[i] + step).min(bounds.upper[i]);
        if (vertex[i] - origin[i]).abs() < 1e-12 {
            vertex[i] = (vertex[i] - step).max(bounds.lower[i]);
        }
        simplex.push(vertex);
    }

    let mut values: Vec<f64> = simplex.iter().map(|v| f(v)).collect();

    let mut iterations = 0;
    let mut converged = false;

    while iterations < options.max_iterations {
        iterations += 1;

        let mut order: Vec<usize> = (0..n_vertices).collect();
        order.sort_by(|&a, &b| {
            values[a]
                .partial_cmp(&values[b])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let best = order[0];
        let worst = order[n_vertices - 1];
        let second_worst = order[n_vertices - 2];

        if has_converged(values[best], values[worst], options.tolerance) {
            converged = true;
            break;
        }

        // Centroid of all vertices except the worst.
        let mut centroid = vec![0.0; dim];
        for &idx in &order[..n_vertices - 1] {
            for (j, c) in centroid.iter_mut().enumerate() {
                *c += simplex[idx][j];
            }
        }
        for c in centroid.iter_mut() {
            *c /= dim as f64;
        }

        // Reflection.
        let mut reflected: Vec<f64> = centroid
            .iter()
            .zip(simplex[worst].iter())
            .map(|(&c, &w)| 2.0 * c - w)
            .collect();
        bounds.clamp(&mut reflected);
        let f_reflected = f(&reflected);

        if f_reflected < values[best] {
            // Expansion.
            let mut expanded: Vec<f64> = centroid
                .iter()
                .zip(reflected.iter())
                .map(|(&c, &r)| 2.0 * r - c)
                .collect();
            bounds.clamp(&mut expanded);
            let f_expanded = f(&expanded);

            if f_expanded < f_reflected {
                simplex[worst] = expanded;
                values[worst] = f_expanded;
            } else {
                simplex[worst] = reflected;
                values[worst] = f_reflected;
            }
        } else if f_reflected < values[second_worst] {
            simplex[worst] = reflected;
            values[worst] = f_reflected;
        } else {
            // Contraction, toward the better of worst/reflected.
            let (base_point, base_value) = if f_reflected < values[worst] {
                (reflected.clone(), f_reflected)
            } else {
                (simplex[worst].clone(), values[worst])
            };

            let mut contracted: Vec<f64> = centroid
                .iter()
                .zip(base_point.iter())
                .map(|(&c, &p)| 0.5 * (c + p))
                .collect();
            bounds.clamp(&mut contracted);
            let f_contracted = f(&contracted);

            if f_contracted < base_value {
                simplex[worst] = contracted;
                values[worst] = f_contracted;
            } else {
                // Shrink everything toward the best vertex.
                let anchor = simplex[best].clone();
                for &idx in &order[1..] {
                    for j in 0..dim {
                        simplex[idx][j] = 0.5 * (simplex[idx][j] + anchor[j]);
                    }
                    bounds.clamp(&mut simplex[idx]);
                    values[idx] = f(&simplex[idx]);
                }
            }
        }
    }

    let best_idx = values
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0);

    Minimum {
        point: simplex[best_idx].clone(),
        value: values[best_idx],
        converged,
        iterations,
    }
}

fn has_converged(best: f64, worst: f64, tolerance: f64) -> bool {
    if best <= ABSOLUTE_FLOOR {
        return true;
    }
    (worst - best).abs() <= tolerance * (1.0 + best.abs())
}

#[cfg(test)]
mod tests;
