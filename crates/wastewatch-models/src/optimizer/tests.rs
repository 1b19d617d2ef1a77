use super::*;

fn wide_bounds(dim: usize) -> Bounds {
    Bounds {
        lower: vec![-10.0; dim],
        upper: vec![10.0; dim],
    }
}

#[test]
fn test_quadratic_minimum() {
    // f(x, y) = (x - 3)^2 + (y - 5)^2
    let result = minimize(
        |p| (p[0] - 3.0).powi(2) + (p[1] - 5.0).powi(2),
        &[0.0, 0.0],
        &wide_bounds(2),
        &MinimizeOptions::default(),
    );
    assert!(result.converged);
    assert!((result.point[0] - 3.0).abs() < 0.01, "x = {}", result.point[0]);
    assert!((result.point[1] - 5.0).abs() < 0.01, "y = {}", result.point[1]);
}

#[test]
fn test_respects_bounds() {
    // Unconstrained minimum at (3, 5); box limits the search to [0, 2]^2,
    // so the nearest feasible corner wins.
    let bounds = Bounds {
        lower: vec![0.0, 0.0],
        upper: vec![2.0, 2.0],
    };
    let result = minimize(
        |p| (p[0] - 3.0).powi(2) + (p[1] - 5.0).powi(2),
        &[1.0, 1.0],
        &bounds,
        &MinimizeOptions::default(),
    );
    for (i, v) in result.point.iter().enumerate() {
        assert!(*v >= bounds.lower[i] && *v <= bounds.upper[i], "out of bounds: {v}");
    }
    assert!((result.point[0] - 2.0).abs() < 0.1, "x = {}", result.point[0]);
    assert!((result.point[1] - 2.0).abs() < 0.1, "y = {}", result.point[1]);
}

#[test]
fn test_higher_dimensional_sphere() {
    let dim = 8;
    let target: Vec<f64> = (0..dim).map(|i| 0.5 * i as f64 - 2.0).collect();
    let target_obj = target.clone();
    let result = minimize(
        move |p| {
            p.iter()
                .zip(target_obj.iter())
                .map(|(x, t)| (x - t).powi(2))
                .sum()
        },
        &vec![0.0; dim],
        &wide_bounds(dim),
        &MinimizeOptions::default(),
    );
    for (x, t) in result.point.iter().zip(target.iter()) {
        assert!((x - t).abs() < 0.05, "coordinate {x} vs target {t}");
    }
}

#[test]
fn test_start_at_optimum_converges_immediately() {
    let result = minimize(
        |p| p[0].powi(2) + p[1].powi(2),
        &[0.0, 0.0],
        &wide_bounds(2),
        &MinimizeOptions::default(),
    );
    assert!(result.converged);
    assert!(result.value < 1e-10);
}

#[test]
fn test_deterministic() {
    let run = || {
        minimize(
            |p| (p[0] - 1.0).powi(2) + (p[1] + 2.0).powi(4),
            &[5.0, 5.0],
            &wide_bounds(2),
            &MinimizeOptions::default(),
        )
    };
    let a = run();
    let b = run();
    assert_eq!(a.point, b.point);
    assert_eq!(a.value, b.value);
    assert_eq!(a.iterations, b.iterations);
}

#[test]
fn test_iteration_cap_reported() {
    let options = MinimizeOptions {
        max_iterations: 3,
        tolerance: 1e-12,
    };
    let result = minimize(
        |p| (p[0] - 9.0).powi(2),
        &[-9.0],
        &wide_bounds(1),
        &options,
    );
    assert!(!result.converged);
    assert_eq!(result.iterations, 3);
}
