use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spinbound::Point;

/// Two populations separated by a gap around `y = k * x + b`.
pub fn two_populations(seed: u64, per_class: usize, k: f64, b: f64, half_gap: f64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut points = Vec::with_capacity(per_class * 2);
    for _ in 0..per_class {
        let x = rng.random_range(0.0..2.5);
        points.push(Point::new(x, k * x + b + half_gap + rng.random_range(0.0..0.8)));
        let x = rng.random_range(0.0..2.5);
        points.push(Point::new(x, k * x + b - half_gap - rng.random_range(0.0..0.8)));
    }
    points
}

/// Unstructured cloud for property checks.
pub fn uniform_cloud(seed: u64, count: usize) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| Point::new(rng.random_range(-2.0..2.0), rng.random_range(-2.0..2.0)))
        .collect()
}

/// Writes points back into the raw units the default loader expects:
/// `diameter = 10^x`, `period = 10^-y`.
pub fn write_asteroid_csv(path: &Path, points: &[Point]) {
    let mut text = String::from("name,diameter (km),Period (h)\n");
    for (idx, point) in points.iter().enumerate() {
        let diameter = 10f64.powf(point.x);
        let period = 10f64.powf(-point.y);
        text.push_str(&format!("a{idx},{diameter},{period}\n"));
    }
    std::fs::write(path, text).expect("write csv");
}
