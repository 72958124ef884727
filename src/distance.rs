//! Grid-wide field operators: exact Euclidean distance transform and
//! separable Gaussian blur. Both read a finished input map and write a
//! fresh output map.

use crate::tilemap::Tilemap;

/// Stand-in for "no feature" inside the 1D transform. Kept finite so the
/// parabola intersections never produce NaN.
const FAR: f64 = 1e20;

/// Euclidean distance from every cell to the nearest cell where `features`
/// is true. Cells with no feature anywhere in the map get `f32::INFINITY`.
///
/// Two-pass lower-envelope transform (columns, then rows), so the result is
/// exact rather than a chamfer approximation.
pub fn distance_transform(features: &Tilemap<bool>) -> Tilemap<f32> {
    let width = features.width;
    let height = features.height;

    let mut squared = Tilemap::new_with(width, height, FAR);
    for (x, y, &is_feature) in features.iter() {
        if is_feature {
            squared.set(x, y, 0.0);
        }
    }

    let longest = width.max(height);
    let mut f = vec![0.0f64; longest];
    let mut d = vec![0.0f64; longest];
    let mut v = vec![0usize; longest];
    let mut z = vec![0.0f64; longest + 1];

    // Columns
    for x in 0..width {
        for y in 0..height {
            f[y] = *squared.get(x, y);
        }
        squared_distance_1d(&f[..height], &mut d[..height], &mut v, &mut z);
        for y in 0..height {
            squared.set(x, y, d[y]);
        }
    }

    // Rows
    for y in 0..height {
        for x in 0..width {
            f[x] = *squared.get(x, y);
        }
        squared_distance_1d(&f[..width], &mut d[..width], &mut v, &mut z);
        for x in 0..width {
            squared.set(x, y, d[x]);
        }
    }

    squared.map(|&sq| {
        if sq >= FAR * 0.5 {
            f32::INFINITY
        } else {
            sq.sqrt() as f32
        }
    })
}

/// 1D squared distance transform of a sampled function `f` into `d`.
/// `v` and `z` are scratch buffers of length >= n and n + 1.
fn squared_distance_1d(f: &[f64], d: &mut [f64], v: &mut [usize], z: &mut [f64]) {
    let n = f.len();
    if n == 0 {
        return;
    }

    let intersect = |q: usize, p: usize| -> f64 {
        let (qf, pf) = (q as f64, p as f64);
        ((f[q] + qf * qf) - (f[p] + pf * pf)) / (2.0 * qf - 2.0 * pf)
    };

    let mut k = 0usize;
    v[0] = 0;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;

    for q in 1..n {
        let mut s = intersect(q, v[k]);
        while k > 0 && s <= z[k] {
            k -= 1;
            s = intersect(q, v[k]);
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = f64::INFINITY;
    }

    k = 0;
    for (q, out) in d.iter_mut().enumerate().take(n) {
        while z[k + 1] < q as f64 {
            k += 1;
        }
        let offset = q as f64 - v[k] as f64;
        *out = offset * offset + f[v[k]];
    }
}

/// Separable Gaussian blur. The kernel is truncated at four sigma and edge
/// samples clamp to the border.
pub fn gaussian_blur(map: &Tilemap<f32>, sigma: f32) -> Tilemap<f32> {
    if sigma <= 0.0 {
        return map.clone();
    }

    let radius = (4.0 * sigma + 0.5) as usize;
    let kernel = generate_gaussian_kernel(radius, sigma);
    let half_kernel = radius as i64;
    let width = map.width;
    let height = map.height;

    // Horizontal pass
    let mut horizontal = Tilemap::new_with(width, height, 0.0f32);
    for y in 0..height {
        for x in 0..width {
            let mut sum = 0.0;
            for (ki, &weight) in kernel.iter().enumerate() {
                let sx = (x as i64 + ki as i64 - half_kernel).clamp(0, width as i64 - 1) as usize;
                sum += *map.get(sx, y) * weight;
            }
            horizontal.set(x, y, sum);
        }
    }

    // Vertical pass
    let mut result = Tilemap::new_with(width, height, 0.0f32);
    for y in 0..height {
        for x in 0..width {
            let mut sum = 0.0;
            for (ki, &weight) in kernel.iter().enumerate() {
                let sy = (y as i64 + ki as i64 - half_kernel).clamp(0, height as i64 - 1) as usize;
                sum += *horizontal.get(x, sy) * weight;
            }
            result.set(x, y, sum);
        }
    }

    result
}

/// Normalised 1D Gaussian kernel of length `2 * radius + 1`.
fn generate_gaussian_kernel(radius: usize, sigma: f32) -> Vec<f32> {
    let sigma_sq = sigma * sigma;
    let mut kernel: Vec<f32> = (0..=2 * radius)
        .map(|i| {
            let x = i as f32 - radius as f32;
            (-x * x / (2.0 * sigma_sq)).exp()
        })
        .collect();

    let total: f32 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= total;
    }
    kernel
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force(features: &Tilemap<bool>) -> Tilemap<f32> {
        let points: Vec<(usize, usize)> = features
            .iter()
            .filter(|(_, _, &f)| f)
            .map(|(x, y, _)| (x, y))
            .collect();
        let mut out = Tilemap::new_with(features.width, features.height, f32::INFINITY);
        for y in 0..features.height {
            for x in 0..features.width {
                let best = points
                    .iter()
                    .map(|&(px, py)| {
                        let dx = px as f32 - x as f32;
                        let dy = py as f32 - y as f32;
                        (dx * dx + dy * dy).sqrt()
                    })
                    .fold(f32::INFINITY, f32::min);
                out.set(x, y, best);
            }
        }
        out
    }

    #[test]
    fn test_distance_single_point() {
        let mut features = Tilemap::new_with(7, 5, false);
        features.set(3, 2, true);
        let dist = distance_transform(&features);

        assert_eq!(*dist.get(3, 2), 0.0);
        assert!((*dist.get(4, 2) - 1.0).abs() < 1e-5);
        assert!((*dist.get(4, 3) - 2.0f32.sqrt()).abs() < 1e-5);
        assert!((*dist.get(0, 0) - 13.0f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn test_distance_matches_brute_force() {
        let mut features = Tilemap::new_with(13, 9, false);
        for &(x, y) in &[(0, 0), (12, 8), (5, 4), (9, 1), (2, 7)] {
            features.set(x, y, true);
        }
        let fast = distance_transform(&features);
        let slow = brute_force(&features);

        for (x, y, &expected) in slow.iter() {
            let got = *fast.get(x, y);
            assert!((got - expected).abs() < 1e-4, "({x}, {y}): {got} vs {expected}");
        }
    }

    #[test]
    fn test_distance_without_features_is_infinite() {
        let features = Tilemap::new_with(4, 4, false);
        let dist = distance_transform(&features);
        assert!(dist.iter().all(|(_, _, d)| d.is_infinite()));
    }

    #[test]
    fn test_blur_preserves_constant_field() {
        let map = Tilemap::new_with(8, 6, -3000.0f32);
        let blurred = gaussian_blur(&map, 1.5);
        for (_, _, &v) in blurred.iter() {
            assert!((v + 3000.0).abs() < 0.01);
        }
    }

    #[test]
    fn test_blur_spreads_spike() {
        let mut map = Tilemap::new_with(15, 15, 0.0f32);
        map.set(7, 7, 100.0);
        let blurred = gaussian_blur(&map, 1.5);

        let center = *blurred.get(7, 7);
        assert!(center < 100.0 && center > 0.0);
        assert!(*blurred.get(8, 7) > 0.0);
        assert!(*blurred.get(8, 7) < center);
        // Isotropic: equal distances get equal values
        assert!((*blurred.get(8, 7) - *blurred.get(7, 8)).abs() < 1e-5);

        let total: f32 = blurred.iter().map(|(_, _, v)| *v).sum();
        assert!((total - 100.0).abs() < 0.1);
    }

    #[test]
    fn test_kernel_is_normalised() {
        let kernel = generate_gaussian_kernel(6, 1.5);
        assert_eq!(kernel.len(), 13);
        let total: f32 = kernel.iter().sum();
        assert!((total - 1.0).abs() < 1e-5);
        assert_eq!(kernel[0], kernel[12]);
    }
}
