use log::warn;
use rustfft::num_complex::Complex;
use std::f64::consts::PI;

/// Digital IIR transfer function in `b` (numerator) / `a` (denominator)
/// form, with `a[0]` normalized to 1.
///
/// `clamped` records whether the requested band had to be adjusted to fit
/// inside the valid (0, nyquist) range.
#[derive(Debug, Clone)]
pub struct FilterCoefficients {
    pub b: Vec<f64>,
    pub a: Vec<f64>,
    pub clamped: bool,
}

/// Butterworth band-pass design via the analog prototype, band transform
/// and bilinear mapping with frequency prewarping.
///
/// Out-of-range edges are clamped rather than rejected: the low edge is
/// raised to 1 Hz, the high edge lowered to 99% of nyquist, and an
/// inverted band is widened to 10 Hz above the low edge.
pub fn design_bandpass(
    low_hz: f64,
    high_hz: f64,
    order: usize,
    sample_rate: u32,
) -> FilterCoefficients {
    let nyquist = sample_rate as f64 / 2.0;
    let mut low = low_hz;
    let mut high = high_hz;
    let mut clamped = false;

    if low < 1.0 {
        low = 1.0;
        clamped = true;
    }
    if high > 0.99 * nyquist {
        high = 0.99 * nyquist;
        clamped = true;
    }
    if low >= high {
        high = low + 10.0;
        clamped = true;
    }
    if clamped {
        warn!(
            "band edges adjusted to {:.1}-{:.1} Hz (requested {:.1}-{:.1})",
            low, high, low_hz, high_hz
        );
    }

    let fs = sample_rate as f64;
    let fs2 = 2.0 * fs;

    // Prewarped analog band edges.
    let w1 = fs2 * (PI * low / fs).tan();
    let w2 = fs2 * (PI * high / fs).tan();
    let w0 = (w1 * w2).sqrt();
    let bw = w2 - w1;

    // Analog low-pass prototype poles on the unit circle.
    let proto: Vec<Complex<f64>> = (0..order)
        .map(|k| {
            let theta = PI * (2 * k + order + 1) as f64 / (2 * order) as f64;
            Complex::from_polar(1.0, theta)
        })
        .collect();

    // Low-pass to band-pass: each prototype pole splits into a pair.
    let mut poles = Vec::with_capacity(2 * order);
    for &p in &proto {
        let scaled = p * (bw / 2.0);
        let disc = (scaled * scaled - w0 * w0).sqrt();
        poles.push(scaled + disc);
        poles.push(scaled - disc);
    }
    // N analog zeros at s = 0; the transformed gain is bw^N.
    let k_analog = bw.powi(order as i32);

    // Bilinear transform. Analog zeros at the origin map to z = 1 and the
    // degree deficit contributes zeros at z = -1.
    let fs2_c = Complex::new(fs2, 0.0);
    let digital_poles: Vec<Complex<f64>> =
        poles.iter().map(|&s| (fs2_c + s) / (fs2_c - s)).collect();
    let mut digital_zeros = vec![Complex::new(1.0, 0.0); order];
    digital_zeros.extend(vec![Complex::new(-1.0, 0.0); order]);

    let num: Complex<f64> = Complex::new(fs2.powi(order as i32), 0.0);
    let den: Complex<f64> = poles.iter().map(|&s| fs2_c - s).product();
    let k_digital = k_analog * (num / den).re;

    let mut b = poly_from_roots(&digital_zeros);
    for c in &mut b {
        *c *= k_digital;
    }
    let a = poly_from_roots(&digital_poles);

    FilterCoefficients { b, a, clamped }
}

/// Expands a monic polynomial from its complex roots, returning the real
/// parts of the coefficients in descending-power order.
fn poly_from_roots(roots: &[Complex<f64>]) -> Vec<f64> {
    let mut coeffs = vec![Complex::new(1.0, 0.0)];
    for r in roots {
        let mut next = vec![Complex::new(0.0, 0.0); coeffs.len() + 1];
        for (i, c) in coeffs.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= c * r;
        }
        coeffs = next;
    }
    coeffs.iter().map(|c| c.re).collect()
}

/// Zero-phase filtering: run the filter forward, reverse, run it again,
/// reverse back. Doubles the magnitude response and cancels phase delay.
pub fn apply_filter(samples: &[f32], coeffs: &FilterCoefficients) -> Vec<f32> {
    let forward = filter_direct(samples.iter().map(|&s| s as f64), samples.len(), coeffs);
    let backward = filter_direct(forward.iter().rev().copied(), forward.len(), coeffs);
    backward.iter().rev().map(|&s| s as f32).collect()
}

fn filter_direct(
    input: impl Iterator<Item = f64>,
    len: usize,
    coeffs: &FilterCoefficients,
) -> Vec<f64> {
    let b = &coeffs.b;
    let a = &coeffs.a;
    let order = b.len().max(a.len()) - 1;

    // Direct form II transposed.
    let mut state = vec![0.0f64; order];
    let mut output = Vec::with_capacity(len);
    for x in input {
        let y = b[0] * x + state.first().copied().unwrap_or(0.0);
        for i in 0..order {
            let next = if i + 1 < order { state[i + 1] } else { 0.0 };
            let b_i = b.get(i + 1).copied().unwrap_or(0.0);
            let a_i = a.get(i + 1).copied().unwrap_or(0.0);
            state[i] = next + b_i * x - a_i * y;
        }
        output.push(y);
    }
    output
}
