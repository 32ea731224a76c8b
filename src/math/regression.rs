//! Ordinary least squares helpers for pairs trading.
//!
//! `returns_beta` estimates the dynamic hedge ratio by regressing the
//! returns of one leg on the returns of the other over a rolling
//! window. `half_life` fits an AR(1) model to a spread series and
//! converts the autoregressive coefficient into the mean-reversion
//! half-life `-ln 2 / ln φ`.
//!
//! # References
//!
//! - Avellaneda, M. & Lee, J.H. (2010). "Statistical Arbitrage in the US Equities Market"
//! - Chan, E. (2013). "Algorithmic Trading: Winning Strategies and Their Rationale"

/// Slope of the least-squares fit `y = a + b·x`.
///
/// Returns `None` when the series are too short, mismatched, or `x`
/// has no variance.
pub fn ols_slope(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len();
    if n < 2 || n != ys.len() {
        return None;
    }
    let nf = n as f64;
    let mean_x = xs.iter().sum::<f64>() / nf;
    let mean_y = ys.iter().sum::<f64>() / nf;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    for (x, y) in xs.iter().zip(ys.iter()) {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x) * (x - mean_x);
    }

    if var_x < 1e-12 || !cov.is_finite() {
        return None;
    }
    let slope = cov / var_x;
    slope.is_finite().then_some(slope)
}

/// Hedge ratio from simple returns of two aligned price series.
///
/// Regresses leg-a returns on leg-b returns. `None` until both series
/// carry at least three prices or when leg b has no variance.
pub fn returns_beta(prices_a: &[f64], prices_b: &[f64]) -> Option<f64> {
    if prices_a.len() < 3 || prices_a.len() != prices_b.len() {
        return None;
    }
    let rets = |prices: &[f64]| -> Vec<f64> {
        prices
            .windows(2)
            .map(|w| if w[0].abs() > 1e-12 { w[1] / w[0] - 1.0 } else { 0.0 })
            .collect()
    };
    let ra = rets(prices_a);
    let rb = rets(prices_b);
    ols_slope(&rb, &ra)
}

/// Mean-reversion half-life of a spread series from its AR(1) fit.
///
/// Fits `s[t] = a + φ·s[t-1]` and returns `-ln 2 / ln φ`, in the same
/// units as the series spacing. `None` when the fit is unavailable or
/// φ is outside (0, 1), i.e. the series does not mean-revert.
pub fn half_life(spreads: &[f64]) -> Option<f64> {
    if spreads.len() < 4 {
        return None;
    }
    let lagged = &spreads[..spreads.len() - 1];
    let current = &spreads[1..];
    let phi = ols_slope(lagged, current)?;
    if phi <= 0.0 || phi >= 1.0 {
        return None;
    }
    let hl = -std::f64::consts::LN_2 / phi.ln();
    (hl.is_finite() && hl > 0.0).then_some(hl)
}
