//! Mathematical utilities for trading strategies.
//!
//! This module provides the statistical primitives shared by the
//! strategies: rolling mean/std windows with O(1) updates, ordinary
//! least squares regression for dynamic hedge ratios, and the AR(1)
//! half-life estimate of a mean-reverting series.

pub mod regression;
pub mod rolling;

pub use regression::{half_life, ols_slope, returns_beta};
pub use rolling::RollingWindow;
