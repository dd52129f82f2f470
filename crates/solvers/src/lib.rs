//! Scalar numerical solvers for staged column calculations.
//!
//! Every solver in this crate works on a fallible scalar function
//! `FnMut(f64) -> Result<f64, E>`, so callers can propagate their own domain
//! errors through a solve without boxing them.
//!
//! - [`bisection`]: root finding on a sign-changing bracket
//! - [`optimization`]: bounded single-variable minimization, with a
//!   golden-section strategy and a dense-grid-then-refine strategy selected
//!   through [`Minimizer`]
//! - [`Observer`]: receives solver events and optionally returns control actions

mod observer;

pub mod bisection;
pub mod optimization;

pub use observer::Observer;
pub use optimization::{Minimizer, Minimum};
