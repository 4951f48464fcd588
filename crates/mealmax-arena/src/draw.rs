//! Random draws that decide battles

use rand::{Rng, RngCore};

/// Source of uniform draws in `[0, 1)`
///
/// Every [`RngCore`] is a source; tests substitute fixed sequences.
pub trait RandomSource {
    fn draw(&mut self) -> f64;
}

impl<R: RngCore> RandomSource for R {
    fn draw(&mut self) -> f64 {
        self.gen::<f64>()
    }
}
