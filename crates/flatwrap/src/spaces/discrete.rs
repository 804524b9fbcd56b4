//! Discrete action space

use super::Space;
use rand::Rng;

/// Discrete space with n possible values: {0, 1, ..., n-1}
///
/// An agent with no legal actions at a decision point gets `Discrete::new(0)`,
/// which contains nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Discrete {
    /// Number of possible values
    pub n: usize,
    /// Cached shape
    shape: Vec<usize>,
}

impl Discrete {
    /// Create a new discrete space with n values
    pub fn new(n: usize) -> Self {
        Self { n, shape: vec![1] }
    }

    /// Whether the space has no values at all
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }
}

impl Space for Discrete {
    type Sample = usize;

    fn sample<R: Rng>(&self, rng: &mut R) -> Option<Self::Sample> {
        if self.is_empty() {
            return None;
        }
        Some(rng.gen_range(0..self.n))
    }

    fn contains(&self, value: &Self::Sample) -> bool {
        *value < self.n
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn num_elements(&self) -> usize {
        1
    }
}
