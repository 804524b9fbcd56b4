//! Observation and action space types.
//!
//! Gymnasium-compatible descriptions of what each agent sees and may do at the
//! current decision point.

mod r#box;
mod discrete;

pub use discrete::Discrete;
pub use r#box::Box;

use rand::Rng;

/// Trait for observation and action spaces
pub trait Space: Clone + Send + Sync {
    /// The type of samples from this space
    type Sample;

    /// Sample a random element from this space, `None` if the space is empty
    fn sample<R: Rng>(&self, rng: &mut R) -> Option<Self::Sample>;

    /// Check if a value is contained in this space
    fn contains(&self, value: &Self::Sample) -> bool;

    /// Get the shape of samples from this space
    fn shape(&self) -> &[usize];

    /// Get the total number of elements in a sample
    fn num_elements(&self) -> usize {
        self.shape().iter().product()
    }
}
