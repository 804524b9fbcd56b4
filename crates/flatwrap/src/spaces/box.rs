//! Box (continuous) observation space

use super::Space;
use ndarray::{Array1, ArrayD, IxDyn};
use rand::Rng;
use rand_distr::{Distribution, Uniform};

/// Box space for continuous values with bounds
#[derive(Clone, Debug, PartialEq)]
pub struct Box {
    /// Lower bound for each element
    pub low: ArrayD<f32>,
    /// Upper bound for each element
    pub high: ArrayD<f32>,
    /// Shape of the space
    shape: Vec<usize>,
}

impl Box {
    /// Create a new box space with given bounds
    pub fn new(low: ArrayD<f32>, high: ArrayD<f32>) -> Self {
        assert_eq!(low.shape(), high.shape(), "Low and high must have same shape");
        let shape = low.shape().to_vec();
        Self { low, high, shape }
    }

    /// Create a box space with uniform bounds
    pub fn uniform(shape: &[usize], low: f32, high: f32) -> Self {
        let low_arr = ArrayD::from_elem(IxDyn(shape), low);
        let high_arr = ArrayD::from_elem(IxDyn(shape), high);
        Self::new(low_arr, high_arr)
    }

    /// Create a one-dimensional box of `len` elements sharing one range
    pub fn vector(len: usize, low: f32, high: f32) -> Self {
        Self::uniform(&[len], low, high)
    }

    /// Check a flat observation vector against the bounds
    pub fn contains_vector(&self, value: &Array1<f32>) -> bool {
        self.shape.len() == 1
            && value.len() == self.shape[0]
            && value
                .iter()
                .zip(self.low.iter())
                .zip(self.high.iter())
                .all(|((&v, &l), &h)| v >= l && v <= h)
    }
}

impl Space for Box {
    type Sample = ArrayD<f32>;

    fn sample<R: Rng>(&self, rng: &mut R) -> Option<Self::Sample> {
        let mut result = ArrayD::zeros(IxDyn(&self.shape));
        for ((&l, &h), r) in self.low.iter().zip(self.high.iter()).zip(result.iter_mut()) {
            *r = Uniform::new_inclusive(l, h).sample(rng);
        }
        Some(result)
    }

    fn contains(&self, value: &Self::Sample) -> bool {
        if value.shape() != self.low.shape() {
            return false;
        }
        value
            .iter()
            .zip(self.low.iter())
            .zip(self.high.iter())
            .all(|((&v, &l), &h)| v >= l && v <= h)
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_box_sample() {
        let space = Box::uniform(&[3, 4], -1.0, 3.0);
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let sample = space.sample(&mut rng).unwrap();
            assert!(space.contains(&sample));
            assert_eq!(sample.shape(), &[3, 4]);
        }
    }

    #[test]
    fn test_box_contains_vector() {
        let space = Box::vector(2, -1.0, 3.0);
        assert!(space.contains_vector(&Array1::from(vec![0.5, 3.0])));
        assert!(!space.contains_vector(&Array1::from(vec![3.5, 0.5])));
        assert!(!space.contains_vector(&Array1::from(vec![0.5])));
        assert_eq!(space.num_elements(), 2);
    }
}
