use rand::{rngs::StdRng, SeedableRng};

/// Chooses which points survive a per-frame point budget.
pub trait PointSampler {
    /// Pick `amount` distinct indices out of `0..population`.
    ///
    /// Implementations return the indices sorted ascending so the surviving
    /// points keep their scan order. `amount` is never larger than `population`.
    fn sample_indices(&mut self, population: usize, amount: usize) -> Vec<usize>;
}

/// Uniform sampling without replacement backed by [`StdRng`].
#[derive(Debug, Clone)]
pub struct RandomSampler {
    rng: StdRng,
}

impl RandomSampler {
    /// Create a sampler, reproducible when a seed is given.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng }
    }
}

impl PointSampler for RandomSampler {
    fn sample_indices(&mut self, population: usize, amount: usize) -> Vec<usize> {
        let amount = amount.min(population);
        let mut indices = rand::seq::index::sample(&mut self.rng, population, amount).into_vec();
        indices.sort_unstable();
        indices
    }
}
