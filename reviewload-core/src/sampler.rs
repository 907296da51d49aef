//! Weighted sampling over labelled entries
//!
//! [`WeightedSampler`] is a cumulative-distribution sampler: a uniform draw
//! `r` in `[0, 1)` selects the first entry whose running weight sum exceeds
//! `r`. When floating-point rounding leaves `r` unmatched the first entry is
//! returned, so every draw yields an entry.

use crate::error::SamplerError;
use crate::operation::OperationKind;
use rand::Rng;

/// Tolerance applied when checking that weights sum to one
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Cumulative-distribution sampler over `(label, weight)` pairs
#[derive(Debug, Clone)]
pub struct WeightedSampler<T> {
    labels: Vec<T>,
    weights: Vec<f64>,
    cumulative: Vec<f64>,
}

impl<T: PartialEq> WeightedSampler<T> {
    /// Build a sampler. Weights must be finite, non-negative and sum to 1.0.
    pub fn new(entries: impl IntoIterator<Item = (T, f64)>) -> Result<Self, SamplerError> {
        let mut labels = Vec::new();
        let mut weights = Vec::new();
        let mut cumulative = Vec::new();
        let mut sum = 0.0;

        for (index, (label, weight)) in entries.into_iter().enumerate() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(SamplerError::InvalidWeight { index, weight });
            }
            if labels.contains(&label) {
                return Err(SamplerError::Duplicate(index));
            }
            sum += weight;
            labels.push(label);
            weights.push(weight);
            cumulative.push(sum);
        }

        if labels.is_empty() {
            return Err(SamplerError::Empty);
        }
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(SamplerError::NotNormalized { sum });
        }

        Ok(Self {
            labels,
            weights,
            cumulative,
        })
    }
}

impl<T> WeightedSampler<T> {
    /// Draw one entry using the supplied random source
    pub fn sample<R: Rng>(&self, rng: &mut R) -> &T {
        self.sample_at(rng.random::<f64>())
    }

    /// Resolve a draw `r` in `[0, 1)` to an entry
    pub fn sample_at(&self, r: f64) -> &T {
        self.cumulative
            .iter()
            .position(|&cumulative| r < cumulative)
            .map(|index| &self.labels[index])
            .unwrap_or(&self.labels[0])
    }

    pub fn entries(&self) -> impl Iterator<Item = (&T, f64)> {
        self.labels.iter().zip(self.weights.iter().copied())
    }

    pub fn weight_sum(&self) -> f64 {
        self.weights.iter().sum()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Picks the operation for each iteration according to the traffic mix
#[derive(Debug, Clone)]
pub struct OperationSelector {
    sampler: WeightedSampler<OperationKind>,
}

impl OperationSelector {
    /// The standard mix: reads dominate, writes share the remainder
    pub fn standard() -> Self {
        Self {
            sampler: WeightedSampler {
                labels: OperationKind::all().to_vec(),
                weights: STANDARD_WEIGHTS.to_vec(),
                cumulative: STANDARD_WEIGHTS
                    .iter()
                    .scan(0.0, |sum, weight| {
                        *sum += weight;
                        Some(*sum)
                    })
                    .collect(),
            },
        }
    }

    pub fn from_mix(mix: impl IntoIterator<Item = (OperationKind, f64)>) -> Result<Self, SamplerError> {
        Ok(Self {
            sampler: WeightedSampler::new(mix)?,
        })
    }

    pub fn select<R: Rng>(&self, rng: &mut R) -> OperationKind {
        *self.sampler.sample(rng)
    }

    pub fn sampler(&self) -> &WeightedSampler<OperationKind> {
        &self.sampler
    }
}

impl Default for OperationSelector {
    fn default() -> Self {
        Self::standard()
    }
}

/// Weights of the standard mix, aligned with [`OperationKind::all`]
pub const STANDARD_WEIGHTS: [f64; OperationKind::COUNT] = [0.20, 0.15, 0.20, 0.10, 0.10, 0.10, 0.15];

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_standard_weights_sum_to_one() {
        let selector = OperationSelector::standard();
        assert!((selector.sampler().weight_sum() - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
        assert_eq!(selector.sampler().len(), OperationKind::COUNT);
    }

    #[test]
    fn test_sample_at_walks_cumulative_sum() {
        let selector = OperationSelector::standard();
        let sampler = selector.sampler();

        assert_eq!(*sampler.sample_at(0.0), OperationKind::GetTeam);
        assert_eq!(*sampler.sample_at(0.19), OperationKind::GetTeam);
        assert_eq!(*sampler.sample_at(0.20), OperationKind::CreatePr);
        assert_eq!(*sampler.sample_at(0.54), OperationKind::GetUserReview);
        assert_eq!(*sampler.sample_at(0.84), OperationKind::SetUserActive);
        assert_eq!(*sampler.sample_at(0.99), OperationKind::GetStatistics);
    }

    #[test]
    fn test_unmatched_draw_falls_back_to_first() {
        let sampler = WeightedSampler::new(vec![("a", 0.5), ("b", 0.4999999999)]).unwrap();
        assert_eq!(*sampler.sample_at(0.99999999999), "a");
    }

    #[test]
    fn test_frequencies_converge_to_weights() {
        let selector = OperationSelector::standard();
        let mut rng = StdRng::seed_from_u64(42);
        let draws = 20_000;
        let mut counts = [0usize; OperationKind::COUNT];

        for _ in 0..draws {
            counts[selector.select(&mut rng).index()] += 1;
        }

        for (kind, weight) in selector.sampler().entries() {
            let observed = counts[kind.index()] as f64 / draws as f64;
            assert!(
                (observed - weight).abs() < 0.02,
                "{} observed {:.4}, expected {:.2}",
                kind,
                observed,
                weight
            );
        }
    }

    #[test]
    fn test_rejects_bad_weights() {
        assert_eq!(
            WeightedSampler::<&str>::new(Vec::new()).unwrap_err(),
            SamplerError::Empty
        );
        assert!(matches!(
            WeightedSampler::new(vec![("a", 0.5), ("b", 0.4)]),
            Err(SamplerError::NotNormalized { .. })
        ));
        assert!(matches!(
            WeightedSampler::new(vec![("a", -0.5), ("b", 1.5)]),
            Err(SamplerError::InvalidWeight { index: 0, .. })
        ));
        assert!(matches!(
            WeightedSampler::new(vec![("a", f64::NAN)]),
            Err(SamplerError::InvalidWeight { .. })
        ));
        assert_eq!(
            WeightedSampler::new(vec![("a", 0.5), ("a", 0.5)]).unwrap_err(),
            SamplerError::Duplicate(1)
        );
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let selector = OperationSelector::standard();
        let mut first = StdRng::seed_from_u64(9);
        let mut second = StdRng::seed_from_u64(9);

        let a: Vec<_> = (0..50).map(|_| selector.select(&mut first)).collect();
        let b: Vec<_> = (0..50).map(|_| selector.select(&mut second)).collect();
        assert_eq!(a, b);
    }
}
