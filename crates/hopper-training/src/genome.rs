//! Fixed-shape two-layer perceptron genomes and their genetic operators.
//!
//! A [`Genome`] is the complete set of parameters of a policy network:
//!
//! ```text
//! observation (4) ──W1,b1──▶ hidden (4..=10, ReLU) ──W2,b2──▶ preferences (3, softmax)
//! ```
//!
//! # Operators
//!
//! - **Clone** - Deep copy; the copy shares no storage with its source
//! - **Mutation** - Each scalar independently, with probability `rate`, gets `N(0, 1)` noise added
//! - **Crossover** - Each scalar position independently, with probability `p`, is swapped
//!   between the two genomes (both operands are modified)
//!
//! Mutation is the only source of new parameter values. Crossover only exchanges values that
//! already exist in the population.
//!
//! # Initialization
//!
//! Random genomes use Glorot-uniform kernels (`U(-l, l)`, `l = sqrt(6 / (fan_in + fan_out))`)
//! and zero biases.

use std::{mem, ops::RangeInclusive};

use arrayvec::ArrayVec;
use hopper_engine::{Action, OBSERVATION_LEN, Observation};
use rand::Rng;
use rand_distr::StandardNormal;

/// Number of network inputs.
pub const INPUT_DIM: usize = OBSERVATION_LEN;
/// Number of network outputs, one per [`Action`].
pub const OUTPUT_DIM: usize = Action::LEN;
/// Allowed hidden layer sizes.
pub const HIDDEN_DIM_RANGE: RangeInclusive<usize> = 4..=10;

const MAX_HIDDEN_DIM: usize = *HIDDEN_DIM_RANGE.end();

/// Per-action preference scores produced by [`Genome::predict`]. Sums to 1.
pub type Prediction = [f32; OUTPUT_DIM];

/// Layer sizes of a [`Genome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[display("{input}x{hidden}x{output}")]
pub struct Shape {
    pub input: usize,
    pub hidden: usize,
    pub output: usize,
}

/// Errors raised by genome operators.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum GenomeError {
    /// Two genomes with different architectures were combined.
    #[display("genome shape mismatch: {left} vs {right}")]
    ShapeMismatch { left: Shape, right: Shape },
}

/// A dense layer with a row-major `inputs x outputs` kernel.
#[derive(Debug, Clone, PartialEq)]
struct Dense {
    inputs: usize,
    outputs: usize,
    kernel: Vec<f32>,
    bias: Vec<f32>,
}

impl Dense {
    fn from_fn<F>(inputs: usize, outputs: usize, mut f: F) -> Self
    where
        F: FnMut() -> f32,
    {
        let kernel = (0..inputs * outputs).map(|_| f()).collect();
        let bias = (0..outputs).map(|_| f()).collect();
        Self {
            inputs,
            outputs,
            kernel,
            bias,
        }
    }

    #[expect(clippy::cast_precision_loss)]
    fn glorot<R>(inputs: usize, outputs: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let limit = (6.0 / (inputs + outputs) as f32).sqrt();
        let kernel = (0..inputs * outputs)
            .map(|_| rng.random_range(-limit..=limit))
            .collect();
        Self {
            inputs,
            outputs,
            kernel,
            bias: vec![0.0; outputs],
        }
    }

    fn forward(&self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(input.len(), self.inputs);
        debug_assert_eq!(output.len(), self.outputs);
        output.copy_from_slice(&self.bias);
        for (x, row) in input.iter().zip(self.kernel.chunks_exact(self.outputs)) {
            for (o, w) in output.iter_mut().zip(row) {
                *o += x * w;
            }
        }
    }

    fn params(&self) -> impl Iterator<Item = &f32> + '_ {
        self.kernel.iter().chain(&self.bias)
    }

    fn params_mut(&mut self) -> impl Iterator<Item = &mut f32> + '_ {
        self.kernel.iter_mut().chain(&mut self.bias)
    }
}

/// Parameters of a two-layer perceptron policy.
///
/// The shape is fixed at construction. `Clone` is a deep copy, so a clone can be mutated or
/// crossed over without affecting its source.
#[derive(Debug, Clone, PartialEq)]
pub struct Genome {
    hidden: Dense,
    output: Dense,
}

fn assert_hidden_dim(hidden_dim: usize) {
    assert!(
        HIDDEN_DIM_RANGE.contains(&hidden_dim),
        "hidden layer size must be in {HIDDEN_DIM_RANGE:?}, got {hidden_dim}"
    );
}

impl Genome {
    /// Creates a genome with Glorot-uniform kernels and zero biases.
    ///
    /// # Panics
    ///
    /// Panics if `hidden_dim` is outside [`HIDDEN_DIM_RANGE`].
    pub fn random<R>(hidden_dim: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        assert_hidden_dim(hidden_dim);
        Self {
            hidden: Dense::glorot(INPUT_DIM, hidden_dim, rng),
            output: Dense::glorot(hidden_dim, OUTPUT_DIM, rng),
        }
    }

    /// Creates a genome whose every parameter is `0.0`.
    ///
    /// # Panics
    ///
    /// Panics if `hidden_dim` is outside [`HIDDEN_DIM_RANGE`].
    #[must_use]
    pub fn zeroed(hidden_dim: usize) -> Self {
        Self::from_fn(hidden_dim, || 0.0)
    }

    /// Creates a genome by calling `f` once per parameter, in [`Genome::parameters`] order.
    ///
    /// # Panics
    ///
    /// Panics if `hidden_dim` is outside [`HIDDEN_DIM_RANGE`].
    ///
    /// # Examples
    ///
    /// ```
    /// use hopper_training::genome::Genome;
    ///
    /// let genome = Genome::from_fn(4, || 0.5);
    /// assert!(genome.parameters().all(|p| p == 0.5));
    /// assert_eq!(genome.parameter_count(), 4 * 4 + 4 + 4 * 3 + 3);
    /// ```
    pub fn from_fn<F>(hidden_dim: usize, mut f: F) -> Self
    where
        F: FnMut() -> f32,
    {
        assert_hidden_dim(hidden_dim);
        Self {
            hidden: Dense::from_fn(INPUT_DIM, hidden_dim, &mut f),
            output: Dense::from_fn(hidden_dim, OUTPUT_DIM, &mut f),
        }
    }

    #[must_use]
    pub fn shape(&self) -> Shape {
        Shape {
            input: self.hidden.inputs,
            hidden: self.hidden.outputs,
            output: self.output.outputs,
        }
    }

    #[must_use]
    pub fn hidden_dim(&self) -> usize {
        self.hidden.outputs
    }

    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.hidden.kernel.len()
            + self.hidden.bias.len()
            + self.output.kernel.len()
            + self.output.bias.len()
    }

    /// Iterates over every parameter: W1, b1, W2, b2, kernels row-major.
    pub fn parameters(&self) -> impl Iterator<Item = f32> + '_ {
        self.hidden.params().chain(self.output.params()).copied()
    }

    fn parameters_mut(&mut self) -> impl Iterator<Item = &mut f32> + '_ {
        self.hidden.params_mut().chain(self.output.params_mut())
    }

    /// Input-to-hidden kernel, row-major `INPUT_DIM x hidden_dim`.
    #[must_use]
    pub fn hidden_kernel(&self) -> &[f32] {
        &self.hidden.kernel
    }

    /// Hidden-to-output kernel, row-major `hidden_dim x OUTPUT_DIM`.
    #[must_use]
    pub fn output_kernel(&self) -> &[f32] {
        &self.output.kernel
    }

    /// Forward pass: `softmax(relu(x·W1 + b1)·W2 + b2)`.
    ///
    /// Deterministic and side-effect free.
    #[must_use]
    pub fn predict(&self, observation: &Observation) -> Prediction {
        let mut hidden = ArrayVec::<f32, MAX_HIDDEN_DIM>::new();
        hidden.extend((0..self.hidden_dim()).map(|_| 0.0));
        self.hidden.forward(observation, &mut hidden);
        for h in &mut hidden {
            *h = h.max(0.0);
        }

        let mut logits = [0.0; OUTPUT_DIM];
        self.output.forward(&hidden, &mut logits);
        softmax(&mut logits);
        logits
    }

    /// Adds standard-normal noise to each parameter independently with probability `rate`.
    ///
    /// `rate <= 0` leaves the genome untouched and `rate >= 1` perturbs every parameter.
    pub fn mutate<R>(&mut self, rate: f32, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        for p in self.parameters_mut() {
            if rng.random::<f32>() < rate {
                *p += rng.sample::<f32, _>(StandardNormal);
            }
        }
    }

    /// Swaps each parameter position with `other` independently with probability
    /// `swap_probability`.
    ///
    /// Both genomes are modified. Callers that need `other` to stay intact must pass a clone.
    ///
    /// # Errors
    ///
    /// Returns [`GenomeError::ShapeMismatch`] if the genomes have different shapes; neither
    /// genome is modified in that case.
    pub fn crossover<R>(
        &mut self,
        other: &mut Genome,
        swap_probability: f32,
        rng: &mut R,
    ) -> Result<(), GenomeError>
    where
        R: Rng + ?Sized,
    {
        if self.shape() != other.shape() {
            return Err(GenomeError::ShapeMismatch {
                left: self.shape(),
                right: other.shape(),
            });
        }
        for (a, b) in self.parameters_mut().zip(other.parameters_mut()) {
            if rng.random::<f32>() < swap_probability {
                mem::swap(a, b);
            }
        }
        Ok(())
    }
}

fn softmax(values: &mut [f32]) {
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut sum = 0.0;
    for v in values.iter_mut() {
        *v = (*v - max).exp();
        sum += *v;
    }
    for v in values {
        *v /= sum;
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(0x5eed)
    }

    const PROBES: [Observation; 4] = [
        [0.0, 0.0, 0.0, 0.0],
        [1.0, 0.0, 0.5, 0.25],
        [0.3, 0.9, 0.1, 1.0],
        [1.0, 1.0, 1.0, 1.0],
    ];

    fn counting(hidden_dim: usize) -> Genome {
        let mut n = 0.0;
        Genome::from_fn(hidden_dim, || {
            n += 1.0;
            n
        })
    }

    #[test]
    fn test_shape_and_parameter_count() {
        for hidden_dim in HIDDEN_DIM_RANGE {
            let genome = Genome::random(hidden_dim, &mut rng());
            assert_eq!(
                genome.shape(),
                Shape {
                    input: 4,
                    hidden: hidden_dim,
                    output: 3
                }
            );
            assert_eq!(genome.parameter_count(), genome.parameters().count());
            assert_eq!(genome.hidden_kernel().len(), 4 * hidden_dim);
            assert_eq!(genome.output_kernel().len(), hidden_dim * 3);
        }
    }

    #[test]
    #[should_panic(expected = "hidden layer size")]
    fn test_rejects_hidden_dim_out_of_range() {
        let _ = Genome::zeroed(11);
    }

    #[test]
    fn test_random_init_has_zero_bias_and_bounded_kernel() {
        let genome = Genome::random(6, &mut rng());
        let limit = (6.0_f32 / 10.0).sqrt();
        assert!(genome.hidden.bias.iter().all(|b| *b == 0.0));
        assert!(genome.hidden_kernel().iter().all(|w| w.abs() <= limit));
        assert!(genome.hidden_kernel().iter().any(|w| *w != 0.0));
    }

    #[test]
    fn test_zeroed_predicts_uniform() {
        let genome = Genome::zeroed(5);
        for probe in PROBES {
            let prediction = genome.predict(&probe);
            for p in prediction {
                assert!((p - 1.0 / 3.0).abs() < 1e-6, "{prediction:?}");
            }
        }
    }

    #[test]
    fn test_prediction_sums_to_one() {
        let genome = Genome::random(8, &mut rng());
        for probe in PROBES {
            let sum: f32 = genome.predict(&probe).iter().sum();
            assert!((sum - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_predict_known_values() {
        // W1 = 0, b1 = 1 => hidden = [1; 4]; W2 column 1 = 1, others 0 => logits [0, 4, 0]
        let mut genome = Genome::zeroed(4);
        genome.hidden.bias.fill(1.0);
        for row in genome.output.kernel.chunks_exact_mut(OUTPUT_DIM) {
            row[1] = 1.0;
        }
        let prediction = genome.predict(&[0.2, 0.4, 0.6, 0.8]);
        let e4 = 4.0_f32.exp();
        let expected = [1.0 / (e4 + 2.0), e4 / (e4 + 2.0), 1.0 / (e4 + 2.0)];
        for (p, e) in prediction.iter().zip(expected) {
            assert!((p - e).abs() < 1e-6);
        }
    }

    #[test]
    fn test_relu_clips_negative_hidden_units() {
        // every hidden unit is negative, so only the output bias matters
        let mut genome = Genome::zeroed(4);
        genome.hidden.bias.fill(-10.0);
        genome.output.kernel.fill(100.0);
        assert_eq!(genome.predict(&[1.0; 4]), Genome::zeroed(4).predict(&[1.0; 4]));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut rng = rng();
        let original = Genome::random(6, &mut rng);
        let mut copy = original.clone();
        for probe in PROBES {
            assert_eq!(
                original.predict(&probe).map(f32::to_bits),
                copy.predict(&probe).map(f32::to_bits)
            );
        }

        let before: Vec<_> = PROBES.iter().map(|p| original.predict(p)).collect();
        copy.mutate(1.0, &mut rng);
        let mut other = Genome::random(6, &mut rng);
        copy.crossover(&mut other, 1.0, &mut rng).unwrap();
        let after: Vec<_> = PROBES.iter().map(|p| original.predict(p)).collect();
        assert_eq!(before, after);
        assert_ne!(original, copy);
    }

    #[test]
    fn test_mutate_zero_rate_is_noop() {
        let mut genome = Genome::random(7, &mut rng());
        let before = genome.clone();
        genome.mutate(0.0, &mut rng());
        assert_eq!(genome, before);
    }

    #[test]
    fn test_mutate_full_rate_changes_every_parameter() {
        let mut genome = Genome::random(7, &mut rng());
        let before = genome.clone();
        genome.mutate(1.0, &mut rng());
        for (a, b) in genome.parameters().zip(before.parameters()) {
            assert_ne!(a, b);
        }
    }

    #[test]
    fn test_mutate_partial_rate_changes_some_parameters() {
        let mut genome = Genome::zeroed(10);
        genome.mutate(0.5, &mut rng());
        let changed = genome.parameters().filter(|p| *p != 0.0).count();
        let total = genome.parameter_count();
        assert!(changed > total / 4 && changed < total * 3 / 4, "{changed}/{total}");
    }

    #[test]
    fn test_crossover_zero_probability_is_noop() {
        let mut rng = rng();
        let mut a = counting(5);
        let mut b = Genome::zeroed(5);
        a.crossover(&mut b, 0.0, &mut rng).unwrap();
        assert_eq!(a, counting(5));
        assert_eq!(b, Genome::zeroed(5));
    }

    #[test]
    fn test_crossover_full_probability_exchanges_everything() {
        let mut rng = rng();
        let mut a = counting(5);
        let mut b = Genome::zeroed(5);
        a.crossover(&mut b, 1.0, &mut rng).unwrap();
        assert_eq!(a, Genome::zeroed(5));
        assert_eq!(b, counting(5));
    }

    #[test]
    fn test_crossover_only_swaps_positions() {
        let mut rng = rng();
        let mut a = counting(6);
        let mut b = Genome::zeroed(6);
        a.crossover(&mut b, 0.5, &mut rng).unwrap();
        for ((orig, a), b) in counting(6).parameters().zip(a.parameters()).zip(b.parameters()) {
            // every position holds either both original values or both swapped
            assert!((a == orig && b == 0.0) || (a == 0.0 && b == orig));
        }
    }

    #[test]
    fn test_crossover_shape_mismatch() {
        let mut a = Genome::zeroed(4);
        let mut b = counting(5);
        let err = a.crossover(&mut b, 1.0, &mut rng()).unwrap_err();
        assert!(matches!(err, GenomeError::ShapeMismatch { .. }));
        assert_eq!(err.to_string(), "genome shape mismatch: 4x4x3 vs 4x5x3");
        assert_eq!(b, counting(5));
    }
}
