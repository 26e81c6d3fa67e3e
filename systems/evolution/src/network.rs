//! Dense feed-forward network used as the evolved jump policy.

use dino_evolve_core::{ensure_positive, Policy, Sensors};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::EvolutionError;

/// Fixed factors that bring every sensor into roughly `0.0..=1.0`.
const SENSOR_SCALE: [f32; Sensors::LEN] = [720.0, 1280.0, 135.0, 20.0];

/// Fully connected layer with `outputs * inputs` row-major weights.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Layer {
    inputs: usize,
    outputs: usize,
    weights: Vec<f32>,
    biases: Vec<f32>,
}

impl Layer {
    fn random<D, R>(inputs: usize, outputs: usize, init: &D, rng: &mut R) -> Self
    where
        D: Distribution<f32>,
        R: Rng + ?Sized,
    {
        Self {
            inputs,
            outputs,
            weights: (0..inputs * outputs).map(|_| init.sample(rng)).collect(),
            biases: (0..outputs).map(|_| init.sample(rng)).collect(),
        }
    }

    fn is_well_formed(&self) -> bool {
        self.outputs > 0
            && self.weights.len() == self.inputs * self.outputs
            && self.biases.len() == self.outputs
    }

    fn forward(&self, input: &[f32], activation: fn(f32) -> f32, out: &mut Vec<f32>) {
        out.clear();
        for (row, bias) in self.weights.chunks_exact(self.inputs).zip(&self.biases) {
            let sum: f32 = row.iter().zip(input).map(|(weight, x)| weight * x).sum();
            out.push(activation(sum + bias));
        }
    }

    fn parameters_mut(&mut self) -> impl Iterator<Item = &mut f32> {
        self.weights.iter_mut().chain(self.biases.iter_mut())
    }
}

fn sigmoid(value: f32) -> f32 {
    1.0 / (1.0 + (-value).exp())
}

/// Feed-forward network mapping the four sensors onto a jump probability.
///
/// Hidden layers use `tanh`, the single output neuron a logistic sigmoid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedForwardNetwork {
    layers: Vec<Layer>,
}

impl FeedForwardNetwork {
    /// Creates a network with one hidden layer of `hidden` neurons.
    ///
    /// A hidden size of zero connects the sensors straight to the output.
    /// Parameters are drawn from a zero-mean normal distribution.
    pub fn random<R: Rng + ?Sized>(
        hidden: usize,
        init_stdev: f32,
        rng: &mut R,
    ) -> Result<Self, EvolutionError> {
        ensure_positive("evolution.weight_init_stdev", init_stdev)?;
        let init = Normal::new(0.0, init_stdev).map_err(|_| EvolutionError::Distribution {
            field: "evolution.weight_init_stdev",
            value: init_stdev,
        })?;

        let layers = if hidden == 0 {
            vec![Layer::random(Sensors::LEN, 1, &init, rng)]
        } else {
            vec![
                Layer::random(Sensors::LEN, hidden, &init, rng),
                Layer::random(hidden, 1, &init, rng),
            ]
        };
        Ok(Self { layers })
    }

    /// Checks that layer shapes chain from the sensors to a single output.
    pub fn validate(&self) -> Result<(), EvolutionError> {
        let mut expected_inputs = Sensors::LEN;
        for (index, layer) in self.layers.iter().enumerate() {
            if layer.inputs != expected_inputs || !layer.is_well_formed() {
                return Err(EvolutionError::MalformedNetwork { layer: index });
            }
            expected_inputs = layer.outputs;
        }
        if self.layers.is_empty() || expected_inputs != 1 {
            return Err(EvolutionError::MalformedNetwork {
                layer: self.layers.len(),
            });
        }
        Ok(())
    }

    /// Evaluates the network on raw, unscaled sensor values.
    #[must_use]
    pub fn evaluate(&self, sensors: &Sensors) -> f32 {
        let mut input: Vec<f32> = sensors
            .to_array()
            .iter()
            .zip(SENSOR_SCALE)
            .map(|(value, scale)| value / scale)
            .collect();
        let mut output = Vec::new();

        let last = self.layers.len().saturating_sub(1);
        for (index, layer) in self.layers.iter().enumerate() {
            let activation: fn(f32) -> f32 = if index == last { sigmoid } else { f32::tanh };
            layer.forward(&input, activation, &mut output);
            std::mem::swap(&mut input, &mut output);
        }
        input.first().copied().unwrap_or(0.0)
    }

    /// Total number of weights and biases.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.layers
            .iter()
            .map(|layer| layer.weights.len() + layer.biases.len())
            .sum()
    }

    /// Flattened copy of every parameter, layer by layer.
    #[must_use]
    pub fn parameters(&self) -> Vec<f32> {
        self.layers
            .iter()
            .flat_map(|layer| layer.weights.iter().chain(&layer.biases))
            .copied()
            .collect()
    }

    /// Uniform crossover: every parameter is taken from either parent with equal odds.
    ///
    /// Parents of different shapes yield a copy of `self`.
    #[must_use]
    pub fn crossover<R: Rng + ?Sized>(&self, other: &Self, rng: &mut R) -> Self {
        let mut child = self.clone();
        if self.parameter_count() != other.parameter_count() {
            return child;
        }
        let donor = other.parameters();
        for (parameter, value) in child.parameters_mut().zip(donor) {
            if rng.gen_bool(0.5) {
                *parameter = value;
            }
        }
        child
    }

    /// Perturbs each parameter with probability `rate` by a sample of `noise`.
    pub fn mutate<R: Rng + ?Sized>(&mut self, rate: f64, noise: &Normal<f32>, rng: &mut R) {
        for parameter in self.parameters_mut() {
            if rng.gen_bool(rate) {
                *parameter += noise.sample(rng);
            }
        }
    }

    fn parameters_mut(&mut self) -> impl Iterator<Item = &mut f32> {
        self.layers.iter_mut().flat_map(|layer| layer.parameters_mut())
    }
}

impl Policy for FeedForwardNetwork {
    fn decide(&mut self, sensors: &Sensors) -> f32 {
        self.evaluate(sensors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dino_evolve_core::ConfigError;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn sensors() -> Sensors {
        Sensors {
            y: 550.0,
            distance: 420.0,
            obstacle_width: 45.0,
            game_speed: 8.0,
        }
    }

    #[test]
    fn outputs_lie_in_the_unit_interval() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for hidden in [0, 1, 6, 12] {
            let network = FeedForwardNetwork::random(hidden, 3.0, &mut rng).expect("valid stdev");
            network.validate().expect("random networks are well formed");
            let output = network.evaluate(&sensors());
            assert!((0.0..=1.0).contains(&output), "{output}");
        }
    }

    #[test]
    fn parameter_count_matches_topology() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let network = FeedForwardNetwork::random(6, 1.0, &mut rng).expect("valid stdev");
        assert_eq!(network.parameter_count(), 4 * 6 + 6 + 6 + 1);
        assert_eq!(network.parameters().len(), network.parameter_count());
    }

    #[test]
    fn zero_rate_mutation_leaves_parameters_alone() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut network = FeedForwardNetwork::random(4, 1.0, &mut rng).expect("valid stdev");
        let before = network.clone();
        let noise = Normal::new(0.0, 0.5).expect("valid stdev");
        network.mutate(0.0, &noise, &mut rng);
        assert_eq!(network, before);

        network.mutate(1.0, &noise, &mut rng);
        assert_ne!(network, before);
    }

    #[test]
    fn crossover_draws_each_parameter_from_a_parent() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let first = FeedForwardNetwork::random(6, 1.0, &mut rng).expect("valid stdev");
        let second = FeedForwardNetwork::random(6, 1.0, &mut rng).expect("valid stdev");
        let child = first.crossover(&second, &mut rng);

        let (a, b) = (first.parameters(), second.parameters());
        for (index, value) in child.parameters().into_iter().enumerate() {
            assert!(value == a[index] || value == b[index]);
        }
    }

    #[test]
    fn negative_stdev_is_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for stdev in [-1.0, 0.0, f32::NAN] {
            assert!(matches!(
                FeedForwardNetwork::random(6, stdev, &mut rng),
                Err(EvolutionError::Config(ConfigError::NonPositive {
                    field: "evolution.weight_init_stdev",
                    ..
                }))
            ));
        }
    }

    #[test]
    fn truncated_layers_fail_validation() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut network = FeedForwardNetwork::random(3, 1.0, &mut rng).expect("valid stdev");
        let _ = network.layers[1].weights.pop();
        assert!(matches!(
            network.validate(),
            Err(EvolutionError::MalformedNetwork { layer: 1 })
        ));
    }
}
