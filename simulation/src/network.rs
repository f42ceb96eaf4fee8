//! A tiny feed-forward network with step activation.
//!
//! There is no training in the classical sense. A network starts with random weights and
//! only changes by [`NeuralNetwork::mutate`], which blends it towards a fresh random network.

use crate::error::{SimResult, SimulationError};
use crate::geometry::lerp;
use serde::{Deserialize, Serialize};

/// Draws a value in -1..1.
fn random_signed(rng: &mut fastrand::Rng) -> f32 {
    rng.f32() * 2.0 - 1.0
}

/// One fully connected layer. It remembers the values of the last pass for the visualizer.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    /// The values fed in during the last pass.
    pub inputs: Vec<f32>,
    /// The values produced during the last pass, each 0 or 1.
    pub outputs: Vec<f32>,
    /// One threshold per output.
    pub biases: Vec<f32>,
    /// Indexed `[input][output]`.
    pub weights: Vec<Vec<f32>>,
}

impl Level {
    /// Creates a level with random weights and biases.
    pub fn new(input_count: usize, output_count: usize, rng: &mut fastrand::Rng) -> Self {
        Level {
            inputs: vec![0.0; input_count],
            outputs: vec![0.0; output_count],
            biases: (0..output_count).map(|_| random_signed(rng)).collect(),
            weights: (0..input_count)
                .map(|_| (0..output_count).map(|_| random_signed(rng)).collect())
                .collect(),
        }
    }

    pub fn input_count(&self) -> usize {
        self.weights.len()
    }

    pub fn output_count(&self) -> usize {
        self.biases.len()
    }

    /// An output fires when the weighted sum of the inputs exceeds its bias.
    pub fn feed_forward(&mut self, given_inputs: &[f32]) -> SimResult<&[f32]> {
        if given_inputs.len() != self.input_count() {
            return Err(SimulationError::InputMismatch {
                expected: self.input_count(),
                actual: given_inputs.len(),
            });
        }
        self.inputs.clear();
        self.inputs.extend_from_slice(given_inputs);

        for (output_index, output) in self.outputs.iter_mut().enumerate() {
            let sum: f32 = self
                .inputs
                .iter()
                .zip(self.weights.iter())
                .map(|(input, weights)| input * weights[output_index])
                .sum();
            *output = if sum > self.biases[output_index] { 1.0 } else { 0.0 };
        }

        Ok(&self.outputs)
    }

    fn mutate(&mut self, amount: f32, rng: &mut fastrand::Rng) {
        for bias in self.biases.iter_mut() {
            *bias = lerp(*bias, random_signed(rng), amount);
        }
        for weight in self.weights.iter_mut().flatten() {
            *weight = lerp(*weight, random_signed(rng), amount);
        }
    }

    /// Checks the stored dimensions agree with each other, used after deserialization.
    fn is_consistent(&self) -> bool {
        self.outputs.len() == self.biases.len()
            && self.inputs.len() == self.weights.len()
            && self.weights.iter().all(|row| row.len() == self.biases.len())
    }
}

/// The brain of a car.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct NeuralNetwork {
    pub levels: Vec<Level>,
}

impl NeuralNetwork {
    /// Creates a random network. `neuron_counts` lists the layer sizes from input to output.
    ///
    /// # Errors
    /// Fails on fewer than two layers or on an empty layer.
    pub fn new(neuron_counts: &[usize], rng: &mut fastrand::Rng) -> SimResult<Self> {
        if neuron_counts.len() < 2 {
            return Err(SimulationError::InvalidTopology(format!(
                "need at least two layers, got {}",
                neuron_counts.len()
            )));
        }
        if neuron_counts.contains(&0) {
            return Err(SimulationError::InvalidTopology(format!(
                "empty layer in {neuron_counts:?}"
            )));
        }

        let levels = neuron_counts
            .windows(2)
            .map(|pair| Level::new(pair[0], pair[1], rng))
            .collect();
        Ok(NeuralNetwork { levels })
    }

    /// The layer sizes from input to output.
    pub fn topology(&self) -> Vec<usize> {
        let mut counts: Vec<usize> = self.levels.iter().map(Level::input_count).collect();
        if let Some(last) = self.levels.last() {
            counts.push(last.output_count());
        }
        counts
    }

    /// Runs all levels in sequence and returns the outputs of the last one.
    pub fn feed_forward(&mut self, given_inputs: &[f32]) -> SimResult<Vec<f32>> {
        let mut values = given_inputs.to_vec();
        for level in self.levels.iter_mut() {
            values = level.feed_forward(&values)?.to_vec();
        }
        Ok(values)
    }

    /// Blends every weight and bias towards a random value. An amount of 0 keeps the
    /// network, 1 replaces it by a random one.
    pub fn mutate(&mut self, amount: f32, rng: &mut fastrand::Rng) {
        for level in self.levels.iter_mut() {
            level.mutate(amount, rng);
        }
    }

    /// A mutated copy, leaving `self` untouched.
    pub fn mutated(&self, amount: f32, rng: &mut fastrand::Rng) -> Self {
        let mut copy = self.clone();
        copy.mutate(amount, rng);
        copy
    }

    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a stored brain and checks that the levels fit together.
    pub fn from_json(json: &str) -> SimResult<Self> {
        let network: NeuralNetwork = serde_json::from_str(json)?;
        if network.levels.is_empty() {
            return Err(SimulationError::InvalidTopology(
                "stored brain has no levels".to_string(),
            ));
        }
        let chained = network
            .levels
            .windows(2)
            .all(|pair| pair[0].output_count() == pair[1].input_count());
        if !chained || !network.levels.iter().all(Level::is_consistent) {
            return Err(SimulationError::InvalidTopology(
                "stored brain has mismatching levels".to_string(),
            ));
        }
        let topology = network.topology();
        if topology.contains(&0) {
            return Err(SimulationError::InvalidTopology(format!(
                "empty layer in stored brain {topology:?}"
            )));
        }
        Ok(network)
    }
}
