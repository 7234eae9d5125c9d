use rand::Rng;

use crate::activation::activation::Activation;
use crate::error::{NetError, Result};
use crate::layers::dense::Layer;
use crate::loss::squared::SquaredError;
use crate::math::matrix::Matrix;
use crate::network::spec::NetworkSpec;

/// Everything a forward pass produces: each hidden layer's activations, in
/// order, and the final output vector. Backpropagation consumes it.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardPass {
    pub hidden: Vec<Vec<f64>>,
    pub output: Vec<f64>,
}

/// Feedforward network with any number of hidden layers.
///
/// Shapes are fixed at construction; `backward()` is the only thing that
/// changes parameter values. Layers are exposed read-only.
#[derive(Debug, Clone)]
pub struct Network {
    num_inputs: usize,
    pub(crate) hidden: Vec<Layer>,
    pub(crate) output: Layer,
}

impl Network {
    /// He-initialized network for `spec`. Pass a seeded RNG for reproducible
    /// weights.
    pub fn new<R: Rng + ?Sized>(spec: &NetworkSpec, rng: &mut R) -> Result<Network> {
        spec.validate()?;
        let fan_ins = spec.fan_ins();
        let hidden = spec
            .hidden_layers
            .iter()
            .zip(&spec.hidden_activations)
            .zip(&fan_ins)
            .map(|((&size, &act), &fan_in)| Layer::new(size, fan_in, act, rng))
            .collect();
        let last = *fan_ins.last().unwrap_or(&spec.num_inputs);
        let output = Layer::new(spec.num_outputs, last, spec.output_activation, rng);
        Ok(Network {
            num_inputs: spec.num_inputs,
            hidden,
            output,
        })
    }

    /// Assembles a network from explicit parameters, checking that every
    /// layer's fan-in matches the width of the layer before it.
    pub fn from_parts(num_inputs: usize, hidden: Vec<Layer>, output: Layer) -> Result<Network> {
        if num_inputs == 0 {
            return Err(NetError::Config("number of inputs must be at least 1".into()));
        }
        let mut width = num_inputs;
        for (i, layer) in hidden.iter().enumerate() {
            NetError::check_len(&format!("hidden layer {} fan-in", i), width, layer.input_size())?;
            width = layer.size();
        }
        NetError::check_len("output layer fan-in", width, output.input_size())?;
        let mut net = Network {
            num_inputs,
            hidden,
            output,
        };
        net.bind_functions();
        Ok(net)
    }

    /// Convenience over `from_parts` taking raw nested weights, with every
    /// bias zero.
    pub fn from_weights(
        num_inputs: usize,
        hidden_weights: Vec<Vec<Vec<f64>>>,
        hidden_activations: Vec<Activation>,
        output_weights: Vec<Vec<f64>>,
        output_activation: Activation,
    ) -> Result<Network> {
        NetError::check_len("hidden activations", hidden_weights.len(), hidden_activations.len())
            .map_err(|e| NetError::Config(e.to_string()))?;
        let hidden = hidden_weights
            .into_iter()
            .zip(hidden_activations)
            .map(|(w, act)| {
                let w = Matrix::from_data(w)?;
                let biases = vec![0.0; w.rows];
                Layer::from_parts(w, biases, act)
            })
            .collect::<Result<Vec<_>>>()?;
        let w = Matrix::from_data(output_weights)?;
        let biases = vec![0.0; w.rows];
        let output = Layer::from_parts(w, biases, output_activation)?;
        Network::from_parts(num_inputs, hidden, output)
    }

    /// Resolves every layer's activation to its function pair.
    ///
    /// Called once whenever a network is assembled from stored parts.
    pub fn bind_functions(&mut self) {
        for layer in self.hidden.iter_mut() {
            layer.bind_function();
        }
        self.output.bind_function();
    }

    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    pub fn hidden(&self) -> &[Layer] {
        &self.hidden
    }

    pub fn output(&self) -> &Layer {
        &self.output
    }

    pub fn num_outputs(&self) -> usize {
        self.output.size()
    }

    /// Width of each hidden layer, in order.
    pub fn hidden_layers(&self) -> Vec<usize> {
        self.hidden.iter().map(Layer::size).collect()
    }

    pub fn hidden_activations(&self) -> Vec<Activation> {
        self.hidden.iter().map(|l| l.activation).collect()
    }

    pub fn output_activation(&self) -> Activation {
        self.output.activation
    }

    /// The architecture this network was built with.
    pub fn spec(&self) -> NetworkSpec {
        NetworkSpec {
            num_inputs: self.num_inputs,
            hidden_layers: self.hidden_layers(),
            hidden_activations: self.hidden_activations(),
            num_outputs: self.num_outputs(),
            output_activation: self.output_activation(),
        }
    }

    /// Forward pass. Pure: the same weights and input always give the same
    /// result.
    pub fn forward(&self, input: &[f64]) -> Result<ForwardPass> {
        NetError::check_len("network input", self.num_inputs, input.len())?;
        let mut hidden: Vec<Vec<f64>> = Vec::with_capacity(self.hidden.len());
        for layer in &self.hidden {
            let src = hidden.last().map_or(input, |v| v.as_slice());
            let out = layer.feed_from(src);
            hidden.push(out);
        }
        let src = hidden.last().map_or(input, |v| v.as_slice());
        let output = self.output.feed_from(src);
        Ok(ForwardPass { hidden, output })
    }

    /// Output vector only.
    pub fn predict(&self, input: &[f64]) -> Result<Vec<f64>> {
        Ok(self.forward(input)?.output)
    }

    /// One online gradient step on `0.5 · Σ(target − output)²`.
    ///
    /// `pass` must be the forward pass of `input` under the current weights.
    /// All deltas are computed before any parameter moves, so each layer's
    /// error is propagated through the next layer's pre-update weights.
    /// A learning rate of `0` leaves every parameter untouched.
    pub fn backward(
        &mut self,
        input: &[f64],
        target: &[f64],
        pass: &ForwardPass,
        learning_rate: f64,
    ) -> Result<()> {
        if !learning_rate.is_finite() || learning_rate < 0.0 {
            return Err(NetError::Config(format!(
                "learning rate must be a finite non-negative number, got {}",
                learning_rate
            )));
        }
        self.check_pass(input, target, pass)?;

        // Residual already carries the descent sign: t - o.
        let residual = SquaredError::residual(&pass.output, target);
        let output_deltas = self.output.deltas(&residual, &pass.output);

        let mut hidden_deltas: Vec<Vec<f64>> = vec![Vec::new(); self.hidden.len()];
        let mut next_errors = self.output.back_errors(&output_deltas);
        for i in (0..self.hidden.len()).rev() {
            let deltas = self.hidden[i].deltas(&next_errors, &pass.hidden[i]);
            if i > 0 {
                next_errors = self.hidden[i].back_errors(&deltas);
            }
            hidden_deltas[i] = deltas;
        }

        let last = pass.hidden.last().map_or(input, |v| v.as_slice());
        self.output.apply_deltas(&output_deltas, last, learning_rate);
        for (i, deltas) in hidden_deltas.iter().enumerate() {
            let src = if i == 0 { input } else { pass.hidden[i - 1].as_slice() };
            self.hidden[i].apply_deltas(deltas, src, learning_rate);
        }
        Ok(())
    }

    fn check_pass(&self, input: &[f64], target: &[f64], pass: &ForwardPass) -> Result<()> {
        NetError::check_len("network input", self.num_inputs, input.len())?;
        NetError::check_len("target", self.num_outputs(), target.len())?;
        NetError::check_len("forward output", self.num_outputs(), pass.output.len())?;
        NetError::check_len("forward hidden layers", self.hidden.len(), pass.hidden.len())?;
        for (i, (layer, acts)) in self.hidden.iter().zip(&pass.hidden).enumerate() {
            NetError::check_len(&format!("hidden layer {} activations", i), layer.size(), acts.len())?;
        }
        Ok(())
    }
}
