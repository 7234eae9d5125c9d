use crate::error::{NetError, Result};
use crate::network::network::{ForwardPass, Network};

/// Plain gradient descent with a fixed learning rate.
#[derive(Debug, Clone, Copy)]
pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    /// Fails with `Config` unless `learning_rate` is finite and positive.
    pub fn new(learning_rate: f64) -> Result<Sgd> {
        if !learning_rate.is_finite() || learning_rate <= 0.0 {
            return Err(NetError::Config(format!(
                "learning rate must be a positive number, got {}",
                learning_rate
            )));
        }
        Ok(Sgd { learning_rate })
    }

    /// Applies one online update for a sample whose forward pass is `pass`.
    pub fn step(
        &self,
        network: &mut Network,
        input: &[f64],
        target: &[f64],
        pass: &ForwardPass,
    ) -> Result<()> {
        network.backward(input, target, pass, self.learning_rate)
    }
}
