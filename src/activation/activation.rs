use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{NetError, Result};

/// The closed set of activations a layer may use.
///
/// Serialized as its lowercase name (`"relu"`, `"sigmoid"`, `"tanh"`,
/// `"linear"`), which is also the name accepted by `from_name()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Relu,
    Sigmoid,
    Tanh,
    Linear,
}

/// A resolved activation: the element-wise function and its derivative.
///
/// `derivative` is evaluated on the *activated output* `v = activate(z)`,
/// never on the pre-activation sum `z`. Backpropagation only keeps layer
/// outputs around, so every entry in the table follows that convention.
#[derive(Clone, Copy)]
pub struct Kernel {
    pub activate: fn(f64) -> f64,
    pub derivative: fn(f64) -> f64,
}

impl fmt::Debug for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Kernel")
    }
}

// Indexed by `Activation as usize`; keep in declaration order.
static KERNELS: [Kernel; 4] = [
    Kernel { activate: relu, derivative: relu_derivative },
    Kernel { activate: sigmoid, derivative: sigmoid_derivative },
    Kernel { activate: tanh, derivative: tanh_derivative },
    Kernel { activate: linear, derivative: linear_derivative },
];

static NAMES: [(&str, Activation); 4] = [
    ("relu", Activation::Relu),
    ("sigmoid", Activation::Sigmoid),
    ("tanh", Activation::Tanh),
    ("linear", Activation::Linear),
];

impl Activation {
    /// Resolves a registry name. Unknown names are a configuration error.
    pub fn from_name(name: &str) -> Result<Activation> {
        let name = name.trim();
        NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, a)| *a)
            .ok_or_else(|| {
                NetError::Config(format!(
                    "unknown activation '{}' (expected one of: relu, sigmoid, tanh, linear)",
                    name
                ))
            })
    }

    /// Registry name of this activation.
    pub fn name(&self) -> &'static str {
        NAMES[*self as usize].0
    }

    /// Looks up the function pair for this activation.
    pub fn kernel(&self) -> Kernel {
        KERNELS[*self as usize]
    }

    pub fn function(&self, x: f64) -> f64 {
        (self.kernel().activate)(x)
    }

    /// Derivative expressed in terms of the activated output `v`.
    pub fn derivative(&self, v: f64) -> f64 {
        (self.kernel().derivative)(v)
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Activation {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Activation> {
        Activation::from_name(s)
    }
}

fn relu(x: f64) -> f64 {
    if x > 0.0 { x } else { 0.0 }
}

// relu output is positive exactly when its input was, so testing v works.
fn relu_derivative(v: f64) -> f64 {
    if v > 0.0 { 1.0 } else { 0.0 }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn sigmoid_derivative(v: f64) -> f64 {
    v * (1.0 - v)
}

fn tanh(x: f64) -> f64 {
    x.tanh()
}

fn tanh_derivative(v: f64) -> f64 {
    1.0 - v * v
}

fn linear(x: f64) -> f64 {
    x
}

fn linear_derivative(_v: f64) -> f64 {
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_resolve_and_render_back() {
        for (name, act) in NAMES.iter() {
            assert_eq!(Activation::from_name(name).unwrap(), *act);
            assert_eq!(act.name(), *name);
            assert_eq!(act.to_string(), *name);
        }
        assert_eq!(" tanh ".parse::<Activation>().unwrap(), Activation::Tanh);
    }

    #[test]
    fn unknown_name_is_config_error() {
        let err = Activation::from_name("softmax").unwrap_err();
        assert!(matches!(err, NetError::Config(_)));
        assert!(matches!(Activation::from_name("ReLU"), Err(NetError::Config(_))));
    }

    #[test]
    fn derivatives_take_activated_output() {
        let v = Activation::Sigmoid.function(0.0);
        assert_eq!(v, 0.5);
        assert_eq!(Activation::Sigmoid.derivative(v), 0.25);

        let v = Activation::Tanh.function(0.5);
        assert!((Activation::Tanh.derivative(v) - (1.0 - 0.5f64.tanh().powi(2))).abs() < 1e-15);

        assert_eq!(Activation::Relu.function(-2.0), 0.0);
        assert_eq!(Activation::Relu.derivative(0.0), 0.0);
        assert_eq!(Activation::Relu.derivative(3.0), 1.0);

        assert_eq!(Activation::Linear.function(-7.5), -7.5);
        assert_eq!(Activation::Linear.derivative(123.0), 1.0);
    }

    #[test]
    fn serializes_as_lowercase_name() {
        let json = serde_json::to_string(&Activation::Sigmoid).unwrap();
        assert_eq!(json, "\"sigmoid\"");
        let back: Activation = serde_json::from_str("\"relu\"").unwrap();
        assert_eq!(back, Activation::Relu);
    }
}
