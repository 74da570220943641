//! Element-wise activation functions.
//!
//! Each variant carries a `forwards` nonlinearity and its `backwards`
//! derivative with respect to the pre-activation value.
//!
//! | name        | forwards(x)              | backwards(x)            |
//! |-------------|--------------------------|-------------------------|
//! | `ReLU`      | `max(x, 0)`              | `0` if `x <= 0` else `1`  |
//! | `LeakyReLU` | `0.01x` if `x < 0` else `x` | `0.01` if `x <= 0` else `1` |
//! | `TanH`      | `tanh(x)`                | `1 - tanh(x)²`          |
//!
//! Activations are chosen by name at the configuration boundary:
//!
//! ```rust
//! use quantum_nn::Activation;
//!
//! let act: Activation = "LeakyReLU".parse()?;
//! assert_eq!(act.forwards(-2.0), -0.02);
//! assert!("Softmax".parse::<Activation>().is_err());
//! # Ok::<(), quantum_nn::Error>(())
//! ```

use core::fmt;
use core::str::FromStr;

use crate::error::Error;
use crate::matrix::Matrix;

/// Negative-side slope of [`Activation::LeakyRelu`].
pub const LEAKY_SLOPE: f64 = 0.01;

/// A scalar nonlinearity paired with its derivative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Activation {
    /// Rectified linear unit.
    #[default]
    Relu,
    /// `ReLU` with a small negative slope.
    LeakyRelu,
    /// Hyperbolic tangent.
    Tanh,
}

impl Activation {
    /// All variants, in declaration order.
    pub const ALL: [Self; 3] = [Self::Relu, Self::LeakyRelu, Self::Tanh];

    /// Canonical name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Relu => "ReLU",
            Self::LeakyRelu => "LeakyReLU",
            Self::Tanh => "TanH",
        }
    }

    /// The nonlinearity.
    #[must_use]
    pub fn forwards(self, x: f64) -> f64 {
        match self {
            Self::Relu => x.max(0.0),
            Self::LeakyRelu => {
                if x < 0.0 {
                    LEAKY_SLOPE * x
                } else {
                    x
                }
            }
            Self::Tanh => x.tanh(),
        }
    }

    /// Derivative of [`Activation::forwards`], evaluated at the
    /// pre-activation value `x`.
    #[must_use]
    pub fn backwards(self, x: f64) -> f64 {
        match self {
            Self::Relu => {
                if x <= 0.0 {
                    0.0
                } else {
                    1.0
                }
            }
            Self::LeakyRelu => {
                if x <= 0.0 {
                    LEAKY_SLOPE
                } else {
                    1.0
                }
            }
            Self::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
        }
    }

    /// Applies [`Activation::forwards`] element-wise.
    #[must_use]
    pub fn apply(self, m: &Matrix) -> Matrix {
        m.map(|x| self.forwards(x))
    }

    /// Applies [`Activation::backwards`] element-wise.
    #[must_use]
    pub fn derivative(self, m: &Matrix) -> Matrix {
        m.map(|x| self.backwards(x))
    }
}

impl FromStr for Activation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "relu" => Ok(Self::Relu),
            "leakyrelu" => Ok(Self::LeakyRelu),
            "tanh" => Ok(Self::Tanh),
            _ => Err(Error::Configuration(format!(
                "unknown activation function '{s}' (expected one of ReLU, LeakyReLU, TanH)"
            ))),
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for act in Activation::ALL {
            assert_eq!(act.name().parse::<Activation>().unwrap(), act);
        }
        assert_eq!("leaky_relu".parse::<Activation>().unwrap(), Activation::LeakyRelu);
        assert_eq!("TANH".parse::<Activation>().unwrap(), Activation::Tanh);
    }

    #[test]
    fn unknown_name_is_a_configuration_error() {
        let err = "sigmoid".parse::<Activation>().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn values_follow_table() {
        let t = 0.5f64.tanh();
        // (activation, x, forwards(x), backwards(x))
        let cases = [
            (Activation::Relu, 2.0, 2.0, 1.0),
            (Activation::Relu, -3.0, 0.0, 0.0),
            (Activation::LeakyRelu, 2.0, 2.0, 1.0),
            (Activation::LeakyRelu, -3.0, -0.03, LEAKY_SLOPE),
            (Activation::Tanh, 0.5, t, 1.0 - t * t),
            (Activation::Tanh, -0.5, -t, 1.0 - t * t),
            (Activation::Tanh, 20.0, 1.0, 0.0),
        ];
        for (act, x, fwd, bwd) in cases {
            assert!((act.forwards(x) - fwd).abs() < 1e-12, "{act} forwards({x})");
            assert!((act.backwards(x) - bwd).abs() < 1e-12, "{act} backwards({x})");
        }
    }

    #[test]
    fn derivative_at_zero_follows_table() {
        assert_eq!(Activation::Relu.backwards(0.0), 0.0);
        assert_eq!(Activation::LeakyRelu.backwards(0.0), LEAKY_SLOPE);
        assert_eq!(Activation::Tanh.backwards(0.0), 1.0);
    }
}
