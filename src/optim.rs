//! Adaptive moment estimation (Adam).
//!
//! D. P. Kingma and J. Ba, "Adam: A Method for Stochastic Optimization,"
//! arXiv:1412.6980, 2014.
//!
//! One [`AdamOptimizer`] is bound to exactly one parameter tensor. A
//! fully-connected layer therefore needs two: one for its weights and one
//! for its biases. [`LayerOptimizer`] and [`NetworkOptimizer`] do that
//! bookkeeping and drive the update choreography:
//!
//! 1. gradients come out of [`Network::backward`]
//! 2. each tensor's optimizer turns its gradient into a delta
//! 3. [`Layer::update`] subtracts the deltas in place
//!
//! ## Update rule
//!
//! ```text
//! t     = t + 1
//! m     = β1·m + (1 − β1)·g
//! v     = β2·v + (1 − β2)·g²
//! m̂     = m / (1 − β1ᵗ)
//! v̂     = v / (1 − β2ᵗ)
//! θ     = θ − α·m̂ / (√v̂ + ε)
//! ```
//!
//! The second moment accumulates from its own previous value.

use tracing::trace;

use crate::error::{Error, Result};
use crate::layer::{Layer, ParameterGradients};
use crate::matrix::Matrix;
use crate::network::Network;

/// Adam hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdamConfig {
    /// Step size α.
    pub alpha: f64,
    /// Decay rate of the first moment.
    pub beta1: f64,
    /// Decay rate of the second moment.
    pub beta2: f64,
    /// Added to the denominator to keep it away from zero.
    pub epsilon: f64,
}

impl Default for AdamConfig {
    fn default() -> Self {
        Self {
            alpha: 1e-3,
            beta1: 0.9,
            beta2: 0.99,
            epsilon: 1e-8,
        }
    }
}

impl AdamConfig {
    /// Sets α.
    #[must_use]
    pub const fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Sets β1.
    #[must_use]
    pub const fn with_beta1(mut self, beta1: f64) -> Self {
        self.beta1 = beta1;
        self
    }

    /// Sets β2.
    #[must_use]
    pub const fn with_beta2(mut self, beta2: f64) -> Self {
        self.beta2 = beta2;
        self
    }

    /// Sets ε.
    #[must_use]
    pub const fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Checks `alpha > 0`, `0 <= beta < 1` and `epsilon > 0`, all finite.
    ///
    /// # Errors
    /// [`Error::Configuration`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let bad = |name: &str, value: f64| {
            Err(Error::Configuration(format!(
                "invalid Adam hyperparameter {name} = {value}"
            )))
        };
        if !(self.alpha.is_finite() && self.alpha > 0.0) {
            return bad("alpha", self.alpha);
        }
        if !(0.0..1.0).contains(&self.beta1) {
            return bad("beta1", self.beta1);
        }
        if !(0.0..1.0).contains(&self.beta2) {
            return bad("beta2", self.beta2);
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return bad("epsilon", self.epsilon);
        }
        Ok(())
    }
}

/// Adam state for a single parameter tensor.
#[derive(Debug, Clone, PartialEq)]
pub struct AdamOptimizer {
    parameters: Matrix,
    config: AdamConfig,
    first_moment: Matrix,
    second_moment: Matrix,
    step_count: u32,
}

impl AdamOptimizer {
    /// Binds a fresh optimizer to `parameters`. Both moments start at zero.
    ///
    /// # Errors
    /// [`Error::Configuration`] if `config` fails [`AdamConfig::validate`].
    pub fn new(parameters: Matrix, config: AdamConfig) -> Result<Self> {
        config.validate()?;
        let (rows, cols) = parameters.shape();
        Ok(Self {
            first_moment: Matrix::zeros(rows, cols)?,
            second_moment: Matrix::zeros(rows, cols)?,
            parameters,
            config,
            step_count: 0,
        })
    }

    /// The tensor being optimized.
    #[must_use]
    pub const fn parameters(&self) -> &Matrix {
        &self.parameters
    }

    /// Hyperparameters.
    #[must_use]
    pub const fn config(&self) -> &AdamConfig {
        &self.config
    }

    /// Number of steps taken.
    #[must_use]
    pub const fn step_count(&self) -> u32 {
        self.step_count
    }

    /// `true` until the first step.
    #[must_use]
    pub const fn is_fresh(&self) -> bool {
        self.step_count == 0
    }

    /// First moment estimate `m`.
    #[must_use]
    pub const fn first_moment(&self) -> &Matrix {
        &self.first_moment
    }

    /// Second moment estimate `v`.
    #[must_use]
    pub const fn second_moment(&self) -> &Matrix {
        &self.second_moment
    }

    /// Takes one step and returns the updated parameters.
    ///
    /// # Errors
    /// [`ShapeError::Incompatible`](crate::ShapeError::Incompatible) if
    /// `gradient` is not shaped like the parameters. State is untouched on error.
    pub fn step(&mut self, gradient: &Matrix) -> Result<&Matrix> {
        self.step_delta(gradient)?;
        Ok(&self.parameters)
    }

    /// Takes one step and returns the delta that was subtracted from the
    /// parameters, ready to hand to [`Layer::update`].
    ///
    /// # Errors
    /// Same as [`AdamOptimizer::step`].
    pub fn step_delta(&mut self, gradient: &Matrix) -> Result<Matrix> {
        let AdamConfig {
            alpha,
            beta1,
            beta2,
            epsilon,
        } = self.config;
        let t = self.step_count + 1;

        let first_moment = self
            .first_moment
            .scale(beta1)
            .add(&gradient.scale(1.0 - beta1))?;
        let second_moment = self
            .second_moment
            .scale(beta2)
            .add(&gradient.elementwise_multiply(gradient)?.scale(1.0 - beta2))?;

        let exponent = i32::try_from(t).unwrap_or(i32::MAX);
        let m_hat = first_moment.scale(1.0 / (1.0 - beta1.powi(exponent)));
        let v_hat = second_moment.scale(1.0 / (1.0 - beta2.powi(exponent)));

        let delta = m_hat
            .elementwise_divide(&v_hat.map(f64::sqrt).add_scalar(epsilon))?
            .scale(alpha);

        self.parameters.sub_assign(&delta)?;
        self.first_moment = first_moment;
        self.second_moment = second_moment;
        self.step_count = t;
        trace!(step = t, "adam step");

        Ok(delta)
    }
}

/// The weight and bias optimizers of one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerOptimizer {
    weights: AdamOptimizer,
    biases: AdamOptimizer,
}

impl LayerOptimizer {
    /// Binds two fresh optimizers to copies of `layer`'s parameters.
    ///
    /// # Errors
    /// [`Error::Configuration`] if `config` is invalid.
    pub fn for_layer(layer: &dyn Layer, config: AdamConfig) -> Result<Self> {
        Ok(Self {
            weights: AdamOptimizer::new(layer.weights().clone(), config)?,
            biases: AdamOptimizer::new(layer.biases().clone(), config)?,
        })
    }

    /// Optimizer bound to the weights.
    #[must_use]
    pub const fn weights(&self) -> &AdamOptimizer {
        &self.weights
    }

    /// Optimizer bound to the biases.
    #[must_use]
    pub const fn biases(&self) -> &AdamOptimizer {
        &self.biases
    }

    fn check(&self, layer: &dyn Layer, grads: &ParameterGradients) -> Result<()> {
        for (bound, other) in [
            (self.weights.parameters(), &grads.weights),
            (self.biases.parameters(), &grads.biases),
            (self.weights.parameters(), layer.weights()),
            (self.biases.parameters(), layer.biases()),
        ] {
            if bound.shape() != other.shape() {
                return Err(Error::incompatible(
                    "optimizer update",
                    bound.shape(),
                    other.shape(),
                ));
            }
        }
        Ok(())
    }

    /// Steps both optimizers and applies the deltas to `layer`.
    ///
    /// All shapes are checked before any state changes.
    ///
    /// # Errors
    /// [`ShapeError::Incompatible`](crate::ShapeError::Incompatible) if the
    /// gradients or the layer do not match the bound parameters.
    pub fn apply(&mut self, layer: &mut dyn Layer, grads: &ParameterGradients) -> Result<()> {
        self.check(layer, grads)?;
        let weight_delta = self.weights.step_delta(&grads.weights)?;
        let bias_delta = self.biases.step_delta(&grads.biases)?;
        layer.update(&weight_delta, &bias_delta)
    }
}

/// One [`LayerOptimizer`] per network layer.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkOptimizer {
    layers: Vec<LayerOptimizer>,
}

impl NetworkOptimizer {
    /// Binds optimizers to every layer of `network`, first layer first.
    ///
    /// # Errors
    /// [`Error::Configuration`] if `config` is invalid.
    pub fn new(network: &Network, config: AdamConfig) -> Result<Self> {
        let layers = network
            .layers()
            .map(|layer| LayerOptimizer::for_layer(layer, config))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { layers })
    }

    /// Per-layer optimizers, first layer first.
    #[must_use]
    pub fn layers(&self) -> &[LayerOptimizer] {
        &self.layers
    }

    /// Applies gradients in the order [`Network::backward`] returns them
    /// (last layer first).
    ///
    /// Every layer is checked before any of them is stepped, so on error
    /// neither the network nor the optimizer state has changed.
    ///
    /// # Errors
    /// - [`Error::Configuration`] if the gradient count or the network's
    ///   layer count differs from the number of bound layers
    /// - [`ShapeError::Incompatible`](crate::ShapeError::Incompatible) from
    ///   [`LayerOptimizer::apply`]
    pub fn apply(&mut self, network: &mut Network, grads: &[ParameterGradients]) -> Result<()> {
        let n = self.layers.len();
        if grads.len() != n || network.len() != n {
            return Err(Error::Configuration(format!(
                "optimizer is bound to {n} layers, got {} gradients for a network of {} layers",
                grads.len(),
                network.len()
            )));
        }
        for ((opt, g), layer) in self.layers.iter().zip(grads.iter().rev()).zip(network.layers()) {
            opt.check(layer, g)?;
        }
        for (i, (opt, g)) in self.layers.iter_mut().zip(grads.iter().rev()).enumerate() {
            let layer = network
                .layer_mut(i)
                .ok_or_else(|| Error::Configuration(format!("network has no layer {i}")))?;
            opt.apply(layer, g)?;
        }
        Ok(())
    }
}
