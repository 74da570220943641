//! Layers and their forward/backward contract.
//!
//! # Two-phase propagation
//!
//! A trainable [`Layer`] does not cache anything on itself. [`Layer::forward`]
//! returns the activated output together with a [`ForwardContext`] holding the
//! input and pre-activation of that call, and [`Layer::backward`] consumes the
//! context by value. Calling `backward` without a matching `forward`, or twice
//! for the same `forward`, does not type-check.
//!
//! The activation derivative is evaluated at the cached pre-activation value,
//! never at the incoming error.
//!
//! Layers that only ever run inference implement [`Forward`] alone.
//!
//! ## Example
//!
//! ```rust
//! use quantum_nn::{Activation, FullyConnected, Layer, Matrix};
//!
//! let layer = FullyConnected::from_parameters(
//!     Matrix::new(1, 2, vec![1.0, -1.0])?,
//!     Matrix::zeros(1, 1)?,
//!     Activation::Relu,
//! )?;
//! let (out, ctx) = layer.forward(&Matrix::column(vec![3.0, 1.0])?)?;
//! assert_eq!(out.to_vec(), vec![2.0]);
//!
//! let grads = layer.backward(ctx, &Matrix::column(vec![1.0])?)?;
//! assert_eq!(grads.weights.to_vec(), vec![3.0, 1.0]);
//! # Ok::<(), quantum_nn::Error>(())
//! ```

use tracing::debug;

use crate::activation::Activation;
use crate::error::{Result, ShapeError};
use crate::matrix::{Matrix, Vector};
use crate::random::{DEFAULT_MU, DEFAULT_SIGMA, MatrixRng};

/// The forward-only contract: a pure map from an input vector to an output vector.
pub trait Forward {
    /// Length of the accepted input vector.
    fn num_inputs(&self) -> usize;

    /// Length of the produced output vector.
    fn num_outputs(&self) -> usize;

    /// Runs the layer without keeping anything for a backward pass.
    ///
    /// # Errors
    /// [`ShapeError::LayerInput`] if `input` is not a `num_inputs × 1` vector.
    fn infer(&self, input: &Vector) -> Result<Vector>;
}

/// A trainable layer.
pub trait Layer: Forward {
    /// Runs the layer and returns the output with the state `backward` needs.
    ///
    /// # Errors
    /// [`ShapeError::LayerInput`] if `input` is not a `num_inputs × 1` vector.
    fn forward(&self, input: &Vector) -> Result<(Vector, ForwardContext)>;

    /// Propagates `output_error` back through the layer.
    ///
    /// # Errors
    /// [`ShapeError::LayerInput`] if `output_error` is not a
    /// `num_outputs × 1` vector or `ctx` was produced by a layer of other dims.
    fn backward(&self, ctx: ForwardContext, output_error: &Vector) -> Result<LayerGradients>;

    /// In-place `weights -= weight_delta; biases -= bias_delta`.
    ///
    /// Both deltas are checked before either parameter is touched.
    ///
    /// # Errors
    /// [`ShapeError::LayerInput`] if a delta's dims differ from its parameter's.
    fn update(&mut self, weight_delta: &Matrix, bias_delta: &Vector) -> Result<()>;

    /// Weight matrix, `num_outputs × num_inputs`.
    fn weights(&self) -> &Matrix;

    /// Bias vector, `num_outputs × 1`.
    fn biases(&self) -> &Vector;
}

/// State captured by one [`Layer::forward`] call, consumed by the paired
/// [`Layer::backward`].
///
/// Contexts are minted only by the crate's layers. A context does not record
/// which layer produced it: `backward` checks its dims, but handing it to a
/// different layer of the same dims is not detected.
///
/// ```compile_fail
/// use quantum_nn::{ForwardContext, Matrix};
///
/// let v = Matrix::column(vec![1.0]).unwrap();
/// let _ = ForwardContext::new(v.clone(), v);
/// ```
#[derive(Debug, Clone)]
pub struct ForwardContext {
    input: Vector,
    pre_activation: Vector,
}

impl ForwardContext {
    #[must_use]
    pub(crate) const fn new(input: Vector, pre_activation: Vector) -> Self {
        Self {
            input,
            pre_activation,
        }
    }

    /// The input the layer saw.
    #[must_use]
    pub const fn input(&self) -> &Vector {
        &self.input
    }

    /// The value the activation was applied to.
    #[must_use]
    pub const fn pre_activation(&self) -> &Vector {
        &self.pre_activation
    }
}

/// Everything [`Layer::backward`] produces.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerGradients {
    /// Error with respect to the layer input, fed to the previous layer.
    pub inputs: Vector,
    /// Gradient with respect to the weights.
    pub weights: Matrix,
    /// Gradient with respect to the biases.
    pub biases: Vector,
}

impl LayerGradients {
    /// Drops the input error, keeping what an optimizer needs.
    #[must_use]
    pub fn into_parameters(self) -> ParameterGradients {
        ParameterGradients {
            weights: self.weights,
            biases: self.biases,
        }
    }
}

/// Weight and bias gradients of one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterGradients {
    /// Gradient with respect to the weights.
    pub weights: Matrix,
    /// Gradient with respect to the biases.
    pub biases: Vector,
}

impl ParameterGradients {
    /// Element-wise sum, for accumulating gradients over several samples.
    ///
    /// # Errors
    /// [`ShapeError::Incompatible`] if the two come from differently shaped layers.
    pub fn add(&self, other: &Self) -> Result<Self> {
        Ok(Self {
            weights: self.weights.add(&other.weights)?,
            biases: self.biases.add(&other.biases)?,
        })
    }

    /// Both gradients multiplied by `k`.
    #[must_use]
    pub fn scale(&self, k: f64) -> Self {
        Self {
            weights: self.weights.scale(k),
            biases: self.biases.scale(k),
        }
    }
}

/// Fully-connected layer: `activation(weights @ input + biases)`.
#[derive(Debug, Clone, PartialEq)]
pub struct FullyConnected {
    weights: Matrix,
    biases: Vector,
    activation: Activation,
}

impl FullyConnected {
    /// Creates a layer with weights drawn from `N(0, 0.2²)` and zero biases.
    ///
    /// # Errors
    /// [`ShapeError::Empty`] if either size is zero.
    pub fn new(
        num_inputs: usize,
        num_outputs: usize,
        activation: Activation,
        rng: &mut MatrixRng,
    ) -> Result<Self> {
        let weights = rng.gauss(num_outputs, num_inputs, DEFAULT_MU, DEFAULT_SIGMA)?;
        let biases = Matrix::zeros(num_outputs, 1)?;
        debug!(num_inputs, num_outputs, %activation, "created fully-connected layer");
        Ok(Self {
            weights,
            biases,
            activation,
        })
    }

    /// Like [`FullyConnected::new`], choosing the activation by name.
    ///
    /// # Errors
    /// [`Error::Configuration`](crate::Error::Configuration) for an unknown
    /// activation name, otherwise as [`FullyConnected::new`].
    pub fn with_activation_name(
        num_inputs: usize,
        num_outputs: usize,
        activation: &str,
        rng: &mut MatrixRng,
    ) -> Result<Self> {
        Self::new(num_inputs, num_outputs, activation.parse()?, rng)
    }

    /// Builds a layer around existing parameters.
    ///
    /// # Errors
    /// [`ShapeError::LayerInput`] unless `biases` is a `weights.rows() × 1` vector.
    pub fn from_parameters(weights: Matrix, biases: Vector, activation: Activation) -> Result<Self> {
        check_dims((weights.rows(), 1), &biases)?;
        Ok(Self {
            weights,
            biases,
            activation,
        })
    }

    /// The layer's nonlinearity.
    #[must_use]
    pub const fn activation(&self) -> Activation {
        self.activation
    }

    fn pre_activation(&self, input: &Vector) -> Result<Vector> {
        check_dims((self.num_inputs(), 1), input)?;
        self.weights.matmul(input)?.add(&self.biases)
    }
}

fn check_dims(expected: (usize, usize), m: &Matrix) -> Result<()> {
    if m.shape() == expected {
        Ok(())
    } else {
        Err(ShapeError::LayerInput {
            expected,
            actual: m.shape(),
        }
        .into())
    }
}

impl Forward for FullyConnected {
    fn num_inputs(&self) -> usize {
        self.weights.cols()
    }

    fn num_outputs(&self) -> usize {
        self.weights.rows()
    }

    fn infer(&self, input: &Vector) -> Result<Vector> {
        Ok(self.activation.apply(&self.pre_activation(input)?))
    }
}

impl Layer for FullyConnected {
    fn forward(&self, input: &Vector) -> Result<(Vector, ForwardContext)> {
        let pre_activation = self.pre_activation(input)?;
        let output = self.activation.apply(&pre_activation);
        Ok((output, ForwardContext::new(input.clone(), pre_activation)))
    }

    fn backward(&self, ctx: ForwardContext, output_error: &Vector) -> Result<LayerGradients> {
        let out_dims = (self.num_outputs(), 1);
        check_dims(out_dims, output_error)?;
        check_dims(out_dims, &ctx.pre_activation)?;
        check_dims((self.num_inputs(), 1), &ctx.input)?;

        let deactivated =
            output_error.elementwise_multiply(&self.activation.derivative(&ctx.pre_activation))?;
        let inputs = self.weights.transpose().matmul(&deactivated)?;
        let weights = deactivated.matmul(&ctx.input.into_transpose())?;

        Ok(LayerGradients {
            inputs,
            weights,
            biases: deactivated,
        })
    }

    fn update(&mut self, weight_delta: &Matrix, bias_delta: &Vector) -> Result<()> {
        check_dims(self.weights.shape(), weight_delta)?;
        check_dims(self.biases.shape(), bias_delta)?;
        self.weights.sub_assign(weight_delta)?;
        self.biases.sub_assign(bias_delta)
    }

    fn weights(&self) -> &Matrix {
        &self.weights
    }

    fn biases(&self) -> &Vector {
        &self.biases
    }
}
