//! quantum_nn: dense matrices and a small feed-forward network core in Rust.
//!
//! Built for experimenting with networks trained adversarially (a generator
//! and a discriminator driven by an outside training loop), with a focus on
//! explicit shapes and explicit data flow rather than a hidden graph.
//!
//! # Features
//!
//! - Dense `f64` matrices with element-wise algebra, a parallel matrix
//!   product built on lazy row/column views, and copy-free transposition.
//! - Uniform and Gaussian random matrices with reproducible seeding.
//! - Fully-connected layers with `ReLU`, `LeakyReLU` and `TanH` activations.
//! - Networks that thread a vector forward and an error signal backward.
//! - An Adam optimizer bound per parameter tensor.
//!
//! # Goals
//!
//! - Every dimension mismatch is a typed error at the call that caused it.
//! - Backward passes consume the state of their forward pass, so the
//!   forward-before-backward protocol is checked by the compiler.
//! - Matrix values are immutable; only optimizer updates write in place.
//!
//! # Modules
//!
//! - [`matrix`]: the [`Matrix`] type and its views.
//! - [`random`]: random matrix construction.
//! - [`activation`]: element-wise nonlinearities.
//! - [`layer`]: the [`Layer`] contract and [`FullyConnected`].
//! - [`network`]: [`Network`] composition.
//! - [`optim`]: [`AdamOptimizer`] and per-layer/per-network bookkeeping.
//! - [`loss`]: loss functions and their gradients.
//! - [`error`]: [`Error`] and [`ShapeError`].
//!
//! # Example
//!
//! ```rust
//! use quantum_nn::{
//!     loss, Activation, AdamConfig, FullyConnected, Matrix, Network, NetworkOptimizer,
//!     random::MatrixRng,
//! };
//!
//! let mut rng = MatrixRng::seeded(42);
//! let mut net = Network::new();
//! net.append(Box::new(FullyConnected::new(2, 4, Activation::Tanh, &mut rng)?))?;
//! net.append(Box::new(FullyConnected::new(4, 1, Activation::LeakyRelu, &mut rng)?))?;
//! let mut opt = NetworkOptimizer::new(&net, AdamConfig::default())?;
//!
//! let x = Matrix::column(vec![0.5, -0.25])?;
//! let y = Matrix::column(vec![1.0])?;
//! let (out, trace) = net.forward(&x)?;
//! let grads = net.backward(trace, &loss::mse_gradient(&y, &out)?)?;
//! opt.apply(&mut net, &grads)?;
//! # Ok::<(), quantum_nn::Error>(())
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::many_single_char_names,
    clippy::cast_precision_loss,
    clippy::similar_names,
    clippy::float_cmp
)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod activation;
pub mod error;
pub mod layer;
pub mod loss;
pub mod matrix;
pub mod network;
pub mod optim;
pub mod random;

mod ops;

pub use activation::Activation;
pub use error::{Error, Result, ShapeError};
pub use layer::{Forward, ForwardContext, FullyConnected, Layer, LayerGradients, ParameterGradients};
pub use matrix::{Matrix, Vector, View};
pub use network::{Network, NetworkTrace};
pub use optim::{AdamConfig, AdamOptimizer, LayerOptimizer, NetworkOptimizer};
