//! Ordered composition of layers.
//!
//! A [`Network`] threads a vector forward through its layers and an error
//! signal backward through them in reverse. Adjacent layers must agree on
//! size: `layers[i].num_outputs() == layers[i + 1].num_inputs()`, which is
//! checked on every append.
//!
//! [`Network::forward`] returns a [`NetworkTrace`] alongside the output. The
//! trace holds one [`ForwardContext`] per layer and is consumed by
//! [`Network::backward`], which walks the layers last-first. Each layer's
//! backward step needs the input error produced by the layer after it, so
//! the walk is strictly sequential.

use tracing::{debug, trace};

use crate::error::{Error, Result, ShapeError};
use crate::layer::{ForwardContext, Layer, LayerGradients, ParameterGradients};
use crate::matrix::Vector;

/// A feed-forward network.
#[derive(Default)]
pub struct Network {
    layers: Vec<Box<dyn Layer>>,
}

/// Per-layer state of one [`Network::forward`] call.
#[derive(Debug, Clone)]
pub struct NetworkTrace {
    contexts: Vec<ForwardContext>,
}

impl NetworkTrace {
    /// Number of recorded layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    /// `true` if no layer was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

impl Network {
    /// An empty network.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a network by appending `layers` in order.
    ///
    /// # Errors
    /// [`ShapeError::Chain`] at the first pair of layers that do not line up.
    pub fn from_layers<I>(layers: I) -> Result<Self>
    where
        I: IntoIterator<Item = Box<dyn Layer>>,
    {
        let mut network = Self::new();
        for layer in layers {
            network.append(layer)?;
        }
        Ok(network)
    }

    /// Appends `layer` after the current last layer.
    ///
    /// On error the network is left unchanged.
    ///
    /// # Errors
    /// [`ShapeError::Chain`] unless the network is empty or
    /// `layer.num_inputs()` equals the last layer's `num_outputs()`.
    pub fn append(&mut self, layer: Box<dyn Layer>) -> Result<()> {
        if let Some(last) = self.layers.last() {
            if last.num_outputs() != layer.num_inputs() {
                return Err(ShapeError::Chain {
                    expected: last.num_outputs(),
                    actual: layer.num_inputs(),
                }
                .into());
            }
        }
        debug!(
            index = self.layers.len(),
            num_inputs = layer.num_inputs(),
            num_outputs = layer.num_outputs(),
            "appended layer"
        );
        self.layers.push(layer);
        Ok(())
    }

    /// Number of layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// `true` if there are no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layer `i`, first layer at 0.
    #[must_use]
    pub fn layer(&self, i: usize) -> Option<&(dyn Layer + 'static)> {
        self.layers.get(i).map(|l| &**l)
    }

    /// Mutable access to layer `i`, for parameter updates.
    pub fn layer_mut(&mut self, i: usize) -> Option<&mut (dyn Layer + 'static)> {
        self.layers.get_mut(i).map(|l| &mut **l)
    }

    /// Iterates the layers front to back.
    pub fn layers(&self) -> impl DoubleEndedIterator<Item = &(dyn Layer + 'static)> + '_ {
        self.layers.iter().map(|l| &**l)
    }

    /// Input size of the first layer.
    #[must_use]
    pub fn num_inputs(&self) -> Option<usize> {
        self.layers.first().map(|l| l.num_inputs())
    }

    /// Output size of the last layer.
    #[must_use]
    pub fn num_outputs(&self) -> Option<usize> {
        self.layers.last().map(|l| l.num_outputs())
    }

    fn check_not_empty(&self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(Error::Configuration(
                "cannot propagate through a network with no layers".into(),
            ));
        }
        Ok(())
    }

    /// Runs every layer in order without recording a trace.
    ///
    /// # Errors
    /// - [`Error::Configuration`] if the network has no layers
    /// - [`ShapeError::LayerInput`] if `input` does not fit the first layer
    pub fn infer(&self, input: &Vector) -> Result<Vector> {
        self.check_not_empty()?;
        let mut output = input.clone();
        for layer in &self.layers {
            output = layer.infer(&output)?;
        }
        Ok(output)
    }

    /// Runs every layer in order, recording what the backward pass needs.
    ///
    /// # Errors
    /// - [`Error::Configuration`] if the network has no layers
    /// - [`ShapeError::LayerInput`] if `input` does not fit the first layer
    pub fn forward(&self, input: &Vector) -> Result<(Vector, NetworkTrace)> {
        self.check_not_empty()?;
        let mut contexts = Vec::with_capacity(self.layers.len());
        let mut output = input.clone();
        for layer in &self.layers {
            let (next, ctx) = layer.forward(&output)?;
            contexts.push(ctx);
            output = next;
        }
        trace!(layers = contexts.len(), "forward pass complete");
        Ok((output, NetworkTrace { contexts }))
    }

    /// Propagates `output_error` back from the last layer to the first.
    ///
    /// Returns one [`ParameterGradients`] per layer, **last layer first**.
    ///
    /// # Errors
    /// - [`Error::Configuration`] if `trace` was recorded on a network with a
    ///   different number of layers
    /// - [`ShapeError::LayerInput`] if `output_error` does not match the last
    ///   layer's output
    pub fn backward(&self, trace: NetworkTrace, output_error: &Vector) -> Result<Vec<ParameterGradients>> {
        if trace.contexts.len() != self.layers.len() {
            return Err(Error::Configuration(format!(
                "trace covers {} layers but the network has {}",
                trace.contexts.len(),
                self.layers.len()
            )));
        }

        let mut grads = Vec::with_capacity(self.layers.len());
        let mut error = output_error.clone();
        for (layer, ctx) in self.layers.iter().rev().zip(trace.contexts.into_iter().rev()) {
            let LayerGradients {
                inputs,
                weights,
                biases,
            } = layer.backward(ctx, &error)?;
            error = inputs;
            grads.push(ParameterGradients { weights, biases });
        }
        trace!(layers = grads.len(), "backward pass complete");
        Ok(grads)
    }
}

impl core::fmt::Debug for Network {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list()
            .entries(self.layers.iter().map(|l| (l.num_inputs(), l.num_outputs())))
            .finish()
    }
}
