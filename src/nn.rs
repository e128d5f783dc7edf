//! Neural Network inference.
//!
//! This wraps the [tract] ONNX runtime behind a small loading and inference API. The networks
//! used here take a single flat feature vector and produce a single score vector, so unlike image
//! networks there is no input sampling step; the caller supplies the values directly.
//!
//! [tract]: https://github.com/sonos/tract

use tract_onnx::prelude::{
    tvec, Framework, Graph, InferenceModelExt, SimplePlan, TValue, Tensor, TypedFact, TypedOp,
};

use std::{borrow::Cow, path::Path, sync::Arc};

type Model = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Neural network loader.
pub struct Loader<'a> {
    model_data: Cow<'a, [u8]>,
}

impl<'a> Loader<'a> {
    fn new(data: Cow<'a, [u8]>) -> Self {
        Self { model_data: data }
    }

    /// Loads and optimizes the network.
    ///
    /// Returns an error if the network data is malformed, if the network data is incomplete, or if
    /// the network uses unimplemented operations.
    pub fn load(self) -> anyhow::Result<NeuralNetwork> {
        let graph = tract_onnx::onnx()
            .model_for_read(&mut &*self.model_data)?
            .into_optimized()?;
        let model = SimplePlan::new(graph)?;

        Ok(NeuralNetwork(Arc::new(NeuralNetworkImpl { inner: model })))
    }
}

/// A neural network that can be used for inference.
///
/// This is a cheaply [`Clone`]able handle to the underlying network structures. Inference itself
/// carries internal execution state and is not reentrant; see
/// [`GestureClassifier`][crate::classify::GestureClassifier] for the ownership rules.
#[derive(Clone)]
pub struct NeuralNetwork(Arc<NeuralNetworkImpl>);

struct NeuralNetworkImpl {
    inner: Model,
}

impl NeuralNetwork {
    /// Loads a pre-trained model from an ONNX file path.
    ///
    /// The path must have a `.onnx` extension. In the future, other model formats may be supported.
    pub fn from_path<'a, P: AsRef<Path>>(path: P) -> anyhow::Result<Loader<'a>> {
        Self::from_path_impl(path.as_ref())
    }

    fn from_path_impl<'a>(path: &Path) -> anyhow::Result<Loader<'a>> {
        match path.extension() {
            Some(ext) if ext == "onnx" => {}
            _ => anyhow::bail!("neural network file must have `.onnx` extension"),
        }

        let model_data = std::fs::read(path)?;
        Ok(Loader::new(model_data.into()))
    }

    /// Loads a pre-trained model from an in-memory ONNX file.
    pub fn from_onnx(raw: &[u8]) -> anyhow::Result<Loader<'_>> {
        Ok(Loader::new(raw.into()))
    }

    /// Returns the number of input nodes of the network.
    pub fn num_inputs(&self) -> usize {
        self.0.inner.model().inputs.len()
    }

    /// Returns the number of output nodes of the network.
    pub fn num_outputs(&self) -> usize {
        self.0.inner.model().outputs.len()
    }

    /// Returns the number of scalar values the network's sole input holds.
    ///
    /// Leading batch dimensions of 1 are part of the tensor shape but do not contribute to the
    /// value count, so a `[1, 1, 1, 43]` input reports a length of 43.
    pub fn input_len(&self) -> anyhow::Result<usize> {
        if self.num_inputs() != 1 {
            anyhow::bail!(
                "classifier network has to take exactly 1 input, this one takes {}",
                self.num_inputs(),
            );
        }

        let fact = self.0.inner.model().input_fact(0)?;
        match fact.shape.as_concrete() {
            Some(shape) => Ok(shape.iter().product()),
            None => anyhow::bail!("classifier network input has a symbolic shape"),
        }
    }

    /// Runs the network on a flat input vector, returning the flattened first output.
    ///
    /// `input` must hold exactly [`NeuralNetwork::input_len`] values; the values are reshaped to
    /// the network's declared input shape, never truncated or padded.
    pub fn estimate(&self, input: &[f32]) -> anyhow::Result<Vec<f32>> {
        let fact = self.0.inner.model().input_fact(0)?;
        let shape = match fact.shape.as_concrete() {
            Some(shape) => shape.to_vec(),
            None => anyhow::bail!("classifier network input has a symbolic shape"),
        };
        if input.len() != shape.iter().product::<usize>() {
            anyhow::bail!(
                "input has {} values, network expects {} (shape {:?})",
                input.len(),
                shape.iter().product::<usize>(),
                shape,
            );
        }

        let tensor = Tensor::from_shape(&shape, input)?;
        let outputs = self.0.inner.run(tvec![TValue::from_const(Arc::new(tensor))])?;
        log::trace!("inference result: {:?}", outputs);

        let scores = outputs[0].to_array_view::<f32>()?;
        Ok(scores.iter().copied().collect())
    }
}
