//! Gesture classifier invocation.

use std::path::Path;

use crate::nn::NeuralNetwork;
use crate::timer::Timer;

/// Trait for classifiers that map a feature vector to a class index.
///
/// The gesture pipeline is generic over this seam so that the inference engine stays swappable
/// (and testable without model files). [`GestureClassifier`] is the ONNX-backed implementation.
pub trait Classify {
    /// Returns the number of values an input feature vector must hold.
    fn input_len(&self) -> usize;

    /// Classifies one feature vector, returning the winning class index.
    ///
    /// The call is blocking and the classifier is not reentrant; a frame's hands are classified
    /// strictly one after another.
    fn invoke(&mut self, features: &[f32]) -> anyhow::Result<usize>;

    /// Returns profiling timers for this classifier, for chaining into a pipeline's FPS log.
    ///
    /// Classifiers without instrumentation return no timers.
    fn timers(&self) -> Vec<&Timer> {
        Vec::new()
    }
}

/// A model resource that is released exactly once.
///
/// After [`ModelHandle::close`] the inner value is gone; lookups from that point on return
/// [`None`] so callers can fail loudly instead of touching a released handle.
struct ModelHandle<T> {
    inner: Option<T>,
}

impl<T> ModelHandle<T> {
    fn new(inner: T) -> Self {
        Self { inner: Some(inner) }
    }

    fn get(&self) -> Option<&T> {
        self.inner.as_ref()
    }

    fn close(&mut self) {
        if self.inner.take().is_none() {
            log::warn!("gesture classifier closed more than once");
        }
    }
}

/// A loaded gesture classification model.
///
/// The classifier exclusively owns its [`NeuralNetwork`] handle: it is created once at startup,
/// reused across all frames, and released exactly once, either by [`GestureClassifier::close`] or
/// on drop. The underlying inference context carries internal execution state, so the handle must
/// never be invoked from more than one thread; in push-mode operation it is moved onto the
/// dedicated classification thread (see [`GestureWorker`][crate::pipeline::GestureWorker]).
pub struct GestureClassifier {
    nn: ModelHandle<NeuralNetwork>,
    input_len: usize,
    t_infer: Timer,
}

impl GestureClassifier {
    /// Wraps a loaded [`NeuralNetwork`] as a gesture classifier.
    ///
    /// Returns an error if the network does not take exactly one input of concrete shape, or does
    /// not produce at least one output.
    pub fn new(nn: NeuralNetwork) -> anyhow::Result<Self> {
        let input_len = nn.input_len()?;
        if nn.num_outputs() == 0 {
            anyhow::bail!("classifier network produces no outputs");
        }

        Ok(Self {
            nn: ModelHandle::new(nn),
            input_len,
            t_infer: Timer::new("infer"),
        })
    }

    /// Loads a classifier model from an ONNX file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Self::new(NeuralNetwork::from_path(path)?.load()?)
    }

    /// Releases the underlying model handle.
    ///
    /// Any [`invoke`][Classify::invoke] call after `close` fails with an error rather than
    /// touching the released handle. Dropping the classifier releases the handle as well, so
    /// calling `close` is only needed when a host's shutdown hook wants the release to happen at
    /// a defined point. A second `close` only warns.
    pub fn close(&mut self) {
        self.nn.close();
    }
}

impl Classify for GestureClassifier {
    fn input_len(&self) -> usize {
        self.input_len
    }

    fn invoke(&mut self, features: &[f32]) -> anyhow::Result<usize> {
        let Some(nn) = self.nn.get() else {
            anyhow::bail!("gesture classifier invoked after close");
        };
        if features.len() != self.input_len {
            anyhow::bail!(
                "feature vector has {} values, classifier expects {}",
                features.len(),
                self.input_len,
            );
        }

        let scores = self.t_infer.time(|| nn.estimate(features))?;
        if scores.is_empty() {
            anyhow::bail!("classifier produced an empty score vector");
        }
        Ok(argmax(&scores))
    }

    fn timers(&self) -> Vec<&Timer> {
        vec![&self.t_infer]
    }
}

/// Returns the index of the largest score, ties broken by first occurrence.
///
/// First-occurrence tie-breaking matches the readout convention of the inference engines the
/// classifier models were validated against.
fn argmax(scores: &[f32]) -> usize {
    let mut best = 0;
    for (index, &score) in scores.iter().enumerate().skip(1) {
        if score > scores[best] {
            best = index;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_picks_maximum() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), 1);
        assert_eq!(argmax(&[0.9]), 0);
        assert_eq!(argmax(&[-3.0, -1.0, -2.0]), 1);
    }

    #[test]
    fn argmax_ties_break_to_first() {
        assert_eq!(argmax(&[0.5, 0.5, 0.5]), 0);
        assert_eq!(argmax(&[0.1, 0.5, 0.5]), 1);
    }

    #[test]
    fn argmax_ignores_nan() {
        assert_eq!(argmax(&[0.2, f32::NAN, 0.1]), 0);
    }

    #[test]
    fn model_handle_releases_exactly_once() {
        let mut handle = ModelHandle::new(1_u32);
        assert_eq!(handle.get(), Some(&1));
        handle.close();
        assert_eq!(handle.get(), None);
        // A second close only warns; the handle stays released.
        handle.close();
        assert_eq!(handle.get(), None);
    }

    #[test]
    fn invoke_after_close_fails() {
        let mut classifier = GestureClassifier {
            nn: ModelHandle { inner: None },
            input_len: 43,
            t_infer: Timer::new("infer"),
        };

        let err = classifier.invoke(&vec![0.0; 43]).unwrap_err();
        assert!(err.to_string().contains("after close"), "{err}");
    }
}
