//! Per-frame gesture recognition pipelines.
//!
//! [`GesturePipeline`] is the synchronous ("pull") form: the caller hands in a frame's detections
//! and receives the frame result on its own thread. [`GestureWorker`] wraps a pipeline for
//! detectors that deliver results through a callback on an internal thread ("push"): frames are
//! handed off, in arrival order, to a dedicated thread that exclusively owns the classifier.

use std::io;

use pawawwewism::Worker;

use crate::classify::Classify;
use crate::feature::{self, NormalizationMode};
use crate::gesture::{Gesture, GestureSet};
use crate::landmark::{HandDetection, NUM_HAND_LANDMARKS};
use crate::timer::{FpsCounter, Timer};

/// Classifies every hand of a frame and aggregates the per-hand gestures.
///
/// The pipeline owns the classifier for its whole lifetime; the classifier is released when the
/// pipeline is dropped.
pub struct GesturePipeline<C: Classify> {
    classifier: C,
    gestures: GestureSet,
    mode: NormalizationMode,
    t_frame: Timer,
}

impl<C: Classify> GesturePipeline<C> {
    /// Creates a pipeline from a classifier and the gesture vocabulary its model family predicts.
    ///
    /// Fails if the classifier's input width does not match the feature layout for
    /// [`NUM_HAND_LANDMARKS`] landmarks (one handedness flag plus two values per landmark). The
    /// pipeline must not start accepting frames with a mismatched model, so this is checked here
    /// rather than per frame.
    pub fn new(classifier: C, gestures: GestureSet) -> anyhow::Result<Self> {
        let expected = 1 + 2 * NUM_HAND_LANDMARKS;
        if classifier.input_len() != expected {
            anyhow::bail!(
                "classifier expects {} inputs, but {} landmarks produce {} features",
                classifier.input_len(),
                NUM_HAND_LANDMARKS,
                expected,
            );
        }

        Ok(Self {
            classifier,
            gestures,
            mode: NormalizationMode::Relative,
            t_frame: Timer::new("frame"),
        })
    }

    /// Sets the landmark normalization mode.
    ///
    /// The mode is a property of the classifier's model family; the default is
    /// [`NormalizationMode::Relative`].
    pub fn set_normalization(&mut self, mode: NormalizationMode) {
        self.mode = mode;
    }

    /// Returns the gesture vocabulary used to label results.
    pub fn gestures(&self) -> &GestureSet {
        &self.gestures
    }

    /// Returns profiling timers for this pipeline, including the classifier's.
    pub fn timers(&self) -> impl Iterator<Item = &Timer> + '_ {
        [&self.t_frame].into_iter().chain(self.classifier.timers())
    }

    /// Processes one frame of hand detections, returning one gesture per classified hand.
    ///
    /// Hands whose landmark list is absent are skipped with a warning and omitted from the
    /// result, so the result can be shorter than the input; the gestures that are present stay in
    /// input-hand order. An empty frame yields an empty result.
    ///
    /// Errors indicate a configuration or lifecycle problem (wrong landmark count for the model,
    /// classifier invoked after close, inference failure), never a property of a single frame's
    /// hand poses.
    pub fn process_frame(&mut self, hands: &[HandDetection]) -> anyhow::Result<Vec<Gesture>> {
        let _guard = self.t_frame.start();

        let mut frame = Vec::with_capacity(hands.len());
        for (hand_idx, hand) in hands.iter().enumerate() {
            let Some(landmarks) = hand.landmarks() else {
                log::warn!("landmarks[{hand_idx}] are absent, skipping hand");
                continue;
            };

            let normalized = feature::normalize(landmarks, self.mode);
            let features =
                feature::assemble(hand.handedness(), &normalized, self.classifier.input_len())?;
            let index = self.classifier.invoke(&features)?;
            frame.push(self.gestures.map_index(index));
        }

        Ok(frame)
    }
}

/// Push-mode front end: an order-preserving hand-off from a detection callback to a dedicated
/// classification thread.
///
/// The pipeline (and with it the non-reentrant classifier handle) is moved onto the worker thread
/// at spawn time and never crosses threads again. [`GestureWorker::push_frame`] may be called from
/// the detector's delivery thread; frames are processed strictly in arrival order. `push_frame`
/// blocks while the worker is busy with the previous frame, so a producer that outpaces
/// classification is throttled instead of frames being reordered or half-processed.
///
/// Dropping the worker joins the thread, which releases the classifier on every exit path.
pub struct GestureWorker {
    worker: Worker<Vec<HandDetection>>,
}

impl GestureWorker {
    /// Spawns the classification thread.
    ///
    /// `on_result` is invoked on that thread with each frame result, in frame order; it is the
    /// single-threaded consumer seam (e.g. a channel to a UI). Frames whose processing fails are
    /// dropped whole, with an error-level diagnostic.
    pub fn spawn<C, F>(mut pipeline: GesturePipeline<C>, mut on_result: F) -> Result<Self, io::Error>
    where
        C: Classify + Send + 'static,
        F: FnMut(Vec<Gesture>) + Send + 'static,
    {
        let mut fps = FpsCounter::new("gesture");
        let worker = Worker::builder().name("gesture classifier").spawn(
            move |hands: Vec<HandDetection>| {
                match pipeline.process_frame(&hands) {
                    Ok(frame) => {
                        log::trace!("gestures: {}", pipeline.gestures().format_frame(&frame));
                        on_result(frame);
                    }
                    Err(e) => log::error!("dropping frame: {e:#}"),
                }

                fps.tick_with(pipeline.timers());
            },
        )?;

        Ok(Self { worker })
    }

    /// Hands one frame of detections to the classification thread.
    ///
    /// Blocks while the previous frame is still being processed.
    pub fn push_frame(&mut self, hands: Vec<HandDetection>) {
        self.worker.send(hands);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use crate::landmark::{Handedness, Landmarks};

    use super::*;

    /// Test classifier that replays a fixed index sequence.
    struct Replay {
        indices: Vec<usize>,
        calls: usize,
    }

    impl Replay {
        fn new<I: Into<Vec<usize>>>(indices: I) -> Self {
            Self {
                indices: indices.into(),
                calls: 0,
            }
        }
    }

    impl Classify for Replay {
        fn input_len(&self) -> usize {
            1 + 2 * NUM_HAND_LANDMARKS
        }

        fn invoke(&mut self, features: &[f32]) -> anyhow::Result<usize> {
            assert_eq!(features.len(), self.input_len());
            let index = self.indices[self.calls % self.indices.len()];
            self.calls += 1;
            Ok(index)
        }
    }

    /// Classifier with a width that cannot fit 21 landmarks.
    struct Misconfigured;

    impl Classify for Misconfigured {
        fn input_len(&self) -> usize {
            10
        }

        fn invoke(&mut self, _features: &[f32]) -> anyhow::Result<usize> {
            unreachable!("pipeline construction must fail first")
        }
    }

    fn hand(handedness: Handedness) -> HandDetection {
        let coords = (0..NUM_HAND_LANDMARKS).map(|i| (0.5 + i as f32 * 0.01, 0.5));
        HandDetection::new(handedness, 0.9, Landmarks::from_coords(coords))
    }

    /// [`Replay`] with an instrumented inference step.
    struct TimedReplay {
        replay: Replay,
        t_infer: Timer,
    }

    impl Classify for TimedReplay {
        fn input_len(&self) -> usize {
            self.replay.input_len()
        }

        fn invoke(&mut self, features: &[f32]) -> anyhow::Result<usize> {
            self.t_infer.time(|| self.replay.invoke(features))
        }

        fn timers(&self) -> Vec<&Timer> {
            vec![&self.t_infer]
        }
    }

    #[test]
    fn pipeline_timers_chain_classifier_timers() {
        let pipeline = GesturePipeline::new(Replay::new([0]), GestureSet::basic()).unwrap();
        assert_eq!(pipeline.timers().count(), 1);

        let timed = TimedReplay {
            replay: Replay::new([0]),
            t_infer: Timer::new("infer"),
        };
        let mut pipeline = GesturePipeline::new(timed, GestureSet::basic()).unwrap();
        pipeline.process_frame(&[hand(Handedness::Left)]).unwrap();

        let drained = pipeline.timers().map(|t| t.to_string()).collect::<Vec<_>>();
        assert_eq!(drained.len(), 2);
        assert!(drained[0].starts_with("frame: 1x"), "{:?}", drained);
        assert!(drained[1].starts_with("infer: 1x"), "{:?}", drained);
    }

    #[test]
    fn width_mismatch_fails_at_startup() {
        assert!(GesturePipeline::new(Misconfigured, GestureSet::basic()).is_err());
    }

    #[test]
    fn empty_frame_yields_empty_result() {
        let mut pipeline = GesturePipeline::new(Replay::new([0]), GestureSet::basic()).unwrap();
        assert_eq!(pipeline.process_frame(&[]).unwrap(), vec![]);
    }

    #[test]
    fn absent_landmarks_skip_the_hand_only() {
        let set = GestureSet::basic();
        let mut pipeline = GesturePipeline::new(Replay::new([2]), set.clone()).unwrap();

        let hands = [
            hand(Handedness::Right),
            HandDetection::without_landmarks(Handedness::Left, 0.4),
        ];
        let frame = pipeline.process_frame(&hands).unwrap();
        assert_eq!(frame, vec![set.map_index(2)]);
    }

    #[test]
    fn hands_are_labeled_in_input_order() {
        let set = GestureSet::basic();
        let mut pipeline = GesturePipeline::new(Replay::new([0, 1, 2]), set.clone()).unwrap();

        let hands = [
            hand(Handedness::Left),
            hand(Handedness::Right),
            hand(Handedness::Left),
        ];
        let frame = pipeline.process_frame(&hands).unwrap();
        assert_eq!(
            frame,
            vec![set.map_index(0), set.map_index(1), set.map_index(2)]
        );
        assert_eq!(set.format_frame(&frame), "three, peace, fist");
    }

    #[test]
    fn out_of_range_output_degrades_to_none() {
        let set = GestureSet::basic();
        let mut pipeline = GesturePipeline::new(Replay::new([99]), set).unwrap();
        let frame = pipeline.process_frame(&[hand(Handedness::Left)]).unwrap();
        assert_eq!(frame, vec![Gesture::NONE]);
    }

    #[test]
    fn worker_preserves_frame_order() {
        let set = GestureSet::extended();
        let indices = (0..13usize).collect::<Vec<_>>();
        let pipeline = GesturePipeline::new(Replay::new(indices), set.clone()).unwrap();

        let (sender, receiver) = mpsc::channel();
        let mut worker = GestureWorker::spawn(pipeline, move |frame| {
            sender.send(frame).unwrap();
        })
        .unwrap();

        for _ in 0..13 {
            worker.push_frame(vec![hand(Handedness::Right)]);
        }
        drop(worker); // joins the thread

        let frames = receiver.iter().collect::<Vec<_>>();
        assert_eq!(frames.len(), 13);
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame, &vec![set.map_index(i)]);
        }
    }
}
