//! Mudra hand gesture recognition library.
//!
//! This crate turns a stream of hand-landmark detections (as produced by an external vision
//! model) into named gestures. Per detected hand, the landmark list is normalized
//! ([`feature::normalize`]), packed into a fixed-width feature vector ([`feature::assemble`]),
//! classified by an ONNX model ([`classify::GestureClassifier`]), and the resulting class index is
//! mapped into a gesture vocabulary ([`gesture::GestureSet`]).
//!
//! The per-frame plumbing lives in [`pipeline`]: [`pipeline::GesturePipeline`] for synchronous
//! per-frame calls, and [`pipeline::GestureWorker`] when the detector delivers results via a
//! callback on its own thread and classification has to happen on a single dedicated thread.
//!
//! Camera access, the landmark detector itself, and result presentation are out of scope; callers
//! feed [`landmark::HandDetection`]s in and receive [`gesture::Gesture`]s back.

use log::LevelFilter;

pub mod classify;
pub mod feature;
pub mod gesture;
pub mod landmark;
pub mod nn;
pub mod pipeline;
pub mod timer;

/// macro-use only, not part of public API.
#[doc(hidden)]
pub fn init_logger(calling_crate: &'static str) {
    let log_level = LevelFilter::Debug;
    env_logger::Builder::new()
        .filter(Some(calling_crate), log_level)
        .filter(Some(env!("CARGO_PKG_NAME")), log_level)
        .filter(Some("tract_onnx"), LevelFilter::Warn)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Initializes logging to *stderr*.
///
/// The calling crate and mudra will log at *debug* level, tract at *warn* level.
///
/// If a global logger is already registered, this macro will do nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"))
    };
}
