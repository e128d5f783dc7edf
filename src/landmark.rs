//! Hand landmark data as delivered by an external detection model.

use nalgebra::Point2;

/// Number of landmarks the hand model family predicts per hand.
pub const NUM_HAND_LANDMARKS: usize = 21;

/// An ordered collection of 2D hand landmarks.
///
/// Coordinates are either normalized image coordinates (0..1) or pixel coordinates, depending on
/// the producing detector. The collection is immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Landmarks {
    positions: Box<[Point2<f32>]>,
}

impl Landmarks {
    /// Creates a [`Landmarks`] collection from an ordered list of positions.
    pub fn new<I>(positions: I) -> Self
    where
        I: IntoIterator<Item = Point2<f32>>,
    {
        Self {
            positions: positions.into_iter().collect(),
        }
    }

    /// Creates a [`Landmarks`] collection from `(x, y)` coordinate pairs.
    pub fn from_coords<I>(coords: I) -> Self
    where
        I: IntoIterator<Item = (f32, f32)>,
    {
        Self::new(coords.into_iter().map(|(x, y)| Point2::new(x, y)))
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Returns a landmark's position.
    ///
    /// The index can be one of the named [`LandmarkIdx`] joints.
    pub fn position(&self, index: usize) -> Point2<f32> {
        self.positions[index]
    }

    pub fn positions(&self) -> &[Point2<f32>] {
        &self.positions
    }

    pub fn iter(&self) -> impl Iterator<Item = Point2<f32>> + Clone + '_ {
        self.positions.iter().copied()
    }
}

/// Classification of a detected hand as the left or right hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    /// Parses a handedness label as reported by the detection model.
    ///
    /// Matching is case-insensitive. Returns [`None`] for labels that are neither `left` nor
    /// `right`; callers treat that as a malformed detection and skip the hand.
    pub fn from_label(label: &str) -> Option<Self> {
        if label.eq_ignore_ascii_case("left") {
            Some(Handedness::Left)
        } else if label.eq_ignore_ascii_case("right") {
            Some(Handedness::Right)
        } else {
            None
        }
    }
}

/// Names for the hand pose landmarks.
///
/// # Terminology
///
/// - **CMC**: [Carpometacarpal joint], the lowest joint of the thumb, located near the wrist.
/// - **MCP**: [Metacarpophalangeal joint], the lower joint forming the knuckles near the palm of
///   the hand.
/// - **PIP**: Proximal Interphalangeal joint, the joint between the MCP and DIP.
/// - **DIP**: Distal Interphalangeal joint, the highest joint of a finger.
/// - **Tip**: This landmark is just placed on the tip of the finger, above the DIP.
///
/// [Carpometacarpal joint]: https://en.wikipedia.org/wiki/Carpometacarpal_joint
/// [Metacarpophalangeal joint]: https://en.wikipedia.org/wiki/Metacarpophalangeal_joint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandmarkIdx {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexFingerMcp,
    IndexFingerPip,
    IndexFingerDip,
    IndexFingerTip,
    MiddleFingerMcp,
    MiddleFingerPip,
    MiddleFingerDip,
    MiddleFingerTip,
    RingFingerMcp,
    RingFingerPip,
    RingFingerDip,
    RingFingerTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// One detected hand in a frame.
///
/// The landmark list may be absent even though the handedness slot is present; detectors produce
/// such partial results for all hands after the first under some conditions. Consumers skip those
/// hands instead of failing the frame.
#[derive(Debug, Clone)]
pub struct HandDetection {
    handedness: Handedness,
    confidence: f32,
    landmarks: Option<Landmarks>,
}

impl HandDetection {
    pub fn new(handedness: Handedness, confidence: f32, landmarks: Landmarks) -> Self {
        Self {
            handedness,
            confidence,
            landmarks: Some(landmarks),
        }
    }

    /// Creates a detection whose landmark list is absent.
    pub fn without_landmarks(handedness: Handedness, confidence: f32) -> Self {
        Self {
            handedness,
            confidence,
            landmarks: None,
        }
    }

    pub fn handedness(&self) -> Handedness {
        self.handedness
    }

    /// The detector's confidence in this hand. Passed through unused by the gesture pipeline.
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn landmarks(&self) -> Option<&Landmarks> {
        self.landmarks.as_ref()
    }
}
