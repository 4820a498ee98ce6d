//! Rule-based gesture classification
//!
//! A hand's pose is reduced to five numbers (thumb-index distance plus one
//! curl angle per finger) and matched against an ordered rule table. The
//! first matching rule wins, so Grab preempts every click variant and the
//! click variants are mutually exclusive.

use serde::{Deserialize, Serialize};

use super::geometry::{angle, distance};
use super::landmarks::*;

/// Discrete gesture label for one hand at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum GestureLabel {
    #[default]
    None,
    Grab,
    LeftClick,
    RightClick,
    DoubleClick,
}

impl GestureLabel {
    /// Label text as shown to the stream consumer
    pub fn as_str(&self) -> &'static str {
        match self {
            GestureLabel::None => "None",
            GestureLabel::Grab => "Grab",
            GestureLabel::LeftClick => "Left Click",
            GestureLabel::RightClick => "Right Click",
            GestureLabel::DoubleClick => "Double Click",
        }
    }

    pub fn is_click(&self) -> bool {
        matches!(
            self,
            GestureLabel::LeftClick | GestureLabel::RightClick | GestureLabel::DoubleClick
        )
    }
}

impl From<GestureLabel> for &'static str {
    fn from(label: GestureLabel) -> Self {
        label.as_str()
    }
}

impl TryFrom<String> for GestureLabel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "None" => Ok(GestureLabel::None),
            "Grab" => Ok(GestureLabel::Grab),
            "Left Click" => Ok(GestureLabel::LeftClick),
            "Right Click" => Ok(GestureLabel::RightClick),
            "Double Click" => Ok(GestureLabel::DoubleClick),
            other => Err(format!("unknown gesture label: {}", other)),
        }
    }
}

impl std::fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Angle and distance cut-offs used by the rule table (degrees / normalized units)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassifierThresholds {
    /// A finger whose curl angle is below this counts as bent
    pub bent_angle: f64,
    /// Bent fingers needed for Grab
    pub grab_min_bent: usize,
    /// Thumb-index distance a click requires (closed pinch is reserved for Grab)
    pub click_min_distance: f64,
    pub left_index_max: f64,
    pub left_middle_min: f64,
    pub right_middle_max: f64,
    pub right_index_min: f64,
    pub double_max: f64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            bent_angle: 70.0,
            grab_min_bent: 3,
            click_min_distance: 0.05,
            left_index_max: 100.0,
            left_middle_min: 60.0,
            right_middle_max: 90.0,
            right_index_min: 60.0,
            double_max: 75.0,
        }
    }
}

/// Geometric summary of one hand
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandMetrics {
    /// Thumb tip to index tip
    pub pinch_distance: f64,
    pub index: f64,
    pub middle: f64,
    pub ring: f64,
    pub pinky: f64,
}

impl HandMetrics {
    /// Returns `None` when fewer than 21 landmarks are supplied
    pub fn from_landmarks(landmarks: &[Landmark]) -> Option<Self> {
        if landmarks.len() < LANDMARK_COUNT {
            return None;
        }
        let curl = |base: usize, mid: usize, tip: usize| {
            angle(landmarks[base], landmarks[mid], landmarks[tip])
        };
        Some(Self {
            pinch_distance: distance(landmarks[THUMB_TIP], landmarks[INDEX_TIP]),
            index: curl(INDEX_MCP, INDEX_PIP, INDEX_TIP),
            middle: curl(MIDDLE_MCP, MIDDLE_PIP, MIDDLE_TIP),
            ring: curl(RING_MCP, RING_PIP, RING_TIP),
            pinky: curl(PINKY_MCP, PINKY_PIP, PINKY_TIP),
        })
    }

    pub fn bent_count(&self, bent_angle: f64) -> usize {
        [self.index, self.middle, self.ring, self.pinky]
            .iter()
            .filter(|&&a| a < bent_angle)
            .count()
    }
}

/// One entry of the priority table
pub struct Rule {
    pub label: GestureLabel,
    pub matches: fn(&HandMetrics, &ClassifierThresholds) -> bool,
}

fn is_grab(m: &HandMetrics, t: &ClassifierThresholds) -> bool {
    m.bent_count(t.bent_angle) >= t.grab_min_bent
}

fn is_left_click(m: &HandMetrics, t: &ClassifierThresholds) -> bool {
    m.index < t.left_index_max && m.middle > t.left_middle_min && m.pinch_distance > t.click_min_distance
}

fn is_right_click(m: &HandMetrics, t: &ClassifierThresholds) -> bool {
    m.middle < t.right_middle_max && m.index > t.right_index_min && m.pinch_distance > t.click_min_distance
}

fn is_double_click(m: &HandMetrics, t: &ClassifierThresholds) -> bool {
    m.index < t.double_max && m.middle < t.double_max && m.pinch_distance > t.click_min_distance
}

/// Evaluated top to bottom; order is the tie-break
pub const RULES: [Rule; 4] = [
    Rule { label: GestureLabel::Grab, matches: is_grab },
    Rule { label: GestureLabel::LeftClick, matches: is_left_click },
    Rule { label: GestureLabel::RightClick, matches: is_right_click },
    Rule { label: GestureLabel::DoubleClick, matches: is_double_click },
];

/// Stateless classifier holding its thresholds
#[derive(Debug, Clone, Default)]
pub struct GestureClassifier {
    thresholds: ClassifierThresholds,
}

impl GestureClassifier {
    pub fn new(thresholds: ClassifierThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ClassifierThresholds {
        &self.thresholds
    }

    pub fn classify(&self, landmarks: &[Landmark]) -> GestureLabel {
        match HandMetrics::from_landmarks(landmarks) {
            Some(metrics) => self.classify_metrics(&metrics),
            None => GestureLabel::None,
        }
    }

    pub fn classify_metrics(&self, metrics: &HandMetrics) -> GestureLabel {
        RULES
            .iter()
            .find(|rule| (rule.matches)(metrics, &self.thresholds))
            .map(|rule| rule.label)
            .unwrap_or(GestureLabel::None)
    }
}

/// Classify with the default thresholds
pub fn classify(landmarks: &[Landmark]) -> GestureLabel {
    GestureClassifier::default().classify(landmarks)
}
