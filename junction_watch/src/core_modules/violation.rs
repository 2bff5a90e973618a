// THEORY:
// Violations are synthetic records that scroll through a short "recent" list.
// The log is newest-first and capped, so old entries simply fall off the end.
// Nothing is deduplicated or correlated; a violation only exists to be shown.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

/// How many violations the dashboard keeps on screen.
pub const DEFAULT_CAPACITY: usize = 6;

const CONFIDENCE_MIN: f32 = 85.0;
const CONFIDENCE_MAX: f32 = 99.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationKind {
    Speeding,
    RedLight,
    IllegalParking,
    LaneViolation,
    NoHelmet,
    WrongWay,
    MobilePhone,
}

impl ViolationKind {
    pub const ALL: [ViolationKind; 7] = [
        ViolationKind::Speeding,
        ViolationKind::RedLight,
        ViolationKind::IllegalParking,
        ViolationKind::LaneViolation,
        ViolationKind::NoHelmet,
        ViolationKind::WrongWay,
        ViolationKind::MobilePhone,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ViolationKind::Speeding => "Speed limit exceeded",
            ViolationKind::RedLight => "Red light violation",
            ViolationKind::IllegalParking => "Illegal parking",
            ViolationKind::LaneViolation => "Lane violation",
            ViolationKind::NoHelmet => "No helmet detected",
            ViolationKind::WrongWay => "Wrong way driving",
            ViolationKind::MobilePhone => "Mobile phone usage",
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        *Self::ALL.choose(rng).unwrap_or(&ViolationKind::Speeding)
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for ViolationKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Model credited with "detecting" a violation. Purely decorative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectionModel {
    Yolo,
    TensorFlow,
    OpenCv,
    ScikitLearn,
}

impl DetectionModel {
    pub const ALL: [DetectionModel; 4] =
        [DetectionModel::Yolo, DetectionModel::TensorFlow, DetectionModel::OpenCv, DetectionModel::ScikitLearn];

    pub fn label(self) -> &'static str {
        match self {
            DetectionModel::Yolo => "YOLO",
            DetectionModel::TensorFlow => "TensorFlow",
            DetectionModel::OpenCv => "OpenCV",
            DetectionModel::ScikitLearn => "Scikit-learn",
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        *Self::ALL.choose(rng).unwrap_or(&DetectionModel::Yolo)
    }
}

impl fmt::Display for DetectionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for DetectionModel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// A fabricated infraction at one of the junctions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    #[serde(rename = "type")]
    pub kind: ViolationKind,
    /// Name of the junction it was "seen" at.
    pub location: String,
    /// `HH:MM:SS` at the time it was recorded.
    pub time: String,
    /// Display-only confidence percentage.
    pub confidence: f32,
    pub ai_model: DetectionModel,
}

impl Violation {
    /// Draws a violation of random kind at one of `junction_names`.
    pub fn synthesize<R: Rng + ?Sized>(rng: &mut R, junction_names: &[&str], time: String) -> Option<Self> {
        let location = junction_names.choose(rng)?;
        let kind = ViolationKind::random(rng);
        let confidence = rng.gen_range(CONFIDENCE_MIN..=CONFIDENCE_MAX);
        Some(Self {
            kind,
            location: (*location).to_string(),
            time,
            confidence: (confidence * 10.0).round() / 10.0,
            ai_model: DetectionModel::random(rng),
        })
    }
}

/// Newest-first list of violations with a fixed capacity.
#[derive(Debug, Clone)]
pub struct ViolationLog {
    entries: VecDeque<Violation>,
    capacity: usize,
    /// Total recorded since startup, including entries that fell off.
    recorded: u64,
}

impl ViolationLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { entries: VecDeque::with_capacity(capacity + 1), capacity, recorded: 0 }
    }

    /// Puts `violation` at the front and drops whatever no longer fits.
    pub fn record(&mut self, violation: Violation) {
        self.entries.push_front(violation);
        self.entries.truncate(self.capacity);
        self.recorded += 1;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn total_recorded(&self) -> u64 {
        self.recorded
    }

    pub fn latest(&self) -> Option<&Violation> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<Violation> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for ViolationLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn violation(n: usize) -> Violation {
        Violation {
            kind: ViolationKind::ALL[n % ViolationKind::ALL.len()],
            location: format!("J{n}"),
            time: "12:00:00".into(),
            confidence: 90.0,
            ai_model: DetectionModel::ALL[n % DetectionModel::ALL.len()],
        }
    }

    #[test]
    fn log_never_exceeds_capacity() {
        let mut log = ViolationLog::default();
        for n in 0..50 {
            log.record(violation(n));
            assert!(log.len() <= DEFAULT_CAPACITY);
        }
        assert_eq!(log.len(), DEFAULT_CAPACITY);
        assert_eq!(log.total_recorded(), 50);
    }

    #[test]
    fn newest_entry_is_first() {
        let mut log = ViolationLog::default();
        for n in 0..8 {
            log.record(violation(n));
        }
        let locations: Vec<String> = log.iter().map(|v| v.location.clone()).collect();
        assert_eq!(locations, ["J7", "J6", "J5", "J4", "J3", "J2"]);
    }

    #[test]
    fn synthesize_picks_from_given_junctions() {
        let mut rng = StdRng::seed_from_u64(7);
        let names = ["Alpha", "Beta"];
        for _ in 0..100 {
            let v = Violation::synthesize(&mut rng, &names, "08:00:00".into()).expect("non-empty names");
            assert!(names.contains(&v.location.as_str()));
            assert!((CONFIDENCE_MIN..=CONFIDENCE_MAX).contains(&v.confidence));
        }
        assert!(Violation::synthesize(&mut rng, &[], "08:00:00".into()).is_none());
    }

    #[test]
    fn serializes_with_type_label() {
        let json = serde_json::to_value(violation(1)).expect("serialize");
        assert_eq!(json["type"], "Red light violation");
        assert_eq!(json["location"], "J1");
        assert_eq!(json["ai_model"], "TensorFlow");
    }

    #[test]
    fn every_model_gets_credited_eventually() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            let v = Violation::synthesize(&mut rng, &["Alpha"], "08:00:00".into()).expect("non-empty names");
            seen.insert(v.ai_model);
        }
        assert_eq!(seen.len(), DetectionModel::ALL.len());
    }
}
