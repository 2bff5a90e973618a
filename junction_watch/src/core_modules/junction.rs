// THEORY:
// The `junction` module holds the one record the whole dashboard revolves
// around: a named road junction with a handful of display attributes. None of
// the attributes are measured. They are overwritten wholesale on every refresh
// tick, forced to fixed values by the control actions, and rendered as-is.
//
// Key principles:
// 1.  **Labels are enums**: density and signal are closed sets, so they are
//     enums with a fixed display form ("Medium", "yellow") rather than strings.
// 2.  **Wait time is a number**: it is stored in seconds and only becomes the
//     "45 seconds" string when displayed or serialized.
// 3.  **Static identity**: id, name, description, location and the peak-hour
//     profile never change after construction.

use serde::{Serialize, Serializer};
use std::fmt;

/// Occupancy label shown on a junction card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Density {
    Low,
    Medium,
    High,
    /// Set by the signal optimization action.
    Optimized,
    /// Set by the emergency override.
    Emergency,
}

impl Density {
    /// The labels a refresh tick may draw from.
    pub const OBSERVED: [Density; 3] = [Density::Low, Density::Medium, Density::High];

    pub fn label(self) -> &'static str {
        match self {
            Density::Low => "Low",
            Density::Medium => "Medium",
            Density::High => "High",
            Density::Optimized => "Optimized",
            Density::Emergency => "Emergency",
        }
    }
}

impl fmt::Display for Density {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Traffic light state shown on a junction card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Red,
    Yellow,
    Green,
}

impl Signal {
    pub const ALL: [Signal; 3] = [Signal::Red, Signal::Yellow, Signal::Green];

    pub fn label(self) -> &'static str {
        match self {
            Signal::Red => "red",
            Signal::Yellow => "yellow",
            Signal::Green => "green",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A wait time in whole seconds. Displays as `"<n> seconds"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WaitTime(pub u32);

impl WaitTime {
    pub fn seconds(self) -> u32 {
        self.0
    }
}

impl fmt::Display for WaitTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} seconds", self.0)
    }
}

impl Serialize for WaitTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// An inclusive range of hours during which a junction is at its busiest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeakWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl PeakWindow {
    pub const fn new(start_hour: u32, end_hour: u32) -> Self {
        Self { start_hour, end_hour }
    }

    pub fn contains(&self, hour: u32) -> bool {
        self.start_hour <= hour && hour <= self.end_hour
    }
}

impl fmt::Display for PeakWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:00-{:02}:00", self.start_hour, self.end_hour)
    }
}

/// A single monitored junction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Junction {
    /// Stable key, `junction1` through `junction4` for the default roster.
    pub id: String,
    /// Display name, also used as the location of violations.
    pub name: String,
    pub description: String,
    pub density: Density,
    pub signal: Signal,
    pub wait_time: WaitTime,
    /// Number of vehicles currently "counted" at the junction.
    pub vehicles: u32,
    /// Latitude and longitude.
    pub location: (f64, f64),
    /// Hours during which the peak-hour strategy boosts traffic.
    pub peak_hours: Vec<PeakWindow>,
    /// Baseline for the peak-hour strategy.
    pub avg_daily_traffic: u32,
}

impl Junction {
    pub fn is_peak_hour(&self, hour: u32) -> bool {
        self.peak_hours.iter().any(|w| w.contains(hour))
    }
}

struct Seed {
    name: &'static str,
    description: &'static str,
    density: Density,
    signal: Signal,
    wait: u32,
    vehicles: u32,
    location: (f64, f64),
    peaks: [PeakWindow; 2],
    avg_daily_traffic: u32,
}

const ROSTER: [Seed; 4] = [
    Seed {
        name: "Connaught Place",
        description: "Major commercial hub with high pedestrian and vehicle traffic",
        density: Density::Medium,
        signal: Signal::Yellow,
        wait: 45,
        vehicles: 23,
        location: (28.6139, 77.2090),
        peaks: [PeakWindow::new(9, 11), PeakWindow::new(17, 20)],
        avg_daily_traffic: 15_000,
    },
    Seed {
        name: "India Gate Circle",
        description: "Tourist area with moderate traffic flow and ceremonial importance",
        density: Density::Low,
        signal: Signal::Red,
        wait: 30,
        vehicles: 15,
        location: (28.5355, 77.3910),
        peaks: [PeakWindow::new(10, 12), PeakWindow::new(16, 18)],
        avg_daily_traffic: 8_000,
    },
    Seed {
        name: "Akshardham Temple",
        description: "Religious site with heavy weekend traffic and tour buses",
        density: Density::High,
        signal: Signal::Green,
        wait: 60,
        vehicles: 45,
        location: (28.6692, 77.4538),
        peaks: [PeakWindow::new(8, 10), PeakWindow::new(18, 21)],
        avg_daily_traffic: 20_000,
    },
    Seed {
        name: "Red Fort Junction",
        description: "Historical area with mixed commercial and tourist traffic",
        density: Density::Medium,
        signal: Signal::Yellow,
        wait: 40,
        vehicles: 32,
        location: (28.6304, 77.2177),
        peaks: [PeakWindow::new(9, 11), PeakWindow::new(15, 17)],
        avg_daily_traffic: 12_000,
    },
];

/// The four Delhi junctions the dashboard starts with.
pub fn default_roster() -> Vec<Junction> {
    ROSTER
        .iter()
        .enumerate()
        .map(|(i, seed)| Junction {
            id: format!("junction{}", i + 1),
            name: seed.name.to_string(),
            description: seed.description.to_string(),
            density: seed.density,
            signal: seed.signal,
            wait_time: WaitTime(seed.wait),
            vehicles: seed.vehicles,
            location: seed.location,
            peak_hours: seed.peaks.to_vec(),
            avg_daily_traffic: seed.avg_daily_traffic,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_has_four_ordered_junctions() {
        let roster = default_roster();
        assert_eq!(roster.len(), 4);
        let ids: Vec<&str> = roster.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, ["junction1", "junction2", "junction3", "junction4"]);
        assert_eq!(roster[0].name, "Connaught Place");
        assert_eq!(roster[3].location, (28.6304, 77.2177));
    }

    #[test]
    fn labels_match_dashboard_text() {
        assert_eq!(WaitTime(45).to_string(), "45 seconds");
        assert_eq!(Signal::Yellow.to_string(), "yellow");
        assert_eq!(Density::Optimized.to_string(), "Optimized");
        assert_eq!(PeakWindow::new(9, 11).to_string(), "09:00-11:00");
    }

    #[test]
    fn peak_window_is_inclusive() {
        let junction = &default_roster()[0];
        assert!(junction.is_peak_hour(9));
        assert!(junction.is_peak_hour(11));
        assert!(junction.is_peak_hour(20));
        assert!(!junction.is_peak_hour(13));
    }
}
