// THEORY:
// A refresh tick replaces every junction's live attributes. How the new values
// are drawn is a `RefreshStrategy`:
//
// 1.  **Uniform**: each attribute is drawn independently and uniformly. Density
//     and signal have no relation to the vehicle count. This is what the
//     dashboard shows by default.
// 2.  **PeakHour**: the vehicle count is derived from the junction's average
//     daily traffic, boosted inside its peak windows and jittered, and the
//     density, signal and wait time follow from that count. The numbers still
//     mean nothing; they just look more coherent. Violations follow suit: the
//     chance of recording one is fixed by the hour of day (rush hours 08, 09,
//     17, 18 and 19 double it) instead of the configured flat probability.

use crate::core_modules::junction::{Density, Junction, Signal, WaitTime};
use rand::Rng;
use rand::seq::SliceRandom;

pub const UNIFORM_VEHICLES: std::ops::RangeInclusive<u32> = 10..=59;
pub const UNIFORM_WAIT_SECS: std::ops::RangeInclusive<u32> = 20..=79;

const PEAK_MULTIPLIER: f64 = 2.5;
const JITTER: std::ops::RangeInclusive<f64> = 0.7..=1.3;
pub const PEAK_VEHICLES_MIN: u32 = 5;
pub const PEAK_VEHICLES_MAX: u32 = 80;

pub const RUSH_HOURS: [u32; 5] = [8, 9, 17, 18, 19];
pub const RUSH_HOUR_VIOLATION_PROBABILITY: f64 = 0.3;
pub const OFF_PEAK_VIOLATION_PROBABILITY: f64 = 0.15;

/// Live attributes drawn for one junction on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    pub density: Density,
    pub signal: Signal,
    pub vehicles: u32,
    pub wait_time: WaitTime,
}

impl Reading {
    pub fn apply_to(self, junction: &mut Junction) {
        junction.density = self.density;
        junction.signal = self.signal;
        junction.vehicles = self.vehicles;
        junction.wait_time = self.wait_time;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshStrategy {
    #[default]
    Uniform,
    PeakHour,
}

impl RefreshStrategy {
    /// Draws a fresh reading for `junction` at `hour` of day.
    pub fn draw<R: Rng + ?Sized>(self, junction: &Junction, hour: u32, rng: &mut R) -> Reading {
        match self {
            RefreshStrategy::Uniform => draw_uniform(rng),
            RefreshStrategy::PeakHour => draw_peak_hour(junction, hour, rng),
        }
    }

    /// Chance that a tick at `hour` records a violation. `Uniform` keeps `configured`.
    pub fn violation_probability(self, configured: f64, hour: u32) -> f64 {
        match self {
            RefreshStrategy::Uniform => configured,
            RefreshStrategy::PeakHour if RUSH_HOURS.contains(&hour) => RUSH_HOUR_VIOLATION_PROBABILITY,
            RefreshStrategy::PeakHour => OFF_PEAK_VIOLATION_PROBABILITY,
        }
    }
}

impl std::str::FromStr for RefreshStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uniform" => Ok(RefreshStrategy::Uniform),
            "peak-hour" | "peak_hour" | "peakhour" => Ok(RefreshStrategy::PeakHour),
            other => Err(format!("expected `uniform` or `peak-hour`, got `{other}`")),
        }
    }
}

fn draw_uniform<R: Rng + ?Sized>(rng: &mut R) -> Reading {
    Reading {
        density: *Density::OBSERVED.choose(rng).unwrap_or(&Density::Medium),
        signal: *Signal::ALL.choose(rng).unwrap_or(&Signal::Red),
        vehicles: rng.gen_range(UNIFORM_VEHICLES),
        wait_time: WaitTime(rng.gen_range(UNIFORM_WAIT_SECS)),
    }
}

fn draw_peak_hour<R: Rng + ?Sized>(junction: &Junction, hour: u32, rng: &mut R) -> Reading {
    let base = junction.avg_daily_traffic as f64 / 24.0;
    let multiplier = if junction.is_peak_hour(hour) { PEAK_MULTIPLIER } else { 1.0 };
    let raw = (base * multiplier * rng.gen_range(JITTER) / 100.0) as u32;
    let vehicles = raw.clamp(PEAK_VEHICLES_MIN, PEAK_VEHICLES_MAX);

    let (density, signal, wait) = if vehicles > 50 {
        (Density::High, Signal::Green, rng.gen_range(60..=90))
    } else if vehicles > 25 {
        (Density::Medium, Signal::Yellow, rng.gen_range(30..=60))
    } else {
        (Density::Low, Signal::Red, rng.gen_range(15..=30))
    };

    Reading { density, signal, vehicles, wait_time: WaitTime(wait) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::junction::default_roster;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn uniform_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(11);
        let junction = &default_roster()[0];
        for _ in 0..500 {
            let r = RefreshStrategy::Uniform.draw(junction, 12, &mut rng);
            assert!(UNIFORM_VEHICLES.contains(&r.vehicles));
            assert!(UNIFORM_WAIT_SECS.contains(&r.wait_time.seconds()));
            assert!(Density::OBSERVED.contains(&r.density));
        }
    }

    #[test]
    fn peak_hour_is_clamped_and_consistent() {
        let mut rng = StdRng::seed_from_u64(5);
        for junction in default_roster() {
            for hour in 0..24 {
                let r = RefreshStrategy::PeakHour.draw(&junction, hour, &mut rng);
                assert!((PEAK_VEHICLES_MIN..=PEAK_VEHICLES_MAX).contains(&r.vehicles));
                match r.density {
                    Density::High => assert!(r.vehicles > 50 && r.signal == Signal::Green),
                    Density::Medium => assert!(r.vehicles > 25 && r.signal == Signal::Yellow),
                    Density::Low => assert!(r.vehicles <= 25 && r.signal == Signal::Red),
                    other => panic!("unexpected density {other}"),
                }
            }
        }
    }

    #[test]
    fn peak_hours_raise_traffic() {
        // Akshardham: 20000 / 24 = 833 per hour, /100 gives ~8 off-peak and ~20 at peak.
        let junction = &default_roster()[2];
        let mut rng = StdRng::seed_from_u64(1);
        let off_peak: u32 = (0..200).map(|_| RefreshStrategy::PeakHour.draw(junction, 3, &mut rng).vehicles).sum();
        let peak: u32 = (0..200).map(|_| RefreshStrategy::PeakHour.draw(junction, 9, &mut rng).vehicles).sum();
        assert!(peak > off_peak * 2);
    }

    #[test]
    fn violation_probability_follows_rush_hours() {
        assert_eq!(RefreshStrategy::Uniform.violation_probability(0.6, 8), 0.6);
        assert_eq!(RefreshStrategy::PeakHour.violation_probability(0.6, 8), 0.3);
        assert_eq!(RefreshStrategy::PeakHour.violation_probability(0.6, 19), 0.3);
        assert_eq!(RefreshStrategy::PeakHour.violation_probability(0.6, 10), 0.15);
        assert_eq!(RefreshStrategy::PeakHour.violation_probability(1.0, 3), 0.15);
    }

    #[test]
    fn parses_strategy_names() {
        assert_eq!("peak-hour".parse::<RefreshStrategy>(), Ok(RefreshStrategy::PeakHour));
        assert_eq!(" Uniform ".parse::<RefreshStrategy>(), Ok(RefreshStrategy::Uniform));
        assert!("random".parse::<RefreshStrategy>().is_err());
    }
}
