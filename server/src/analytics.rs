use crate::{
    models::{AnalyticsSnapshot, CountryClicks, DeviceClicks},
    random::RandomSource,
};

/// Exclusive upper bound for the simulated total.
pub const TOTAL_CLICKS_BOUND: u32 = 1000;

/// Countries in display order with the exclusive upper bound of their draw.
/// Bounds decrease to mimic a typical traffic distribution.
pub const COUNTRY_PROFILE: [(&str, u32); 4] = [
    ("United States", 300),
    ("United Kingdom", 200),
    ("Canada", 150),
    ("Germany", 100),
];

/// Device classes in display order with the exclusive upper bound of their draw.
pub const DEVICE_PROFILE: [(&str, u32); 3] = [("Desktop", 400), ("Mobile", 350), ("Tablet", 100)];

/// Fabricates click statistics for premium sessions. Every figure is an
/// independent draw; nothing is reconciled against `total_clicks`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticsSimulator;

impl AnalyticsSimulator {
    pub fn simulate(&self, rng: &dyn RandomSource) -> AnalyticsSnapshot {
        let total_clicks = rng.next_below(TOTAL_CLICKS_BOUND);

        let countries = COUNTRY_PROFILE
            .iter()
            .map(|&(name, bound)| CountryClicks {
                name: name.to_owned(),
                clicks: rng.next_below(bound),
            })
            .collect();

        let devices = DEVICE_PROFILE
            .iter()
            .map(|&(device_type, bound)| DeviceClicks {
                device_type: device_type.to_owned(),
                clicks: rng.next_below(bound),
            })
            .collect();

        AnalyticsSnapshot {
            total_clicks,
            countries,
            devices,
        }
    }
}
