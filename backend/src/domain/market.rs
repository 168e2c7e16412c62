//! Built-in market data: the city catalogue, seasonal table and competitor
//! estimates feeding the heatmap and the pricing planner.

use rand::Rng;
use serde::Serialize;
use utoipa::ToSchema;

/// A city in the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct City {
    pub name: &'static str,
    pub state: &'static str,
    pub population: u32,
    /// LGBTQ+ friendliness index, 0 to 100.
    pub lgbtq_index: u8,
    /// Recommended neighbourhoods to stay in, best first.
    pub stay_areas: [&'static str; 2],
}

pub const CITIES: [City; 10] = [
    City {
        name: "New York",
        state: "NY",
        population: 8_804_190,
        lgbtq_index: 95,
        stay_areas: ["Chelsea", "Greenwich Village"],
    },
    City {
        name: "Los Angeles",
        state: "CA",
        population: 3_898_747,
        lgbtq_index: 92,
        stay_areas: ["West Hollywood", "Silver Lake"],
    },
    City {
        name: "San Francisco",
        state: "CA",
        population: 873_965,
        lgbtq_index: 98,
        stay_areas: ["Castro District", "Mission District"],
    },
    City {
        name: "Chicago",
        state: "IL",
        population: 2_746_388,
        lgbtq_index: 85,
        stay_areas: ["Boystown", "Andersonville"],
    },
    City {
        name: "Miami",
        state: "FL",
        population: 467_963,
        lgbtq_index: 88,
        stay_areas: ["South Beach", "Wynwood"],
    },
    City {
        name: "Dallas",
        state: "TX",
        population: 1_343_573,
        lgbtq_index: 78,
        stay_areas: ["Oak Lawn", "Uptown"],
    },
    City {
        name: "Houston",
        state: "TX",
        population: 2_304_580,
        lgbtq_index: 82,
        stay_areas: ["Montrose", "Heights"],
    },
    City {
        name: "Seattle",
        state: "WA",
        population: 737_015,
        lgbtq_index: 91,
        stay_areas: ["Capitol Hill", "Fremont"],
    },
    City {
        name: "Atlanta",
        state: "GA",
        population: 498_715,
        lgbtq_index: 84,
        stay_areas: ["Midtown", "Virginia Highland"],
    },
    City {
        name: "Boston",
        state: "MA",
        population: 685_094,
        lgbtq_index: 89,
        stay_areas: ["South End", "Back Bay"],
    },
];

/// Look a city up by name, ignoring case and surrounding whitespace.
pub fn find_city(name: &str) -> Option<&'static City> {
    let name = name.trim();
    CITIES
        .iter()
        .find(|city| city.name.eq_ignore_ascii_case(name))
}

/// Seasonal demand data for one month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    #[schema(value_type = String, example = "June")]
    pub month: &'static str,
    /// Recommended stay length, e.g. `"7-10"` days.
    #[schema(value_type = String)]
    pub optimal_days: &'static str,
    pub multiplier: f64,
}

const fn season(month: &'static str, optimal_days: &'static str, multiplier: f64) -> Season {
    Season {
        month,
        optimal_days,
        multiplier,
    }
}

/// Seasonal table indexed by zero-based month.
pub const SEASONS: [Season; 12] = [
    season("January", "5-7", 0.85),
    season("February", "3-5", 1.1),
    season("March", "5-7", 1.15),
    season("April", "4-6", 0.95),
    season("May", "6-8", 1.2),
    season("June", "7-10", 1.5),
    season("July", "5-7", 1.25),
    season("August", "5-7", 1.15),
    season("September", "4-6", 0.9),
    season("October", "5-7", 1.0),
    season("November", "3-5", 0.8),
    season("December", "4-6", 1.2),
];

/// Seasonal data for a zero-based month, or `None` outside `0..=11`.
pub fn season_for(month: u8) -> Option<&'static Season> {
    SEASONS.get(usize::from(month))
}

/// Predicted demand for one city. Recomputed on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    pub city: String,
    pub state: String,
    /// Demand score, 0 to 100.
    pub demand_score: u8,
    pub lgbtq_index: u8,
    pub level: DemandLevel,
}

impl Forecast {
    pub fn new(city: &City, demand_score: u8) -> Self {
        let demand_score = demand_score.min(100);
        Self {
            city: city.name.to_owned(),
            state: city.state.to_owned(),
            demand_score,
            lgbtq_index: city.lgbtq_index,
            level: DemandLevel::from_score(demand_score),
        }
    }
}

/// Heatmap bucket for a demand score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DemandLevel {
    Low,
    Medium,
    High,
}

impl DemandLevel {
    pub const fn from_score(score: u8) -> Self {
        if score >= 70 {
            Self::High
        } else if score >= 50 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Competitor market saturation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum Saturation {
    Low,
    Medium,
    High,
}

impl Saturation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

/// Estimated competitor activity in a city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorSnapshot {
    pub total_active: u32,
    pub saturation: Saturation,
    /// Average hourly rate in dollars.
    pub avg_rate: u32,
}

/// Typical hourly rate assumed for competitors.
pub const COMPETITOR_AVG_RATE: u32 = 180;

impl CompetitorSnapshot {
    /// Estimate competitors from population and index using `r` in `[0, 1)`.
    ///
    /// # Examples
    /// ```
    /// use masseurpro::domain::{find_city, CompetitorSnapshot, Saturation};
    ///
    /// let miami = find_city("Miami").unwrap();
    /// let snapshot = CompetitorSnapshot::estimate(miami, 0.0);
    /// assert_eq!(snapshot.total_active, 24);
    /// assert_eq!(snapshot.saturation, Saturation::Medium);
    /// ```
    pub fn estimate(city: &City, r: f64) -> Self {
        let r = if r.is_finite() { r.clamp(0.0, 1.0) } else { 0.0 };
        let base = (f64::from(city.population) / 100_000.0 * f64::from(city.lgbtq_index) / 10.0)
            .floor();
        let active = (base * (0.6 + r * 0.4)).floor();
        // Bounded by population/10_000 * 10, well inside u32.
        let total_active = active as u32;
        let saturation = if total_active > 50 {
            Saturation::High
        } else if total_active > 20 {
            Saturation::Medium
        } else {
            Saturation::Low
        };
        Self {
            total_active,
            saturation,
            avg_rate: COMPETITOR_AVG_RATE,
        }
    }

    /// Estimate using a fresh random draw.
    pub fn sample<R: Rng + ?Sized>(city: &City, rng: &mut R) -> Self {
        Self::estimate(city, rng.gen_range(0.0..1.0))
    }
}

/// Demand score used when prediction fails: uniform in `30..80`.
pub fn fallback_demand_score<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    rng.gen_range(30..80)
}
