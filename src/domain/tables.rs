//! Static lookup tables for venue and umpire adjustments.
//!
//! Tables are plain immutable data handed to the evaluator at
//! construction. `FactorTables::default()` carries the built-in league
//! tables; config overrides are merged on top with `merge`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::prop::{PropCategory, UmpireStat};

/// Latitude/longitude of a venue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VenueLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// Strikeout and walk tendencies of a home plate umpire. Any field may
/// be missing; a missing multiplier is unlisted, not neutral.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UmpireTendency {
    /// Multiplier on strikeout rates.
    #[serde(default)]
    pub k_boost: Option<f64>,
    /// Multiplier on walk rates.
    #[serde(default)]
    pub bb_suppress: Option<f64>,
    /// Share of games going over the total. Informational.
    #[serde(default)]
    pub over_tendency: Option<f64>,
}

impl UmpireTendency {
    /// Multiplier for `stat`, if recorded.
    pub const fn factor(&self, stat: UmpireStat) -> Option<f64> {
        match stat {
            UmpireStat::Strikeout => self.k_boost,
            UmpireStat::Walk => self.bb_suppress,
        }
    }

    /// Fields present in `other` replace ours.
    fn overlay(self, other: Self) -> Self {
        Self {
            k_boost: other.k_boost.or(self.k_boost),
            bb_suppress: other.bb_suppress.or(self.bb_suppress),
            over_tendency: other.over_tendency.or(self.over_tendency),
        }
    }
}

/// Default over tendency for umpires without a recorded value.
pub const NEUTRAL_OVER_TENDENCY: f64 = 0.5;

/// Normalise a venue name: trim, lowercase, collapse whitespace.
pub fn normalize_venue(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Normalise an umpire name. Periods are dropped so initials match
/// regardless of punctuation ("C.B. Bucknor" == "CB Bucknor").
pub fn normalize_umpire(name: &str) -> String {
    normalize_venue(&name.replace('.', ""))
}

/// Immutable venue and umpire tables. Keys are stored normalised.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorTables {
    park_run: HashMap<String, f64>,
    park_prop: HashMap<String, HashMap<PropCategory, f64>>,
    umpires: HashMap<String, UmpireTendency>,
    venues: HashMap<String, VenueLocation>,
}

impl FactorTables {
    /// Tables with no entries; every lookup is unlisted.
    pub fn empty() -> Self {
        Self {
            park_run: HashMap::new(),
            park_prop: HashMap::new(),
            umpires: HashMap::new(),
            venues: HashMap::new(),
        }
    }

    /// Run-environment factor for a venue.
    pub fn park_run_factor(&self, venue: &str) -> Option<f64> {
        self.park_run.get(&normalize_venue(venue)).copied()
    }

    /// Category-specific park factor for a venue.
    pub fn park_prop_factor(&self, venue: &str, category: PropCategory) -> Option<f64> {
        self.park_prop
            .get(&normalize_venue(venue))
            .and_then(|by_cat| by_cat.get(&category))
            .copied()
    }

    pub fn umpire(&self, name: &str) -> Option<&UmpireTendency> {
        self.umpires.get(&normalize_umpire(name))
    }

    /// Multiplier an umpire applies to the given stat.
    pub fn umpire_factor(&self, name: &str, stat: UmpireStat) -> Option<f64> {
        self.umpire(name).and_then(|u| u.factor(stat))
    }

    pub fn venue_location(&self, venue: &str) -> Option<VenueLocation> {
        self.venues.get(&normalize_venue(venue)).copied()
    }

    pub fn with_park_run(mut self, venue: &str, factor: f64) -> Self {
        self.park_run.insert(normalize_venue(venue), factor);
        self
    }

    pub fn with_park_prop(mut self, venue: &str, category: PropCategory, factor: f64) -> Self {
        self.park_prop
            .entry(normalize_venue(venue))
            .or_default()
            .insert(category, factor);
        self
    }

    pub fn with_umpire(mut self, name: &str, tendency: UmpireTendency) -> Self {
        self.umpires.insert(normalize_umpire(name), tendency);
        self
    }

    pub fn with_venue(mut self, venue: &str, location: VenueLocation) -> Self {
        self.venues.insert(normalize_venue(venue), location);
        self
    }

    /// Merge overrides on top of these tables. Override entries win; an
    /// umpire override only replaces the fields it sets.
    pub fn merge(mut self, overrides: &TableOverrides) -> Self {
        for (venue, factor) in &overrides.park_run {
            self = self.with_park_run(venue, *factor);
        }
        for (venue, by_cat) in &overrides.park_prop {
            for (category, factor) in by_cat {
                self = self.with_park_prop(venue, *category, *factor);
            }
        }
        for (name, tendency) in &overrides.umpires {
            let merged = self
                .umpire(name)
                .copied()
                .unwrap_or_default()
                .overlay(*tendency);
            self = self.with_umpire(name, merged);
        }
        for (venue, location) in &overrides.venues {
            self = self.with_venue(venue, *location);
        }
        self
    }

    pub fn venue_count(&self) -> usize {
        self.venues.len()
    }

    pub fn umpire_count(&self) -> usize {
        self.umpires.len()
    }
}

/// Table entries supplied through configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableOverrides {
    #[serde(default)]
    pub park_run: HashMap<String, f64>,
    #[serde(default)]
    pub park_prop: HashMap<String, HashMap<PropCategory, f64>>,
    #[serde(default)]
    pub umpires: HashMap<String, UmpireTendency>,
    #[serde(default)]
    pub venues: HashMap<String, VenueLocation>,
}

impl TableOverrides {
    pub fn is_empty(&self) -> bool {
        self.park_run.is_empty()
            && self.park_prop.is_empty()
            && self.umpires.is_empty()
            && self.venues.is_empty()
    }
}

// ────────────────────────────────────────────
// Built-in league tables
// ────────────────────────────────────────────

const PARK_RUN_FACTORS: &[(&str, f64)] = &[
    ("Dodger Stadium", 1.05),
    ("Coors Field", 1.20),
    ("Yankee Stadium", 1.08),
    ("Fenway Park", 1.10),
    ("Oracle Park", 0.90),
    ("Oakland Coliseum", 0.85),
    ("Wrigley Field", 1.07),
    ("Citizens Bank Park", 1.06),
    ("Petco Park", 0.94),
    ("Globe Life Field", 0.97),
    ("Tropicana Field", 0.93),
    ("Truist Park", 1.04),
    ("Minute Maid Park", 1.01),
    ("Rogers Centre", 1.03),
    ("Progressive Field", 1.02),
    ("Great American Ball Park", 1.12),
    ("Guaranteed Rate Field", 1.00),
    ("Busch Stadium", 0.95),
    ("Target Field", 1.00),
    ("T-Mobile Park", 0.96),
    ("Chase Field", 1.11),
    ("PNC Park", 0.99),
    ("Kauffman Stadium", 1.00),
    ("loanDepot Park", 0.98),
    ("American Family Field", 1.08),
    ("Nationals Park", 1.00),
    ("Citi Field", 0.97),
    ("Angel Stadium", 0.96),
    ("Camden Yards", 1.09),
    ("Oriole Park at Camden Yards", 1.09),
    ("Comerica Park", 0.92),
];

// (venue, hits, total bases, walks, strikeouts, earned runs)
// Strikeout factors apply to both batter and pitcher strikeout props.
// H+R+RBI props share the total-bases factor; outs use the inverse run factor.
const PARK_PROP_FACTORS: &[(&str, f64, f64, f64, f64, f64)] = &[
    ("Coors Field", 1.12, 1.18, 1.02, 0.91, 1.22),
    ("Great American Ball Park", 1.03, 1.10, 1.01, 0.99, 1.10),
    ("Fenway Park", 1.07, 1.06, 1.00, 0.96, 1.08),
    ("Chase Field", 1.05, 1.07, 0.99, 0.96, 1.08),
    ("Yankee Stadium", 0.99, 1.08, 1.02, 1.02, 1.06),
    ("Citizens Bank Park", 1.01, 1.06, 1.01, 1.01, 1.05),
    ("Wrigley Field", 1.02, 1.04, 1.01, 0.98, 1.04),
    ("American Family Field", 0.98, 1.05, 1.02, 1.04, 1.04),
    ("Camden Yards", 1.02, 1.04, 0.99, 0.99, 1.05),
    ("Oracle Park", 0.97, 0.90, 0.99, 1.02, 0.92),
    ("Petco Park", 0.96, 0.94, 1.01, 1.04, 0.94),
    ("Oakland Coliseum", 0.95, 0.92, 1.02, 1.03, 0.90),
    ("T-Mobile Park", 0.94, 0.95, 0.99, 1.07, 0.93),
    ("Tropicana Field", 0.97, 0.95, 1.00, 1.05, 0.94),
    ("Comerica Park", 0.99, 0.94, 0.98, 0.99, 0.95),
];

const UMPIRE_TENDENCIES: &[(&str, f64, f64)] = &[
    ("Laz Diaz", 1.10, 0.90),
    ("Angel Hernandez", 0.92, 1.15),
    ("Pat Hoberg", 1.08, 0.95),
    ("CB Bucknor", 0.95, 1.10),
    ("Jim Wolf", 1.03, 0.97),
    ("Mark Wegner", 1.05, 0.96),
    ("Dan Bellino", 1.04, 0.98),
    ("Ed Hickox", 0.97, 1.02),
    ("Alan Porter", 1.02, 1.00),
    ("Chris Guccione", 1.00, 1.00),
    ("Will Little", 1.06, 0.97),
    ("Quinn Wolcott", 1.01, 1.03),
    ("Adrian Johnson", 1.00, 1.02),
    ("Tripp Gibson", 1.07, 0.94),
    ("Andy Fletcher", 0.93, 1.12),
    ("Vic Carapazza", 1.09, 0.91),
    ("Jerry Meals", 0.98, 1.04),
    ("Brian Knight", 1.00, 1.00),
    ("Ted Barrett", 1.04, 0.99),
    ("Marty Foster", 0.96, 1.08),
    ("Nic Lentz", 1.03, 0.97),
    ("Chad Fairchild", 1.02, 1.00),
    ("Carlos Torres", 1.00, 1.01),
    ("Tony Randazzo", 0.97, 1.05),
    ("Nestor Ceja", 1.01, 0.99),
];

const UMPIRE_OVER_TENDENCIES: &[(&str, f64)] = &[
    ("Pat Hoberg", 0.52),
    ("Laz Diaz", 0.58),
    ("Angel Hernandez", 0.60),
    ("Doug Eddings", 0.48),
    ("Mark Wegner", 0.50),
    ("Tripp Gibson", 0.45),
    ("CB Bucknor", 0.63),
    ("Dan Bellino", 0.47),
    ("Will Little", 0.49),
    ("Alan Porter", 0.51),
    ("Chris Guccione", 0.55),
    ("Jeremie Rehak", 0.50),
    ("Adam Hamari", 0.53),
    ("James Hoye", 0.48),
    ("Gabe Morales", 0.46),
];

const VENUE_LOCATIONS: &[(&str, f64, f64)] = &[
    ("Angel Stadium", 33.8003, -117.8827),
    ("Chase Field", 33.4455, -112.0667),
    ("Citi Field", 40.7571, -73.8458),
    ("Citizens Bank Park", 39.9061, -75.1665),
    ("Comerica Park", 42.3390, -83.0485),
    ("Coors Field", 39.7562, -104.9942),
    ("Dodger Stadium", 34.0739, -118.2400),
    ("Fenway Park", 42.3467, -71.0972),
    ("Globe Life Field", 32.7473, -97.0847),
    ("Great American Ball Park", 39.0979, -84.5066),
    ("Guaranteed Rate Field", 41.8309, -87.6339),
    ("Kauffman Stadium", 39.0517, -94.4803),
    ("loanDepot Park", 25.7780, -80.2195),
    ("Minute Maid Park", 29.7573, -95.3555),
    ("Nationals Park", 38.8730, -77.0074),
    ("Oakland Coliseum", 37.7516, -122.2005),
    ("Oracle Park", 37.7786, -122.3893),
    ("Oriole Park at Camden Yards", 39.2839, -76.6217),
    ("Camden Yards", 39.2839, -76.6217),
    ("Petco Park", 32.7073, -117.1573),
    ("PNC Park", 40.4469, -80.0057),
    ("Progressive Field", 41.4962, -81.6852),
    ("RingCentral Coliseum", 37.7516, -122.2005),
    ("Rogers Centre", 43.6414, -79.3894),
    ("T-Mobile Park", 47.5914, -122.3325),
    ("Target Field", 44.9817, -93.2783),
    ("Tropicana Field", 27.7683, -82.6534),
    ("Truist Park", 33.8908, -84.4678),
    ("Wrigley Field", 41.9484, -87.6553),
    ("Yankee Stadium", 40.8296, -73.9262),
    ("American Family Field", 43.0280, -87.9712),
    ("Busch Stadium", 38.6226, -90.1928),
];

impl Default for FactorTables {
    fn default() -> Self {
        let mut tables = Self::empty();

        for (venue, factor) in PARK_RUN_FACTORS {
            tables = tables.with_park_run(venue, *factor);
        }

        for &(venue, hits, tb, bb, k, er) in PARK_PROP_FACTORS {
            tables = tables
                .with_park_prop(venue, PropCategory::Hits, hits)
                .with_park_prop(venue, PropCategory::TotalBases, tb)
                .with_park_prop(venue, PropCategory::HitsRunsRbis, tb)
                .with_park_prop(venue, PropCategory::Walks, bb)
                .with_park_prop(venue, PropCategory::BatterStrikeouts, k)
                .with_park_prop(venue, PropCategory::PitcherStrikeouts, k)
                .with_park_prop(venue, PropCategory::EarnedRuns, er)
                .with_park_prop(venue, PropCategory::Outs, 1.0 / er);
        }

        for &(name, k_boost, bb_suppress) in UMPIRE_TENDENCIES {
            tables = tables.with_umpire(
                name,
                UmpireTendency {
                    k_boost: Some(k_boost),
                    bb_suppress: Some(bb_suppress),
                    over_tendency: None,
                },
            );
        }
        for &(name, over) in UMPIRE_OVER_TENDENCIES {
            let key = normalize_umpire(name);
            tables
                .umpires
                .entry(key)
                .or_default()
                .over_tendency = Some(over);
        }

        for &(venue, latitude, longitude) in VENUE_LOCATIONS {
            tables = tables.with_venue(venue, VenueLocation { latitude, longitude });
        }

        tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_venue_normalization() {
        assert_eq!(normalize_venue("  Coors   Field "), "coors field");
        let tables = FactorTables::default();
        assert_eq!(tables.park_run_factor("COORS FIELD"), Some(1.20));
        // Mixed-case table key still matches
        assert_eq!(tables.park_run_factor("loandepot park"), Some(0.98));
    }

    #[test]
    fn test_unknown_venue_unlisted() {
        let tables = FactorTables::default();
        assert_eq!(tables.park_run_factor("Sandlot"), None);
        assert_eq!(tables.park_prop_factor("Sandlot", PropCategory::Hits), None);
        assert_eq!(tables.venue_location("Sandlot"), None);
    }

    #[test]
    fn test_park_prop_factor_by_category() {
        let tables = FactorTables::default();
        assert_eq!(
            tables.park_prop_factor("Coors Field", PropCategory::TotalBases),
            Some(1.18)
        );
        assert_eq!(
            tables.park_prop_factor("Coors Field", PropCategory::PitcherStrikeouts),
            Some(0.91)
        );
        assert_eq!(tables.park_prop_factor("Dodger Stadium", PropCategory::Hits), None);
    }

    #[test]
    fn test_umpire_name_punctuation() {
        let tables = FactorTables::default();
        let ump = tables.umpire("C.B. Bucknor").unwrap();
        assert_eq!(ump.bb_suppress, Some(1.10));
        assert_eq!(ump.over_tendency, Some(0.63));
        assert_eq!(
            tables.umpire_factor("laz diaz", UmpireStat::Strikeout),
            Some(1.10)
        );
    }

    #[test]
    fn test_over_tendency_only_umpire_has_no_multiplier() {
        let tables = FactorTables::default();
        assert_eq!(
            tables.umpire_factor("Doug Eddings", UmpireStat::Strikeout),
            None
        );
        assert_eq!(tables.umpire_factor("Doug Eddings", UmpireStat::Walk), None);
        assert_eq!(tables.umpire("Doug Eddings").unwrap().over_tendency, Some(0.48));
    }

    #[test]
    fn test_merge_overrides_win() {
        let mut overrides = TableOverrides::default();
        overrides.park_run.insert("Coors Field".to_string(), 1.15);
        overrides.park_run.insert("Sandlot".to_string(), 1.30);
        let tables = FactorTables::default().merge(&overrides);
        assert_eq!(tables.park_run_factor("coors field"), Some(1.15));
        assert_eq!(tables.park_run_factor("Sandlot"), Some(1.30));
        assert_eq!(tables.park_run_factor("Fenway Park"), Some(1.10));
    }

    #[test]
    fn test_partial_umpire_override_keeps_builtin_fields() {
        let mut overrides = TableOverrides::default();
        overrides.umpires.insert(
            "Laz Diaz".to_string(),
            UmpireTendency {
                k_boost: Some(1.02),
                ..UmpireTendency::default()
            },
        );
        overrides
            .umpires
            .insert("New Guy".to_string(), UmpireTendency::default());
        let tables = FactorTables::default().merge(&overrides);

        let laz = tables.umpire("Laz Diaz").unwrap();
        assert_eq!(laz.k_boost, Some(1.02));
        assert_eq!(laz.bb_suppress, Some(0.90));
        assert_eq!(laz.over_tendency, Some(0.58));
        assert_eq!(tables.umpire_factor("New Guy", UmpireStat::Walk), None);
    }
}
