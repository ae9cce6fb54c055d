use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FilterError;

/// Intervalle fermé `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueRange {
    pub start: u32,
    pub end: u32,
}

impl ValueRange {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, value: u32) -> bool {
        self.start <= value && value <= self.end
    }

    pub fn width(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_within(&self, outer: &ValueRange) -> bool {
        outer.start <= self.start && self.end <= outer.end
    }
}

impl fmt::Display for ValueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterDimension {
    Sum,
    Even,
    Prime,
    Frame,
    Portrait,
    Fibonacci,
    #[serde(rename = "multiple_of_3")]
    MultipleOf3,
    Repeats,
}

impl FilterDimension {
    pub const ALL: [FilterDimension; 8] = [
        FilterDimension::Sum,
        FilterDimension::Even,
        FilterDimension::Prime,
        FilterDimension::Frame,
        FilterDimension::Portrait,
        FilterDimension::Fibonacci,
        FilterDimension::MultipleOf3,
        FilterDimension::Repeats,
    ];

    /// Dimensions calculables à partir d'un tirage seul (sans tirage précédent).
    pub const HISTOGRAM: [FilterDimension; 7] = [
        FilterDimension::Sum,
        FilterDimension::Even,
        FilterDimension::Prime,
        FilterDimension::Frame,
        FilterDimension::Portrait,
        FilterDimension::Fibonacci,
        FilterDimension::MultipleOf3,
    ];

    /// Plage des valeurs atteignables par une combinaison de 15 numéros.
    pub fn full_range(&self) -> ValueRange {
        match self {
            FilterDimension::Sum => ValueRange::new(120, 270),
            FilterDimension::Even => ValueRange::new(2, 12),
            FilterDimension::Prime => ValueRange::new(0, 9),
            FilterDimension::Frame => ValueRange::new(6, 15),
            FilterDimension::Portrait => ValueRange::new(0, 9),
            FilterDimension::Fibonacci => ValueRange::new(0, 7),
            FilterDimension::MultipleOf3 => ValueRange::new(0, 8),
            FilterDimension::Repeats => ValueRange::new(5, 15),
        }
    }

    pub fn default_range(&self) -> ValueRange {
        match self {
            FilterDimension::Sum => ValueRange::new(166, 220),
            FilterDimension::Even => ValueRange::new(6, 9),
            FilterDimension::Prime => ValueRange::new(4, 7),
            FilterDimension::Frame => ValueRange::new(9, 11),
            FilterDimension::Portrait => ValueRange::new(4, 6),
            FilterDimension::Fibonacci => ValueRange::new(3, 5),
            FilterDimension::MultipleOf3 => ValueRange::new(4, 6),
            FilterDimension::Repeats => ValueRange::new(8, 10),
        }
    }

    /// Part des tirages réels tombant dans `default_range`.
    pub fn historical_success_rate(&self) -> f64 {
        match self {
            FilterDimension::Sum => 0.84,
            FilterDimension::Even => 0.82,
            FilterDimension::Prime => 0.80,
            FilterDimension::Frame => 0.78,
            FilterDimension::Portrait => 0.78,
            FilterDimension::Fibonacci => 0.80,
            FilterDimension::MultipleOf3 => 0.75,
            FilterDimension::Repeats => 0.79,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FilterDimension::Sum => "sum",
            FilterDimension::Even => "even",
            FilterDimension::Prime => "prime",
            FilterDimension::Frame => "frame",
            FilterDimension::Portrait => "portrait",
            FilterDimension::Fibonacci => "fibonacci",
            FilterDimension::MultipleOf3 => "multiple_of_3",
            FilterDimension::Repeats => "repeats",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FilterDimension::Sum => "Somme",
            FilterDimension::Even => "Pairs",
            FilterDimension::Prime => "Premiers",
            FilterDimension::Frame => "Cadre",
            FilterDimension::Portrait => "Centre",
            FilterDimension::Fibonacci => "Fibonacci",
            FilterDimension::MultipleOf3 => "Multiples de 3",
            FilterDimension::Repeats => "Répétés",
        }
    }
}

impl fmt::Display for FilterDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for FilterDimension {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace('-', "_");
        FilterDimension::ALL
            .iter()
            .copied()
            .find(|d| d.name() == key)
            .or(match key.as_str() {
                "mult3" | "multiples_of_3" => Some(FilterDimension::MultipleOf3),
                "repeat" => Some(FilterDimension::Repeats),
                _ => None,
            })
            .ok_or_else(|| FilterError::UnknownDimension(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RestrictivenessBand {
    Disabled,
    VeryLoose,
    Loose,
    Moderate,
    Tight,
    VeryTight,
}

impl RestrictivenessBand {
    pub fn from_coverage(coverage: f64) -> Self {
        if coverage >= 0.8 {
            RestrictivenessBand::VeryLoose
        } else if coverage >= 0.6 {
            RestrictivenessBand::Loose
        } else if coverage >= 0.4 {
            RestrictivenessBand::Moderate
        } else if coverage >= 0.2 {
            RestrictivenessBand::Tight
        } else {
            RestrictivenessBand::VeryTight
        }
    }
}

impl fmt::Display for RestrictivenessBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestrictivenessBand::Disabled => write!(f, "désactivé"),
            RestrictivenessBand::VeryLoose => write!(f, "très large"),
            RestrictivenessBand::Loose => write!(f, "large"),
            RestrictivenessBand::Moderate => write!(f, "modéré"),
            RestrictivenessBand::Tight => write!(f, "serré"),
            RestrictivenessBand::VeryTight => write!(f, "très serré"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FilterConfigRepr")]
pub struct FilterConfig {
    dimension: FilterDimension,
    enabled: bool,
    range: ValueRange,
}

#[derive(Deserialize)]
struct FilterConfigRepr {
    dimension: FilterDimension,
    enabled: bool,
    range: ValueRange,
}

impl TryFrom<FilterConfigRepr> for FilterConfig {
    type Error = FilterError;

    fn try_from(repr: FilterConfigRepr) -> Result<Self, Self::Error> {
        FilterConfig::new(repr.dimension, repr.enabled, repr.range)
    }
}

impl FilterConfig {
    pub fn new(dimension: FilterDimension, enabled: bool, range: ValueRange) -> Result<Self, FilterError> {
        check_range(dimension, range)?;
        Ok(Self { dimension, enabled, range })
    }

    /// Filtre actif sur son intervalle par défaut.
    pub fn default_for(dimension: FilterDimension) -> Self {
        Self {
            dimension,
            enabled: true,
            range: dimension.default_range(),
        }
    }

    pub fn disabled(dimension: FilterDimension) -> Self {
        Self {
            enabled: false,
            ..Self::default_for(dimension)
        }
    }

    pub fn defaults() -> Vec<FilterConfig> {
        FilterDimension::ALL.iter().map(|&d| Self::default_for(d)).collect()
    }

    pub fn dimension(&self) -> FilterDimension {
        self.dimension
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn range(&self) -> ValueRange {
        self.range
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_range(&mut self, range: ValueRange) -> Result<(), FilterError> {
        check_range(self.dimension, range)?;
        self.range = range;
        Ok(())
    }

    pub fn accepts(&self, value: u32) -> bool {
        !self.enabled || self.range.contains(value)
    }

    pub fn coverage_percentage(&self) -> f64 {
        let full = self.dimension.full_range();
        self.range.width() as f64 / full.width() as f64
    }

    pub fn restrictiveness_band(&self) -> RestrictivenessBand {
        if !self.enabled {
            return RestrictivenessBand::Disabled;
        }
        RestrictivenessBand::from_coverage(self.coverage_percentage())
    }
}

fn check_range(dimension: FilterDimension, range: ValueRange) -> Result<(), FilterError> {
    if range.start > range.end {
        return Err(FilterError::InvertedRange {
            start: range.start,
            end: range.end,
        });
    }
    let full = dimension.full_range();
    if !range.is_within(&full) {
        return Err(FilterError::OutOfBounds {
            dimension,
            start: range.start,
            end: range.end,
            full_start: full.start,
            full_end: full.end,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_within_full() {
        for d in FilterDimension::ALL {
            assert!(d.default_range().is_within(&d.full_range()), "{:?}", d);
            let rate = d.historical_success_rate();
            assert!(rate > 0.0 && rate <= 1.0);
        }
    }

    #[test]
    fn test_accepts_disabled_always() {
        let f = FilterConfig::disabled(FilterDimension::Sum);
        assert!(f.accepts(0));
        assert!(f.accepts(1000));
    }

    #[test]
    fn test_accepts_bounds_inclusive() {
        let f = FilterConfig::default_for(FilterDimension::Even);
        assert!(f.accepts(6));
        assert!(f.accepts(9));
        assert!(!f.accepts(5));
        assert!(!f.accepts(10));
    }

    #[test]
    fn test_new_rejects_inverted() {
        let err = FilterConfig::new(FilterDimension::Prime, true, ValueRange::new(5, 3)).unwrap_err();
        assert_eq!(err, FilterError::InvertedRange { start: 5, end: 3 });
    }

    #[test]
    fn test_new_rejects_out_of_bounds() {
        assert!(FilterConfig::new(FilterDimension::Sum, true, ValueRange::new(100, 200)).is_err());
        assert!(FilterConfig::new(FilterDimension::Repeats, true, ValueRange::new(5, 16)).is_err());
    }

    #[test]
    fn test_set_range_keeps_previous_on_error() {
        let mut f = FilterConfig::default_for(FilterDimension::Frame);
        assert!(f.set_range(ValueRange::new(3, 20)).is_err());
        assert_eq!(f.range(), FilterDimension::Frame.default_range());
    }

    #[test]
    fn test_coverage_full_range() {
        let f = FilterConfig::new(FilterDimension::Sum, true, FilterDimension::Sum.full_range()).unwrap();
        assert!((f.coverage_percentage() - 1.0).abs() < 1e-12);
        assert_eq!(f.restrictiveness_band(), RestrictivenessBand::VeryLoose);
    }

    #[test]
    fn test_bands() {
        let sum = |s, e| FilterConfig::new(FilterDimension::Sum, true, ValueRange::new(s, e)).unwrap();
        // largeur totale 150
        assert_eq!(sum(120, 240).restrictiveness_band(), RestrictivenessBand::VeryLoose);
        assert_eq!(sum(120, 210).restrictiveness_band(), RestrictivenessBand::Loose);
        assert_eq!(sum(120, 180).restrictiveness_band(), RestrictivenessBand::Moderate);
        assert_eq!(sum(120, 150).restrictiveness_band(), RestrictivenessBand::Tight);
        assert_eq!(sum(180, 180).restrictiveness_band(), RestrictivenessBand::VeryTight);
        let mut off = sum(180, 180);
        off.set_enabled(false);
        assert_eq!(off.restrictiveness_band(), RestrictivenessBand::Disabled);
    }

    #[test]
    fn test_dimension_from_str() {
        assert_eq!("sum".parse::<FilterDimension>().unwrap(), FilterDimension::Sum);
        assert_eq!("Multiple-of-3".parse::<FilterDimension>().unwrap(), FilterDimension::MultipleOf3);
        assert_eq!("mult3".parse::<FilterDimension>().unwrap(), FilterDimension::MultipleOf3);
        assert!("odd".parse::<FilterDimension>().is_err());
    }

    #[test]
    fn test_serde_validates_range() {
        let json = r#"{"dimension":"sum","enabled":true,"range":{"start":150,"end":200}}"#;
        let f: FilterConfig = serde_json::from_str(json).unwrap();
        assert_eq!(f.range(), ValueRange::new(150, 200));

        let bad = r#"{"dimension":"even","enabled":true,"range":{"start":0,"end":15}}"#;
        assert!(serde_json::from_str::<FilterConfig>(bad).is_err());

        let back = serde_json::to_string(&f).unwrap();
        assert!(back.contains("\"dimension\":\"sum\""));
    }
}
