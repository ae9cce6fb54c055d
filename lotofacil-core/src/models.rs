use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CombinationError, DrawError};
use crate::filters::FilterDimension;

/// Nombre de numéros de l'univers (1..=25).
pub const UNIVERSE: u8 = 25;
/// Nombre de numéros par combinaison.
pub const PICK_COUNT: usize = 15;

const UNIVERSE_MASK: u32 = (1 << UNIVERSE) - 1;

/// Masque de bits d'un ensemble de numéros (bit `n - 1` pour le numéro `n`).
pub const fn number_mask(numbers: &[u8]) -> u32 {
    let mut mask = 0u32;
    let mut i = 0;
    while i < numbers.len() {
        mask |= 1 << (numbers[i] - 1);
        i += 1;
    }
    mask
}

/// 15 numéros distincts de 1 à 25, stockés sous forme de masque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Combination {
    mask: u32,
}

impl Combination {
    pub fn new(numbers: &[u8]) -> Result<Self, CombinationError> {
        if numbers.len() != PICK_COUNT {
            return Err(CombinationError::WrongSize(numbers.len()));
        }
        let mut mask = 0u32;
        for &n in numbers {
            if !(1..=UNIVERSE).contains(&n) {
                return Err(CombinationError::OutOfRange(n));
            }
            let bit = 1u32 << (n - 1);
            if mask & bit != 0 {
                return Err(CombinationError::Duplicate(n));
            }
            mask |= bit;
        }
        Ok(Self { mask })
    }

    pub fn from_mask(mask: u32) -> Result<Self, CombinationError> {
        if mask & !UNIVERSE_MASK != 0 {
            return Err(CombinationError::InvalidMask(mask));
        }
        let size = mask.count_ones() as usize;
        if size != PICK_COUNT {
            return Err(CombinationError::WrongSize(size));
        }
        Ok(Self { mask })
    }

    pub fn mask(&self) -> u32 {
        self.mask
    }

    pub fn contains(&self, number: u8) -> bool {
        (1..=UNIVERSE).contains(&number) && self.mask & (1 << (number - 1)) != 0
    }

    /// Numéros dans l'ordre croissant.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (1..=UNIVERSE).filter(move |&n| self.mask & (1 << (n - 1)) != 0)
    }

    pub fn numbers(&self) -> Vec<u8> {
        self.iter().collect()
    }

    pub fn sum(&self) -> u32 {
        self.iter().map(u32::from).sum()
    }

    /// Nombre de numéros communs avec un ensemble donné par son masque.
    pub fn count_in(&self, set_mask: u32) -> u32 {
        (self.mask & set_mask).count_ones()
    }

    pub fn intersection_count(&self, other: &Combination) -> u32 {
        self.count_in(other.mask)
    }
}

impl TryFrom<Vec<u8>> for Combination {
    type Error = CombinationError;

    fn try_from(numbers: Vec<u8>) -> Result<Self, Self::Error> {
        Combination::new(&numbers)
    }
}

impl From<Combination> for Vec<u8> {
    fn from(combination: Combination) -> Self {
        combination.numbers()
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|n| format!("{:02}", n)).collect();
        write!(f, "{}", parts.join(" "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoricalDraw {
    contest: u32,
    numbers: Combination,
    date: Option<String>,
}

impl HistoricalDraw {
    pub fn new(contest: u32, numbers: Combination, date: Option<String>) -> Result<Self, DrawError> {
        if contest == 0 {
            return Err(DrawError::ZeroContest);
        }
        Ok(Self { contest, numbers, date })
    }

    pub fn from_numbers(contest: u32, numbers: &[u8], date: Option<String>) -> Result<Self, DrawError> {
        let combination = Combination::new(numbers)?;
        Self::new(contest, combination, date)
    }

    pub fn contest(&self) -> u32 {
        self.contest
    }

    pub fn numbers(&self) -> &Combination {
        &self.numbers
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentHit {
    pub contest: u32,
    pub hits: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringResult {
    /// Nombre de points (11 à 15) → nombre de concours concernés.
    pub hit_counts: BTreeMap<u8, u32>,
    pub last_hit_contest: Option<u32>,
    pub last_hit_score: Option<u8>,
    pub last_checked_contest: u32,
    /// Les 15 derniers concours, du plus ancien au plus récent.
    pub recent_hits: Vec<RecentHit>,
}

impl ScoringResult {
    pub fn total_hits(&self) -> u32 {
        self.hit_counts.values().sum()
    }

    pub fn hit_rate(&self, draws_checked: usize) -> f64 {
        if draws_checked == 0 {
            return 0.0;
        }
        self.total_hits() as f64 / draws_checked as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedNumber {
    pub number: u8,
    pub value: u32,
}

/// Valeur (ou tranche) → nombre de tirages.
pub type Histogram = BTreeMap<u32, u32>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionReport {
    pub distributions: BTreeMap<FilterDimension, Histogram>,
    pub most_frequent: Vec<RankedNumber>,
    pub most_overdue: Vec<RankedNumber>,
    pub mean_sum: f64,
    pub draws_analyzed: usize,
    pub analyzed_at: DateTime<Utc>,
}

impl DistributionReport {
    /// Rapport vide : histogrammes sans entrée, moyenne nulle.
    pub fn empty(analyzed_at: DateTime<Utc>) -> Self {
        Self {
            distributions: FilterDimension::HISTOGRAM
                .iter()
                .map(|&d| (d, Histogram::new()))
                .collect(),
            most_frequent: Vec::new(),
            most_overdue: Vec::new(),
            mean_sum: 0.0,
            draws_analyzed: 0,
            analyzed_at,
        }
    }

    pub fn distribution(&self, dimension: FilterDimension) -> Option<&Histogram> {
        self.distributions.get(&dimension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_fifteen() -> Vec<u8> {
        (1..=15).collect()
    }

    #[test]
    fn test_combination_ok() {
        let c = Combination::new(&first_fifteen()).unwrap();
        assert_eq!(c.numbers(), first_fifteen());
        assert_eq!(c.sum(), 120);
        assert!(c.contains(15));
        assert!(!c.contains(16));
        assert!(!c.contains(0));
    }

    #[test]
    fn test_combination_wrong_size() {
        assert_eq!(
            Combination::new(&[1, 2, 3]),
            Err(CombinationError::WrongSize(3))
        );
    }

    #[test]
    fn test_combination_out_of_range() {
        let mut numbers = first_fifteen();
        numbers[0] = 26;
        assert_eq!(Combination::new(&numbers), Err(CombinationError::OutOfRange(26)));
        numbers[0] = 0;
        assert_eq!(Combination::new(&numbers), Err(CombinationError::OutOfRange(0)));
    }

    #[test]
    fn test_combination_duplicate() {
        let mut numbers = first_fifteen();
        numbers[14] = 1;
        assert_eq!(Combination::new(&numbers), Err(CombinationError::Duplicate(1)));
    }

    #[test]
    fn test_from_mask() {
        let c = Combination::from_mask((1 << 15) - 1).unwrap();
        assert_eq!(c.numbers(), first_fifteen());
        assert!(Combination::from_mask(0b111).is_err());
        assert!(Combination::from_mask(1 << 25 | ((1 << 14) - 1)).is_err());
    }

    #[test]
    fn test_intersection_count() {
        let a = Combination::new(&first_fifteen()).unwrap();
        let b = Combination::new(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 24, 25]).unwrap();
        assert_eq!(a.intersection_count(&b), 13);
        assert_eq!(a.intersection_count(&a), 15);
    }

    #[test]
    fn test_display_sorted_padded() {
        let c = Combination::new(&[25, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14]).unwrap();
        assert!(c.to_string().starts_with("01 02 03"));
        assert!(c.to_string().ends_with("14 25"));
    }

    #[test]
    fn test_serde_rejects_invalid() {
        let json = serde_json::to_string(&Combination::new(&first_fifteen()).unwrap()).unwrap();
        assert_eq!(json, "[1,2,3,4,5,6,7,8,9,10,11,12,13,14,15]");
        assert!(serde_json::from_str::<Combination>("[1,2,3]").is_err());
    }

    #[test]
    fn test_draw_zero_contest() {
        let c = Combination::new(&first_fifteen()).unwrap();
        assert_eq!(HistoricalDraw::new(0, c, None), Err(DrawError::ZeroContest));
        let draw = HistoricalDraw::new(42, c, Some("2024-01-01".to_string())).unwrap();
        assert_eq!(draw.contest(), 42);
        assert_eq!(draw.date(), Some("2024-01-01"));
    }

    #[test]
    fn test_empty_report_has_all_histograms() {
        let report = DistributionReport::empty(Utc::now());
        assert_eq!(report.distributions.len(), 7);
        assert!(report.distribution(FilterDimension::Repeats).is_none());
        assert_eq!(report.draws_analyzed, 0);
    }

    mod props {
        use super::super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn any_fifteen_subset_is_valid(mut pool in Just((1u8..=25).collect::<Vec<_>>()).prop_shuffle()) {
                pool.truncate(PICK_COUNT);
                let c = Combination::new(&pool).unwrap();
                prop_assert_eq!(c.numbers().len(), PICK_COUNT);
                prop_assert!(c.iter().all(|n| (1..=UNIVERSE).contains(&n)));
                prop_assert!(c.numbers().windows(2).all(|w| w[0] < w[1]));
            }
        }
    }
}
