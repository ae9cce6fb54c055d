use lotofacil_core::models::number_mask;
use lotofacil_core::{Combination, FilterDimension};

pub const EVENS: u32 = number_mask(&[2, 4, 6, 8, 10, 12, 14, 16, 18, 20, 22, 24]);
pub const PRIMES: u32 = number_mask(&[2, 3, 5, 7, 11, 13, 17, 19, 23]);
/// Bordure de la grille 5×5.
pub const FRAME: u32 = number_mask(&[1, 2, 3, 4, 5, 6, 10, 11, 15, 16, 20, 21, 22, 23, 24, 25]);
/// Intérieur de la grille 5×5, complément de `FRAME`.
pub const PORTRAIT: u32 = number_mask(&[7, 8, 9, 12, 13, 14, 17, 18, 19]);
pub const FIBONACCI: u32 = number_mask(&[1, 2, 3, 5, 8, 13, 21]);
pub const MULTIPLES_OF_3: u32 = number_mask(&[3, 6, 9, 12, 15, 18, 21, 24]);

/// Statistique d'une combinaison pour une dimension de filtre.
///
/// `Repeats` n'a de sens qu'avec un tirage précédent : `None` sinon.
pub fn statistic(
    dimension: FilterDimension,
    combination: &Combination,
    previous: Option<&Combination>,
) -> Option<u32> {
    let value = match dimension {
        FilterDimension::Sum => combination.sum(),
        FilterDimension::Even => combination.count_in(EVENS),
        FilterDimension::Prime => combination.count_in(PRIMES),
        FilterDimension::Frame => combination.count_in(FRAME),
        FilterDimension::Portrait => combination.count_in(PORTRAIT),
        FilterDimension::Fibonacci => combination.count_in(FIBONACCI),
        FilterDimension::MultipleOf3 => combination.count_in(MULTIPLES_OF_3),
        FilterDimension::Repeats => return previous.map(|p| combination.intersection_count(p)),
    };
    Some(value)
}

/// Valeur placée dans l'histogramme : la somme est regroupée par dizaines.
pub fn histogram_bucket(dimension: FilterDimension, value: u32) -> u32 {
    match dimension {
        FilterDimension::Sum => value / 10 * 10,
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn combo(numbers: &[u8]) -> Combination {
        Combination::new(numbers).unwrap()
    }

    #[test]
    fn test_frame_portrait_partition() {
        assert_eq!(FRAME & PORTRAIT, 0);
        assert_eq!(FRAME | PORTRAIT, (1 << 25) - 1);
        assert_eq!(FRAME.count_ones(), 16);
        assert_eq!(PORTRAIT.count_ones(), 9);
    }

    #[test]
    fn test_statistics_first_fifteen() {
        let c = combo(&(1..=15).collect::<Vec<_>>());
        assert_eq!(statistic(FilterDimension::Sum, &c, None), Some(120));
        assert_eq!(statistic(FilterDimension::Even, &c, None), Some(7));
        assert_eq!(statistic(FilterDimension::Prime, &c, None), Some(6));
        assert_eq!(statistic(FilterDimension::Frame, &c, None), Some(9));
        assert_eq!(statistic(FilterDimension::Portrait, &c, None), Some(6));
        assert_eq!(statistic(FilterDimension::Fibonacci, &c, None), Some(6));
        assert_eq!(statistic(FilterDimension::MultipleOf3, &c, None), Some(5));
    }

    #[test]
    fn test_repeats_needs_previous() {
        let c = combo(&(1..=15).collect::<Vec<_>>());
        let prev = combo(&(11..=25).collect::<Vec<_>>());
        assert_eq!(statistic(FilterDimension::Repeats, &c, None), None);
        assert_eq!(statistic(FilterDimension::Repeats, &c, Some(&prev)), Some(5));
    }

    #[test]
    fn test_full_ranges_are_tight() {
        // Les bornes des plages complètes sont atteintes par des combinaisons réelles.
        let low = combo(&(1..=15).collect::<Vec<_>>());
        let high = combo(&(11..=25).collect::<Vec<_>>());
        assert_eq!(statistic(FilterDimension::Sum, &low, None), Some(FilterDimension::Sum.full_range().start));
        assert_eq!(statistic(FilterDimension::Sum, &high, None), Some(FilterDimension::Sum.full_range().end));
    }

    #[test]
    fn test_sum_bucket() {
        assert_eq!(histogram_bucket(FilterDimension::Sum, 197), 190);
        assert_eq!(histogram_bucket(FilterDimension::Sum, 200), 200);
        assert_eq!(histogram_bucket(FilterDimension::Even, 7), 7);
    }
}
