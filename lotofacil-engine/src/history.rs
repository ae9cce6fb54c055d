use anyhow::Result;

use lotofacil_core::{Combination, HistoricalDraw};

/// Fournisseur de l'historique des tirages.
pub trait HistorySource {
    /// Tirages triés du plus récent au plus ancien ; peut être vide.
    fn history(&self) -> Result<Vec<HistoricalDraw>>;

    /// Numéros du tirage le plus récent.
    fn previous_draw(&self) -> Result<Option<Combination>> {
        Ok(self.history()?.first().map(|d| *d.numbers()))
    }
}

/// Historique déjà en mémoire.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistory {
    draws: Vec<HistoricalDraw>,
}

impl InMemoryHistory {
    pub fn new(mut draws: Vec<HistoricalDraw>) -> Self {
        sort_newest_first(&mut draws);
        Self { draws }
    }
}

impl HistorySource for InMemoryHistory {
    fn history(&self) -> Result<Vec<HistoricalDraw>> {
        Ok(self.draws.clone())
    }
}

pub fn sort_newest_first(draws: &mut [HistoricalDraw]) {
    draws.sort_by(|a, b| b.contest().cmp(&a.contest()));
}

/// Historique synthétique : `draws[0]` est le concours `n`, le plus récent.
pub fn make_test_draws(n: usize) -> Vec<HistoricalDraw> {
    (0..n)
        .map(|i| {
            let offset = (i * 7) % 25;
            let numbers: Vec<u8> = (0..15).map(|j| ((offset + j) % 25 + 1) as u8).collect();
            let date = format!("2024-01-{:02}", (i % 28) + 1);
            HistoricalDraw::from_numbers((n - i) as u32, &numbers, Some(date))
                .expect("les tirages synthétiques sont valides")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_test_draws_order() {
        let draws = make_test_draws(10);
        assert_eq!(draws.len(), 10);
        assert_eq!(draws[0].contest(), 10);
        assert_eq!(draws[9].contest(), 1);
    }

    #[test]
    fn test_in_memory_sorts_and_previous() {
        let mut draws = make_test_draws(5);
        draws.reverse();
        let source = InMemoryHistory::new(draws);
        let history = source.history().unwrap();
        assert_eq!(history[0].contest(), 5);
        assert_eq!(source.previous_draw().unwrap(), Some(*history[0].numbers()));
    }

    #[test]
    fn test_empty_history_has_no_previous() {
        let source = InMemoryHistory::default();
        assert_eq!(source.previous_draw().unwrap(), None);
    }
}
