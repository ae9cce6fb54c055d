use std::collections::BTreeMap;

use lotofacil_core::{Combination, HistoricalDraw, RecentHit, ScoreError, ScoringResult};

/// Nombre minimal de numéros communs pour un gain.
pub const MIN_PRIZE_HITS: u8 = 11;
/// Taille de la fenêtre de concours récents renvoyée pour les graphiques.
pub const RECENT_WINDOW: usize = 15;

/// Compare une combinaison à l'historique (`history[0]` = tirage le plus récent).
pub fn score_combination(
    combination: &Combination,
    history: &[HistoricalDraw],
) -> Result<ScoringResult, ScoreError> {
    if history.is_empty() {
        return Err(ScoreError::EmptyHistory);
    }

    let hits_of = |draw: &HistoricalDraw| combination.intersection_count(draw.numbers()) as u8;

    let mut hit_counts: BTreeMap<u8, u32> = BTreeMap::new();
    let mut last_hit: Option<(u32, u8)> = None;

    for draw in history {
        let hits = hits_of(draw);
        if hits < MIN_PRIZE_HITS {
            continue;
        }
        *hit_counts.entry(hits).or_insert(0) += 1;
        if last_hit.is_none() {
            last_hit = Some((draw.contest(), hits));
        }
    }

    let mut recent_hits: Vec<RecentHit> = history
        .iter()
        .take(RECENT_WINDOW)
        .map(|draw| RecentHit {
            contest: draw.contest(),
            hits: hits_of(draw),
        })
        .collect();
    recent_hits.reverse();

    Ok(ScoringResult {
        hit_counts,
        last_hit_contest: last_hit.map(|(contest, _)| contest),
        last_hit_score: last_hit.map(|(_, hits)| hits),
        last_checked_contest: history.first().map_or(0, HistoricalDraw::contest),
        recent_hits,
    })
}
