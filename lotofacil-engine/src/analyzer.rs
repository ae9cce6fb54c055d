use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use chrono::Utc;
use dashmap::DashMap;
use rayon::prelude::*;

use lotofacil_core::models::Histogram;
use lotofacil_core::{DistributionReport, FilterDimension, HistoricalDraw, RankedNumber, UNIVERSE};

use crate::features::{histogram_bucket, statistic};

const TOP_N: usize = 5;
pub const DEFAULT_CACHE_CAPACITY: usize = 32;

/// Identité d'une fenêtre de tirages : (nombre, concours le plus récent, le plus ancien).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowKey {
    pub count: usize,
    pub newest: u32,
    pub oldest: u32,
}

impl WindowKey {
    pub fn of(draws: &[HistoricalDraw]) -> Self {
        let (newest, oldest) = contest_bounds(draws).unwrap_or((0, 0));
        Self {
            count: draws.len(),
            newest,
            oldest,
        }
    }
}

fn contest_bounds(draws: &[HistoricalDraw]) -> Option<(u32, u32)> {
    let newest = draws.iter().map(HistoricalDraw::contest).max()?;
    let oldest = draws.iter().map(HistoricalDraw::contest).min()?;
    Some((newest, oldest))
}

/// Analyse complète d'une fenêtre de tirages, sans cache.
pub fn analyze(draws: &[HistoricalDraw]) -> DistributionReport {
    let Some((newest, oldest)) = contest_bounds(draws) else {
        return DistributionReport::empty(Utc::now());
    };

    let ((most_frequent, most_overdue), (distributions, mean_sum)) = rayon::join(
        || rayon::join(|| frequency_ranking(draws), || overdue_ranking(draws, newest, oldest)),
        || rayon::join(|| distributions(draws), || mean_sum(draws)),
    );

    DistributionReport {
        distributions,
        most_frequent,
        most_overdue,
        mean_sum,
        draws_analyzed: draws.len(),
        analyzed_at: Utc::now(),
    }
}

fn top_ranked(values: [u32; UNIVERSE as usize]) -> Vec<RankedNumber> {
    let mut ranked: Vec<RankedNumber> = values
        .iter()
        .enumerate()
        .map(|(i, &value)| RankedNumber {
            number: (i + 1) as u8,
            value,
        })
        .collect();
    ranked.sort_by(|a, b| b.value.cmp(&a.value));
    ranked.truncate(TOP_N);
    ranked
}

fn frequency_ranking(draws: &[HistoricalDraw]) -> Vec<RankedNumber> {
    let mut counts = [0u32; UNIVERSE as usize];
    for draw in draws {
        for n in draw.numbers().iter() {
            counts[(n - 1) as usize] += 1;
        }
    }
    top_ranked(counts)
}

/// Retard = concours le plus récent − dernier concours contenant le numéro.
/// Un numéro jamais sorti prend le concours le plus ancien comme référence.
fn overdue_ranking(draws: &[HistoricalDraw], newest: u32, oldest: u32) -> Vec<RankedNumber> {
    let mut last_seen = [oldest; UNIVERSE as usize];
    let mut seen = [false; UNIVERSE as usize];

    let mut by_recency: Vec<&HistoricalDraw> = draws.iter().collect();
    by_recency.sort_by(|a, b| b.contest().cmp(&a.contest()));

    for draw in by_recency {
        for n in draw.numbers().iter() {
            let idx = (n - 1) as usize;
            if !seen[idx] {
                seen[idx] = true;
                last_seen[idx] = draw.contest();
            }
        }
        if seen.iter().all(|&s| s) {
            break;
        }
    }

    top_ranked(last_seen.map(|contest| newest - contest))
}

fn distributions(draws: &[HistoricalDraw]) -> BTreeMap<FilterDimension, Histogram> {
    FilterDimension::HISTOGRAM
        .par_iter()
        .map(|&dimension| (dimension, histogram(draws, dimension)))
        .collect()
}

fn histogram(draws: &[HistoricalDraw], dimension: FilterDimension) -> Histogram {
    let mut histogram = Histogram::new();
    for draw in draws {
        if let Some(value) = statistic(dimension, draw.numbers(), None) {
            *histogram.entry(histogram_bucket(dimension, value)).or_insert(0) += 1;
        }
    }
    histogram
}

fn mean_sum(draws: &[HistoricalDraw]) -> f64 {
    if draws.is_empty() {
        return 0.0;
    }
    let total: u64 = draws.iter().map(|d| u64::from(d.numbers().sum())).sum();
    total as f64 / draws.len() as f64
}

struct CachedReport {
    report: Arc<DistributionReport>,
    inserted: u64,
}

/// Analyseur avec cache borné, partageable entre threads.
///
/// À capacité, environ un quart des entrées (les plus anciennes insérées)
/// sont retirées avant l'insertion suivante.
pub struct DistributionAnalyzer {
    cache: DashMap<WindowKey, CachedReport>,
    capacity: usize,
    sequence: AtomicU64,
}

impl Default for DistributionAnalyzer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl DistributionAnalyzer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cache: DashMap::new(),
            capacity: capacity.max(1),
            sequence: AtomicU64::new(0),
        }
    }

    /// Instance partagée par tout le processus.
    pub fn shared() -> &'static DistributionAnalyzer {
        static SHARED: OnceLock<DistributionAnalyzer> = OnceLock::new();
        SHARED.get_or_init(DistributionAnalyzer::default)
    }

    pub fn analyze(&self, draws: &[HistoricalDraw]) -> Arc<DistributionReport> {
        let key = WindowKey::of(draws);
        if let Some(cached) = self.cache.get(&key) {
            log::debug!("cache d'analyse : hit {:?}", key);
            return Arc::clone(&cached.report);
        }

        let report = Arc::new(analyze(draws));
        if self.cache.len() >= self.capacity {
            self.evict();
        }
        let inserted = self.sequence.fetch_add(1, Ordering::Relaxed);
        // Un autre thread a pu insérer la même fenêtre entre-temps : on garde la sienne.
        let entry = self.cache.entry(key).or_insert(CachedReport { report, inserted });
        Arc::clone(&entry.report)
    }

    fn evict(&self) {
        let to_remove = (self.capacity / 4).max(1);
        let mut entries: Vec<(WindowKey, u64)> = self
            .cache
            .iter()
            .map(|e| (*e.key(), e.value().inserted))
            .collect();
        entries.sort_by_key(|&(_, inserted)| inserted);
        for (key, _) in entries.into_iter().take(to_remove) {
            self.cache.remove(&key);
        }
        log::debug!("cache d'analyse : {} entrées évincées", to_remove);
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn contains(&self, draws: &[HistoricalDraw]) -> bool {
        self.cache.contains_key(&WindowKey::of(draws))
    }

    pub fn clear(&self) {
        self.cache.clear();
    }
}

/// Analyse via le cache partagé du processus.
pub fn analyze_history(draws: &[HistoricalDraw]) -> Arc<DistributionReport> {
    DistributionAnalyzer::shared().analyze(draws)
}
