use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use lotofacil_core::{HistoricalDraw, PICK_COUNT};
use lotofacil_engine::history::{sort_newest_first, HistorySource};

/// Colonnes : concours ; date ; n1 .. n15
const FIRST_NUMBER_COLUMN: usize = 2;

fn field(record: &csv::StringRecord, idx: usize) -> Result<&str> {
    record
        .get(idx)
        .map(str::trim)
        .with_context(|| format!("Champ manquant à l'index {}", idx))
}

fn parse_record(record: &csv::StringRecord) -> Result<HistoricalDraw> {
    let get = |idx: usize| field(record, idx);

    let raw_contest = get(0)?;
    let contest: u32 = raw_contest
        .parse()
        .with_context(|| format!("Numéro de concours invalide : '{}'", raw_contest))?;
    let date = parse_date(get(1)?)?;

    let numbers = (FIRST_NUMBER_COLUMN..FIRST_NUMBER_COLUMN + PICK_COUNT)
        .map(|idx| {
            let s = get(idx)?;
            s.parse::<u8>()
                .with_context(|| format!("Impossible de parser '{}' (index {})", s, idx))
        })
        .collect::<Result<Vec<u8>>>()?;

    HistoricalDraw::from_numbers(contest, &numbers, date)
        .with_context(|| format!("Tirage {} invalide", contest))
}

/// Accepte `JJ/MM/AAAA` ou `AAAA-MM-JJ` ; une date vide est absente.
pub fn parse_date(raw: &str) -> Result<Option<String>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if raw.contains('-') {
        return Ok(Some(raw.to_string()));
    }
    let parts: Vec<&str> = raw.split('/').collect();
    if parts.len() != 3 {
        bail!("Format de date invalide: '{}'", raw);
    }
    Ok(Some(format!("{}-{}-{}", parts[2], parts[1], parts[0])))
}

pub struct LoadResult {
    pub draws: Vec<HistoricalDraw>,
    pub total_records: u32,
    pub skipped: u32,
    pub errors: u32,
}

pub fn load_csv(path: &Path) -> Result<LoadResult> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;

    let mut result = LoadResult {
        draws: Vec::new(),
        total_records: 0,
        skipped: 0,
        errors: 0,
    };
    let mut seen = HashSet::new();

    for record_result in reader.records() {
        result.total_records += 1;
        let parsed = record_result
            .context("Erreur de lecture")
            .and_then(|record| parse_record(&record));
        match parsed {
            Ok(draw) if seen.insert(draw.contest()) => result.draws.push(draw),
            Ok(draw) => {
                log::debug!("concours {} en double ignoré", draw.contest());
                result.skipped += 1;
            }
            Err(e) => {
                log::warn!("ligne {} ignorée : {:#}", result.total_records, e);
                result.errors += 1;
            }
        }
    }

    sort_newest_first(&mut result.draws);
    Ok(result)
}

/// Historique lu depuis un fichier CSV `;`.
pub struct CsvHistory {
    path: PathBuf,
}

impl CsvHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistorySource for CsvHistory {
    fn history(&self) -> Result<Vec<HistoricalDraw>> {
        Ok(load_csv(&self.path)?.draws)
    }
}
