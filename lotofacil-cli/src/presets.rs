use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

use lotofacil_core::{FilterConfig, FilterDimension, ValueRange};

/// `--enable sum`, `--enable sum=170-210` ou `--enable even=7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOverride {
    pub dimension: FilterDimension,
    pub range: Option<ValueRange>,
}

impl FromStr for FilterOverride {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (name, raw_range) = match s.split_once('=') {
            Some((name, range)) => (name, Some(range.trim())),
            None => (s, None),
        };
        let dimension: FilterDimension = name.parse()?;
        let range = raw_range.map(parse_range).transpose()?;
        Ok(Self { dimension, range })
    }
}

fn parse_range(raw: &str) -> Result<ValueRange> {
    let parse = |s: &str| -> Result<u32> {
        s.trim()
            .parse::<u32>()
            .with_context(|| format!("Borne invalide : '{}'", s))
    };
    match raw.split_once('-') {
        Some((start, end)) => Ok(ValueRange::new(parse(start)?, parse(end)?)),
        None => {
            let value = parse(raw)?;
            Ok(ValueRange::new(value, value))
        }
    }
}

pub fn load_preset(path: &Path) -> Result<Vec<FilterConfig>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {:?}", path))?;
    let filters: Vec<FilterConfig> = serde_json::from_str(&json)
        .with_context(|| format!("Préréglage invalide dans {:?}", path))?;
    Ok(filters)
}

pub fn save_preset(filters: &[FilterConfig], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(filters)?;
    std::fs::write(path, json).with_context(|| format!("Impossible d'écrire {:?}", path))?;
    Ok(())
}

/// Filtres de départ (préréglage, défauts ou tout désactivé) puis surcharges.
///
/// Le résultat contient toujours une configuration par dimension.
pub fn resolve_filters(
    preset: Option<&Path>,
    bare: bool,
    enable: &[FilterOverride],
    disable: &[FilterDimension],
) -> Result<Vec<FilterConfig>> {
    let base = match preset {
        Some(path) => load_preset(path)?,
        None if bare => Vec::new(),
        None => FilterConfig::defaults(),
    };

    let mut filters: Vec<FilterConfig> = FilterDimension::ALL
        .iter()
        .map(|&d| {
            base.iter()
                .find(|f| f.dimension() == d)
                .copied()
                .unwrap_or_else(|| FilterConfig::disabled(d))
        })
        .collect();

    for o in enable {
        let filter = find_mut(&mut filters, o.dimension)?;
        if let Some(range) = o.range {
            filter
                .set_range(range)
                .map_err(|e| anyhow!("--enable {} : {}", o.dimension.name(), e))?;
        }
        filter.set_enabled(true);
    }
    for &d in disable {
        find_mut(&mut filters, d)?.set_enabled(false);
    }

    Ok(filters)
}

fn find_mut(filters: &mut [FilterConfig], dimension: FilterDimension) -> Result<&mut FilterConfig> {
    filters
        .iter_mut()
        .find(|f| f.dimension() == dimension)
        .with_context(|| format!("Filtre absent : {}", dimension.name()))
}
