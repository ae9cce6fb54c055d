use thiserror::Error;

use crate::filters::FilterDimension;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombinationError {
    #[error("Une combinaison contient exactement 15 numéros (reçu : {0})")]
    WrongSize(usize),
    #[error("Numéro {0} hors limites (1-25)")]
    OutOfRange(u8),
    #[error("Numéro en double : {0}")]
    Duplicate(u8),
    #[error("Masque invalide : {0:#x}")]
    InvalidMask(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrawError {
    #[error("Le numéro de concours doit être strictement positif")]
    ZeroContest,
    #[error(transparent)]
    Combination(#[from] CombinationError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("Intervalle inversé : {start} > {end}")]
    InvertedRange { start: u32, end: u32 },
    #[error("Intervalle {start}-{end} hors de la plage de {dimension} ({full_start}-{full_end})")]
    OutOfBounds {
        dimension: FilterDimension,
        start: u32,
        end: u32,
        full_start: u32,
        full_end: u32,
    },
    #[error("Filtre inconnu : '{0}'")]
    UnknownDimension(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    #[error("Historique vide : aucun tirage à comparer")]
    EmptyHistory,
}
