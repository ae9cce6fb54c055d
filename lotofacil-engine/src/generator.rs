use std::thread::{self, JoinHandle};

use crossbeam_channel::{self as channel, Receiver};
use indexmap::IndexSet;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};

use lotofacil_core::{Combination, FilterConfig, FilterDimension, PICK_COUNT, UNIVERSE};

use crate::cancellation::CancellationToken;
use crate::features::statistic;

/// Tentatives de la phase heuristique par combinaison demandée.
pub const HEURISTIC_ATTEMPTS_PER_TARGET: usize = 50;
/// Plafond de la phase aléatoire.
pub const MAX_RANDOM_ATTEMPTS: usize = 250_000;
const RANDOM_PROGRESS_STRIDE: usize = 5;
/// Nombre de combinaisons distinctes : C(25, 15).
pub const TOTAL_COMBINATIONS: usize = 3_268_760;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Started { total: usize },
    PhaseMessage { text: String },
    Attempt { attempt_number: usize, found_so_far: usize },
    Finished { combinations: Vec<Combination> },
    Failed { reason: String, attempts_made: usize, found_count: usize },
}

impl ProgressEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProgressEvent::Finished { .. } | ProgressEvent::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Success(Vec<Combination>),
    Failure {
        reason: String,
        attempts_made: usize,
        found_count: usize,
    },
}

impl GenerationOutcome {
    /// Convertit l'événement terminal d'un flux ; `None` pour les autres.
    pub fn from_event(event: &ProgressEvent) -> Option<Self> {
        match event {
            ProgressEvent::Finished { combinations } => Some(GenerationOutcome::Success(combinations.clone())),
            ProgressEvent::Failed { reason, attempts_made, found_count } => Some(GenerationOutcome::Failure {
                reason: reason.clone(),
                attempts_made: *attempts_made,
                found_count: *found_count,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub filters: Vec<FilterConfig>,
    pub target_count: usize,
    pub previous_draw: Option<Combination>,
    /// Seed pour la reproductibilité ; aléa système sinon.
    pub seed: Option<u64>,
}

impl GenerationRequest {
    pub fn new(filters: Vec<FilterConfig>, target_count: usize) -> Self {
        Self {
            filters,
            target_count,
            previous_draw: None,
            seed: None,
        }
    }

    pub fn with_previous_draw(mut self, previous: Option<Combination>) -> Self {
        self.previous_draw = previous;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

pub struct Generator {
    filters: Vec<FilterConfig>,
    target_count: usize,
    previous_draw: Option<Combination>,
    seed: Option<u64>,
}

impl Generator {
    pub fn new(request: GenerationRequest) -> Self {
        Self {
            filters: request.filters.into_iter().filter(|f| f.is_enabled()).collect(),
            target_count: request.target_count,
            previous_draw: request.previous_draw,
            seed: request.seed,
        }
    }

    fn repeats_filter(&self) -> Option<&FilterConfig> {
        self.filters.iter().find(|f| f.dimension() == FilterDimension::Repeats)
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_rng(&mut rand::rng()),
        }
    }

    /// Vrai si tous les filtres actifs acceptent la combinaison.
    pub fn is_valid(&self, combination: &Combination) -> bool {
        self.filters.iter().all(|f| {
            statistic(f.dimension(), combination, self.previous_draw.as_ref())
                .is_some_and(|value| f.accepts(value))
        })
    }

    /// Exécute la recherche et pousse chaque événement dans `emit`.
    ///
    /// Après annulation, plus aucun événement n'est émis.
    pub fn run<F>(&self, token: &CancellationToken, mut emit: F)
    where
        F: FnMut(ProgressEvent),
    {
        if self.repeats_filter().is_some() && self.previous_draw.is_none() {
            emit(ProgressEvent::Failed {
                reason: "Le filtre des numéros répétés nécessite le tirage précédent".to_string(),
                attempts_made: 0,
                found_count: 0,
            });
            return;
        }
        if token.is_cancelled() {
            return;
        }

        emit(ProgressEvent::Started { total: self.target_count });

        if self.target_count > TOTAL_COMBINATIONS {
            emit(ProgressEvent::Failed {
                reason: format!(
                    "{} combinaisons demandées, il n'en existe que {}",
                    self.target_count, TOTAL_COMBINATIONS
                ),
                attempts_made: 0,
                found_count: 0,
            });
            return;
        }

        let mut rng = self.rng();
        let mut accepted: IndexSet<Combination> =
            IndexSet::with_capacity(self.target_count.min(MAX_RANDOM_ATTEMPTS));
        let mut attempts = 0usize;

        if let (Some(repeats), Some(previous)) = (self.repeats_filter(), self.previous_draw) {
            if accepted.len() < self.target_count {
                emit(ProgressEvent::PhaseMessage {
                    text: format!("Phase heuristique : {} répétés du tirage précédent", repeats.range()),
                });
                let completed = self.heuristic_phase(repeats, &previous, token, &mut rng, &mut accepted, &mut attempts, &mut emit);
                if !completed {
                    return;
                }
                log::debug!("phase heuristique : {} / {} en {} tentatives", accepted.len(), self.target_count, attempts);
            }
        }

        if accepted.len() < self.target_count {
            emit(ProgressEvent::PhaseMessage {
                text: "Phase aléatoire".to_string(),
            });
            let completed = self.random_phase(token, &mut rng, &mut accepted, &mut attempts, &mut emit);
            if !completed {
                return;
            }
        }

        if token.is_cancelled() {
            return;
        }

        if accepted.len() < self.target_count {
            log::info!("génération incomplète : {} / {} après {} tentatives", accepted.len(), self.target_count, attempts);
            emit(ProgressEvent::Failed {
                reason: format!(
                    "Seulement {} combinaisons valides sur {} après {} tentatives ; élargissez les filtres",
                    accepted.len(),
                    self.target_count,
                    attempts
                ),
                attempts_made: attempts,
                found_count: accepted.len(),
            });
        } else {
            log::info!("{} combinaisons générées en {} tentatives", accepted.len(), attempts);
            emit(ProgressEvent::Finished {
                combinations: accepted.into_iter().collect(),
            });
        }
    }

    /// Retourne `false` si la recherche a été annulée.
    #[allow(clippy::too_many_arguments)]
    fn heuristic_phase<F>(
        &self,
        repeats: &FilterConfig,
        previous: &Combination,
        token: &CancellationToken,
        rng: &mut StdRng,
        accepted: &mut IndexSet<Combination>,
        attempts: &mut usize,
        emit: &mut F,
    ) -> bool
    where
        F: FnMut(ProgressEvent),
    {
        let inside = previous.numbers();
        let outside: Vec<u8> = (1..=UNIVERSE).filter(|&n| !previous.contains(n)).collect();
        let range = repeats.range();
        let budget = HEURISTIC_ATTEMPTS_PER_TARGET.saturating_mul(self.target_count);

        for attempt in 1..=budget {
            if token.is_cancelled() {
                return false;
            }
            if accepted.len() >= self.target_count {
                break;
            }
            *attempts += 1;

            let k = rng.random_range(range.start..=range.end) as usize;
            let fill = PICK_COUNT.saturating_sub(k);
            if k > inside.len() || fill > outside.len() {
                continue;
            }

            let mask = inside
                .choose_multiple(rng, k)
                .chain(outside.choose_multiple(rng, fill))
                .fold(0u32, |m, &n| m | 1 << (n - 1));
            let Ok(candidate) = Combination::from_mask(mask) else {
                continue;
            };

            if self.is_valid(&candidate) && accepted.insert(candidate) {
                emit(ProgressEvent::Attempt {
                    attempt_number: attempt,
                    found_so_far: accepted.len(),
                });
            }
        }
        true
    }

    /// Retourne `false` si la recherche a été annulée.
    fn random_phase<F>(
        &self,
        token: &CancellationToken,
        rng: &mut StdRng,
        accepted: &mut IndexSet<Combination>,
        attempts: &mut usize,
        emit: &mut F,
    ) -> bool
    where
        F: FnMut(ProgressEvent),
    {
        let mut pool: Vec<u8> = (1..=UNIVERSE).collect();

        for attempt in 1..=MAX_RANDOM_ATTEMPTS {
            if token.is_cancelled() {
                return false;
            }
            if accepted.len() >= self.target_count {
                break;
            }
            *attempts += 1;

            pool.shuffle(rng);
            let mask = pool[..PICK_COUNT].iter().fold(0u32, |m, &n| m | 1 << (n - 1));
            let Ok(candidate) = Combination::from_mask(mask) else {
                continue;
            };

            if self.is_valid(&candidate) && accepted.insert(candidate) {
                let found = accepted.len();
                if found % RANDOM_PROGRESS_STRIDE == 0 || found == self.target_count {
                    emit(ProgressEvent::Attempt {
                        attempt_number: attempt,
                        found_so_far: found,
                    });
                }
            }
        }
        true
    }
}

/// Génération lancée sur un thread dédié ; les événements arrivent par canal.
pub struct GenerationHandle {
    events: Receiver<ProgressEvent>,
    token: CancellationToken,
    worker: Option<JoinHandle<()>>,
}

impl GenerationHandle {
    pub fn events(&self) -> &Receiver<ProgressEvent> {
        &self.events
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Consomme le flux jusqu'à sa fin.
    ///
    /// `None` si la génération a été annulée, ou si les événements ont déjà
    /// été lus via [`events`](Self::events) : le terminal n'est reçu qu'une fois.
    pub fn wait_with<F>(mut self, mut on_event: F) -> Option<GenerationOutcome>
    where
        F: FnMut(&ProgressEvent),
    {
        let mut outcome = None;
        for event in self.events.iter() {
            on_event(&event);
            if let Some(o) = GenerationOutcome::from_event(&event) {
                outcome = Some(o);
            }
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("le thread de génération s'est interrompu");
            }
        }
        outcome
    }

    pub fn wait(self) -> Option<GenerationOutcome> {
        self.wait_with(|_| {})
    }
}

impl Drop for GenerationHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

pub fn spawn_generation(request: GenerationRequest) -> GenerationHandle {
    let (tx, rx) = channel::unbounded();
    let token = CancellationToken::new();
    let worker_token = token.clone();
    let generator = Generator::new(request);

    let worker = thread::spawn(move || {
        generator.run(&worker_token, |event| {
            if tx.send(event).is_err() {
                worker_token.cancel();
            }
        });
    });

    GenerationHandle {
        events: rx,
        token,
        worker: Some(worker),
    }
}
