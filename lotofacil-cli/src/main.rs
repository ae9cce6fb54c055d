mod display;
mod history;
mod presets;

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use lotofacil_core::{Combination, FilterConfig, FilterDimension};
use lotofacil_engine::{
    analyze_history, estimate_success_probability, score_combination, spawn_generation,
    GenerationOutcome, GenerationRequest, HistorySource, ProgressEvent,
};

use crate::history::{load_csv, CsvHistory};
use crate::presets::{resolve_filters, save_preset, FilterOverride};

const DEFAULT_HISTORY: &str = "assets/lotofacil_sample.csv";

#[derive(Parser)]
#[command(name = "lotofacil", about = "Générateur de grilles Lotofácil sous contraintes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct FilterArgs {
    /// Préréglage de filtres (JSON)
    #[arg(short, long)]
    filters: Option<PathBuf>,

    /// Partir de filtres tous désactivés au lieu des valeurs par défaut
    #[arg(long)]
    bare: bool,

    /// Activer un filtre, éventuellement sur un intervalle (ex: sum=170-210)
    #[arg(long, value_name = "FILTRE[=MIN-MAX]")]
    enable: Vec<FilterOverride>,

    /// Désactiver un filtre
    #[arg(long, value_name = "FILTRE")]
    disable: Vec<FilterDimension>,
}

impl FilterArgs {
    fn resolve(&self) -> Result<Vec<FilterConfig>> {
        resolve_filters(self.filters.as_deref(), self.bare, &self.enable, &self.disable)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Afficher les filtres, leur niveau de restriction et l'estimation
    Filters {
        #[command(flatten)]
        filters: FilterArgs,

        /// Sauvegarder la configuration résultante dans un préréglage
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Estimer la probabilité qu'une grille aléatoire passe les filtres
    Estimate {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Générer des grilles respectant les filtres
    Generate {
        /// Nombre de grilles
        #[arg(short, long, default_value = "5")]
        count: usize,

        #[command(flatten)]
        filters: FilterArgs,

        /// Historique CSV (fournit le tirage précédent)
        #[arg(long)]
        history: Option<PathBuf>,

        /// Seed pour la reproductibilité
        #[arg(long)]
        seed: Option<u64>,

        /// Annuler la recherche après ce délai
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Sortie JSON
        #[arg(long)]
        json: bool,
    },

    /// Analyser les distributions de l'historique
    Analyze {
        #[arg(long, default_value = DEFAULT_HISTORY)]
        history: PathBuf,

        /// Fenêtre d'analyse (nombre de tirages les plus récents)
        #[arg(short, long)]
        window: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// Comparer une grille à l'historique
    Score {
        #[arg(long, default_value = DEFAULT_HISTORY)]
        history: PathBuf,

        /// 15 numéros (1-25)
        numbers: Vec<u8>,

        #[arg(long)]
        json: bool,
    },

    /// Lister les derniers tirages
    History {
        #[arg(long, default_value = DEFAULT_HISTORY)]
        history: PathBuf,

        /// Nombre de tirages à afficher
        #[arg(short, long, default_value = "10")]
        last: usize,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Filters { filters, save } => cmd_filters(&filters, save.as_deref()),
        Command::Estimate { filters } => cmd_estimate(&filters),
        Command::Generate {
            count,
            filters,
            history,
            seed,
            timeout_secs,
            json,
        } => cmd_generate(count, &filters, history.as_deref(), seed, timeout_secs, json),
        Command::Analyze { history, window, json } => cmd_analyze(&history, window, json),
        Command::Score { history, numbers, json } => cmd_score(&history, &numbers, json),
        Command::History { history, last } => cmd_history(&history, last),
    }
}

fn cmd_filters(args: &FilterArgs, save: Option<&Path>) -> Result<()> {
    let filters = args.resolve()?;
    display::display_filters(&filters, estimate_success_probability(&filters));
    if let Some(path) = save {
        save_preset(&filters, path)?;
        println!("\nPréréglage sauvegardé dans : {}", path.display());
    }
    Ok(())
}

fn cmd_estimate(args: &FilterArgs) -> Result<()> {
    let filters = args.resolve()?;
    display::display_estimate(estimate_success_probability(&filters));
    Ok(())
}

fn cmd_generate(
    count: usize,
    args: &FilterArgs,
    history: Option<&Path>,
    seed: Option<u64>,
    timeout_secs: Option<u64>,
    json: bool,
) -> Result<()> {
    let mut filters = args.resolve()?;

    let previous = match history {
        Some(path) => {
            let source = CsvHistory::new(path);
            let previous = source.previous_draw()?;
            match &previous {
                Some(c) => log::info!("tirage précédent ({}) : {}", source.path().display(), c),
                None => log::warn!("historique vide : {}", source.path().display()),
            }
            previous
        }
        None => None,
    };
    // Sans historique, le filtre des répétés par défaut est retiré ; demandé explicitement, il échouera.
    let explicit_repeats = args.enable.iter().any(|o| o.dimension == FilterDimension::Repeats);
    if previous.is_none() && args.filters.is_none() && !explicit_repeats {
        for f in filters.iter_mut().filter(|f| f.dimension() == FilterDimension::Repeats) {
            if f.is_enabled() {
                log::warn!("pas d'historique : filtre des répétés désactivé");
                f.set_enabled(false);
            }
        }
    }

    let probability = estimate_success_probability(&filters);
    log::info!("probabilité estimée {:.4}, {} grilles demandées", probability, count);

    let request = GenerationRequest::new(filters, count)
        .with_previous_draw(previous)
        .with_seed(seed);
    let handle = spawn_generation(request);

    if let Some(secs) = timeout_secs {
        let token = handle.token();
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(secs));
            token.cancel();
        });
    }

    let pb = if json { ProgressBar::hidden() } else { ProgressBar::new(count as u64) };
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let outcome = handle.wait_with(|event| match event {
        ProgressEvent::Started { total } => pb.set_length(*total as u64),
        ProgressEvent::PhaseMessage { text } => pb.set_message(text.clone()),
        ProgressEvent::Attempt { attempt_number, found_so_far } => {
            pb.set_position(*found_so_far as u64);
            pb.set_message(format!("tentative {}", attempt_number));
        }
        ProgressEvent::Finished { .. } => pb.finish_with_message("terminé"),
        ProgressEvent::Failed { .. } => pb.abandon(),
    });

    match outcome {
        Some(GenerationOutcome::Success(combinations)) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&combinations)?);
            } else {
                display::display_combinations(&combinations, previous.as_ref());
            }
            Ok(())
        }
        Some(GenerationOutcome::Failure { reason, attempts_made, found_count }) => {
            bail!("{} ({} tentatives, {} grilles trouvées)", reason, attempts_made, found_count)
        }
        None => {
            pb.abandon_with_message("annulé");
            bail!("Génération annulée")
        }
    }
}

fn load_history(path: &Path) -> Result<Vec<lotofacil_core::HistoricalDraw>> {
    let result = load_csv(path)?;
    if result.errors > 0 || result.skipped > 0 {
        display::display_load_summary(path, &result);
    }
    Ok(result.draws)
}

fn cmd_analyze(path: &Path, window: Option<usize>, json: bool) -> Result<()> {
    let mut draws = load_history(path)?;
    if let Some(w) = window {
        draws.truncate(w);
    }
    let report = analyze_history(&draws);
    if json {
        println!("{}", serde_json::to_string_pretty(report.as_ref())?);
    } else {
        display::display_report(&report);
    }
    Ok(())
}

fn cmd_score(path: &Path, numbers: &[u8], json: bool) -> Result<()> {
    let combination = Combination::new(numbers).context("Grille invalide")?;
    let draws = load_history(path)?;
    let result = score_combination(&combination, &draws)
        .with_context(|| format!("Impossible d'évaluer la grille avec {}", path.display()))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        display::display_scoring(&combination, &result, draws.len());
    }
    Ok(())
}

fn cmd_history(path: &Path, last: usize) -> Result<()> {
    let draws = load_history(path)?;
    if draws.is_empty() {
        println!("Historique vide : {}", path.display());
        return Ok(());
    }
    display::display_draws(&draws[..last.min(draws.len())]);
    Ok(())
}
