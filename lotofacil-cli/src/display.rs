use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use lotofacil_core::{
    Combination, DistributionReport, FilterConfig, FilterDimension, HistoricalDraw, RankedNumber,
    RestrictivenessBand, ScoringResult,
};
use lotofacil_engine::expected_attempts;

use crate::history::LoadResult;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn display_load_summary(path: &std::path::Path, result: &LoadResult) {
    println!("Historique {} :", path.display());
    println!("  Lignes lues       : {}", result.total_records);
    println!("  Tirages valides   : {}", result.draws.len());
    if result.skipped > 0 {
        println!("  Doublons ignorés  : {}", result.skipped);
    }
    if result.errors > 0 {
        println!("  Erreurs           : {}", result.errors);
    }
}

pub fn display_draws(draws: &[HistoricalDraw]) {
    if draws.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    let mut table = new_table(vec!["Concours", "Date", "Numéros", "Somme"]);
    for draw in draws {
        table.add_row(vec![
            draw.contest().to_string(),
            draw.date().unwrap_or("-").to_string(),
            draw.numbers().to_string(),
            draw.numbers().sum().to_string(),
        ]);
    }
    println!("{table}");
}

fn band_color(band: RestrictivenessBand) -> Color {
    match band {
        RestrictivenessBand::Disabled => Color::DarkGrey,
        RestrictivenessBand::VeryLoose | RestrictivenessBand::Loose => Color::Green,
        RestrictivenessBand::Moderate => Color::Yellow,
        RestrictivenessBand::Tight | RestrictivenessBand::VeryTight => Color::Red,
    }
}

pub fn display_filters(filters: &[FilterConfig], probability: f64) {
    println!("\n🎛  Filtres\n");

    let mut table = new_table(vec!["Filtre", "Actif", "Intervalle", "Plage", "Taux hist.", "Couverture", "Niveau"]);
    for f in filters {
        let d = f.dimension();
        let band = f.restrictiveness_band();
        table.add_row(vec![
            Cell::new(d.label()),
            Cell::new(if f.is_enabled() { "oui" } else { "non" }),
            Cell::new(f.range().to_string()),
            Cell::new(d.full_range().to_string()),
            Cell::new(format!("{:.0} %", d.historical_success_rate() * 100.0)),
            Cell::new(format!("{:.0} %", f.coverage_percentage() * 100.0)),
            Cell::new(band.to_string()).fg(band_color(band)),
        ]);
    }
    println!("{table}");
    display_estimate(probability);
}

pub fn display_estimate(probability: f64) {
    println!("\nProbabilité de succès estimée : {:.2} %", probability * 100.0);
    match expected_attempts(probability) {
        Some(n) => println!("Tentatives moyennes par grille : ~{}", n),
        None => println!("Aucune grille ne devrait satisfaire ces filtres."),
    }
}

pub fn display_combinations(combinations: &[Combination], previous: Option<&Combination>) {
    println!("\n🎲 Grilles générées\n");

    let mut header = vec!["#", "Numéros", "Somme", "Pairs", "Premiers"];
    if previous.is_some() {
        header.push("Répétés");
    }
    let mut table = new_table(header);

    for (i, c) in combinations.iter().enumerate() {
        let stat = |d| {
            lotofacil_engine::features::statistic(d, c, previous)
                .map(|v| v.to_string())
                .unwrap_or_default()
        };
        let mut row = vec![
            format!("{}", i + 1),
            c.to_string(),
            stat(FilterDimension::Sum),
            stat(FilterDimension::Even),
            stat(FilterDimension::Prime),
        ];
        if previous.is_some() {
            row.push(stat(FilterDimension::Repeats));
        }
        table.add_row(row);
    }
    println!("{table}");
}

fn ranked_line(ranked: &[RankedNumber]) -> String {
    ranked
        .iter()
        .map(|r| format!("{:02} ({})", r.number, r.value))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn display_report(report: &DistributionReport) {
    println!("\n📊 Analyse de {} tirages\n", report.draws_analyzed);
    if report.draws_analyzed == 0 {
        println!("Aucun tirage à analyser.");
        return;
    }

    println!("Plus fréquents : {}", ranked_line(&report.most_frequent));
    println!("Plus en retard : {}", ranked_line(&report.most_overdue));
    println!("Somme moyenne  : {:.1}", report.mean_sum);

    for (dimension, histogram) in &report.distributions {
        println!("\n── {} ──", dimension.label());
        let mut table = new_table(vec!["Valeur", "Tirages", "Part"]);
        let total = report.draws_analyzed as f64;
        for (bucket, count) in histogram {
            let label = match dimension {
                FilterDimension::Sum => format!("{}-{}", bucket, bucket + 9),
                _ => bucket.to_string(),
            };
            table.add_row(vec![
                label,
                count.to_string(),
                format!("{:.1} %", *count as f64 / total * 100.0),
            ]);
        }
        println!("{table}");
    }
}

pub fn display_scoring(combination: &Combination, result: &ScoringResult, draws_checked: usize) {
    println!("\n🔎 Grille {}\n", combination);

    let mut table = new_table(vec!["Points", "Concours"]);
    for hits in (11..=15u8).rev() {
        let count = result.hit_counts.get(&hits).copied().unwrap_or(0);
        table.add_row(vec![hits.to_string(), count.to_string()]);
    }
    println!("{table}");

    println!(
        "Gains : {} sur {} concours ({:.2} %)",
        result.total_hits(),
        draws_checked,
        result.hit_rate(draws_checked) * 100.0
    );
    match (result.last_hit_contest, result.last_hit_score) {
        (Some(contest), Some(score)) => println!("Dernier gain : concours {} ({} points)", contest, score),
        _ => println!("Aucun gain dans l'historique."),
    }
    println!("Dernier concours vérifié : {}", result.last_checked_contest);

    let recent = result
        .recent_hits
        .iter()
        .map(|h| format!("{}:{}", h.contest, h.hits))
        .collect::<Vec<_>>()
        .join("  ");
    println!("Derniers concours : {}", recent);
}
