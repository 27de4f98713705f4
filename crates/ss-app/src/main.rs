use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use ss_audio::FeatureExtractor;
use ss_core::config::SortConfig;
use ss_model::{SampleClassifier, select_device};
use ss_sort::{FolderSorter, Progress, SortReport, TransferMode};

pub mod cli;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Configuration
    let config = resolve_config(cli.config.as_deref())?;

    // 4. Modèle : chargé une seule fois, avant de toucher aux fichiers
    let device = select_device(cli.cuda);
    let classifier = SampleClassifier::load(&cli.weights, &device)
        .with_context(|| format!("Chargement des poids {}", cli.weights.display()))?;
    log::info!("Modèle chargé depuis {}", cli.weights.display());

    // 5. Tri
    let mode = if cli.copy {
        TransferMode::Copy
    } else {
        TransferMode::Move
    };
    let mut sorter = FolderSorter::new(
        &cli.folder,
        &classifier,
        FeatureExtractor::new(config.features),
        mode,
        config.extensions,
    );
    let report = sorter
        .run(print_progress)
        .with_context(|| format!("Tri de {}", cli.folder.display()))?;

    print!("{}", summary(&report));
    Ok(())
}

/// `--config` absent → défauts ; chemin donné mais introuvable → warning + défauts.
fn resolve_config(path: Option<&Path>) -> Result<SortConfig> {
    match path {
        None => Ok(SortConfig::standard()),
        Some(path) if path.exists() => ss_core::config::load_sort_config(path),
        Some(path) => {
            log::warn!(
                "Config introuvable : {}. Utilisation des défauts.",
                path.display()
            );
            Ok(SortConfig::standard())
        }
    }
}

fn print_progress(progress: Progress<'_>) {
    match progress {
        Progress::Sorted {
            index,
            total,
            relative,
            label,
        } => println!("[{index}/{total}] {} → {}", relative.display(), label.dir_name()),
        Progress::Skipped {
            index,
            total,
            relative,
            error,
        } => println!("[{index}/{total}] {} ignoré ({error})", relative.display()),
    }
}

fn summary(report: &SortReport) -> String {
    let mut out = String::from("\nTotal :\n");
    for (label, n) in report.counts() {
        out.push_str(&format!("{:<15}: {n}\n", label.dir_name()));
    }
    out.push_str(&format!("{:<15}: {}\n", "ignorés", report.skipped.len()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = resolve_config(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(cfg.extensions, SortConfig::standard().extensions);
        assert!(resolve_config(None).is_ok());
    }

    #[test]
    fn config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sort.toml");
        std::fs::write(&path, "[sorter]\nextensions = [\"wav\"]\n").unwrap();
        let cfg = resolve_config(Some(&path)).unwrap();
        assert_eq!(cfg.extensions, vec!["wav".to_string()]);
    }

    #[test]
    fn summary_lists_every_class_then_skipped() {
        let text = summary(&SortReport::default());
        let lines: Vec<&str> = text.lines().filter(|l| l.contains(':')).collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[1], "drum_samples   : 0");
        assert_eq!(lines[5], "ignorés        : 0");
    }
}
