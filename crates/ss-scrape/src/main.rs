use std::path::Path;

use anyhow::{Context, Result};
use ss_core::config::ScrapeConfig;
use ss_scrape::{HttpTransport, scrape_all};

const CONFIG_FILE: &str = "scrape.toml";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = resolve_config(Path::new(CONFIG_FILE))?;
    let transport = HttpTransport::new(&config)?;
    let report = scrape_all(&transport, &config).context("Création des dossiers de sortie")?;

    for q in &report.queries {
        println!(
            "{:<15}: {} enregistré(s), {} échec(s), {} sans preview, {} page(s) ({})",
            q.key, q.saved, q.failed, q.without_preview, q.pages, q.stop
        );
    }
    println!(
        "Terminé : {} fichier(s), {} échec(s).",
        report.total_saved(),
        report.total_failed()
    );
    Ok(())
}

fn resolve_config(path: &Path) -> Result<ScrapeConfig> {
    if path.exists() {
        ss_core::config::load_scrape_config(path)
    } else {
        log::debug!("{} absent, utilisation des défauts.", path.display());
        Ok(ScrapeConfig::default())
    }
}
