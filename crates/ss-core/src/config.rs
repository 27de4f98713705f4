use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Extensions audio acceptées par le tri (comparaison insensible à la casse).
pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "flac", "ogg", "aiff", "aif", "m4a"];

/// Paramètres de calcul du log-mel-spectrogramme.
///
/// Les valeurs par défaut sont celles avec lesquelles les poids fournis ont
/// été entraînés.
///
/// # Example
/// ```
/// use ss_core::config::FeatureConfig;
/// let config = FeatureConfig::default();
/// assert_eq!(config.max_frames, 640);
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct FeatureConfig {
    /// Fréquence d'échantillonnage cible (Hz).
    pub sample_rate: u32,
    /// Taille de la fenêtre FFT.
    pub n_fft: usize,
    /// Pas entre deux trames STFT.
    pub hop_length: usize,
    /// Nombre de bandes mel.
    pub n_mels: usize,
    /// Longueur fixe de l'axe temporel (troncature ou padding).
    pub max_frames: usize,
    /// Plancher dynamique sous le pic, en dB.
    pub top_db: f32,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 24_000,
            n_fft: 2048,
            hop_length: 512,
            n_mels: 128,
            max_frames: 640,
            top_db: 80.0,
        }
    }
}

impl FeatureConfig {
    /// Clamp all numeric fields to their valid ranges.
    pub fn clamp_all(&mut self) {
        self.sample_rate = self.sample_rate.clamp(8_000, 192_000);
        self.n_fft = self.n_fft.clamp(16, 16_384);
        self.hop_length = self.hop_length.clamp(1, self.n_fft);
        self.n_mels = self.n_mels.clamp(1, self.n_fft / 2 + 1);
        self.max_frames = self.max_frames.clamp(1, 100_000);
        self.top_db = self.top_db.clamp(0.0, 200.0);
    }
}

/// Configuration du tri de dossier.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct SortConfig {
    /// Paramètres du spectrogramme.
    pub features: FeatureConfig,
    /// Extensions retenues, en minuscules et sans le point.
    pub extensions: Vec<String>,
}

impl SortConfig {
    /// Configuration par défaut avec la liste d'extensions standard.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            features: FeatureConfig::default(),
            extensions: AUDIO_EXTENSIONS.iter().map(|e| (*e).to_string()).collect(),
        }
    }

    /// Normalise la liste d'extensions : minuscules, sans point, sans doublon.
    pub fn clamp_all(&mut self) {
        self.features.clamp_all();
        let mut exts: Vec<String> = self
            .extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        exts.sort();
        exts.dedup();
        if exts.is_empty() {
            log::warn!("Liste d'extensions vide, utilisation des défauts.");
            exts = AUDIO_EXTENSIONS.iter().map(|e| (*e).to_string()).collect();
        }
        self.extensions = exts;
    }
}

/// Une requête de recherche : clé (nom du dossier de sortie) + URL filtrée.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct QuerySpec {
    /// Clé courte, le dossier de sortie sera `<key>_samples`.
    pub key: String,
    /// URL de la page de résultats, sans le paramètre `page`.
    pub url: String,
}

/// Configuration du scraper de previews.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ScrapeConfig {
    /// Nombre maximal de pages par requête.
    pub max_pages: u32,
    /// Timeout par requête HTTP, en secondes.
    pub timeout_secs: u64,
    /// En-tête User-Agent envoyé au site.
    pub user_agent: String,
    /// Dossier racine sous lequel sont créés les `<key>_samples`.
    pub output_root: PathBuf,
    /// Requêtes traitées dans l'ordre.
    pub queries: Vec<QuerySpec>,
}

const FREESOUND_SYNTH: &str = "https://freesound.org/search/?q=&f=tag%253A%2522synthesizer%2522%2520samplerate%253A44100%2520channels%253A2&s=Date+added+%28newest+first%29&si_tags=0&si_name=0&si_description=0&si_packname=0&si_sound_id=0&si_username=0&d0=0&d1=30&ig=0&r=0&g=1&dp=0&cm=0&mm=0";
const FREESOUND_DRUM: &str = "https://freesound.org/search/?q=&f=channels%253A2%2520samplerate%253A44100%2520tag%253A%2522drum%2522&s=Date+added+%28newest+first%29&si_tags=0&si_name=0&si_description=0&si_packname=0&si_sound_id=0&si_username=0&d0=0&d1=30&ig=0&r=0&g=1&dp=0&cm=0&mm=0";
const FREESOUND_WATER: &str = "https://freesound.org/search/?q=&f=tag%253A%2522water%2522%2520channels%253A2%2520samplerate%253A44100&s=Date+added+%28newest+first%29&si_tags=0&si_name=0&si_description=0&si_packname=0&si_sound_id=0&si_username=0&d0=0&d1=30&ig=0&r=0&g=1&dp=0&cm=0&mm=0";
const FREESOUND_VOICE: &str = "https://freesound.org/search/?q=&f=tag%253A%2522vocal%2522%2520channels%253A2%2520samplerate%253A44100&s=Date+added+%28newest+first%29&si_tags=0&si_name=0&si_description=0&si_packname=0&si_sound_id=0&si_username=0&d0=0&d1=30&ig=0&r=0&g=1&dp=0&cm=0&mm=0";

impl Default for ScrapeConfig {
    fn default() -> Self {
        let query = |key: &str, url: &str| QuerySpec {
            key: key.to_string(),
            url: url.to_string(),
        };
        Self {
            max_pages: 17,
            timeout_secs: 10,
            user_agent: "Mozilla/5.0 (compatible; FreesoundScraper/1.0)".to_string(),
            output_root: PathBuf::from("."),
            queries: vec![
                query("synthesizer", FREESOUND_SYNTH),
                query("drum", FREESOUND_DRUM),
                query("water", FREESOUND_WATER),
                query("voice", FREESOUND_VOICE),
            ],
        }
    }
}

impl ScrapeConfig {
    /// Clamp all numeric fields to their valid ranges.
    pub fn clamp_all(&mut self) {
        self.max_pages = self.max_pages.clamp(1, 1000);
        self.timeout_secs = self.timeout_secs.clamp(1, 300);
        self.queries
            .retain(|q| !q.key.trim().is_empty() && !q.url.trim().is_empty());
    }
}

/// Structure TOML intermédiaire pour le tri.
#[derive(Deserialize)]
struct SortConfigFile {
    features: Option<FeatureSection>,
    sorter: Option<SorterSection>,
}

/// Features section, all fields optional for partial override.
#[derive(Deserialize)]
struct FeatureSection {
    sample_rate: Option<u32>,
    n_fft: Option<usize>,
    hop_length: Option<usize>,
    n_mels: Option<usize>,
    max_frames: Option<usize>,
    top_db: Option<f32>,
}

#[derive(Deserialize)]
struct SorterSection {
    extensions: Option<Vec<String>>,
}

/// Structure TOML intermédiaire pour le scraper.
#[derive(Deserialize)]
struct ScrapeConfigFile {
    scrape: ScrapeSection,
}

#[derive(Deserialize)]
struct ScrapeSection {
    max_pages: Option<u32>,
    timeout_secs: Option<u64>,
    user_agent: Option<String>,
    output_root: Option<PathBuf>,
    queries: Option<Vec<QuerySpec>>,
}

/// Charge un fichier TOML de tri et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use ss_core::config::load_sort_config;
/// use std::path::Path;
/// let config = load_sort_config(Path::new("samplesort.toml")).unwrap();
/// ```
pub fn load_sort_config(path: &Path) -> Result<SortConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    parse_sort_config(&content)
        .with_context(|| format!("Erreur de parsing TOML dans {}", path.display()))
}

fn parse_sort_config(content: &str) -> Result<SortConfig> {
    let file: SortConfigFile = toml::from_str(content)?;
    let mut config = SortConfig::standard();

    if let Some(f) = file.features {
        let c = &mut config.features;
        if let Some(v) = f.sample_rate {
            c.sample_rate = v;
        }
        if let Some(v) = f.n_fft {
            c.n_fft = v;
        }
        if let Some(v) = f.hop_length {
            c.hop_length = v;
        }
        if let Some(v) = f.n_mels {
            c.n_mels = v;
        }
        if let Some(v) = f.max_frames {
            c.max_frames = v;
        }
        if let Some(v) = f.top_db {
            c.top_db = v;
        }
    }
    if let Some(v) = file.sorter.and_then(|s| s.extensions) {
        config.extensions = v;
    }

    config.clamp_all();
    Ok(config)
}

/// Charge un fichier TOML de scraping et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn load_scrape_config(path: &Path) -> Result<ScrapeConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    parse_scrape_config(&content)
        .with_context(|| format!("Erreur de parsing TOML dans {}", path.display()))
}

fn parse_scrape_config(content: &str) -> Result<ScrapeConfig> {
    let file: ScrapeConfigFile = toml::from_str(content)?;
    let mut config = ScrapeConfig::default();

    let s = file.scrape;
    if let Some(v) = s.max_pages {
        config.max_pages = v;
    }
    if let Some(v) = s.timeout_secs {
        config.timeout_secs = v;
    }
    if let Some(v) = s.user_agent {
        config.user_agent = v;
    }
    if let Some(v) = s.output_root {
        config.output_root = v;
    }
    if let Some(v) = s.queries {
        config.queries = v;
    }

    config.clamp_all();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_features_override_keeps_defaults() {
        let config = parse_sort_config("[features]\nn_mels = 64\n").unwrap();
        assert_eq!(config.features.n_mels, 64);
        assert_eq!(config.features.n_fft, 2048);
        assert_eq!(config.extensions.len(), AUDIO_EXTENSIONS.len());
    }

    #[test]
    fn extensions_are_normalized() {
        let config = parse_sort_config("[sorter]\nextensions = [\".WAV\", \"wav\", \" Flac \"]\n")
            .unwrap();
        assert_eq!(config.extensions, vec!["flac".to_string(), "wav".to_string()]);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let config = parse_sort_config("[features]\nhop_length = 0\nn_fft = 4\n").unwrap();
        assert_eq!(config.features.n_fft, 16);
        assert_eq!(config.features.hop_length, 1);
    }

    #[test]
    fn scrape_defaults_match_hardcoded_queries() {
        let config = ScrapeConfig::default();
        let keys: Vec<&str> = config.queries.iter().map(|q| q.key.as_str()).collect();
        assert_eq!(keys, ["synthesizer", "drum", "water", "voice"]);
        assert_eq!(config.max_pages, 17);
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn scrape_queries_override() {
        let toml = r#"
[scrape]
max_pages = 2

[[scrape.queries]]
key = "bell"
url = "https://example.org/search/?q=bell"
"#;
        let config = parse_scrape_config(toml).unwrap();
        assert_eq!(config.max_pages, 2);
        assert_eq!(config.queries.len(), 1);
        assert_eq!(config.queries[0].key, "bell");
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_sort_config(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }
}
