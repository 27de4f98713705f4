use std::path::PathBuf;

use clap::Parser;

/// samplesort — range les échantillons audio par classe (drum, synth, voice, water).
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Dossier à trier (parcouru récursivement).
    pub folder: PathBuf,

    /// Poids du modèle : PyTorch `.pth` ou `.safetensors`.
    #[arg(long, default_value = "audio_classifier_cnn.pth")]
    pub weights: PathBuf,

    /// Utiliser CUDA si disponible. Requiert --features cuda.
    #[arg(long, default_value_t = false)]
    pub cuda: bool,

    /// Copier au lieu de déplacer.
    #[arg(long, default_value_t = false)]
    pub copy: bool,

    /// Fichier de configuration TOML (paramètres mel, extensions).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["samplesort", "samples"]).unwrap();
        assert_eq!(cli.folder, PathBuf::from("samples"));
        assert_eq!(cli.weights, PathBuf::from("audio_classifier_cnn.pth"));
        assert!(!cli.cuda);
        assert!(!cli.copy);
        assert!(cli.config.is_none());
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn all_flags() {
        let cli = Cli::try_parse_from([
            "samplesort",
            "in",
            "--weights",
            "m.safetensors",
            "--cuda",
            "--copy",
            "-c",
            "sort.toml",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.weights, PathBuf::from("m.safetensors"));
        assert!(cli.cuda && cli.copy);
        assert_eq!(cli.config, Some(PathBuf::from("sort.toml")));
        assert_eq!(cli.log_level, "debug");
    }

    #[test]
    fn folder_is_required() {
        assert!(Cli::try_parse_from(["samplesort"]).is_err());
    }
}
