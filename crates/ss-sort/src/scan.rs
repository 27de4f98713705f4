use std::path::{Path, PathBuf};

use ss_core::ClassLabel;
use walkdir::{DirEntry, WalkDir};

/// Whether `path` has one of `extensions` (lowercase, no dot).
#[must_use]
pub fn has_audio_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_lowercase();
            extensions.iter().any(|e| *e == ext)
        })
}

/// A class directory directly under the scan root.
fn is_class_dir(entry: &DirEntry) -> bool {
    entry.depth() == 1
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| ClassLabel::from_dir_name(name).is_some())
}

/// Liste récursivement les fichiers audio sous `root`, triés par ordre
/// lexical du chemin complet (chaîne, pas composant par composant).
///
/// Les sous-dossiers de classe (`root/drum_samples`, ...) sont exclus du
/// parcours, ce qui rend un second passage sans effet.
#[must_use]
pub fn scan_audio_files(root: &Path, extensions: &[String]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| !is_class_dir(e))
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                log::warn!("Parcours impossible : {err}");
                None
            }
        })
        .map(DirEntry::into_path)
        .filter(|p| p.is_file() && has_audio_extension(p, extensions))
        .collect();
    files.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn exts() -> Vec<String> {
        ss_core::config::AUDIO_EXTENSIONS
            .iter()
            .map(|e| (*e).to_string())
            .collect()
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let exts = exts();
        assert!(has_audio_extension(Path::new("a/KICK.WAV"), &exts));
        assert!(has_audio_extension(Path::new("pad.Aif"), &exts));
        assert!(!has_audio_extension(Path::new("notes.txt"), &exts));
        assert!(!has_audio_extension(Path::new("wav"), &exts));
    }

    #[test]
    fn scan_is_recursive_sorted_and_skips_class_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("b/deep")).unwrap();
        fs::create_dir_all(root.join("drum_samples")).unwrap();
        fs::create_dir_all(root.join("b/voice_samples")).unwrap();
        for f in [
            "z.mp3",
            "a.wav",
            "b/deep/c.flac",
            "drum_samples/sorted.wav",
            "b/voice_samples/nested.ogg",
            "readme.txt",
        ] {
            fs::write(root.join(f), b"x").unwrap();
        }

        let found: Vec<PathBuf> = scan_audio_files(root, &exts())
            .into_iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            found,
            vec![
                PathBuf::from("a.wav"),
                PathBuf::from("b/deep/c.flac"),
                PathBuf::from("b/voice_samples/nested.ogg"),
                PathBuf::from("z.mp3"),
            ]
        );
    }

    #[test]
    fn order_is_lexical_on_the_whole_path() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::create_dir_all(root.join("a-b")).unwrap();
        fs::write(root.join("a/x.wav"), b"x").unwrap();
        fs::write(root.join("a-b/x.wav"), b"x").unwrap();

        let found: Vec<PathBuf> = scan_audio_files(root, &exts())
            .into_iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();
        // '-' sorts before '/'
        assert_eq!(found, vec![PathBuf::from("a-b/x.wav"), PathBuf::from("a/x.wav")]);
    }
}
