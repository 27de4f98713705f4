use crate::listing::PreviewUrl;

/// Punctuation kept in file names besides alphanumerics.
const KEPT_PUNCTUATION: &str = " -_()[]{}";

/// Nettoie un titre pour en faire un nom de fichier.
///
/// Keeps alphanumerics (Unicode) and ` -_()[]{}`, drops everything else,
/// then trims trailing whitespace. An empty result becomes
/// `sound_<unix seconds>`.
///
/// # Example
/// ```
/// use ss_scrape::files::sanitize_title;
/// assert_eq!(sanitize_title("Kick #1 (hard)!  "), "Kick 1 (hard)");
/// ```
#[must_use]
pub fn sanitize_title(title: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || KEPT_PUNCTUATION.contains(*c))
        .collect();
    let kept = kept.trim_end();
    if kept.is_empty() {
        format!("sound_{}", chrono::Utc::now().timestamp())
    } else {
        kept.to_string()
    }
}

/// Extension of the last path segment of `url`, dot included, or `""`.
///
/// Query string and fragment are ignored; leading dots of the segment do
/// not start an extension.
#[must_use]
pub fn url_extension(url: &str) -> &str {
    let url = url.split(['?', '#']).next().unwrap_or_default();
    let after_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let Some((_, path)) = after_scheme.split_once('/') else {
        return "";
    };
    let segment = path.rsplit('/').next().unwrap_or_default();
    let stem_start = segment.len() - segment.trim_start_matches('.').len();
    segment[stem_start..]
        .rfind('.')
        .map_or("", |i| &segment[stem_start + i..])
}

/// Nom de fichier local pour une preview : titre nettoyé + extension de l'URL.
#[must_use]
pub fn file_name_for(title: &str, preview: &PreviewUrl) -> String {
    format!("{}{}", sanitize_title(title), url_extension(&preview.url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::PreviewKind;

    #[test]
    fn sanitizer_keeps_allowed_characters() {
        assert_eq!(sanitize_title("Rain/on:roof*"), "Rainonroof");
        assert_eq!(sanitize_title("[Loop] {120bpm} a_b-c"), "[Loop] {120bpm} a_b-c");
        assert_eq!(sanitize_title("Café über"), "Café über");
        assert_eq!(sanitize_title("  lead  "), "  lead");
    }

    #[test]
    fn empty_title_gets_timestamp_name() {
        let name = sanitize_title("!!!");
        let digits = name.strip_prefix("sound_").unwrap();
        assert!(!digits.is_empty());
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn extension_comes_from_url_path() {
        assert_eq!(
            url_extension("https://cdn.freesound.org/previews/12/12345_678-lq.mp3"),
            ".mp3"
        );
        assert_eq!(url_extension("https://x.org/a/b.c/file.ogg?dl=1#t"), ".ogg");
        assert_eq!(url_extension("https://x.org/a/noext"), "");
        assert_eq!(url_extension("https://x.org/.hidden"), "");
        assert_eq!(url_extension("https://x.org"), "");
        assert_eq!(url_extension("https://x.org/a.tar.gz"), ".gz");
    }

    #[test]
    fn file_name_joins_title_and_extension() {
        let preview = PreviewUrl {
            url: "https://cdn/x/1_2-lq.ogg".into(),
            kind: PreviewKind::Ogg,
        };
        assert_eq!(file_name_for("Water drop #3", &preview), "Water drop 3.ogg");
    }
}
