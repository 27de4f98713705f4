use std::fmt;

use scraper::{Html, Selector};

/// CSS selector of a player widget on a Freesound result page.
pub const PLAYER_SELECTOR: &str = "div.bw-player";

/// Title used when a widget has no `data-title`.
pub const UNTITLED: &str = "untitled_sound";

/// Format of a preview file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreviewKind {
    /// `data-mp3`
    Mp3,
    /// `data-ogg`
    Ogg,
}

impl fmt::Display for PreviewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Mp3 => "MP3",
            Self::Ogg => "OGG",
        })
    }
}

/// Lien direct vers un fichier de preview.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreviewUrl {
    pub url: String,
    pub kind: PreviewKind,
}

/// One player widget of a listing page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingEntry {
    /// Trimmed `data-title`, or [`UNTITLED`].
    pub title: String,
    /// MP3 preview if present, else OGG, else none.
    pub preview: Option<PreviewUrl>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Extrait les widgets de lecture d'une page de résultats, dans l'ordre du document.
///
/// # Example
/// ```
/// use ss_scrape::{PreviewKind, parse_listing};
/// let html = r#"<div class="bw-player" data-title="Kick 01" data-mp3="https://x/k.mp3"></div>"#;
/// let entries = parse_listing(html);
/// assert_eq!(entries[0].title, "Kick 01");
/// assert_eq!(entries[0].preview.as_ref().map(|p| p.kind), Some(PreviewKind::Mp3));
/// ```
#[must_use]
pub fn parse_listing(html: &str) -> Vec<ListingEntry> {
    let Ok(selector) = Selector::parse(PLAYER_SELECTOR) else {
        log::error!("Sélecteur invalide : {PLAYER_SELECTOR}");
        return Vec::new();
    };
    let document = Html::parse_document(html);

    document
        .select(&selector)
        .map(|element| {
            let attrs = element.value();
            let title = attrs
                .attr("data-title")
                .map_or(UNTITLED, str::trim)
                .to_string();
            let preview = non_empty(attrs.attr("data-mp3"))
                .map(|url| PreviewUrl {
                    url: url.to_string(),
                    kind: PreviewKind::Mp3,
                })
                .or_else(|| {
                    non_empty(attrs.attr("data-ogg")).map(|url| PreviewUrl {
                        url: url.to_string(),
                        kind: PreviewKind::Ogg,
                    })
                });
            ListingEntry { title, preview }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div class="sample bw-player" data-title="  Deep Kick  "
               data-mp3="https://cdn.freesound.org/previews/1/1_2-lq.mp3"
               data-ogg="https://cdn.freesound.org/previews/1/1_2-lq.ogg"></div>
          <div class="bw-player" data-ogg="https://cdn.freesound.org/previews/3/3_4-lq.ogg"></div>
          <div class="bw-player" data-title="Silent" data-mp3=""></div>
          <span class="bw-player" data-title="Not a div" data-mp3="https://x/y.mp3"></span>
          <div class="player" data-title="Wrong class" data-mp3="https://x/z.mp3"></div>
        </body></html>
    "#;

    #[test]
    fn extracts_widgets_in_order() {
        let entries = parse_listing(PAGE);
        assert_eq!(entries.len(), 3);

        assert_eq!(entries[0].title, "Deep Kick");
        let p = entries[0].preview.as_ref().unwrap();
        assert_eq!(p.kind, PreviewKind::Mp3);
        assert!(p.url.ends_with(".mp3"));

        assert_eq!(entries[1].title, UNTITLED);
        assert_eq!(
            entries[1].preview.as_ref().map(|p| p.kind),
            Some(PreviewKind::Ogg)
        );

        assert_eq!(entries[2].title, "Silent");
        assert!(entries[2].preview.is_none());
    }

    #[test]
    fn page_without_widgets_is_empty() {
        assert!(parse_listing("<html><body><p>Nothing here</p></body></html>").is_empty());
        assert!(parse_listing("").is_empty());
    }
}
