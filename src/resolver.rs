//! Image URL resolution for a chapter.

use crate::error::MangaError;
use crate::models::{Chapter, ChapterPageInfo};

/// Extension of every page image on the host.
const IMAGE_EXTENSION: &str = "png";

/// Builds the ordered page image URLs of a chapter.
pub struct ImageUrlResolver;

impl ImageUrlResolver {
    /// Returns one URL per page, pages `1..=page_count` in order.
    ///
    /// URLs have the form
    /// `https://{host}/manga/{slug}/{directory/}{chapter}-{page}.png`, where
    /// the chapter component is `0004` for whole numbers and `0004.5` for
    /// fractional ones, and the page component is three digits.
    pub fn resolve(chapter: &Chapter, info: &ChapterPageInfo) -> Result<Vec<String>, MangaError> {
        let number = chapter.number()?;
        let base = Self::base_url(chapter, info);

        Ok((1..=info.page_count)
            .map(|page| format!("{}{}-{:03}.{}", base, number, page, IMAGE_EXTENSION))
            .collect())
    }

    /// Everything before the file name, ending in a single '/'.
    fn base_url(chapter: &Chapter, info: &ChapterPageInfo) -> String {
        let host = info.image_host_path.trim_matches('/');
        let mut base = format!("https://{}/manga/{}/", host, chapter.slug());

        let directory = info.directory.trim_matches('/');
        if !directory.is_empty() {
            base.push_str(directory);
            base.push('/');
        }

        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(page_count: u32, directory: &str) -> ChapterPageInfo {
        ChapterPageInfo {
            page_count,
            directory: directory.to_string(),
            image_host_path: "official.lowee.us".to_string(),
        }
    }

    #[test]
    fn test_resolve_whole_number() {
        let chapter = Chapter::new("Bleach Chapter 4", "https://x/Bleach-chapter-4.html");
        let urls = ImageUrlResolver::resolve(&chapter, &info(2, "")).unwrap();
        assert_eq!(
            urls,
            vec![
                "https://official.lowee.us/manga/Bleach/0004-001.png",
                "https://official.lowee.us/manga/Bleach/0004-002.png",
            ]
        );
    }

    #[test]
    fn test_resolve_fractional_number() {
        let chapter = Chapter::new("Bleach Chapter 4.5", "https://x/Bleach-chapter-4.5.html");
        let urls = ImageUrlResolver::resolve(&chapter, &info(1, "")).unwrap();
        assert_eq!(urls, vec!["https://official.lowee.us/manga/Bleach/0004.5-001.png"]);
    }

    #[test]
    fn test_resolve_directory() {
        let chapter = Chapter::new(
            "Bleach Bankai Stories Chapter 1",
            "https://x/Bleach-Bankai-Stories-chapter-1.html",
        );
        let urls = ImageUrlResolver::resolve(&chapter, &info(77, "/S2/")).unwrap();
        assert_eq!(urls.len(), 77);
        assert_eq!(
            urls[76],
            "https://official.lowee.us/manga/Bleach-Bankai-Stories/S2/0001-077.png"
        );
        assert!(urls.iter().all(|u| !u["https://".len()..].contains("//")));
    }

    #[test]
    fn test_resolve_zero_pages() {
        let chapter = Chapter::new("Bleach Chapter 4", "https://x/Bleach-chapter-4.html");
        assert!(ImageUrlResolver::resolve(&chapter, &info(0, "")).unwrap().is_empty());
    }

    #[test]
    fn test_resolve_without_number() {
        let chapter = Chapter::new("Bleach Chapter Extra", "https://x/Bleach-extra.html");
        assert!(matches!(
            ImageUrlResolver::resolve(&chapter, &info(2, "")),
            Err(MangaError::ChapterError(_))
        ));
    }
}
