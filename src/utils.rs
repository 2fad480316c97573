//! Utility functions for common operations.

use crate::error::MangaError;
use crate::http::HttpResponse;

/// Normalizes a manga name into the feed's URL slug.
///
/// Characters other than alphanumerics and hyphens separate words; words are
/// title-cased and joined with hyphens. "one piece" becomes "One-Piece",
/// "spider-man" becomes "Spider-Man".
pub fn normalize_manga_name(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric() && c != '-')
        .filter(|word| !word.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join("-")
}

/// Upper-cases letters that follow a non-letter, lower-cases the rest.
fn title_case(word: &str) -> String {
    let mut result = String::with_capacity(word.len());
    let mut prev_is_letter = false;

    for c in word.chars() {
        if prev_is_letter {
            result.extend(c.to_lowercase());
        } else {
            result.extend(c.to_uppercase());
        }
        prev_is_letter = c.is_alphabetic();
    }

    result
}

/// Passes a successful response through, or maps any other status to `not_found`.
///
/// Every non-2xx status is treated as "not found", 5xx included.
pub fn ensure_found(
    response: HttpResponse,
    not_found: impl FnOnce() -> MangaError,
) -> Result<HttpResponse, MangaError> {
    if !response.is_success() {
        return Err(not_found());
    }
    Ok(response)
}

/// Returns the final path segment of a URL, used as the in-archive file name.
pub fn url_file_name(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url)
        && let Some(segment) = parsed.path_segments().and_then(|mut s| s.next_back())
        && !segment.is_empty()
    {
        return segment.to_string();
    }

    url.rsplit('/').next().unwrap_or(url).to_string()
}

/// Makes a display name safe to use as a file name.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    cleaned.trim().trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_normalize_simple() {
        assert_eq!(normalize_manga_name("bleach"), "Bleach");
        assert_eq!(normalize_manga_name("one piece"), "One-Piece");
        assert_eq!(normalize_manga_name("  ONE   PIECE "), "One-Piece");
    }

    #[test]
    fn test_normalize_punctuation() {
        assert_eq!(normalize_manga_name("spider-man"), "Spider-Man");
        assert_eq!(normalize_manga_name("dr. stone"), "Dr-Stone");
        assert_eq!(normalize_manga_name("kaguya-sama: love is war"), "Kaguya-Sama-Love-Is-War");
        assert_eq!(normalize_manga_name("3gatsu no lion"), "3Gatsu-No-Lion");
    }

    #[test]
    fn test_ensure_found() {
        let ok = HttpResponse::new(StatusCode::OK, "body");
        assert!(ensure_found(ok, || MangaError::MangaNotFound("x".into())).is_ok());

        let missing = HttpResponse::new(StatusCode::NOT_FOUND, "");
        assert!(matches!(
            ensure_found(missing, || MangaError::MangaNotFound("x".into())),
            Err(MangaError::MangaNotFound(_))
        ));

        let server_error = HttpResponse::new(StatusCode::SERVICE_UNAVAILABLE, "");
        assert!(matches!(
            ensure_found(server_error, || MangaError::ChapterNotFound("x".into())),
            Err(MangaError::ChapterNotFound(_))
        ));
    }

    #[test]
    fn test_url_file_name() {
        assert_eq!(
            url_file_name("https://host.example/manga/Bleach/0001-001.png"),
            "0001-001.png"
        );
        assert_eq!(
            url_file_name("https://host.example/manga/Bleach/dir/0004.5-012.png"),
            "0004.5-012.png"
        );
        assert_eq!(url_file_name("relative/path/a.png"), "a.png");
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("Bleach Chapter 1"), "Bleach Chapter 1");
        assert_eq!(sanitize_file_name("Fate/Zero Chapter 2"), "Fate_Zero Chapter 2");
        assert_eq!(sanitize_file_name("Re:Zero? Chapter 3."), "Re_Zero_ Chapter 3");
    }
}
