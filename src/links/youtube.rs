use lazy_static::lazy_static;
use regex::Regex;

/// Pull the video id out of a YouTube URL: `watch?v=` query form first, then
/// `youtu.be/` short links, then the last path segment as a fallback.
pub fn video_id(url: &str) -> Option<String> {
    lazy_static! {
        static ref QUERY_RE: Regex = Regex::new(r"[?&]v=([^&]+)").unwrap();
        static ref SHORT_RE: Regex = Regex::new(r"youtu\.be/(.+)$").unwrap();
    }
    if let Some(captures) = QUERY_RE.captures(url) {
        return Some(captures[1].to_string());
    }
    if let Some(captures) = SHORT_RE.captures(url) {
        return Some(captures[1].to_string());
    }
    url.rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_watch_query_form() {
        assert_eq!(
            video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".into())
        );
    }

    #[test]
    fn extracts_v_among_other_params() {
        assert_eq!(
            video_id("https://www.youtube.com/watch?list=PL123&v=abc123&t=42"),
            Some("abc123".into())
        );
    }

    #[test]
    fn extracts_short_link_form() {
        assert_eq!(
            video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".into())
        );
    }

    #[test]
    fn falls_back_to_last_path_segment() {
        assert_eq!(
            video_id("https://www.youtube.com/embed/xyz789"),
            Some("xyz789".into())
        );
    }

    #[test]
    fn trailing_slash_yields_nothing() {
        assert_eq!(video_id("https://www.youtube.com/"), None);
    }
}
