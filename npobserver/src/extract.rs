//! Best-effort metadata scraping.
//!
//! Pure functions over the raw strings a page binding reads from the
//! document. Every field may be empty; nothing here ever blocks.

use url::Url;

const THUMBNAIL_HOST: &str = "https://i.ytimg.com/vi";
const MIN_MEDIA_ID_LEN: usize = 6;

/// Raw document strings, as read by the page binding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContext {
    /// `location.href`
    pub location: String,
    /// `document.title`
    pub document_title: String,
    /// Text of the watch page heading.
    pub heading_title: Option<String>,
    /// Text of the channel name link.
    pub channel_name: Option<String>,
    /// `href` of `link[rel=canonical]`.
    pub canonical_url: Option<String>,
    /// `content` of `meta[property=og:image]`.
    pub og_image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: String,
    pub channel: String,
    pub url: String,
    pub media_id: String,
    pub thumbnail_url: String,
}

pub fn extract_metadata(ctx: &PageContext) -> PageMetadata {
    let media_id = media_id(ctx).unwrap_or_default();
    PageMetadata {
        title: title(ctx),
        channel: non_empty_trimmed(ctx.channel_name.as_deref()).unwrap_or_default(),
        url: ctx.location.clone(),
        thumbnail_url: thumbnail_url(&media_id, ctx.og_image.as_deref()),
        media_id,
    }
}

fn title(ctx: &PageContext) -> String {
    non_empty_trimmed(ctx.heading_title.as_deref())
        .unwrap_or_else(|| clean_document_title(&ctx.document_title))
}

fn non_empty_trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Strips the trailing ` - YouTube` suffix from a document title.
pub fn clean_document_title(title: &str) -> String {
    let trimmed = title.trim_end();
    // ASCII lowercasing keeps byte offsets aligned with `trimmed`.
    let lower = trimmed.to_ascii_lowercase();
    if let Some(head) = lower.strip_suffix("youtube") {
        if let Some(before_dash) = head.trim_end().strip_suffix('-') {
            return trimmed[..before_dash.len()].trim().to_string();
        }
    }
    trimmed.trim().to_string()
}

fn media_id(ctx: &PageContext) -> Option<String> {
    let location = Url::parse(&ctx.location).ok()?;
    query_media_id(&location)
        .or_else(|| path_media_id(&location, &["shorts", "embed"]))
        .or_else(|| {
            let canonical = Url::parse(ctx.canonical_url.as_deref()?).ok()?;
            query_media_id(&canonical).or_else(|| path_media_id(&canonical, &["shorts"]))
        })
}

/// Media id carried by a URL: `?v=<id>`, `/shorts/<id>` or `/embed/<id>`.
pub fn media_id_from_url(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    query_media_id(&url).or_else(|| path_media_id(&url, &["shorts", "embed"]))
}

fn query_media_id(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, value)| key == "v" && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}

fn path_media_id(url: &Url, prefixes: &[&str]) -> Option<String> {
    let mut segments = url.path_segments()?;
    let first = segments.next()?;
    if !prefixes.contains(&first) {
        return None;
    }

    let id: String = segments
        .next()?
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    (id.len() >= MIN_MEDIA_ID_LEN).then_some(id)
}

fn thumbnail_url(media_id: &str, og_image: Option<&str>) -> String {
    if !media_id.is_empty() {
        // hqdefault always exists, maxres does not.
        return format!("{THUMBNAIL_HOST}/{media_id}/hqdefault.jpg");
    }

    og_image
        .filter(|og| og.starts_with("http"))
        .map(str::to_string)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(location: &str) -> PageContext {
        PageContext {
            location: location.to_string(),
            ..PageContext::default()
        }
    }

    #[test]
    fn test_media_id_sources() {
        assert_eq!(
            media_id_from_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=10").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            media_id_from_url("https://www.youtube.com/shorts/abc_DEF-12?feature=share").as_deref(),
            Some("abc_DEF-12")
        );
        assert_eq!(
            media_id_from_url("https://www.youtube.com/embed/xyz789").as_deref(),
            Some("xyz789")
        );
        assert_eq!(media_id_from_url("https://www.youtube.com/shorts/abc"), None);
        assert_eq!(media_id_from_url("https://www.youtube.com/feed/trending"), None);
        assert_eq!(media_id_from_url("not a url"), None);
    }

    #[test]
    fn test_canonical_fallback() {
        let mut page = ctx("https://www.youtube.com/");
        page.canonical_url = Some("https://www.youtube.com/watch?v=canon123".to_string());
        assert_eq!(extract_metadata(&page).media_id, "canon123");

        // Canonical links never carry embed ids.
        page.canonical_url = Some("https://www.youtube.com/embed/canon123".to_string());
        assert_eq!(extract_metadata(&page).media_id, "");
    }

    #[test]
    fn test_title_preference() {
        let mut page = ctx("https://www.youtube.com/watch?v=abcdef");
        page.document_title = "(3) Some Song - YouTube".to_string();
        assert_eq!(extract_metadata(&page).title, "(3) Some Song");

        page.heading_title = Some("  Some Song (Official)  ".to_string());
        assert_eq!(extract_metadata(&page).title, "Some Song (Official)");

        page.heading_title = Some("   ".to_string());
        assert_eq!(extract_metadata(&page).title, "(3) Some Song");
    }

    #[test]
    fn test_clean_document_title() {
        assert_eq!(clean_document_title("Song -YouTube "), "Song");
        assert_eq!(clean_document_title("Song - youtube"), "Song");
        assert_eq!(clean_document_title("YouTube"), "YouTube");
        assert_eq!(clean_document_title("My YouTube"), "My YouTube");
        assert_eq!(clean_document_title(""), "");
    }

    #[test]
    fn test_thumbnail() {
        let page = ctx("https://www.youtube.com/watch?v=abcdef");
        assert_eq!(
            extract_metadata(&page).thumbnail_url,
            "https://i.ytimg.com/vi/abcdef/hqdefault.jpg"
        );

        let mut no_id = ctx("https://www.youtube.com/");
        no_id.og_image = Some("https://cdn.example/og.jpg".to_string());
        assert_eq!(extract_metadata(&no_id).thumbnail_url, "https://cdn.example/og.jpg");

        no_id.og_image = Some("data:image/png;base64,xx".to_string());
        assert_eq!(extract_metadata(&no_id).thumbnail_url, "");
    }

    #[test]
    fn test_channel_and_url() {
        let mut page = ctx("https://www.youtube.com/watch?v=abcdef");
        page.channel_name = Some(" Artist ".to_string());
        let meta = extract_metadata(&page);
        assert_eq!(meta.channel, "Artist");
        assert_eq!(meta.url, "https://www.youtube.com/watch?v=abcdef");
    }
}
