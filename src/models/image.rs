use serde::{Deserialize, Serialize};
use std::fmt;

/// Image types recognised from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageMimeType {
    Png,
    Jpeg,
    Webp,
}

impl ImageMimeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageMimeType::Png => "image/png",
            ImageMimeType::Jpeg => "image/jpeg",
            ImageMimeType::Webp => "image/webp",
        }
    }

    /// Maps an extension (with or without the leading dot, any case).
    /// Unknown extensions fall back to PNG.
    pub fn from_extension(extension: &str) -> Self {
        match extension.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "png" => ImageMimeType::Png,
            "jpg" | "jpeg" => ImageMimeType::Jpeg,
            "webp" => ImageMimeType::Webp,
            _ => ImageMimeType::Png,
        }
    }

    /// Looks at the last path segment of a URL. Query strings and fragments
    /// are ignored.
    pub fn from_url(raw: &str) -> Self {
        let path = match url::Url::parse(raw) {
            Ok(parsed) => parsed.path().to_string(),
            Err(_) => raw.split(&['?', '#'][..]).next().unwrap_or_default().to_string(),
        };
        let file_name = path.rsplit('/').next().unwrap_or_default();
        match file_name.rsplit_once('.') {
            Some((stem, extension)) if !stem.is_empty() => Self::from_extension(extension),
            _ => ImageMimeType::Png,
        }
    }
}

impl Default for ImageMimeType {
    fn default() -> Self {
        ImageMimeType::Png
    }
}

impl fmt::Display for ImageMimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference image after resolution, ready to be inlined in the provider request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedReferenceImage {
    /// Base64 payload.
    pub content: String,
    pub mime_type: String,
    pub description: Option<String>,
}

/// `data:<mime>;base64,<payload>` split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl<'a> {
    pub mime_type: Option<&'a str>,
    pub payload: &'a str,
}

impl<'a> DataUrl<'a> {
    /// Returns `None` for anything that is not a `data:` URL with a non-empty payload.
    pub fn parse(raw: &'a str) -> Option<Self> {
        let rest = raw.strip_prefix("data:")?;
        let (header, payload) = rest.split_once(',')?;
        if payload.is_empty() {
            return None;
        }
        let mime_type = header
            .split_once(';')
            .map(|(mime, _)| mime)
            .filter(|mime| !mime.is_empty());
        Some(DataUrl { mime_type, payload })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_mapping() {
        assert_eq!(ImageMimeType::from_extension(".png"), ImageMimeType::Png);
        assert_eq!(ImageMimeType::from_extension("JPG"), ImageMimeType::Jpeg);
        assert_eq!(ImageMimeType::from_extension(".jpeg"), ImageMimeType::Jpeg);
        assert_eq!(ImageMimeType::from_extension("webp"), ImageMimeType::Webp);
        assert_eq!(ImageMimeType::from_extension(".gif"), ImageMimeType::Png);
    }

    #[test]
    fn test_from_url() {
        assert_eq!(
            ImageMimeType::from_url("https://cdn.example.com/photos/cat.jpg").as_str(),
            "image/jpeg"
        );
        assert_eq!(
            ImageMimeType::from_url("https://cdn.example.com/cat.WEBP?size=large#top"),
            ImageMimeType::Webp
        );
        assert_eq!(
            ImageMimeType::from_url("https://cdn.example.com/image"),
            ImageMimeType::Png
        );
        assert_eq!(
            ImageMimeType::from_url("https://cdn.example.com/.hidden"),
            ImageMimeType::Png
        );
    }

    #[test]
    fn test_parse_data_url() {
        let parsed = DataUrl::parse("data:image/png;base64,AAAA").unwrap();
        assert_eq!(parsed.mime_type, Some("image/png"));
        assert_eq!(parsed.payload, "AAAA");
    }

    #[test]
    fn test_parse_data_url_rejects_malformed() {
        assert_eq!(DataUrl::parse("https://example.com/a.png"), None);
        assert_eq!(DataUrl::parse("data:image/png;base64"), None);
        assert_eq!(DataUrl::parse("data:image/png;base64,"), None);
    }

    #[test]
    fn test_parse_data_url_without_mime() {
        let parsed = DataUrl::parse("data:;base64,QUJD").unwrap();
        assert_eq!(parsed.mime_type, None);
        assert_eq!(parsed.payload, "QUJD");
    }
}
