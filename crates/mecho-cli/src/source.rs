//! Turning command-line image arguments into image sources.

use std::path::Path;

use anyhow::Result;
use mecho_fetch::ImageSource;

fn is_url(text: &str) -> bool {
    text.starts_with("http://") || text.starts_with("https://")
}

/// Build a source from a path or URL without checking that it exists.
///
/// The suggested filename is the last path segment, so a file named after a
/// stored id is recognised for replay.
pub fn image_source(text: &str) -> ImageSource {
    if is_url(text) {
        let name = text
            .split(['?', '#'])
            .next()
            .and_then(|s| s.rsplit('/').next())
            .filter(|s| !s.is_empty());
        let source = ImageSource::from_url(text);
        match name {
            Some(name) => source.with_filename(name),
            None => source,
        }
    } else {
        let source = ImageSource::from_path(text);
        match Path::new(text).file_name().and_then(|n| n.to_str()) {
            Some(name) => source.with_filename(name),
            None => source,
        }
    }
}

/// Like [`image_source`], but a local path must point at a file.
pub fn parse(text: &str) -> Result<ImageSource> {
    if !is_url(text) && !Path::new(text).is_file() {
        anyhow::bail!("{} is neither an existing file nor an http(s) URL", text);
    }
    Ok(image_source(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_source() {
        let source = image_source("https://cdn.example.com/x/ABC.gif?w=1");
        assert_eq!(
            source.remote_url.as_deref(),
            Some("https://cdn.example.com/x/ABC.gif?w=1")
        );
        assert_eq!(source.suggested_filename.as_deref(), Some("ABC.gif"));
        assert!(source.local_path.is_none());
    }

    #[test]
    fn test_path_source() {
        let source = image_source("/tmp/memes/cat.png");
        assert_eq!(source.local_path.as_deref(), Some(Path::new("/tmp/memes/cat.png")));
        assert_eq!(source.suggested_filename.as_deref(), Some("cat.png"));
    }

    #[test]
    fn test_parse_rejects_missing_file() {
        assert!(parse("/definitely/not/here.png").is_err());
        assert!(parse("https://example.com/a.png").is_ok());
    }
}
