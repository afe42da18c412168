use url::Url;

/// Rewrites media paths found in question-bank cells into absolute,
/// servable URLs. Pure string manipulation: never touches the filesystem,
/// so it stays unit-testable without fixtures.
#[derive(Debug, Clone)]
pub struct MediaResolver {
    base_url: String,
    static_prefix: String,
    media_dir: String,
}

impl MediaResolver {
    pub fn new(base_url: &str, static_prefix: &str, media_dir: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            static_prefix: static_prefix.to_string(),
            media_dir: media_dir.trim_matches('/').to_string(),
        }
    }

    /// Rules, applied in order: empty in → empty out; already absolute →
    /// unchanged; service-relative (`static/...`) → base URL + path;
    /// anything else → its base name under the default media directory.
    pub fn resolve(&self, raw: &str) -> String {
        let path = raw.trim().replace('\\', "/");
        if path.is_empty() {
            return String::new();
        }
        if is_absolute_url(&path) {
            return path;
        }
        if path.starts_with(&self.static_prefix) {
            return format!("{}/{}", self.base_url, path);
        }
        let filename = path.rsplit('/').next().unwrap_or(&path);
        format!("{}/{}/{}", self.base_url, self.media_dir, filename)
    }
}

fn is_absolute_url(s: &str) -> bool {
    match Url::parse(s) {
        Ok(u) => u.scheme() == "http" || u.scheme() == "https",
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> MediaResolver {
        MediaResolver::new("http://localhost:8000", "static/", "static/mocktest_images")
    }

    #[test]
    fn empty_stays_empty() {
        assert_eq!(resolver().resolve(""), "");
        assert_eq!(resolver().resolve("   "), "");
    }

    #[test]
    fn absolute_urls_pass_through() {
        let url = "https://cdn.example.com/img/q1.png";
        assert_eq!(resolver().resolve(url), url);
    }

    #[test]
    fn static_paths_get_the_base_url() {
        assert_eq!(
            resolver().resolve("static/banners/q1.png"),
            "http://localhost:8000/static/banners/q1.png"
        );
    }

    #[test]
    fn bare_names_land_in_the_media_dir() {
        assert_eq!(
            resolver().resolve("q1.png"),
            "http://localhost:8000/static/mocktest_images/q1.png"
        );
    }

    #[test]
    fn windows_separators_are_normalized() {
        assert_eq!(
            resolver().resolve("uploads\\imgs\\q7.png"),
            "http://localhost:8000/static/mocktest_images/q7.png"
        );
    }
}
