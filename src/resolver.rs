use std::path::{Path, PathBuf};

use reqwest::blocking::{Client, ClientBuilder};

use crate::error::ExtractError;
use crate::favicon;
use crate::shortcut;

const RASTER_SUFFIXES: [&str; 3] = [".png", ".jpg", ".jpeg"];

/// How an input file is treated, decided by its extension alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// `.url` Internet Shortcut
    UrlShortcut,
    /// `.lnk` shell link
    ShellLink,
    /// `.png`, `.jpg`, `.jpeg`
    RasterImage,
    /// Anything else, assumed to carry icon resources.
    Binary,
}

impl InputKind {
    /// Suffix match on the lowercased file name, so a bare `.png` is an image too.
    pub fn classify(path: &Path) -> Self {
        let name = lowercase_file_name(path);
        if name.ends_with(".url") {
            InputKind::UrlShortcut
        } else if name.ends_with(".lnk") {
            InputKind::ShellLink
        } else if RASTER_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
            InputKind::RasterImage
        } else {
            InputKind::Binary
        }
    }
}

/// What the Icon Producer should work from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTarget {
    /// A file on disk: a raster image or a binary with icon resources.
    Local(PathBuf),
    /// The downloaded favicon, which is already the final artifact.
    Downloaded(PathBuf),
    /// An `http(s)://` location; icons cannot be extracted from it.
    Remote(String),
}

impl ResolvedTarget {
    /// Classify a location string. Raster names stay local even when they look like URLs.
    pub fn from_location(location: &str) -> Self {
        let path = PathBuf::from(location);
        if !is_raster_image(&path) && is_url(location) {
            ResolvedTarget::Remote(location.to_string())
        } else {
            ResolvedTarget::Local(path)
        }
    }
}

pub fn is_raster_image(path: &Path) -> bool {
    matches!(InputKind::classify(path), InputKind::RasterImage)
}

pub fn is_url(location: &str) -> bool {
    let lower = location.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn lowercase_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

/// Favicon requests wait for the server or the OS to give up; the blocking
/// client would otherwise stop after 30 seconds.
fn client_builder() -> ClientBuilder {
    Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(None)
}

pub struct Resolver {
    client: Client,
}

impl Resolver {
    pub fn new() -> reqwest::Result<Self> {
        Ok(Self::with_client(client_builder().build()?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Work out what to extract an icon from.
    ///
    /// `Ok(None)` means there is nothing to do: an Internet Shortcut without a
    /// `URL=` line.
    pub fn resolve(
        &self,
        input: &Path,
        output_dir: &Path,
    ) -> Result<Option<ResolvedTarget>, ExtractError> {
        let kind = InputKind::classify(input);
        log::debug!("Resolving {} as {:?}", input.display(), kind);

        match kind {
            InputKind::UrlShortcut => {
                let Some(page_url) = favicon::read_shortcut_url(input)? else {
                    return Ok(None);
                };
                let favicon_url = favicon::favicon_url(&page_url)?;
                let downloaded = favicon::download_favicon(&self.client, &favicon_url, output_dir)?;
                Ok(Some(ResolvedTarget::Downloaded(downloaded)))
            }
            InputKind::ShellLink => {
                let target = shortcut::resolve_shortcut(input)?;
                Ok(Some(ResolvedTarget::from_location(&target)))
            }
            InputKind::RasterImage => Ok(Some(ResolvedTarget::Local(input.to_path_buf()))),
            InputKind::Binary => Ok(Some(ResolvedTarget::from_location(
                &input.to_string_lossy(),
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::favicon::FAVICON_FILE_NAME;
    use crate::test_support::{serve_once, serve_once_after, test_client};
    use std::fs;
    use std::time::Duration;

    fn resolver() -> Resolver {
        Resolver::with_client(test_client())
    }

    #[test]
    fn classifies_by_lowercase_extension() {
        assert_eq!(InputKind::classify(Path::new("Site.URL")), InputKind::UrlShortcut);
        assert_eq!(InputKind::classify(Path::new("app.Lnk")), InputKind::ShellLink);
        assert_eq!(InputKind::classify(Path::new("a.PNG")), InputKind::RasterImage);
        assert_eq!(InputKind::classify(Path::new("a.jpg")), InputKind::RasterImage);
        assert_eq!(InputKind::classify(Path::new("a.JPEG")), InputKind::RasterImage);
        assert_eq!(InputKind::classify(Path::new("tool.exe")), InputKind::Binary);
        assert_eq!(InputKind::classify(Path::new("README")), InputKind::Binary);
        assert_eq!(InputKind::classify(Path::new("pic.gif")), InputKind::Binary);
    }

    #[test]
    fn classification_uses_the_file_name_suffix() {
        assert_eq!(InputKind::classify(Path::new("dir/.png")), InputKind::RasterImage);
        assert_eq!(InputKind::classify(Path::new(".URL")), InputKind::UrlShortcut);
        assert_eq!(InputKind::classify(Path::new("logo.png.exe")), InputKind::Binary);
        assert_eq!(InputKind::classify(Path::new("png")), InputKind::Binary);
        assert_eq!(InputKind::classify(Path::new("pictures.png/app")), InputKind::Binary);
    }

    #[test]
    fn slow_favicon_server_is_waited_for() {
        // Longer than reqwest's blocking default of 30 seconds.
        let (base, server) = serve_once_after(Duration::from_secs(32), "200 OK", b"slow icon");
        let dir = tempfile::tempdir().unwrap();
        let client = client_builder().no_proxy().build().unwrap();

        let url = format!("{}/favicon.ico", base);
        let path = favicon::download_favicon(&client, &url, dir.path()).unwrap();

        assert_eq!(fs::read(path).unwrap(), b"slow icon");
        server.join().unwrap();
    }

    #[test]
    fn images_and_binaries_pass_through_unchanged() {
        let out = Path::new("out");
        let png = Path::new("does/not/matter.png");
        let exe = Path::new("does/not/matter.exe");

        assert_eq!(
            resolver().resolve(png, out).unwrap(),
            Some(ResolvedTarget::Local(png.to_path_buf()))
        );
        assert_eq!(
            resolver().resolve(exe, out).unwrap(),
            Some(ResolvedTarget::Local(exe.to_path_buf()))
        );
    }

    #[test]
    fn url_strings_resolve_remote_unless_raster() {
        assert_eq!(
            ResolvedTarget::from_location("HTTPS://example.com/setup.exe"),
            ResolvedTarget::Remote("HTTPS://example.com/setup.exe".into())
        );
        assert_eq!(
            ResolvedTarget::from_location("https://example.com/logo.png"),
            ResolvedTarget::Local(PathBuf::from("https://example.com/logo.png"))
        );
    }

    #[test]
    fn url_file_without_url_line_is_nothing_to_do() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("empty.url");
        fs::write(&input, "[InternetShortcut]\r\nIconIndex=0\r\n").unwrap();

        assert_eq!(resolver().resolve(&input, dir.path()).unwrap(), None);
        assert!(!dir.path().join(FAVICON_FILE_NAME).exists());
    }

    #[test]
    fn url_file_downloads_favicon_from_site_root() {
        let (base, server) = serve_once("200 OK", b"\0\0\x01\0icon");
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("site.url");
        fs::write(&input, format!("[InternetShortcut]\r\nURL={}/deep/page.html?q=1\r\n", base)).unwrap();

        let resolved = resolver().resolve(&input, dir.path()).unwrap();

        let expected = dir.path().join(FAVICON_FILE_NAME);
        assert_eq!(resolved, Some(ResolvedTarget::Downloaded(expected.clone())));
        assert_eq!(fs::read(expected).unwrap(), b"\0\0\x01\0icon");
        assert!(server.join().unwrap().starts_with("GET /favicon.ico HTTP/1.1"));
    }

    #[test]
    fn url_file_with_missing_favicon_fails_without_artifact() {
        let (base, server) = serve_once("404 Not Found", b"");
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("site.url");
        fs::write(&input, format!("URL={}/\n", base)).unwrap();

        let err = resolver().resolve(&input, dir.path()).unwrap_err();

        assert!(matches!(err, ExtractError::DownloadStatus { .. }));
        assert!(!dir.path().join(FAVICON_FILE_NAME).exists());
        server.join().unwrap();
    }

    #[test]
    fn unreadable_url_file_is_a_resolution_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolver()
            .resolve(&dir.path().join("missing.url"), dir.path())
            .unwrap_err();
        assert!(matches!(err, ExtractError::ReadUrlFile { .. }));
    }
}
