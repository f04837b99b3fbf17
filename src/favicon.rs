use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use reqwest::StatusCode;
use reqwest::blocking::Client;
use url::Url;

use crate::error::ExtractError;

/// Name of the artifact written for Internet Shortcut inputs.
pub const FAVICON_FILE_NAME: &str = "favicon.ico";

const CHUNK_SIZE: usize = 1024;

/// Read an Internet Shortcut (`.url`) and return the value of its first `URL=` line.
pub fn read_shortcut_url(path: &Path) -> Result<Option<String>, ExtractError> {
    let bytes = fs::read(path).map_err(|source| ExtractError::ReadUrlFile {
        path: path.to_path_buf(),
        source,
    })?;

    // .url files are frequently written in the ANSI code page
    let content = String::from_utf8_lossy(&bytes);
    Ok(parse_shortcut_url(&content))
}

fn parse_shortcut_url(content: &str) -> Option<String> {
    content
        .lines()
        .find(|line| line.starts_with("URL="))
        .and_then(|line| line.split_once('='))
        .map(|(_, value)| value.trim().to_string())
}

/// `https://example.com/page?q=1` -> `https://example.com/favicon.ico`
pub fn favicon_url(page_url: &str) -> Result<String, ExtractError> {
    let parsed = Url::parse(page_url).map_err(|source| ExtractError::InvalidUrl {
        url: page_url.to_string(),
        source,
    })?;

    if parsed.host_str().is_none() {
        return Err(ExtractError::MissingHost(page_url.to_string()));
    }

    let favicon = parsed
        .join("/favicon.ico")
        .map_err(|source| ExtractError::InvalidUrl {
            url: page_url.to_string(),
            source,
        })?;
    Ok(favicon.to_string())
}

/// Stream `url` into `<output_dir>/favicon.ico`.
///
/// The file is only created once the server answered 200, and it is removed
/// again if the body could not be copied completely.
pub fn download_favicon(
    client: &Client,
    url: &str,
    output_dir: &Path,
) -> Result<PathBuf, ExtractError> {
    log::debug!("Requesting favicon from {}", url);

    let mut response = client
        .get(url)
        .send()
        .map_err(|source| ExtractError::Download {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(ExtractError::DownloadStatus {
            url: url.to_string(),
            status,
        });
    }

    let output_path = output_dir.join(FAVICON_FILE_NAME);
    let written =
        File::create(&output_path).and_then(|mut file| copy_chunked(&mut response, &mut file));

    match written {
        Ok(bytes) => {
            log::debug!("Wrote {} bytes to {}", bytes, output_path.display());
            Ok(output_path)
        }
        Err(source) => {
            let _ = fs::remove_file(&output_path);
            Err(ExtractError::WriteFavicon {
                path: output_path,
                source,
            })
        }
    }
}

fn copy_chunked<R: Read, W: Write>(reader: &mut R, writer: &mut W) -> io::Result<u64> {
    let mut buffer = [0u8; CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buffer[..read])?;
        total += read as u64;
    }
    writer.flush()?;
    Ok(total)
}
