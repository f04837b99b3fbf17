use std::io::{BufRead, BufReader, Cursor, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use image::{Rgba, RgbaImage};
use reqwest::blocking::Client;

/// Answer exactly one HTTP request with `status` and `body`.
///
/// Returns the base URL (`http://127.0.0.1:<port>`) and a handle yielding the
/// request line the server received.
pub fn serve_once(status: &'static str, body: &'static [u8]) -> (String, JoinHandle<String>) {
    serve_once_after(Duration::ZERO, status, body)
}

/// Like `serve_once`, but hold the response back for `delay` after reading the request.
pub fn serve_once_after(
    delay: Duration,
    status: &'static str,
    body: &'static [u8],
) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();
        loop {
            let mut header = String::new();
            let read = reader.read_line(&mut header).unwrap();
            if read == 0 || header == "\r\n" {
                break;
            }
        }
        thread::sleep(delay);

        // The client may hang up early on error statuses; that is not a test failure.
        let _ = write!(
            stream,
            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            status,
            body.len()
        );
        let _ = stream.write_all(body);
        let _ = stream.flush();
        request_line
    });

    (format!("http://{}", addr), handle)
}

pub fn test_client() -> Client {
    Client::builder().no_proxy().build().unwrap()
}

/// A non-square gradient with a transparent corner, saved in the format implied by `name`.
pub fn write_sample_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        if x < width / 4 && y < height / 4 {
            Rgba([0, 0, 0, 0])
        } else {
            Rgba([(x * 255 / width) as u8, (y * 255 / height) as u8, 128, 255])
        }
    });

    let path = dir.join(name);
    if name.ends_with(".png") {
        img.save(&path).unwrap();
    } else {
        image::DynamicImage::ImageRgba8(img).to_rgb8().save(&path).unwrap();
    }
    path
}

/// Square sizes listed in an ICO directory, in file order.
///
/// Every entry must also decode, so a passing call means the bytes are a
/// usable icon container.
pub fn ico_directory_sizes(bytes: &[u8]) -> Vec<u32> {
    let icon_dir = ico::IconDir::read(Cursor::new(bytes)).unwrap();
    assert_eq!(icon_dir.resource_type(), ico::ResourceType::Icon);

    icon_dir
        .entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            assert_eq!(entry.width(), entry.height(), "non-square entry {i}");
            let image = entry.decode().unwrap();
            assert_eq!((image.width(), image.height()), (entry.width(), entry.height()));
            entry.width()
        })
        .collect()
}
