use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::codecs::ico::{IcoEncoder, IcoFrame};
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageFormat, RgbaImage};

use crate::error::ExtractError;
use crate::icon_extractor;
use crate::resolver::{ResolvedTarget, is_raster_image};

/// Square sizes written for raster inputs, largest first.
pub const RASTER_ICON_SIZES: [u32; 6] = [256, 128, 64, 48, 32, 16];

/// Which branch produced an artifact; selects the success wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducedBy {
    Raster,
    Native,
    Favicon,
}

/// Turn a resolved target into exactly one `.ico` inside `output_dir`.
pub fn produce(
    target: &ResolvedTarget,
    output_dir: &Path,
    icon_index: i32,
) -> Result<(PathBuf, ProducedBy), ExtractError> {
    match target {
        ResolvedTarget::Downloaded(path) => Ok((path.clone(), ProducedBy::Favicon)),
        ResolvedTarget::Remote(url) => Err(ExtractError::RemoteTarget(url.clone())),
        ResolvedTarget::Local(path) if is_raster_image(path) => {
            convert_image_to_icon(path, output_dir).map(|p| (p, ProducedBy::Raster))
        }
        ResolvedTarget::Local(path) => {
            extract_native_icon(path, output_dir, icon_index).map(|p| (p, ProducedBy::Native))
        }
    }
}

/// Decode a PNG/JPEG and write it as a six-size icon named after the source.
pub fn convert_image_to_icon(
    image_path: &Path,
    output_dir: &Path,
) -> Result<PathBuf, ExtractError> {
    if !image_path.is_file() {
        return Err(ExtractError::NotFound(image_path.to_path_buf()));
    }

    let image_error = |source| ExtractError::Image {
        path: image_path.to_path_buf(),
        source,
    };

    let img = image::open(image_path).map_err(image_error)?.to_rgba8();
    log::debug!(
        "Decoded {} ({}x{})",
        image_path.display(),
        img.width(),
        img.height()
    );

    let frames = RASTER_ICON_SIZES
        .iter()
        .map(|&size| {
            let square = fit_square(&img, size);
            IcoFrame::as_png(square.as_raw(), size, size, ExtendedColorType::Rgba8)
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(image_error)?;

    let stem = image_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "icon".to_string());
    let icon_path = output_dir.join(format!("{}.ico", stem));

    let mut encoded = Vec::new();
    IcoEncoder::new(&mut encoded)
        .encode_images(&frames)
        .map_err(image_error)?;

    write_icon(icon_path, &encoded)
}

/// Write the encoded container, leaving no partial file behind on failure.
fn write_icon(icon_path: PathBuf, encoded: &[u8]) -> Result<PathBuf, ExtractError> {
    if let Err(source) = fs::write(&icon_path, encoded) {
        let _ = fs::remove_file(&icon_path);
        return Err(ExtractError::WriteIcon {
            path: icon_path,
            source,
        });
    }
    Ok(icon_path)
}

/// Scale `img` to fit inside `size`×`size`, centred on a transparent canvas.
fn fit_square(img: &RgbaImage, size: u32) -> RgbaImage {
    let (width, height) = img.dimensions();
    let longest = width.max(height).max(1) as f64;
    let scaled = |side: u32| ((side as f64 * size as f64 / longest).round() as u32).clamp(1, size);
    let (fit_w, fit_h) = (scaled(width), scaled(height));

    let resized = imageops::resize(img, fit_w, fit_h, FilterType::Lanczos3);
    if fit_w == size && fit_h == size {
        return resized;
    }

    let mut canvas = RgbaImage::new(size, size);
    imageops::replace(
        &mut canvas,
        &resized,
        ((size - fit_w) / 2) as i64,
        ((size - fit_h) / 2) as i64,
    );
    canvas
}

/// Render a binary's embedded icon and save it as a single 256×256 entry.
pub fn extract_native_icon(
    target: &Path,
    output_dir: &Path,
    icon_index: i32,
) -> Result<PathBuf, ExtractError> {
    if !target.is_file() {
        return Err(ExtractError::NotFound(target.to_path_buf()));
    }

    let img = icon_extractor::extract_icon(target, icon_index)?;

    let file_name = target
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "icon".to_string());
    let icon_path = output_dir.join(format!("{}.ico", file_name));

    let mut encoded = Cursor::new(Vec::new());
    img.write_to(&mut encoded, ImageFormat::Ico)
        .map_err(|source| ExtractError::EncodeIcon {
            path: target.to_path_buf(),
            source,
        })?;

    write_icon(icon_path, encoded.get_ref())
}
