use std::path::Path;

use image::RgbaImage;

use crate::error::ExtractError;

/// Edge length of the square bitmap a native icon is drawn into.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
pub const RENDER_SIZE: u32 = 256;

/// Extract icon `icon_index` from a binary and draw it at `RENDER_SIZE`.
#[cfg(target_os = "windows")]
pub fn extract_icon(path: &Path, icon_index: i32) -> Result<RgbaImage, ExtractError> {
    let (large, _small) = extract_icon_handles(path, icon_index)?;
    let img = render_icon(&large, RENDER_SIZE)?;
    log::debug!(
        "Icon OK: '{}' ({}x{}) [index {}]",
        path.display(),
        img.width(),
        img.height(),
        icon_index
    );
    Ok(img)
}

#[cfg(not(target_os = "windows"))]
pub fn extract_icon(path: &Path, icon_index: i32) -> Result<RgbaImage, ExtractError> {
    log::debug!(
        "Cannot extract icon {} from {} on this platform",
        icon_index,
        path.display()
    );
    Err(ExtractError::Unsupported("Native icon extraction"))
}

#[cfg(target_os = "windows")]
fn extract_icon_handles(
    path: &Path,
    icon_index: i32,
) -> Result<(crate::gdi::OwnedIcon, crate::gdi::OwnedIcon), ExtractError> {
    use crate::gdi::OwnedIcon;
    use windows::Win32::UI::Shell::ExtractIconExW;
    use windows::Win32::UI::WindowsAndMessaging::HICON;
    use windows::core::PCWSTR;

    let wide_path = to_wide(path);
    let mut large = HICON::default();
    let mut small = HICON::default();

    let count = unsafe {
        ExtractIconExW(
            PCWSTR(wide_path.as_ptr()),
            icon_index,
            Some(&mut large as *mut HICON),
            Some(&mut small as *mut HICON),
            1,
        )
    };

    // Wrap before checking so both handles are released on every path.
    let large = OwnedIcon { hicon: large };
    let small = OwnedIcon { hicon: small };

    if count == 0 || count == u32::MAX || !large.is_valid() {
        return Err(ExtractError::NoIcons {
            path: path.to_path_buf(),
            index: icon_index,
        });
    }

    Ok((large, small))
}

#[cfg(target_os = "windows")]
fn to_wide(path: &Path) -> Vec<u16> {
    use std::os::windows::ffi::OsStrExt;

    path.as_os_str()
        .encode_wide()
        .chain(std::iter::once(0))
        .collect()
}

/// Draw `icon` into a `size`×`size` DIB and read it back as RGBA.
#[cfg(target_os = "windows")]
fn render_icon(icon: &crate::gdi::OwnedIcon, size: u32) -> Result<RgbaImage, ExtractError> {
    use crate::gdi::{DibSection, MemoryDc, ScreenDc, Selection, bitmap_info};
    use windows::Win32::Graphics::Gdi::{BITMAP, DIB_RGB_COLORS, GetDIBits, GetObjectW};
    use windows::Win32::UI::WindowsAndMessaging::{DI_NORMAL, DrawIconEx};

    let screen = ScreenDc::acquire()?;
    let memory = MemoryDc::compatible_with(&screen)?;
    let bitmap = DibSection::square(&memory, size)?;

    {
        let _selected = Selection::select(&memory, &bitmap);
        unsafe {
            DrawIconEx(
                memory.hdc,
                0,
                0,
                icon.hicon,
                size as i32,
                size as i32,
                0,
                None,
                DI_NORMAL,
            )
        }
        .map_err(|e| ExtractError::Graphics(format!("DrawIconEx failed: {}", e)))?;
    }

    let mut info = BITMAP::default();
    let copied = unsafe {
        GetObjectW(
            bitmap.hbitmap,
            std::mem::size_of::<BITMAP>() as i32,
            Some(&mut info as *mut BITMAP as *mut _),
        )
    };
    if copied == 0 || info.bmWidth <= 0 || info.bmHeight == 0 {
        return Err(ExtractError::Graphics("GetObjectW failed".into()));
    }
    let width = info.bmWidth as u32;
    let height = info.bmHeight.unsigned_abs();

    let mut bmi = bitmap_info(bitmap.size);
    let mut pixels = vec![0u8; (width * height * 4) as usize];
    let lines = unsafe {
        GetDIBits(
            memory.hdc,
            bitmap.hbitmap,
            0,
            height,
            Some(pixels.as_mut_ptr() as *mut _),
            &mut bmi,
            DIB_RGB_COLORS,
        )
    };
    if lines == 0 {
        return Err(ExtractError::Graphics("GetDIBits failed".into()));
    }

    bgra_to_rgba(width, height, pixels)
        .ok_or_else(|| ExtractError::Graphics("bitmap buffer size mismatch".into()))
}

/// Reinterpret a top-down BGRA buffer as an RGBA image.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
pub fn bgra_to_rgba(width: u32, height: u32, mut pixels: Vec<u8>) -> Option<RgbaImage> {
    for px in pixels.chunks_exact_mut(4) {
        px.swap(0, 2);
    }
    RgbaImage::from_raw(width, height, pixels)
}
