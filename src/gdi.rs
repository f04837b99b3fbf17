//! Owned wrappers for the GDI and USER handles used while rendering an icon.
//!
//! Each wrapper releases its handle in `Drop`, so early returns cannot leak.

use std::ffi::c_void;

use windows::Win32::Foundation::HWND;
use windows::Win32::Graphics::Gdi::{
    BI_RGB, BITMAPINFO, BITMAPINFOHEADER, CreateCompatibleDC, CreateDIBSection, CreatedHDC,
    DIB_RGB_COLORS, DeleteDC, DeleteObject, GetDC, HBITMAP, HDC, HGDIOBJ, ReleaseDC, SelectObject,
};
use windows::Win32::UI::WindowsAndMessaging::{DestroyIcon, HICON};

use crate::error::ExtractError;

/// An icon handle returned by the shell, destroyed on drop.
#[derive(Debug)]
pub struct OwnedIcon {
    pub hicon: HICON,
}

impl OwnedIcon {
    pub fn is_valid(&self) -> bool {
        !self.hicon.is_invalid()
    }
}

impl Drop for OwnedIcon {
    fn drop(&mut self) {
        if !self.hicon.is_invalid() {
            unsafe {
                let _ = DestroyIcon(self.hicon);
            }
        }
    }
}

/// The screen device context, released on drop.
pub struct ScreenDc {
    pub hdc: HDC,
}

impl ScreenDc {
    pub fn acquire() -> Result<Self, ExtractError> {
        let hdc = unsafe { GetDC(HWND::default()) };
        if hdc.is_invalid() {
            return Err(ExtractError::Graphics("GetDC failed".into()));
        }
        Ok(Self { hdc })
    }
}

impl Drop for ScreenDc {
    fn drop(&mut self) {
        unsafe {
            let _ = ReleaseDC(HWND::default(), self.hdc);
        }
    }
}

/// A memory device context compatible with the screen, deleted on drop.
pub struct MemoryDc {
    pub hdc: CreatedHDC,
}

impl MemoryDc {
    pub fn compatible_with(screen: &ScreenDc) -> Result<Self, ExtractError> {
        let hdc = unsafe { CreateCompatibleDC(screen.hdc) };
        if hdc.is_invalid() {
            return Err(ExtractError::Graphics("CreateCompatibleDC failed".into()));
        }
        Ok(Self { hdc })
    }
}

impl Drop for MemoryDc {
    fn drop(&mut self) {
        unsafe {
            let _ = DeleteDC(self.hdc);
        }
    }
}

/// A square, top-down, 32-bit DIB section, deleted on drop.
pub struct DibSection {
    pub hbitmap: HBITMAP,
    pub size: u32,
}

impl DibSection {
    pub fn square(dc: &MemoryDc, size: u32) -> Result<Self, ExtractError> {
        let bmi = bitmap_info(size);
        let mut bits: *mut c_void = std::ptr::null_mut();
        let hbitmap = unsafe { CreateDIBSection(dc.hdc, &bmi, DIB_RGB_COLORS, &mut bits, None, 0) }
            .map_err(|e| ExtractError::Graphics(format!("CreateDIBSection failed: {}", e)))?;

        if !bits.is_null() {
            // Start fully transparent so output does not depend on leftover memory.
            unsafe {
                std::ptr::write_bytes(bits as *mut u8, 0, (size * size * 4) as usize);
            }
        }

        Ok(Self { hbitmap, size })
    }
}

impl Drop for DibSection {
    fn drop(&mut self) {
        unsafe {
            let _ = DeleteObject(self.hbitmap);
        }
    }
}

/// Selects a bitmap into a memory DC and restores the previous object on drop.
///
/// Borrows both so the selection always ends before either is destroyed.
pub struct Selection<'a> {
    dc: &'a MemoryDc,
    previous: HGDIOBJ,
}

impl<'a> Selection<'a> {
    pub fn select(dc: &'a MemoryDc, bitmap: &'a DibSection) -> Self {
        let previous = unsafe { SelectObject(dc.hdc, bitmap.hbitmap) };
        Self { dc, previous }
    }
}

impl Drop for Selection<'_> {
    fn drop(&mut self) {
        unsafe {
            let _ = SelectObject(self.dc.hdc, self.previous);
        }
    }
}

/// Header describing a top-down 32 bpp BGRA bitmap of `size`×`size`.
pub fn bitmap_info(size: u32) -> BITMAPINFO {
    BITMAPINFO {
        bmiHeader: BITMAPINFOHEADER {
            biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
            biWidth: size as i32,
            biHeight: -(size as i32), // Top-down DIB
            biPlanes: 1,
            biBitCount: 32,
            biCompression: BI_RGB.0,
            biSizeImage: 0,
            biXPelsPerMeter: 0,
            biYPelsPerMeter: 0,
            biClrUsed: 0,
            biClrImportant: 0,
        },
        bmiColors: [Default::default()],
    }
}
