use std::path::Path;

use crate::error::ExtractError;

/// Return the target path recorded in a shell link (`.lnk`).
///
/// The target is not checked for existence here.
#[cfg(target_os = "windows")]
pub fn resolve_shortcut(lnk_path: &Path) -> Result<String, ExtractError> {
    use windows::{
        Win32::System::Com::{
            CLSCTX_INPROC_SERVER, COINIT_APARTMENTTHREADED, CoCreateInstance, IPersistFile,
            STGM_READ,
        },
        Win32::UI::Shell::{IShellLinkW, ShellLink},
        core::{ComInterface, PCWSTR},
    };

    let fail = |reason: String| ExtractError::Shortcut {
        path: lnk_path.to_path_buf(),
        reason,
    };

    let _com = ComApartment::enter(COINIT_APARTMENTTHREADED);

    unsafe {
        let shell_link: IShellLinkW = CoCreateInstance(&ShellLink, None, CLSCTX_INPROC_SERVER)
            .map_err(|e| fail(e.message().to_string()))?;
        let persist_file: IPersistFile = shell_link
            .cast()
            .map_err(|e| fail(e.message().to_string()))?;

        let path_wide: Vec<u16> = lnk_path
            .as_os_str()
            .to_string_lossy()
            .encode_utf16()
            .chain(std::iter::once(0))
            .collect();
        persist_file
            .Load(PCWSTR(path_wide.as_ptr()), STGM_READ)
            .map_err(|e| fail(e.message().to_string()))?;

        let mut buffer = [0u16; 260];
        shell_link
            .GetPath(&mut buffer, std::ptr::null_mut(), 0)
            .map_err(|e| fail(e.message().to_string()))?;

        let target = String::from_utf16_lossy(&buffer)
            .trim_end_matches('\0')
            .to_string();
        log::debug!("Shortcut {} -> '{}'", lnk_path.display(), target);
        Ok(target)
    }
}

#[cfg(not(target_os = "windows"))]
pub fn resolve_shortcut(lnk_path: &Path) -> Result<String, ExtractError> {
    log::debug!("Cannot resolve {} on this platform", lnk_path.display());
    Err(ExtractError::Unsupported("Shortcut resolution"))
}

/// Keeps COM initialised on this thread for as long as it lives.
#[cfg(target_os = "windows")]
struct ComApartment {
    initialized: bool,
}

#[cfg(target_os = "windows")]
impl ComApartment {
    fn enter(model: windows::Win32::System::Com::COINIT) -> Self {
        let initialized = unsafe { windows::Win32::System::Com::CoInitializeEx(None, model) }.is_ok();
        Self { initialized }
    }
}

#[cfg(target_os = "windows")]
impl Drop for ComApartment {
    fn drop(&mut self) {
        if self.initialized {
            unsafe {
                windows::Win32::System::Com::CoUninitialize();
            }
        }
    }
}

/// Write a shell link at `lnk_path` pointing to `target`.
#[cfg(all(test, target_os = "windows"))]
pub fn create_shortcut(lnk_path: &Path, target: &Path) -> windows::core::Result<()> {
    use windows::{
        Win32::Foundation::TRUE,
        Win32::System::Com::{
            CLSCTX_INPROC_SERVER, COINIT_APARTMENTTHREADED, CoCreateInstance, IPersistFile,
        },
        Win32::UI::Shell::{IShellLinkW, ShellLink},
        core::{ComInterface, PCWSTR},
    };

    let wide = |path: &Path| -> Vec<u16> {
        path.as_os_str()
            .to_string_lossy()
            .encode_utf16()
            .chain(std::iter::once(0))
            .collect()
    };
    let (target_wide, lnk_wide) = (wide(target), wide(lnk_path));

    let _com = ComApartment::enter(COINIT_APARTMENTTHREADED);
    unsafe {
        let shell_link: IShellLinkW = CoCreateInstance(&ShellLink, None, CLSCTX_INPROC_SERVER)?;
        shell_link.SetPath(PCWSTR(target_wide.as_ptr()))?;
        let persist_file: IPersistFile = shell_link.cast()?;
        persist_file.Save(PCWSTR(lnk_wide.as_ptr()), TRUE)
    }
}
