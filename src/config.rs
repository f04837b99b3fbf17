use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    version,
    about = "Save the icon of an executable, shortcut, URL shortcut or image as an .ico file."
)]
pub struct Config {
    /// File to take the icon from (.exe, .lnk, .url, .png, .jpg, .jpeg, ...)
    pub file: Option<PathBuf>,

    /// Directory the .ico file is written to
    pub output_dir: Option<PathBuf>,

    /// Report results on the console instead of in message boxes
    #[arg(long)]
    pub console: bool,
}

impl Config {
    /// Both paths, when given on the command line.
    pub fn selection(&self) -> Option<(String, String)> {
        match (&self.file, &self.output_dir) {
            (Some(file), Some(dir)) => Some((
                file.to_string_lossy().into_owned(),
                dir.to_string_lossy().into_owned(),
            )),
            _ => None,
        }
    }

    /// Message boxes and pickers are only available on Windows.
    #[cfg_attr(not(target_os = "windows"), allow(dead_code))]
    pub fn use_dialogs(&self) -> bool {
        cfg!(target_os = "windows") && !self.console
    }
}
