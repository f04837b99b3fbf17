use std::path::{Path, PathBuf};

use crate::error::ExtractError;
use crate::notify::{NotificationSink, Severity};
use crate::producer::{self, ProducedBy};
use crate::resolver::Resolver;

/// Icon resource index used for every extraction; not selectable yet.
pub const DEFAULT_ICON_INDEX: i32 = 0;

/// How one extraction attempt ended.
#[derive(Debug)]
pub enum Outcome {
    /// Exactly one `.ico` was written at `path`.
    Produced { path: PathBuf, by: ProducedBy },
    /// The input asked for nothing (an Internet Shortcut without a `URL=` line).
    NotApplicable(String),
    /// Terminal failure; no artifact was written.
    Failed(ExtractError),
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

/// The single screen: the two selected paths and where notices go.
pub struct App<'a> {
    pub file_path: String,
    pub output_dir: String,
    pub icon_index: i32,
    sink: &'a dyn NotificationSink,
    resolver: Resolver,
}

impl<'a> App<'a> {
    pub fn new(sink: &'a dyn NotificationSink, resolver: Resolver) -> Self {
        Self {
            file_path: String::new(),
            output_dir: String::new(),
            icon_index: DEFAULT_ICON_INDEX,
            sink,
            resolver,
        }
    }

    /// Run one extraction for the current selection and report the result.
    ///
    /// Never panics or returns an error; every failure becomes `Outcome::Failed`.
    pub fn extract_icon(&self) -> Outcome {
        let outcome = self.run();
        self.report(&outcome);
        outcome
    }

    fn run(&self) -> Outcome {
        let (file_path, output_dir) = (self.file_path.trim(), self.output_dir.trim());
        if file_path.is_empty() || output_dir.is_empty() {
            return Outcome::Failed(ExtractError::MissingSelection);
        }
        let (input, output_dir) = (Path::new(file_path), Path::new(output_dir));

        let target = match self.resolver.resolve(input, output_dir) {
            Ok(Some(target)) => target,
            Ok(None) => {
                return Outcome::NotApplicable(format!(
                    "No URL= entry found in {}",
                    input.display()
                ));
            }
            Err(e) => return Outcome::Failed(e),
        };

        match producer::produce(&target, output_dir, self.icon_index) {
            Ok((path, by)) => Outcome::Produced { path, by },
            Err(e) => Outcome::Failed(e),
        }
    }

    fn report(&self, outcome: &Outcome) {
        match outcome {
            Outcome::Produced { path, by } => {
                let message = success_message(path, *by);
                log::info!("{}", message);
                self.sink.notify("Success", &message, Severity::Info);
            }
            Outcome::NotApplicable(reason) => {
                log::warn!("Nothing to do: {}", reason);
                self.sink.notify("Nothing to do", reason, Severity::Warning);
            }
            Outcome::Failed(e) => {
                log::error!("{}", e);
                self.sink.notify("Error", &e.to_string(), Severity::Error);
            }
        }
    }
}

fn success_message(path: &Path, by: ProducedBy) -> String {
    match by {
        ProducedBy::Raster => format!("Icon created at {}", path.display()),
        ProducedBy::Native => format!("Icon extracted to {}", path.display()),
        ProducedBy::Favicon => format!("Favicon downloaded to {}", path.display()),
    }
}

/// Ask for the input file; `None` when the dialog is cancelled.
#[cfg(target_os = "windows")]
pub fn pick_file() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Select File")
        .add_filter("Executable Files", &["exe", "lnk", "url", "png", "jpeg", "jpg"])
        .pick_file()
}

/// Ask for the output directory; `None` when the dialog is cancelled.
#[cfg(target_os = "windows")]
pub fn pick_output_dir() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Select Output Directory")
        .pick_folder()
}
