mod app;
mod config;
mod error;
mod favicon;
#[cfg(target_os = "windows")]
mod gdi;
mod icon_extractor;
mod notify;
mod producer;
mod resolver;
mod shortcut;
#[cfg(test)]
mod test_support;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use app::{App, Outcome};
use config::Config;
use notify::{ConsoleSink, NotificationSink};
use resolver::Resolver;

fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let config = Config::parse();
    log::debug!("Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let resolver = Resolver::new().context("Failed to create HTTP client")?;

    let console = ConsoleSink;
    #[cfg(target_os = "windows")]
    let dialogs = notify::DialogSink;
    #[cfg(target_os = "windows")]
    let sink: &dyn NotificationSink = if config.use_dialogs() { &dialogs } else { &console };
    #[cfg(not(target_os = "windows"))]
    let sink: &dyn NotificationSink = &console;

    let mut app = App::new(sink, resolver);

    if let Some((file_path, output_dir)) = config.selection() {
        app.file_path = file_path;
        app.output_dir = output_dir;
        let outcome = app.extract_icon();
        return Ok(exit_code(&outcome));
    }

    run_interactive(&mut app, &config)
}

/// Pick, extract, repeat until a picker is cancelled.
#[cfg(target_os = "windows")]
fn run_interactive(app: &mut App<'_>, config: &Config) -> anyhow::Result<ExitCode> {
    let mut last = ExitCode::SUCCESS;
    let mut preset_file = config.file.clone();
    let mut preset_dir = config.output_dir.clone();

    loop {
        let Some(file) = preset_file.take().or_else(app::pick_file) else {
            break;
        };
        let Some(dir) = preset_dir.take().or_else(app::pick_output_dir) else {
            break;
        };

        app.file_path = file.to_string_lossy().into_owned();
        app.output_dir = dir.to_string_lossy().into_owned();
        last = exit_code(&app.extract_icon());
    }

    Ok(last)
}

#[cfg(not(target_os = "windows"))]
fn run_interactive(app: &mut App<'_>, config: &Config) -> anyhow::Result<ExitCode> {
    // No pickers here: an incomplete selection is reported like an empty form.
    if let Some(file) = &config.file {
        app.file_path = file.to_string_lossy().into_owned();
    }
    if let Some(dir) = &config.output_dir {
        app.output_dir = dir.to_string_lossy().into_owned();
    }
    Ok(exit_code(&app.extract_icon()))
}

fn exit_code(outcome: &Outcome) -> ExitCode {
    if outcome.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
