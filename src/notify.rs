/// How a notice should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Receives user-facing notices: success, nothing-to-do and failure messages.
pub trait NotificationSink {
    fn notify(&self, title: &str, message: &str, severity: Severity);
}

/// Prints notices to stdout, errors to stderr.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn notify(&self, title: &str, message: &str, severity: Severity) {
        match severity {
            Severity::Error => eprintln!("{}: {}", title, message),
            Severity::Info | Severity::Warning => println!("{}: {}", title, message),
        }
    }
}

/// Shows each notice in a native message box.
#[cfg(target_os = "windows")]
#[derive(Debug, Default)]
pub struct DialogSink;

#[cfg(target_os = "windows")]
impl NotificationSink for DialogSink {
    fn notify(&self, title: &str, message: &str, severity: Severity) {
        let level = match severity {
            Severity::Info => rfd::MessageLevel::Info,
            Severity::Warning => rfd::MessageLevel::Warning,
            Severity::Error => rfd::MessageLevel::Error,
        };
        let _ = rfd::MessageDialog::new()
            .set_title(title)
            .set_description(message)
            .set_level(level)
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
    }
}

#[cfg(test)]
pub mod recording {
    use super::*;
    use std::cell::RefCell;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Notice {
        pub title: String,
        pub message: String,
        pub severity: Severity,
    }

    /// Keeps every notice for later assertions.
    #[derive(Default)]
    pub struct RecordingSink {
        pub notices: RefCell<Vec<Notice>>,
    }

    impl NotificationSink for RecordingSink {
        fn notify(&self, title: &str, message: &str, severity: Severity) {
            self.notices.borrow_mut().push(Notice {
                title: title.to_string(),
                message: message.to_string(),
                severity,
            });
        }
    }

    impl RecordingSink {
        pub fn single(&self) -> Notice {
            let notices = self.notices.borrow();
            assert_eq!(notices.len(), 1, "expected exactly one notice: {notices:?}");
            notices[0].clone()
        }
    }
}
