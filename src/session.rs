//! Front-end contract: the selected input file and the two user actions.
//!
//! A front end (window, command line, test harness) implements [`Frontend`]
//! to provide file pickers and to display notifications. [`Session`] holds the
//! only piece of state, the currently selected input path, and turns each
//! action into a [`Notification`]. Failed conversions are reported, never
//! propagated, so the front end can keep running and the user can retry.

use std::fmt;
use std::path::{Path, PathBuf};

use log::{error, info};

use crate::config::RenderConfig;
use crate::pipeline::{self, suggested_output_path};

/// Name shown by front ends.
pub const APP_TITLE: &str = "Kindle Highlights Extractor";

/// Services a front end supplies to a [`Session`].
pub trait Frontend {
    /// Asks the user for an input file. `None` means the picker was dismissed.
    fn choose_input(&mut self) -> Option<PathBuf>;

    /// Asks the user where to save the PDF, starting from `suggested`.
    fn choose_output(&mut self, suggested: &Path) -> Option<PathBuf>;

    /// Shows a notification to the user.
    fn notify(&mut self, notification: &Notification);
}

/// How prominently a notification should be presented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    /// Informational message.
    Info,
    /// The action was refused.
    Warning,
    /// The action failed.
    Error,
}

/// Outcome of a user action, ready to be shown in a modal notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    /// The PDF was written.
    Converted {
        /// Path of the written file.
        output: PathBuf,
    },
    /// The user dismissed the save picker; nothing was written.
    SaveCancelled,
    /// Conversion was requested before an input file was selected.
    NoInputSelected,
    /// The conversion failed with the given message.
    Failed {
        /// Display text of the error.
        message: String,
    },
}

impl Notification {
    /// Severity used to present the notification.
    pub fn severity(&self) -> Severity {
        match self {
            Self::Converted { .. } | Self::SaveCancelled => Severity::Info,
            Self::NoInputSelected => Severity::Warning,
            Self::Failed { .. } => Severity::Error,
        }
    }

    /// Short title of the notification dialog.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Converted { .. } => "Success",
            Self::SaveCancelled => "Cancelled",
            Self::NoInputSelected => "Warning",
            Self::Failed { .. } => "Error",
        }
    }

    /// Body text of the notification dialog.
    pub fn message(&self) -> String {
        match self {
            Self::Converted { output } => format!("File generated: {}", output.display()),
            Self::SaveCancelled => "Save cancelled.".to_owned(),
            Self::NoInputSelected => "Please select a file first.".to_owned(),
            Self::Failed { message } => format!("An error occurred: {message}"),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title(), self.message())
    }
}

/// Per-user state of a front end.
#[derive(Clone, Debug, Default)]
pub struct Session {
    selected: Option<PathBuf>,
    config: RenderConfig,
}

impl Session {
    /// Creates a session with nothing selected.
    pub fn new(config: RenderConfig) -> Self {
        Self {
            selected: None,
            config,
        }
    }

    /// Returns the currently selected input file.
    pub fn selected(&self) -> Option<&Path> {
        self.selected.as_deref()
    }

    /// Returns whether the convert action is available.
    pub fn can_convert(&self) -> bool {
        self.selected.is_some()
    }

    /// Runs the "select input file" action.
    ///
    /// The new choice replaces the previous one; a dismissed picker clears it.
    /// Returns whether the convert action is now available.
    pub fn select_input<F: Frontend + ?Sized>(&mut self, frontend: &mut F) -> bool {
        self.selected = frontend.choose_input();
        match &self.selected {
            Some(path) => info!("Selected {}", path.display()),
            None => info!("No file selected"),
        }
        self.can_convert()
    }

    /// Runs the "convert" action and reports the outcome through `frontend`.
    pub fn convert<F: Frontend + ?Sized>(&self, frontend: &mut F) -> Notification {
        let notification = self.run_conversion(frontend);
        frontend.notify(&notification);
        notification
    }

    fn run_conversion<F: Frontend + ?Sized>(&self, frontend: &mut F) -> Notification {
        let Some(input) = self.selected.as_deref() else {
            return Notification::NoInputSelected;
        };

        let suggested = suggested_output_path(input);
        let Some(output) = frontend.choose_output(&suggested) else {
            return Notification::SaveCancelled;
        };

        match pipeline::convert(input, &output, &self.config) {
            Ok(conversion) => Notification::Converted {
                output: conversion.output,
            },
            Err(err) => {
                error!("Conversion of {} failed: {}", input.display(), err);
                Notification::Failed {
                    message: err.to_string(),
                }
            }
        }
    }
}
