//! Status reporting
//!
//! The pane never looks up a status element itself; callers pass a
//! `StatusReporter` and decide how to show each step.

use serde::Serialize;
use std::fmt;

use crate::transfer::{SinkKind, SourceKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum Status {
    Waiting,
    /// Something is being dragged over the pane
    DragOver,
    Captured(SourceKind),
    Inverting,
    Delivered(SinkKind),
    NoImage(SourceKind),
    Failed(String),
}

impl Status {
    /// User-facing status line
    pub fn message(&self) -> String {
        let text = match self {
            Status::Waiting => "Waiting for an image...",
            Status::DragOver => "Release to process the image",
            Status::Captured(SourceKind::Drop) => "Captured the dropped item, analyzing...",
            Status::Captured(kind) => return format!("Captured image from {}", kind),
            Status::Inverting => "Inverting colors...",
            Status::Delivered(SinkKind::Clipboard) => {
                "Done! The new image is on the clipboard.\nGo back to the document and press Ctrl+V"
            }
            Status::Delivered(SinkKind::HostSelection) => "Done! The selected picture was replaced",
            Status::Delivered(SinkKind::File) => "Done! The inverted image was saved",
            Status::NoImage(SourceKind::Clipboard) => "There is no image on the clipboard!",
            Status::NoImage(SourceKind::Drop) => {
                "That is not an image!\nDrag a picture from the document or a screenshot file."
            }
            Status::NoImage(SourceKind::HostSelection) => "Select a picture in the document first",
            Status::Failed(reason) => return format!("Processing failed: {}", reason),
        };
        text.to_string()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

pub trait StatusReporter {
    fn report(&self, status: &Status);
}

impl<F> StatusReporter for F
where
    F: Fn(&Status),
{
    fn report(&self, status: &Status) {
        self(status)
    }
}

/// Sends every status line to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl StatusReporter for LogReporter {
    fn report(&self, status: &Status) {
        match status {
            Status::Failed(_) => log::error!("{}", status),
            Status::NoImage(_) => log::warn!("{}", status),
            Status::Delivered(_) => log::info!("{}", status),
            _ => log::debug!("{}", status),
        }
    }
}
