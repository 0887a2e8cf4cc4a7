use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::InvertError;
use crate::transfer::{SinkKind, SourceKind};

/// Office application hosting the pane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Host {
    Word,
    PowerPoint,
    Excel,
    #[default]
    Unknown,
}

impl Host {
    pub fn is_office(self) -> bool {
        !matches!(self, Host::Unknown)
    }

    /// Word works on the selected picture; PowerPoint and Excel default to paste/drop
    pub fn default_source(self) -> SourceKind {
        match self {
            Host::Word => SourceKind::HostSelection,
            Host::PowerPoint | Host::Excel | Host::Unknown => SourceKind::Clipboard,
        }
    }

    pub fn default_sink(self) -> SinkKind {
        match self.default_source() {
            SourceKind::HostSelection => SinkKind::HostSelection,
            SourceKind::Clipboard | SourceKind::Drop => SinkKind::Clipboard,
        }
    }

    /// Every Office host can read a selected picture; without a host there is no selection
    pub fn accepts(self, source: SourceKind) -> bool {
        match source {
            SourceKind::HostSelection => self.is_office(),
            SourceKind::Clipboard | SourceKind::Drop => true,
        }
    }
}

impl FromStr for Host {
    type Err = InvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "word" => Ok(Host::Word),
            "powerpoint" | "ppt" => Ok(Host::PowerPoint),
            "excel" => Ok(Host::Excel),
            "" | "unknown" => Ok(Host::Unknown),
            other => Err(InvertError::InvalidParameter(format!("unknown host: {}", other))),
        }
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Host::Word => "Word",
            Host::PowerPoint => "PowerPoint",
            Host::Excel => "Excel",
            Host::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}
