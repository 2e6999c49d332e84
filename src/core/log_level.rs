//! Log level definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    #[default]
    Info = 2,
    Warning = 3,
    Error = 4,
    Critical = 5,
}

impl LogLevel {
    /// All levels, lowest first
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Critical,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }

    /// Emoji marker shown inside the level bracket
    pub fn emoji(&self) -> &'static str {
        match self {
            LogLevel::Trace => "👀",
            LogLevel::Debug => "🔍",
            LogLevel::Info => "🔥",
            LogLevel::Warning => "😤",
            LogLevel::Error => "💀",
            LogLevel::Critical => "☠️",
        }
    }

    /// Short label shown next to the emoji and used as the JSON `level` value
    pub fn label(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "err",
            LogLevel::Critical => "crit",
        }
    }

    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Trace => Cyan,
            LogLevel::Debug => Blue,
            LogLevel::Info => Green,
            LogLevel::Warning => Yellow,
            LogLevel::Error => Red,
            LogLevel::Critical => BrightRed,
        }
    }

    /// Recover the level from an already formatted text line
    ///
    /// Looks for the `[emoji ` level bracket; when several brackets match
    /// (an emoji repeated inside the message) the earliest one wins.
    pub fn from_formatted(line: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .filter_map(|level| {
                let marker = format!("[{} ", level.emoji());
                line.find(&marker).map(|pos| (pos, *level))
            })
            .min_by_key(|(pos, _)| *pos)
            .map(|(_, level)| level)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" | "INFORMATION" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warning),
            "ERR" | "ERROR" => Ok(LogLevel::Error),
            "CRIT" | "CRITICAL" | "FATAL" => Ok(LogLevel::Critical),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}
