//! User-facing notices
//!
//! Every store mutation, failed generation and export attempt produces a
//! short notice for the person driving the studio. Notices never carry
//! internal error details; those go to the log.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Destructive,
}

/// A title plus optional description shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub level: NoticeLevel,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: Some(description.into()),
            level: NoticeLevel::Info,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: Some(description.into()),
            level: NoticeLevel::Destructive,
        }
    }

    pub fn is_destructive(&self) -> bool {
        self.level == NoticeLevel::Destructive
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Destructive => "error",
        };
        match &self.description {
            Some(desc) => write!(f, "[{}] {}: {}", tag, self.title, desc),
            None => write!(f, "[{}] {}", tag, self.title),
        }
    }
}
