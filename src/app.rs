//! Process-level application identity.

use std::fmt;
use uuid::Uuid;

/// How this process is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// One-shot command line invocation
    Cli,
    /// Long-running network node
    Node,
}

impl fmt::Display for AppMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Node => write!(f, "Node"),
        }
    }
}

/// Identity of the running process, assigned once at startup.
#[derive(Debug, Clone)]
pub struct AppInfo {
    pub id: Uuid,
    pub name: &'static str,
    pub version: &'static str,
    pub mode: AppMode,
}

impl AppInfo {
    pub fn new(mode: AppMode) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            mode,
        }
    }
}
