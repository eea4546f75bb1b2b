// src/types.rs

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Output tree a task writes into.
///
/// - `Dev`: the development tree served by `serve`.
/// - `Library`: the isolated component catalog served by `lib`.
/// - `Build`: the production tree produced by `build`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Target {
    Dev,
    Library,
    Build,
}

impl Target {
    /// Suffix appended to task names for this target (`compile-css-general-lib`).
    pub fn task_suffix(self) -> &'static str {
        match self {
            Target::Dev | Target::Build => "",
            Target::Library => "-lib",
        }
    }
}

/// Kind of filesystem event a watch binding reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchEventKind {
    Add,
    Change,
    Unlink,
}

/// Which event kinds a watch binding accepts.
///
/// - `All`: add, change and unlink (the watcher default).
/// - `ChangeOnly`: only content changes of files that already existed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatchEvents {
    #[default]
    All,
    ChangeOnly,
}

impl WatchEvents {
    pub fn accepts(self, kind: WatchEventKind) -> bool {
        match self {
            WatchEvents::All => true,
            WatchEvents::ChangeOnly => kind == WatchEventKind::Change,
        }
    }
}

/// Device profile used when requesting PageSpeed scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Desktop,
    Mobile,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Desktop => "desktop",
            Strategy::Mobile => "mobile",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "desktop" => Ok(Strategy::Desktop),
            "mobile" => Ok(Strategy::Mobile),
            other => Err(format!(
                "invalid strategy: {other} (expected \"desktop\" or \"mobile\")"
            )),
        }
    }
}
