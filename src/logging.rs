//! Terminal logging for the learners.
//! Every message is tagged (`[LOG]`, `[FIN]`, `[WRN]`, ...) and printed
//! only when the configured [`Verbosity`] asks for it.
use colored::Colorize;
use serde::{Serialize, Deserialize};

use std::fmt;


const TAG_WIDTH: usize = 12;


/// How much a learner prints while it runs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default,
    Serialize, Deserialize,
)]
pub enum Verbosity {
    /// Print nothing, not even warnings.
    Silent,
    /// Warnings, plus one line per finished model.
    #[default]
    Progress,
    /// Also one line per split decision.
    Detailed,
    /// Also every scored candidate.
    All,
}


impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Silent => "silent",
            Self::Progress => "progress",
            Self::Detailed => "detailed",
            Self::All => "all",
        };
        write!(f, "{name}")
    }
}


/// A tagged logger. `Logger` is `Copy`,
/// so each learner keeps its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Logger {
    verbosity: Verbosity,
    source: &'static str,
}


impl Logger {
    /// Construct a logger that prefixes its messages with `source`.
    pub fn new(source: &'static str, verbosity: Verbosity) -> Self {
        Self { verbosity, source }
    }


    /// The configured verbosity.
    #[inline]
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }


    #[inline]
    pub(crate) fn enabled(&self, level: Verbosity) -> bool {
        self.verbosity != Verbosity::Silent && self.verbosity >= level
    }


    /// One line of progress, e.g., a finished tree.
    pub fn progress<D: fmt::Display>(&self, message: D) {
        if self.enabled(Verbosity::Progress) {
            println!(
                "{} {} {message}",
                "[LOG]".bold().magenta(),
                format!("{:>TAG_WIDTH$}", self.source).blue(),
            );
        }
    }


    /// Per-node details.
    pub fn detail<D: fmt::Display>(&self, message: D) {
        if self.enabled(Verbosity::Detailed) {
            println!(
                "{} {} {message}",
                "[DBG]".bold().cyan(),
                format!("{:>TAG_WIDTH$}", self.source).blue(),
            );
        }
    }


    /// Per-candidate traces.
    pub fn trace<D: fmt::Display>(&self, message: D) {
        if self.enabled(Verbosity::All) {
            println!(
                "{} {} {message}",
                "[ALL]".dimmed(),
                format!("{:>TAG_WIDTH$}", self.source).blue(),
            );
        }
    }


    /// A recoverable anomaly. Printed on `stderr`.
    pub fn warn<D: fmt::Display>(&self, message: D) {
        if self.enabled(Verbosity::Progress) {
            eprintln!(
                "{} {} {message}",
                "[WRN]".bold().yellow(),
                format!("{:>TAG_WIDTH$}", self.source).blue(),
            );
        }
    }


    /// The final line of a training run.
    pub fn finish<D: fmt::Display>(&self, message: D, millisec: u128) {
        if self.enabled(Verbosity::Progress) {
            println!(
                "{} {} {message} {}",
                "[FIN]".bold().bright_green(),
                format!("{:>TAG_WIDTH$}", self.source).blue(),
                time_format(millisec).bold().cyan(),
            );
        }
    }
}


pub(crate) fn time_format(millisec: u128) -> String {
    if millisec < 1_000 {
        return format!("  0.{millisec:0>3}s");
    }
    let sec = millisec / 1_000;
    let millisec = millisec % 1_000;
    if sec < 60 {
        return format!(" {sec:0>2}.{millisec:0>3}s");
    }
    let min = sec / 60;
    let sec = sec % 60;
    if min < 60 {
        return format!(" {min:0>2}m {sec:0>2}s");
    }
    let hours = min / 60;
    let min = min % 60;
    format!(" {hours:0>2}h {min:0>2}m")
}
