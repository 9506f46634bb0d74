//! Line-oriented audit report.
//!
//! Entries are written to the output as soon as they are pushed, so a stalled
//! backend still leaves everything found so far on screen. They are also
//! kept for inspection once the run ends.

use std::fmt;
use std::io::{self, Write};

const BANNER_WIDTH: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Ok,
    Warn,
    /// A fetch failed after the server was found reachable. Not fatal.
    Error,
    Fatal,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Level::Ok => "OK",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
        };
        write!(f, "[{}]", tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Section banner.
    Section(String),
    /// Classified outcome of one check.
    Finding { level: Level, message: String },
    /// Supporting line printed as-is.
    Detail(String),
}

impl Entry {
    pub fn finding(level: Level, message: impl Into<String>) -> Self {
        Entry::Finding {
            level,
            message: message.into(),
        }
    }

    pub fn detail(line: impl Into<String>) -> Self {
        Entry::Detail(line.into())
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Section(title) => {
                let rule = "=".repeat(BANNER_WIDTH);
                write!(f, "\n{rule}\n{title}\n{rule}")
            }
            Entry::Finding { level, message } => write!(f, "{} {}", level, message),
            Entry::Detail(line) => write!(f, "{}", line),
        }
    }
}

pub struct Report<W: Write> {
    out: W,
    entries: Vec<Entry>,
}

impl<W: Write> Report<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: Entry) -> io::Result<()> {
        writeln!(self.out, "{}", entry)?;
        self.entries.push(entry);
        Ok(())
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = Entry>) -> io::Result<()> {
        for entry in entries {
            self.push(entry)?;
        }
        Ok(())
    }

    /// Findings of `level`, in report order.
    pub fn findings(&self, level: Level) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().filter_map(move |entry| match entry {
            Entry::Finding { level: l, message } if *l == level => Some(message.as_str()),
            _ => None,
        })
    }

    pub fn has_fatal(&self) -> bool {
        self.findings(Level::Fatal).next().is_some()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
