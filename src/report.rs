use crate::result::Result;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Sink for progress messages emitted while packaging.
///
/// Reporting is best effort. Implementations swallow their own write
/// failures.
pub trait Reporter {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
}

impl<R: Reporter + ?Sized> Reporter for Box<R> {
    fn debug(&self, message: &str) {
        (**self).debug(message)
    }

    fn info(&self, message: &str) {
        (**self).info(message)
    }
}

/// Terminal output through cliclack. Debug lines only show when verbose.
pub struct Console {
    verbose: bool,
}

impl Console {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Reporter for Console {
    fn debug(&self, message: &str) {
        if self.verbose {
            let _ = cliclack::log::remark(message);
        }
    }

    fn info(&self, message: &str) {
        let _ = cliclack::log::info(message);
    }
}

/// Discards everything
pub struct Silent;

impl Reporter for Silent {
    fn debug(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
}

/// Appends every message, debug included, to a log file.
pub struct LogFile {
    file: File,
}

impl LogFile {
    pub fn create(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file })
    }

    fn write(&self, level: &str, message: &str) {
        let timestamp = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();
        let mut file = &self.file;
        let _ = writeln!(file, "{timestamp} {level:<5} {message}");
    }
}

impl Reporter for LogFile {
    fn debug(&self, message: &str) {
        self.write("DEBUG", message);
    }

    fn info(&self, message: &str) {
        self.write("INFO", message);
    }
}

/// Forwards each message to two reporters.
pub struct Tee<A, B> {
    first: A,
    second: B,
}

impl<A: Reporter, B: Reporter> Tee<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: Reporter, B: Reporter> Reporter for Tee<A, B> {
    fn debug(&self, message: &str) {
        self.first.debug(message);
        self.second.debug(message);
    }

    fn info(&self, message: &str) {
        self.first.info(message);
        self.second.info(message);
    }
}

/// Keeps messages in memory for assertions.
#[cfg(test)]
#[derive(Default)]
pub struct Recorder {
    messages: std::cell::RefCell<Vec<(&'static str, String)>>,
}

#[cfg(test)]
impl Recorder {
    pub fn messages(&self, level: &str) -> Vec<String> {
        self.messages
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

#[cfg(test)]
impl Reporter for Recorder {
    fn debug(&self, message: &str) {
        self.messages.borrow_mut().push(("debug", message.to_string()));
    }

    fn info(&self, message: &str) {
        self.messages.borrow_mut().push(("info", message.to_string()));
    }
}
