//! Status line presentation
//!
//! Every user-visible step of a run is classified as info, ok, warn, fail or
//! skip and printed as one colour-coded line. The reporter also counts
//! warnings so the closing summary can restate them.
//!
//! A buffered reporter keeps the plain-text lines in memory instead of
//! printing them; tests use it to assert on what a run reported.

use std::cell::{Cell, RefCell};

use console::Style;

/// Classification of a status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Info,
    Ok,
    Warn,
    Fail,
    Skip,
}

impl Status {
    /// Fixed-width tag printed in front of the message
    pub fn tag(self) -> &'static str {
        match self {
            Status::Info => "[info]",
            Status::Ok => "[ ok ]",
            Status::Warn => "[warn]",
            Status::Fail => "[fail]",
            Status::Skip => "[skip]",
        }
    }

    fn style(self) -> Style {
        match self {
            Status::Info => Style::new().cyan().bold(),
            Status::Ok => Style::new().green().bold(),
            Status::Warn => Style::new().yellow().bold(),
            Status::Fail => Style::new().red().bold(),
            Status::Skip => Style::new().dim(),
        }
    }
}

enum Sink {
    Terminal,
    Buffer(RefCell<Vec<String>>),
}

/// Writes status lines and keeps the warning count for the run
pub struct Reporter {
    sink: Sink,
    warnings: Cell<usize>,
}

impl Reporter {
    /// Reporter printing to the terminal
    pub fn stdout() -> Self {
        Self {
            sink: Sink::Terminal,
            warnings: Cell::new(0),
        }
    }

    /// Reporter collecting plain-text lines in memory
    #[cfg(test)]
    pub fn buffered() -> Self {
        Self {
            sink: Sink::Buffer(RefCell::new(Vec::new())),
            warnings: Cell::new(0),
        }
    }

    pub fn status(&self, status: Status, message: impl AsRef<str>) {
        let message = message.as_ref();
        if status == Status::Warn {
            self.warnings.set(self.warnings.get() + 1);
        }
        match &self.sink {
            Sink::Terminal => {
                let line = format!("{} {}", status.style().apply_to(status.tag()), message);
                if status == Status::Fail {
                    eprintln!("{line}");
                } else {
                    println!("{line}");
                }
            }
            Sink::Buffer(lines) => lines
                .borrow_mut()
                .push(format!("{} {}", status.tag(), message)),
        }
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.status(Status::Info, message);
    }

    pub fn ok(&self, message: impl AsRef<str>) {
        self.status(Status::Ok, message);
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        self.status(Status::Warn, message);
    }

    pub fn skip(&self, message: impl AsRef<str>) {
        self.status(Status::Skip, message);
    }

    /// Bold section heading, used once per phase and for the summary
    pub fn heading(&self, title: impl AsRef<str>) {
        let title = title.as_ref();
        match &self.sink {
            Sink::Terminal => {
                println!();
                println!("{}", Style::new().bold().magenta().apply_to(format!("==> {title}")));
            }
            Sink::Buffer(lines) => lines.borrow_mut().push(format!("==> {title}")),
        }
    }

    /// Unclassified line, indented under the current heading
    pub fn line(&self, text: impl AsRef<str>) {
        let text = text.as_ref();
        match &self.sink {
            Sink::Terminal => println!("    {text}"),
            Sink::Buffer(lines) => lines.borrow_mut().push(format!("    {text}")),
        }
    }

    /// Number of warnings reported so far
    pub fn warnings(&self) -> usize {
        self.warnings.get()
    }

    /// Lines collected by a buffered reporter (empty for terminal reporters)
    #[cfg(test)]
    pub fn lines(&self) -> Vec<String> {
        match &self.sink {
            Sink::Terminal => Vec::new(),
            Sink::Buffer(lines) => lines.borrow().clone(),
        }
    }
}
