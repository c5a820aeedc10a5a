//! Values returned by dictionary lookups.
//!
//! These are plain records built from server listings. [`Database`] and
//! [`MatchingStrategy`] are also passed back as request parameters; for databases the
//! two reserved names `*` and `!` are available through [`Database::all`] and
//! [`Database::first_match`].
use std::fmt;

/// Database name that searches every database on the server.
pub const ALL_DATABASES: &str = "*";
/// Database name that stops at the first database with a result.
pub const FIRST_MATCH: &str = "!";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Database {
    name: String,
    description: String,
}

impl Database {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// A database known only by name, e.g. one given on the command line.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, "")
    }

    pub fn all() -> Self {
        Self::new(ALL_DATABASES, "All databases")
    }

    pub fn first_match() -> Self {
        Self::new(FIRST_MATCH, "First database with a result")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Display for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.description)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchingStrategy {
    name: String,
    description: String,
}

impl MatchingStrategy {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, "")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Display for MatchingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.description)
    }
}

/// A complete definition of one word from one database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    word: String,
    database: String,
    body: Vec<String>,
}

impl Definition {
    pub fn new(word: impl Into<String>, database: impl Into<String>, body: Vec<String>) -> Self {
        Self {
            word: word.into(),
            database: database.into(),
            body,
        }
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    /// Name of the database the definition came from.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Body lines in the order the server sent them.
    pub fn lines(&self) -> &[String] {
        &self.body
    }

    /// Body lines joined with newlines.
    pub fn text(&self) -> String {
        self.body.join("\n")
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} [{}]", self.word, self.database)?;
        for line in &self.body {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
