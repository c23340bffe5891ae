//! Token-level autofix engine.
//!
//! Sniffs stage edits against token indices. Edits grouped in a changeset
//! are applied together or not at all, and a token may be rewritten at most
//! once per pass so that two sniffs never produce overlapping fixes.

use crate::file::PhpFile;
use thiserror::Error;

/// Error when staging or applying fixes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixerError {
    /// `begin_changeset` called while a changeset is open.
    #[error("a changeset is already open")]
    ChangesetAlreadyOpen,

    /// `end_changeset` called without an open changeset.
    #[error("no changeset is open")]
    NoOpenChangeset,

    /// Edit targets a token index outside the file.
    #[error("token {ptr} does not exist")]
    InvalidToken {
        /// Offending token index.
        ptr: usize,
    },

    /// Edit targets a token already rewritten in this pass.
    #[error("token {ptr} was already modified by another fix")]
    Conflict {
        /// Offending token index.
        ptr: usize,
    },
}

/// Applies token edits for one file.
#[derive(Debug, Clone)]
pub struct Fixer {
    enabled: bool,
    eol: &'static str,
    contents: Vec<String>,
    modified: Vec<bool>,
    changeset: Option<Vec<(usize, String)>>,
    fix_count: usize,
}

impl Fixer {
    /// Creates a fixer over the tokens of `file`.
    ///
    /// `enabled` reports whether fix mode is on; edits are tracked either way.
    #[must_use]
    pub fn new(file: &PhpFile, enabled: bool) -> Self {
        let contents: Vec<String> = file.tokens().iter().map(|t| t.content.clone()).collect();
        Self {
            enabled,
            eol: file.eol_char(),
            modified: vec![false; contents.len()],
            contents,
            changeset: None,
            fix_count: 0,
        }
    }

    /// Whether fix mode is on.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of applied changes (a changeset counts once).
    #[must_use]
    pub fn fix_count(&self) -> usize {
        self.fix_count
    }

    /// Current content of a token, including staged edits.
    #[must_use]
    pub fn token_content(&self, ptr: usize) -> Option<&str> {
        let staged = self
            .changeset
            .as_ref()
            .and_then(|edits| edits.iter().rev().find(|(p, _)| *p == ptr))
            .map(|(_, text)| text.as_str());
        staged.or_else(|| self.contents.get(ptr).map(String::as_str))
    }

    /// The file content with all applied edits.
    #[must_use]
    pub fn fixed_content(&self) -> String {
        self.contents.concat()
    }

    /// Opens a changeset.
    ///
    /// # Errors
    ///
    /// Returns [`FixerError::ChangesetAlreadyOpen`] if one is open.
    pub fn begin_changeset(&mut self) -> Result<(), FixerError> {
        if self.changeset.is_some() {
            return Err(FixerError::ChangesetAlreadyOpen);
        }
        self.changeset = Some(Vec::new());
        Ok(())
    }

    /// Applies every staged edit of the open changeset.
    ///
    /// # Errors
    ///
    /// Returns [`FixerError::NoOpenChangeset`] without an open changeset, or
    /// [`FixerError::Conflict`] (discarding the changeset) when a staged
    /// token was already modified in this pass.
    pub fn end_changeset(&mut self) -> Result<(), FixerError> {
        let edits = self.changeset.take().ok_or(FixerError::NoOpenChangeset)?;
        if let Some(&(ptr, _)) = edits.iter().find(|(ptr, _)| self.modified[*ptr]) {
            tracing::warn!(ptr, "discarding changeset that overlaps an earlier fix");
            return Err(FixerError::Conflict { ptr });
        }
        if edits.is_empty() {
            return Ok(());
        }
        for (ptr, text) in edits {
            self.contents[ptr] = text;
            self.modified[ptr] = true;
        }
        self.fix_count += 1;
        Ok(())
    }

    /// Discards the open changeset, if any.
    pub fn rollback_changeset(&mut self) {
        if let Some(edits) = self.changeset.take() {
            tracing::debug!(edits = edits.len(), "rolled back changeset");
        }
    }

    /// Runs `edit` inside a changeset, committing on success and rolling
    /// back on error.
    ///
    /// # Errors
    ///
    /// Propagates errors from `edit` and from committing the changeset.
    pub fn changeset<F>(&mut self, edit: F) -> Result<(), FixerError>
    where
        F: FnOnce(&mut Self) -> Result<(), FixerError>,
    {
        self.begin_changeset()?;
        match edit(self) {
            Ok(()) => self.end_changeset(),
            Err(e) => {
                self.rollback_changeset();
                Err(e)
            }
        }
    }

    /// Replaces the content of a token.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown tokens or, outside a changeset, for
    /// tokens already modified in this pass.
    pub fn replace_token(&mut self, ptr: usize, text: impl Into<String>) -> Result<(), FixerError> {
        if ptr >= self.contents.len() {
            return Err(FixerError::InvalidToken { ptr });
        }
        let text = text.into();
        match &mut self.changeset {
            Some(edits) => edits.push((ptr, text)),
            None => {
                if self.modified[ptr] {
                    return Err(FixerError::Conflict { ptr });
                }
                self.contents[ptr] = text;
                self.modified[ptr] = true;
                self.fix_count += 1;
            }
        }
        Ok(())
    }

    fn current(&self, ptr: usize) -> Result<String, FixerError> {
        self.token_content(ptr)
            .map(str::to_string)
            .ok_or(FixerError::InvalidToken { ptr })
    }

    /// Appends text to a token.
    ///
    /// # Errors
    ///
    /// See [`replace_token`](Self::replace_token).
    pub fn add_content(&mut self, ptr: usize, text: &str) -> Result<(), FixerError> {
        let current = self.current(ptr)?;
        self.replace_token(ptr, current + text)
    }

    /// Prepends text to a token.
    ///
    /// # Errors
    ///
    /// See [`replace_token`](Self::replace_token).
    pub fn add_content_before(&mut self, ptr: usize, text: &str) -> Result<(), FixerError> {
        let current = self.current(ptr)?;
        self.replace_token(ptr, format!("{text}{current}"))
    }

    /// Appends a newline to a token.
    ///
    /// # Errors
    ///
    /// See [`replace_token`](Self::replace_token).
    pub fn add_newline(&mut self, ptr: usize) -> Result<(), FixerError> {
        self.add_content(ptr, self.eol)
    }

    /// Prepends a newline to a token.
    ///
    /// # Errors
    ///
    /// See [`replace_token`](Self::replace_token).
    pub fn add_newline_before(&mut self, ptr: usize) -> Result<(), FixerError> {
        self.add_content_before(ptr, self.eol)
    }
}
