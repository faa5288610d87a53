//! Option, result and help types for the selector.

use std::ops::Range;

use super::colors::ColorTag;

/// A caller-specified highlight over the unadorned display text, in
/// byte coordinates of [`FormattedLine::text`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmphasisRange {
    pub start: usize,
    pub end: usize,
    pub tag: ColorTag,
}

/// What an option renders as: a display string plus zero or more
/// emphasis ranges.
#[derive(Clone, Debug, Default)]
pub struct FormattedLine {
    pub text: String,
    pub emphasis: Vec<EmphasisRange>,
}

impl FormattedLine {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasis: Vec::new(),
        }
    }
}

/// What the selector needs from an option. Options are opaque and
/// never mutated; callers replace the whole list to change them.
pub trait SelectOption {
    fn format(&self) -> FormattedLine;

    /// Substring test backing incremental search; the default matches
    /// against the formatted text.
    fn contains(&self, needle: &str, case_sensitive: bool) -> bool {
        let text = self.format().text;
        if case_sensitive {
            text.as_str().contains(needle)
        } else {
            text.to_lowercase().as_str().contains(&needle.to_lowercase())
        }
    }
}

impl SelectOption for String {
    fn format(&self) -> FormattedLine {
        FormattedLine::plain(self.clone())
    }
}

/// The value an interaction ends with.
#[derive(Clone, Debug)]
pub enum SelectResult<O> {
    Single { index: usize, option: O },
    Multi { range: Range<usize>, options: Vec<O> },
}

impl<O> SelectResult<O> {
    /// Flattens either variant into the selected options.
    #[must_use]
    pub fn into_options(self) -> Vec<O> {
        match self {
            SelectResult::Single { option, .. } => vec![option],
            SelectResult::Multi { options, .. } => options,
        }
    }
}

/// Whether a help entry applies inside virtual mode, outside it, or
/// both.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    Single,
    Virtual,
    Both,
}

#[derive(Clone, Debug)]
pub(super) struct HelpEntry {
    pub keys: Vec<String>,
    pub msg: String,
    pub scope: Scope,
    pub recurring: bool,
}

impl HelpEntry {
    pub fn new(keys: Vec<String>, msg: impl Into<String>, scope: Scope, recurring: bool) -> Self {
        Self {
            keys,
            msg: msg.into(),
            scope,
            recurring,
        }
    }
}
