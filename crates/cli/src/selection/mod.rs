//! Interactive list selection.
//!
//! A single-threaded, keystroke-driven picker rendered into the normal
//! terminal scrollback. Every sidekick utility is a thin workflow over
//! this component.
//!
//! # User Interface
//!
//! - vim-style (j/k) or arrow-key movement, wrapping at both ends
//! - `/` incremental smart-case search, `n`/`N` to jump between matches
//! - digits enter a jump-to-number mode, committed with Enter
//! - `v` anchors a virtual (range) selection when range bindings exist;
//!   `q` leaves virtual mode, or quits the selector outside it
//! - `h` shows a generated help screen for every binding
//! - Enter selects the cursor row unless a caller overrode it
//!
//! Custom bindings are either *recurring* (the loop continues after the
//! callback, which may reload the option list) or *terminal* (the
//! interaction ends and the callback's row or range becomes the
//! result).

pub mod colors;
pub mod highlight;
pub mod input;
pub mod types;
pub mod virtual_state;

pub use colors::{ColorTag, Theme};
pub use input::Key;
pub use types::{EmphasisRange, FormattedLine, Scope, SelectOption, SelectResult};
pub use virtual_state::VirtualState;

use std::io::{stderr, Write};
use std::ops::Range;

use indexmap::IndexMap;

use sidekick_core::error::{Error, Result};

use input::KeySource;
use types::HelpEntry;

/// Handler for a single-row binding. Receives the working state and the
/// cursor index; the option itself is read through the state.
pub type SingleHandler<O> = Box<dyn FnMut(&mut SelectorState<O>, usize) -> Result<()>>;

/// Handler for a virtual (range) binding, called with the half-open
/// index range covered by the selection.
pub type RangeHandler<O> = Box<dyn FnMut(&mut SelectorState<O>, Range<usize>) -> Result<()>>;

/// The mutable working set callbacks may touch while the loop is
/// suspended mid-frame. The loop re-clamps the cursor and any virtual
/// anchor after every callback, so handlers are free to shrink or
/// replace the option list.
pub struct SelectorState<O> {
    options: Vec<O>,
    virtual_state: Option<VirtualState>,
}

impl<O> SelectorState<O> {
    #[must_use]
    pub fn options(&self) -> &[O] {
        &self.options
    }

    /// Replaces the working set. Nothing else is reset; cursor, mode
    /// and search state persist and get clamped.
    pub fn load(&mut self, options: Vec<O>) {
        self.options = options;
    }

    /// Force-leaves range selection from inside a callback.
    pub fn exit_virtual(&mut self) {
        self.virtual_state = None;
    }
}

enum SingleSlot {
    Handler(usize),
    /// Synthesized for virtual-only keys: outside virtual mode the
    /// cursor row is treated as a one-element range.
    ForwardToVirtual,
}

enum Found {
    Single(usize),
    Range(usize),
    ForwardedRange(usize),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    Search,
    NumberEntry,
}

pub struct Selector<O: SelectOption> {
    state: SelectorState<O>,
    single_handlers: Vec<(SingleHandler<O>, bool)>,
    range_handlers: Vec<(RangeHandler<O>, bool)>,
    single_keys: IndexMap<Key, SingleSlot>,
    range_keys: IndexMap<Key, usize>,
    helps: Vec<HelpEntry>,
    theme: Theme,
    display_offset: usize,
    enter_overridden: bool,
    search_string: String,
}

impl<O: SelectOption + Clone> Default for Selector<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: SelectOption + Clone> Selector<O> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_offset(1)
    }

    /// `offset` is added to the zero-based index for display and for
    /// number-entry jumps, so a list can continue an external numbering
    /// (e.g. a history page starting at entry 11).
    #[must_use]
    pub fn with_offset(offset: usize) -> Self {
        Self {
            state: SelectorState {
                options: Vec::new(),
                virtual_state: None,
            },
            single_handlers: Vec::new(),
            range_handlers: Vec::new(),
            single_keys: IndexMap::new(),
            range_keys: IndexMap::new(),
            helps: Vec::new(),
            theme: Theme::default(),
            display_offset: offset,
            enter_overridden: false,
            search_string: String::new(),
        }
    }

    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Replaces the option list; see [`SelectorState::load`].
    pub fn load(&mut self, options: Vec<O>) {
        self.state.load(options);
    }

    pub fn exit_virtual(&mut self) {
        self.state.exit_virtual();
    }

    /// Registers a single-row binding for every key in `keys`.
    /// A `recurring` binding keeps the loop alive after firing; a
    /// non-recurring one ends the interaction with the cursor row as
    /// the result.
    pub fn register_keys(
        &mut self,
        keys: &[Key],
        handler: SingleHandler<O>,
        msg: impl Into<String>,
        recurring: bool,
    ) {
        let idx = self.single_handlers.len();
        self.single_handlers.push((handler, recurring));
        for &key in keys {
            if key == Key::Enter {
                self.enter_overridden = true;
            }
            self.single_keys.insert(key, SingleSlot::Handler(idx));
        }
        self.helps.push(HelpEntry::new(
            keys.iter().map(|k| k.label()).collect(),
            msg,
            Scope::Single,
            recurring,
        ));
    }

    /// Registers a range binding. Keys without an explicit single
    /// binding also work outside virtual mode, acting on the cursor row
    /// as a one-element range.
    pub fn register_keys_virtual(
        &mut self,
        keys: &[Key],
        handler: RangeHandler<O>,
        msg: impl Into<String>,
        recurring: bool,
    ) {
        let idx = self.range_handlers.len();
        self.range_handlers.push((handler, recurring));
        for &key in keys {
            self.range_keys.insert(key, idx);
            if !self.single_keys.contains_key(&key) {
                self.single_keys.insert(key, SingleSlot::ForwardToVirtual);
                if key == Key::Enter {
                    self.enter_overridden = true;
                }
            }
        }
        self.helps.push(HelpEntry::new(
            keys.iter().map(|k| k.label()).collect(),
            msg,
            Scope::Virtual,
            recurring,
        ));
    }

    fn can_virtual(&self) -> bool {
        !self.range_handlers.is_empty()
    }

    /// Runs the interaction against the real terminal.
    pub fn run(&mut self) -> Result<SelectResult<O>> {
        self.run_sequence("")
    }

    /// Runs the interaction, drawing keys from `sequence` first.
    /// While scripted keys remain, rendering is suppressed; once the
    /// sequence is exhausted the loop reverts to the terminal.
    pub fn run_sequence(&mut self, sequence: &str) -> Result<SelectResult<O>> {
        let mut keys = KeySource::new(sequence);
        let mut pos = 0usize;
        let mut mode = Mode::Normal;
        let mut number = 0usize;
        let mut hint_printed = false;

        loop {
            let width = input::window_width();
            let interactive = !keys.scripted();

            if interactive && !hint_printed {
                eprintln!("{}press h/H for help{}", self.theme.hint, self.theme.reset);
                hint_printed = true;
            }

            let count = self.state.options.len();
            if count == 0 {
                return Err(Error::Empty);
            }

            if let Some(vs) = self.state.virtual_state.as_mut() {
                vs.set_point(pos);
            }

            let mut row_count = 0usize;
            if interactive {
                for i in 0..count {
                    row_count += self.render_row(i, pos, width);
                }
                match mode {
                    Mode::Search => eprint!("/{}", self.search_string),
                    Mode::NumberEntry => eprint!(":{number}"),
                    Mode::Normal => {}
                }
                let _ = stderr().flush();
            }

            let key = keys.next()?;
            let mut found: Option<Found> = None;

            match mode {
                Mode::Search => match key {
                    Key::Backspace => {
                        if self.search_string.is_empty() {
                            mode = Mode::Normal;
                        } else {
                            self.search_string.pop();
                        }
                    }
                    Key::Enter => mode = Mode::Normal,
                    Key::Char(c) => {
                        self.search_string.push(c);
                        if let Some(hit) = self.search_index(pos as isize, false) {
                            pos = hit;
                        }
                    }
                    _ => {}
                },
                Mode::NumberEntry => match key {
                    Key::Backspace => {
                        number /= 10;
                        if number == 0 {
                            mode = Mode::Normal;
                        }
                    }
                    Key::Enter => {
                        mode = Mode::Normal;
                        pos = number.max(self.display_offset) - self.display_offset;
                        pos = pos.min(count - 1);
                    }
                    Key::Char(c) if c.is_ascii_digit() => {
                        number = number * 10 + (c as usize - '0' as usize);
                    }
                    _ => {}
                },
                Mode::Normal => match key {
                    Key::Char('h') | Key::Char('H') => {
                        let help_rows = self.print_help(width);
                        keys.next()?;
                        input::erase_rows(help_rows)?;
                    }
                    Key::Char('q') | Key::Char('Q') => {
                        if self.state.virtual_state.is_none() {
                            return Err(Error::Quit);
                        }
                        self.state.virtual_state = None;
                    }
                    Key::Char('j') | Key::Char('J') | Key::Down => pos = (pos + 1) % count,
                    Key::Char('k') | Key::Char('K') | Key::Up => pos = (pos + count - 1) % count,
                    Key::Char('n') => {
                        if let Some(hit) = self.search_index(pos as isize + 1, false) {
                            pos = hit;
                        }
                    }
                    Key::Char('N') => {
                        if let Some(hit) = self.search_index(pos as isize - 1, true) {
                            pos = hit;
                        }
                    }
                    Key::Char('/') => {
                        mode = Mode::Search;
                        self.search_string.clear();
                    }
                    Key::Char('v') | Key::Char('V') => {
                        if self.state.virtual_state.is_none() && self.can_virtual() {
                            self.state.virtual_state = Some(VirtualState::new(pos));
                        }
                    }
                    Key::Char(c) if c.is_ascii_digit() => {
                        mode = Mode::NumberEntry;
                        number = c as usize - '0' as usize;
                    }
                    // the default select leaves the list in the scrollback
                    Key::Enter if self.state.virtual_state.is_none() && !self.enter_overridden => {
                        return Ok(SelectResult::Single {
                            index: pos,
                            option: self.state.options[pos].clone(),
                        });
                    }
                    key => found = self.lookup(key),
                },
            }

            let erase = match &found {
                None => true,
                Some(f) => self.is_recurring(f),
            };
            if interactive && erase {
                input::erase_rows(row_count)?;
            }

            let Some(found) = found else {
                continue;
            };

            match found {
                Found::Single(i) => {
                    let recurring = self.single_handlers[i].1;
                    let captured = (!recurring).then(|| self.state.options[pos].clone());
                    (self.single_handlers[i].0)(&mut self.state, pos)?;
                    if let Some(option) = captured {
                        return Ok(SelectResult::Single { index: pos, option });
                    }
                }
                Found::ForwardedRange(i) => {
                    let recurring = self.range_handlers[i].1;
                    let captured = (!recurring).then(|| self.state.options[pos].clone());
                    (self.range_handlers[i].0)(&mut self.state, pos..pos + 1)?;
                    if let Some(option) = captured {
                        return Ok(SelectResult::Single { index: pos, option });
                    }
                }
                Found::Range(i) => {
                    // the anchor exists whenever a range binding fires
                    let range = self
                        .state
                        .virtual_state
                        .map_or(pos..pos + 1, |vs| vs.range());
                    let recurring = self.range_handlers[i].1;
                    let captured =
                        (!recurring).then(|| self.state.options[range.clone()].to_vec());
                    (self.range_handlers[i].0)(&mut self.state, range.clone())?;
                    if let Some(options) = captured {
                        return Ok(SelectResult::Multi { range, options });
                    }
                }
            }

            // the callback may have shrunk or replaced the option list
            let len = self.state.options.len();
            if len > 0 {
                pos = pos.min(len - 1);
            }
            if let Some(vs) = self.state.virtual_state.as_mut() {
                vs.truncate(len);
            }
        }
    }

    fn lookup(&self, key: Key) -> Option<Found> {
        if self.state.virtual_state.is_some() {
            return self.range_keys.get(&key).map(|&i| Found::Range(i));
        }
        match self.single_keys.get(&key)? {
            SingleSlot::Handler(i) => Some(Found::Single(*i)),
            SingleSlot::ForwardToVirtual => {
                self.range_keys.get(&key).map(|&i| Found::ForwardedRange(i))
            }
        }
    }

    fn is_recurring(&self, found: &Found) -> bool {
        match found {
            Found::Single(i) => self.single_handlers[*i].1,
            Found::Range(i) | Found::ForwardedRange(i) => self.range_handlers[*i].1,
        }
    }

    /// Prints one option row and returns the wrapped-row count it
    /// occupies, computed from the uncolored text.
    fn render_row(&self, i: usize, pos: usize, width: usize) -> usize {
        let leading = if pos == i { '>' } else { ' ' };
        let formatted = self.state.options[i].format();
        let selected = self
            .state
            .virtual_state
            .is_some_and(|vs| vs.in_range(i));

        let plain = format!("{} {}. {}", leading, i + self.display_offset, formatted.text);
        let rows = input::wrapped_rows(plain.chars().count(), width);

        let colored = highlight::colorize(
            &formatted.text,
            &formatted.emphasis,
            &self.search_string,
            selected,
            &self.theme,
        );
        let mut line = format!("{} {}. {}", leading, i + self.display_offset, colored);
        if selected {
            line = format!("{}{}{}", self.theme.selection_bg, line, self.theme.reset);
        }
        eprintln!("{line}");
        rows
    }

    /// Wraparound scan for the next option containing the search
    /// string, probing every index at most once.
    fn search_index(&self, start: isize, reverse: bool) -> Option<usize> {
        let len = self.state.options.len() as isize;
        if len == 0 {
            return None;
        }
        let case_sensitive = highlight::is_case_sensitive(&self.search_string);
        for i in 0..len {
            let step = if reverse { -i } else { i };
            let idx = (((start + step) % len + len) % len) as usize;
            if self.state.options[idx].contains(&self.search_string, case_sensitive) {
                return Some(idx);
            }
        }
        None
    }

    /// Prints the help screen and returns its wrapped-row count so it
    /// can be erased after any key dismisses it.
    fn print_help(&self, width: usize) -> usize {
        let mut rows = 0;
        for entry in self.all_helps() {
            let plain = self.help_line(&entry, false);
            let colored = self.help_line(&entry, true);
            eprintln!("{colored}");
            rows += input::wrapped_rows(plain.chars().count(), width);
        }
        eprintln!("(press any key to continue)");
        rows + 1
    }

    fn all_helps(&self) -> Vec<HelpEntry> {
        let mut helps = Vec::new();
        if !self.enter_overridden {
            helps.push(HelpEntry::new(
                vec![Key::Enter.label()],
                "select the option",
                Scope::Single,
                false,
            ));
        }
        if self.can_virtual() {
            helps.push(HelpEntry::new(
                vec!["v".into(), "V".into()],
                "start virtual mode",
                Scope::Both,
                true,
            ));
        }
        helps.push(HelpEntry::new(
            vec!["k".into(), "K".into(), Key::Up.label()],
            "move up",
            Scope::Both,
            true,
        ));
        helps.push(HelpEntry::new(
            vec!["j".into(), "J".into(), Key::Down.label()],
            "move down",
            Scope::Both,
            true,
        ));
        helps.push(HelpEntry::new(
            vec!["q".into(), "Q".into()],
            "quit selector or virtual mode",
            Scope::Both,
            false,
        ));
        helps.push(HelpEntry::new(
            vec!["[0~9]".into()],
            "go to the option at given number",
            Scope::Both,
            true,
        ));
        helps.push(HelpEntry::new(
            vec!["/".into()],
            "search for string",
            Scope::Both,
            true,
        ));
        helps.push(HelpEntry::new(
            vec!["n/N".into()],
            "search forwards/search backwards",
            Scope::Both,
            true,
        ));
        helps.extend(self.helps.iter().cloned());
        helps
    }

    fn help_line(&self, entry: &HelpEntry, colored: bool) -> String {
        let c = |code: &'static str| if colored { code } else { "" };
        let mut s = format!(
            " * {}{}{}: {}",
            c(self.theme.help_key),
            entry.keys.join("/"),
            c(self.theme.reset),
            entry.msg
        );
        if !entry.recurring {
            s.push_str(&format!(
                " {}(ends the selector){}",
                c(self.theme.help_terminal_marker),
                c(self.theme.reset)
            ));
        }
        if self.can_virtual() {
            match entry.scope {
                Scope::Virtual => s.push_str(&format!(
                    " {}(virtual){}",
                    c(self.theme.help_virtual_marker),
                    c(self.theme.reset)
                )),
                Scope::Single => s.push_str(&format!(
                    " {}(non-virtual){}",
                    c(self.theme.help_single_marker),
                    c(self.theme.reset)
                )),
                Scope::Both => {}
            }
        }
        s
    }
}
