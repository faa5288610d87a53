//! ANSI palette for the selector.
//!
//! All escape codes live in a [`Theme`] value passed into the renderer,
//! so callers can restyle a selector without process-wide state.

const RED: &str = "\x1b[1;31m";
const GREEN: &str = "\x1b[1;32m";
const YELLOW: &str = "\x1b[1;33m";
const BLUE: &str = "\x1b[1;34m";
const WHITE: &str = "\x1b[1;37m";
const RESET: &str = "\x1b[0m";

const SELECTION_BG: &str = "\x1b[0;44m";
// foreground colors recombined with the selection background, so
// highlighted text stays visible inside a virtual-mode block
const RED_ON_SELECTION: &str = "\x1b[31;44m\x1b[1m";
const GREEN_ON_SELECTION: &str = "\x1b[32;44m";
const YELLOW_ON_SELECTION: &str = "\x1b[33;44m";
const BLUE_ON_SELECTION: &str = "\x1b[34;44m";
const WHITE_ON_SELECTION: &str = "\x1b[37;44m";

/// Caller-facing color tag for emphasis ranges.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorTag {
    Red,
    Green,
    Yellow,
    Blue,
    White,
}

impl ColorTag {
    #[must_use]
    pub fn code(self, selected: bool) -> &'static str {
        match (self, selected) {
            (ColorTag::Red, false) => RED,
            (ColorTag::Green, false) => GREEN,
            (ColorTag::Yellow, false) => YELLOW,
            (ColorTag::Blue, false) => BLUE,
            (ColorTag::White, false) => WHITE,
            (ColorTag::Red, true) => RED_ON_SELECTION,
            (ColorTag::Green, true) => GREEN_ON_SELECTION,
            (ColorTag::Yellow, true) => YELLOW_ON_SELECTION,
            (ColorTag::Blue, true) => BLUE_ON_SELECTION,
            (ColorTag::White, true) => WHITE_ON_SELECTION,
        }
    }
}

/// Escape codes the renderer and help screen use.
#[derive(Clone, Debug)]
pub struct Theme {
    pub reset: &'static str,
    pub selection_bg: &'static str,
    pub match_color: &'static str,
    pub match_on_selection: &'static str,
    /// The one-time "press h/H for help" hint.
    pub hint: &'static str,
    pub help_key: &'static str,
    pub help_terminal_marker: &'static str,
    pub help_virtual_marker: &'static str,
    pub help_single_marker: &'static str,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            reset: RESET,
            selection_bg: SELECTION_BG,
            match_color: RED,
            match_on_selection: RED_ON_SELECTION,
            hint: GREEN,
            help_key: GREEN,
            help_terminal_marker: RED,
            help_virtual_marker: BLUE,
            help_single_marker: YELLOW,
        }
    }
}

impl Theme {
    /// The "closing" color text falls back to: plain reset, or the
    /// selection background inside a virtual-mode block.
    #[must_use]
    pub fn base(&self, selected: bool) -> &'static str {
        if selected {
            self.selection_bg
        } else {
            self.reset
        }
    }

    #[must_use]
    pub fn matched(&self, selected: bool) -> &'static str {
        if selected {
            self.match_on_selection
        } else {
            self.match_color
        }
    }

    #[must_use]
    pub fn emphasis(&self, tag: ColorTag, selected: bool) -> &'static str {
        tag.code(selected)
    }
}
