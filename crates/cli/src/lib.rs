//! Sidekick CLI Library
//!
//! Companion utilities for the host runner, built around a shared
//! interactive terminal selector.
//!
//! # Key Features
//!
//! - **Interactive List Selection**: keystroke-driven picker with
//!   vim-style movement, incremental smart-case search and digit jumps
//! - **Virtual (Range) Mode**: anchor a second cursor and act on a
//!   contiguous block of options at once
//! - **Pluggable Key Bindings**: recurring and terminal callbacks with
//!   auto-generated help
//! - **Sequence Playback**: feed a recorded keystroke string instead of
//!   a terminal, for scripting and tests
//!
//! # Architecture
//!
//! - [`selection`]: the selector state machine, search/highlight engine
//!   and key input layer
//!
//! The `sk-*` binaries (`historian`, `top`, `resource`, `import`,
//! `collect`) are thin workflows over this module and the host-runner
//! adapter in `sidekick-core`.

pub mod selection;
