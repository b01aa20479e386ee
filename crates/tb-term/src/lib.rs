// SPDX-License-Identifier: MIT
//
// tb-term: terminal backend for termbox-shim.
//
// A small termbox-style terminal service: it owns the terminal's raw
// state, keeps a native cell grid, renders that grid with differential
// ANSI output, and turns stdin bytes into input events through a
// blocking poll. The C-facing layer in the root crate mirrors the grid
// into a flat buffer and translates these events into C records.
//
// Direct terminal control via ANSI escape sequences and raw termios.
// Every frame is diffed against the previous one before a single write.

pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod diff;
pub mod error;
pub mod input;
pub mod output;
pub mod screen;
pub mod terminal;

pub use error::{Error, Result};
