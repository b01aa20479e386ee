// SPDX-License-Identifier: MIT
//
// Backend errors.

use std::io;

use thiserror::Error;

/// Convenience alias used throughout the backend.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything the terminal backend can fail with.
#[derive(Debug, Error)]
pub enum Error {
    /// stdin is not connected to a terminal, so raw mode is impossible.
    #[error("stdin is not a terminal")]
    NotATerminal,

    /// stdin reached end-of-file while waiting for input.
    #[error("terminal input closed")]
    InputClosed,

    /// An OS-level read, write, or termios call failed.
    #[error("terminal i/o: {0}")]
    Io(#[from] io::Error),
}
