// SPDX-License-Identifier: MIT
//
// Attribute conversion between the backend's `Attribute` and the 16-bit
// codes in `tb_cell.fg` / `tb_cell.bg`.

use std::str::FromStr;

use tb_term::cell::Attribute;
use thiserror::Error;

use crate::ffi::{TB_BLACK, TB_DEFAULT, TB_WHITE};

/// The closed colour table used in [`AttributeMode::Palette`].
const TABLE: [(Attribute, u16); 3] = [
    (Attribute::DEFAULT, TB_DEFAULT),
    (Attribute::BLACK, TB_BLACK),
    (Attribute::WHITE, TB_WHITE),
];

/// Backend attribute → C code. Anything outside the table becomes the default.
#[must_use]
pub fn to_foreign(attr: Attribute) -> u16 {
    TABLE
        .iter()
        .find(|(backend, _)| *backend == attr)
        .map_or(TB_DEFAULT, |&(_, code)| code)
}

/// C code → backend attribute. Anything outside the table becomes the default.
#[must_use]
pub fn to_backend(code: u16) -> Attribute {
    TABLE
        .iter()
        .find(|(_, foreign)| *foreign == code)
        .map_or(Attribute::DEFAULT, |&(attr, _)| attr)
}

/// How the mirror converts attributes when copying cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttributeMode {
    /// The 16-bit value crosses unchanged in both directions.
    #[default]
    Raw,
    /// Only the colours in the closed table survive; the rest become default.
    Palette,
}

impl AttributeMode {
    #[must_use]
    pub fn export(self, attr: Attribute) -> u16 {
        match self {
            Self::Raw => attr.bits(),
            Self::Palette => to_foreign(attr),
        }
    }

    #[must_use]
    pub fn import(self, code: u16) -> Attribute {
        match self {
            Self::Raw => Attribute::from_bits(code),
            Self::Palette => to_backend(code),
        }
    }
}

impl FromStr for AttributeMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(Self::Raw),
            "palette" => Ok(Self::Palette),
            _ => Err(UnknownMode),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("expected `raw` or `palette`")]
pub struct UnknownMode;
