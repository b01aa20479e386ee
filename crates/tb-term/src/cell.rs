// SPDX-License-Identifier: MIT
//
// Cell: one character position on screen.
//
// A cell holds a single Unicode codepoint plus foreground and background
// attributes. Attributes use the termbox-go encoding: a palette colour in
// the low byte and style flags in the high byte, packed into 16 bits.
//
//   bits 0..=8   colour: 0 = terminal default, 1..=8 = black..white,
//                9..=256 = 256-colour palette index + 1
//   bit  9       bold
//   bit  10      underline
//   bit  11      reverse
//
// Size: 8 bytes per cell. A 200×50 terminal is 80 KB per grid.

bitflags::bitflags! {
    /// Style flags carried in the high bits of an [`Attribute`].
    ///
    /// ```
    /// use tb_term::cell::{Attribute, Style};
    ///
    /// let attr = Attribute::RED.with_style(Style::BOLD | Style::UNDERLINE);
    /// assert!(attr.style().contains(Style::BOLD));
    /// assert_eq!(attr.color(), Attribute::RED.color());
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Style: u16 {
        /// SGR 1, increased intensity.
        const BOLD      = 0x0200;
        /// SGR 4, straight underline.
        const UNDERLINE = 0x0400;
        /// SGR 7, swap foreground and background.
        const REVERSE   = 0x0800;
    }
}

/// Mask selecting the colour portion of an attribute.
const COLOR_MASK: u16 = 0x01FF;

// ─── Attribute ───────────────────────────────────────────────────────────────

/// A packed colour + style value, as stored in each [`Cell`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(transparent)]
pub struct Attribute(u16);

impl Attribute {
    /// The terminal's own default colour.
    pub const DEFAULT: Self = Self(0);
    pub const BLACK: Self = Self(1);
    pub const RED: Self = Self(2);
    pub const GREEN: Self = Self(3);
    pub const YELLOW: Self = Self(4);
    pub const BLUE: Self = Self(5);
    pub const MAGENTA: Self = Self(6);
    pub const CYAN: Self = Self(7);
    pub const WHITE: Self = Self(8);

    /// Wrap a raw 16-bit value. Every bit pattern is accepted.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// The raw 16-bit value.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// The colour portion (0 = default).
    #[inline]
    #[must_use]
    pub const fn color(self) -> u16 {
        self.0 & COLOR_MASK
    }

    /// The style flags. Unknown high bits are ignored.
    #[inline]
    #[must_use]
    pub const fn style(self) -> Style {
        Style::from_bits_truncate(self.0)
    }

    /// Same colour with the given style flags added.
    #[inline]
    #[must_use]
    pub const fn with_style(self, style: Style) -> Self {
        Self(self.0 | style.bits())
    }

    /// Whether this is the plain terminal default (no colour, no style).
    #[inline]
    #[must_use]
    pub const fn is_default(self) -> bool {
        self.0 == 0
    }
}

// ─── Cell ────────────────────────────────────────────────────────────────────

/// A single terminal cell.
///
/// `ch` is a raw codepoint rather than a `char` so that any 32-bit value a
/// caller writes survives a round trip through the grid. Values that are
/// not Unicode scalars (and `0`) render as a blank.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Unicode codepoint to display.
    pub ch: u32,
    /// Foreground colour and style.
    pub fg: Attribute,
    /// Background colour and style.
    pub bg: Attribute,
}

const SPACE: u32 = b' ' as u32;

impl Cell {
    /// An empty cell: space character, default colours.
    pub const EMPTY: Self = Self {
        ch: SPACE,
        fg: Attribute::DEFAULT,
        bg: Attribute::DEFAULT,
    };

    /// A cell with a character and default colours.
    #[inline]
    #[must_use]
    pub const fn new(ch: char) -> Self {
        Self {
            ch: ch as u32,
            fg: Attribute::DEFAULT,
            bg: Attribute::DEFAULT,
        }
    }

    /// A cell with a character and explicit attributes.
    #[inline]
    #[must_use]
    pub const fn styled(ch: char, fg: Attribute, bg: Attribute) -> Self {
        Self {
            ch: ch as u32,
            fg,
            bg,
        }
    }

    /// A blank cell painted with the given attributes.
    #[inline]
    #[must_use]
    pub const fn blank(fg: Attribute, bg: Attribute) -> Self {
        Self { ch: SPACE, fg, bg }
    }

    /// The codepoint as a `char`, if it is a printable scalar value.
    ///
    /// Returns `None` for `0` and for values outside the Unicode scalar range.
    #[inline]
    #[must_use]
    pub const fn character(self) -> Option<char> {
        if self.ch == 0 {
            return None;
        }
        char::from_u32(self.ch)
    }

    /// Whether this cell is a default-coloured space.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.ch == SPACE && self.fg.is_default() && self.bg.is_default()
    }
}

impl Default for Cell {
    #[inline]
    fn default() -> Self {
        Self::EMPTY
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.character() {
            Some(ch) => write!(f, "Cell({ch:?}")?,
            None => write!(f, "Cell(U+{:04X}", self.ch)?,
        }
        if !self.fg.is_default() {
            write!(f, ", fg={:#06x}", self.fg.bits())?;
        }
        if !self.bg.is_default() {
            write!(f, ", bg={:#06x}", self.bg.bits())?;
        }
        write!(f, ")")
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
