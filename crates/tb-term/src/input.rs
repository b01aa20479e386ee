// SPDX-License-Identifier: MIT
//
// Terminal input parser.
//
// Turns raw stdin bytes into keys and mouse events. Recognized input:
//
// - Legacy CSI sequences (arrows, editing keys, function keys, with
//   xterm `1;<mod>` modifier parameters)
// - SS3 sequences (the application-cursor-mode arrows and F1-F4)
// - SGR mouse reports (`ESC [ < b ; x ; y M|m`)
// - Alt+key (ESC followed by a printable or control byte)
// - UTF-8 multi-byte characters
//
// Bytes can arrive split across reads, so the parser keeps the unconsumed
// tail between calls to `advance`. A lone ESC is ambiguous until more
// bytes arrive or the caller gives up waiting and calls `flush`.
//
// Resize events never come from the byte stream; the screen synthesizes
// them from SIGWINCH. They share this enum so callers see one event type.

use bitflags::bitflags;

// ─── Event Types ────────────────────────────────────────────────────────────

/// A terminal input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// The terminal window changed size.
    Resize { cols: u16, rows: u16 },
}

/// A key press with its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A key press with no modifiers.
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
        }
    }
}

/// Identity of a key.
///
/// The space bar is reported as [`Space`](KeyCode::Space) rather than
/// `Char(' ')`: termbox treats it as a named key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// A printable character.
    Char(char),
    Space,
    Enter,
    Tab,
    Backspace,
    Escape,
    Insert,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    /// F1 through F20.
    F(u8),
}

bitflags! {
    /// Modifier keys, in xterm's `param - 1` bit order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const SUPER = 0b1000;
    }
}

/// A mouse button action at a 0-indexed cell position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub x: u16,
    pub y: u16,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    Press(MouseButton),
    Release(MouseButton),
    Drag(MouseButton),
    Move,
    ScrollUp,
    ScrollDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

// ─── Parser ─────────────────────────────────────────────────────────────────

/// Incremental byte-to-event parser.
///
/// ```
/// use tb_term::input::{Event, KeyCode, KeyEvent, Parser};
///
/// let mut parser = Parser::new();
/// assert!(parser.advance(b"\x1b[").is_empty());
/// assert_eq!(
///     parser.advance(b"A"),
///     vec![Event::Key(KeyEvent::plain(KeyCode::Up))]
/// );
/// ```
pub struct Parser {
    pending: Vec<u8>,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: Vec::with_capacity(64),
        }
    }

    /// Append `data` and return every event that is now complete.
    ///
    /// Incomplete trailing sequences stay buffered for the next call.
    pub fn advance(&mut self, data: &[u8]) -> Vec<Event> {
        self.pending.extend_from_slice(data);

        let mut events = Vec::new();
        let mut pos = 0;
        while pos < self.pending.len() {
            match parse_one(&self.pending[pos..]) {
                Step::Event(event, used) => {
                    events.push(event);
                    pos += used;
                }
                Step::Skip(used) => pos += used,
                Step::NeedMore => break,
            }
        }
        self.pending.drain(..pos);
        events
    }

    /// Whether bytes are waiting for the rest of a sequence.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Give up waiting and turn buffered bytes into plain keys.
    ///
    /// A lone ESC becomes [`KeyCode::Escape`]. Fragments of multi-byte
    /// sequences that can't stand alone are dropped.
    pub fn flush(&mut self) -> Vec<Event> {
        let events = self
            .pending
            .iter()
            .filter_map(|&b| match b {
                0x1B => Some(press(KeyCode::Escape)),
                0x00..=0x7F => match parse_one(&[b]) {
                    Step::Event(event, _) => Some(event),
                    _ => None,
                },
                _ => None,
            })
            .collect();
        self.pending.clear();
        events
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Parsing ────────────────────────────────────────────────────────────────

/// Outcome of looking at the front of the pending buffer.
enum Step {
    Event(Event, usize),
    Skip(usize),
    NeedMore,
}

fn parse_one(buf: &[u8]) -> Step {
    let Some(&first) = buf.first() else {
        return Step::NeedMore;
    };
    match first {
        0x1B => parse_escape(buf),
        0x09 => Step::Event(press(KeyCode::Tab), 1),
        0x0A | 0x0D => Step::Event(press(KeyCode::Enter), 1),
        0x08 | 0x7F => Step::Event(press(KeyCode::Backspace), 1),
        0x00..=0x1A => Step::Event(Event::Key(ctrl(first, Modifiers::CTRL)), 1),
        b' ' => Step::Event(press(KeyCode::Space), 1),
        0x21..=0x7E => Step::Event(press(KeyCode::Char(char::from(first))), 1),
        0xC0..=0xF7 => parse_utf8(buf),
        _ => Step::Skip(1),
    }
}

/// Ctrl+letter for a C0 control byte. `0x00` is Ctrl+@.
fn ctrl(byte: u8, modifiers: Modifiers) -> KeyEvent {
    let ch = if byte == 0 {
        '@'
    } else {
        char::from(byte - 1 + b'a')
    };
    KeyEvent {
        code: KeyCode::Char(ch),
        modifiers,
    }
}

fn parse_escape(buf: &[u8]) -> Step {
    let Some(&second) = buf.get(1) else {
        return Step::NeedMore;
    };
    match second {
        b'[' => parse_csi(buf),
        b'O' => parse_ss3(buf),
        0x1B => Step::Event(alt(KeyCode::Escape), 2),
        b' ' => Step::Event(alt(KeyCode::Space), 2),
        0x21..=0x7E => Step::Event(alt(KeyCode::Char(char::from(second))), 2),
        0x01..=0x1A => Step::Event(Event::Key(ctrl(second, Modifiers::ALT | Modifiers::CTRL)), 2),
        _ => Step::Event(press(KeyCode::Escape), 1),
    }
}

fn parse_csi(buf: &[u8]) -> Step {
    if buf.get(2) == Some(&b'<') {
        return parse_sgr_mouse(buf);
    }

    // Parameter and intermediate bytes run until a final byte in 0x40..=0x7E.
    let mut end = 2;
    loop {
        match buf.get(end) {
            None => return Step::NeedMore,
            Some(0x40..=0x7E) => break,
            Some(0x20..=0x3F) => end += 1,
            Some(_) => return Step::Skip(end + 1),
        }
    }

    let params = Params::parse(&buf[2..end]);
    let used = end + 1;
    let modifiers = decode_modifiers(params.get(1));

    let code = match buf[end] {
        b'~' => match tilde_key(params.get(0)) {
            Some(code) => code,
            None => return Step::Skip(used),
        },
        b'Z' => {
            return Step::Event(
                Event::Key(KeyEvent {
                    code: KeyCode::Tab,
                    modifiers: Modifiers::SHIFT,
                }),
                used,
            );
        }
        letter => match letter_key(letter) {
            Some(code) => code,
            None => return Step::Skip(used),
        },
    };

    Step::Event(Event::Key(KeyEvent { code, modifiers }), used)
}

fn parse_ss3(buf: &[u8]) -> Step {
    let Some(&letter) = buf.get(2) else {
        return Step::NeedMore;
    };
    letter_key(letter).map_or(Step::Skip(3), |code| Step::Event(press(code), 3))
}

/// Keys shared by `CSI <letter>` and `SS3 <letter>`.
const fn letter_key(letter: u8) -> Option<KeyCode> {
    Some(match letter {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        _ => return None,
    })
}

/// `CSI <n> ~` keys. The F-key numbering skips 16, 22, 27 and 30.
#[allow(clippy::cast_possible_truncation)]
const fn tilde_key(n: u16) -> Option<KeyCode> {
    Some(match n {
        1 | 7 => KeyCode::Home,
        2 => KeyCode::Insert,
        3 => KeyCode::Delete,
        4 | 8 => KeyCode::End,
        5 => KeyCode::PageUp,
        6 => KeyCode::PageDown,
        11..=15 => KeyCode::F((n - 10) as u8),
        17..=21 => KeyCode::F((n - 11) as u8),
        23..=26 => KeyCode::F((n - 12) as u8),
        28 | 29 => KeyCode::F((n - 13) as u8),
        31..=34 => KeyCode::F((n - 14) as u8),
        _ => return None,
    })
}

fn parse_sgr_mouse(buf: &[u8]) -> Step {
    let mut end = 3;
    loop {
        match buf.get(end) {
            None => return Step::NeedMore,
            Some(b'M' | b'm') => break,
            Some(b'0'..=b'9' | b';') => end += 1,
            Some(_) => return Step::Skip(end + 1),
        }
    }

    let params = Params::parse(&buf[3..end]);
    let cb = params.get(0);
    let x = params.get(1).saturating_sub(1);
    let y = params.get(2).saturating_sub(1);
    let released = buf[end] == b'm';

    let mut modifiers = Modifiers::empty();
    modifiers.set(Modifiers::SHIFT, cb & 4 != 0);
    modifiers.set(Modifiers::ALT, cb & 8 != 0);
    modifiers.set(Modifiers::CTRL, cb & 16 != 0);

    let button = match cb & 3 {
        0 => Some(MouseButton::Left),
        1 => Some(MouseButton::Middle),
        2 => Some(MouseButton::Right),
        _ => None,
    };

    let kind = if cb & 64 != 0 {
        if cb & 1 == 0 {
            MouseEventKind::ScrollUp
        } else {
            MouseEventKind::ScrollDown
        }
    } else if cb & 32 != 0 {
        button.map_or(MouseEventKind::Move, MouseEventKind::Drag)
    } else {
        let button = button.unwrap_or(MouseButton::Left);
        if released {
            MouseEventKind::Release(button)
        } else {
            MouseEventKind::Press(button)
        }
    };

    Step::Event(
        Event::Mouse(MouseEvent {
            kind,
            x,
            y,
            modifiers,
        }),
        end + 1,
    )
}

fn parse_utf8(buf: &[u8]) -> Step {
    let len = match buf[0] {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        _ => 4,
    };
    let Some(bytes) = buf.get(..len) else {
        // Only wait if what we have so far could still be valid.
        return if buf[1..].iter().all(|b| b & 0xC0 == 0x80) {
            Step::NeedMore
        } else {
            Step::Skip(1)
        };
    };
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| s.chars().next())
        .map_or(Step::Skip(1), |ch| Step::Event(press(KeyCode::Char(ch)), len))
}

// ─── Helpers ────────────────────────────────────────────────────────────────

const fn press(code: KeyCode) -> Event {
    Event::Key(KeyEvent::plain(code))
}

const fn alt(code: KeyCode) -> Event {
    Event::Key(KeyEvent {
        code,
        modifiers: Modifiers::ALT,
    })
}

/// xterm encodes modifiers as `1 + bitmask`; 0 and 1 both mean none.
#[allow(clippy::cast_possible_truncation)]
const fn decode_modifiers(param: u16) -> Modifiers {
    Modifiers::from_bits_truncate(param.saturating_sub(1) as u8)
}

/// Semicolon-separated numeric CSI parameters. Missing values read as 0;
/// colon sub-parameters are ignored.
struct Params {
    values: [u16; 4],
}

impl Params {
    fn parse(raw: &[u8]) -> Self {
        let mut values = [0u16; 4];
        let fields = raw
            .split(|&b| b == b';')
            .map(|field| {
                field
                    .iter()
                    .take_while(|b| b.is_ascii_digit())
                    .fold(0u16, |acc, &d| {
                        acc.saturating_mul(10).saturating_add(u16::from(d - b'0'))
                    })
            });
        for (slot, value) in values.iter_mut().zip(fields) {
            *slot = value;
        }
        Self { values }
    }

    fn get(&self, index: usize) -> u16 {
        self.values.get(index).copied().unwrap_or(0)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(bytes: &[u8]) -> Vec<Event> {
        Parser::new().advance(bytes)
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::plain(code))
    }

    fn key_mod(code: KeyCode, modifiers: Modifiers) -> Event {
        Event::Key(KeyEvent { code, modifiers })
    }

    // ── Plain bytes ─────────────────────────────────────────────────────

    #[test]
    fn printable_ascii() {
        assert_eq!(
            parse(b"aZ~"),
            vec![
                key(KeyCode::Char('a')),
                key(KeyCode::Char('Z')),
                key(KeyCode::Char('~')),
            ]
        );
    }

    #[test]
    fn space_is_a_named_key() {
        assert_eq!(parse(b" "), vec![key(KeyCode::Space)]);
    }

    #[test]
    fn control_bytes() {
        assert_eq!(parse(b"\r"), vec![key(KeyCode::Enter)]);
        assert_eq!(parse(b"\n"), vec![key(KeyCode::Enter)]);
        assert_eq!(parse(b"\t"), vec![key(KeyCode::Tab)]);
        assert_eq!(parse(b"\x7f"), vec![key(KeyCode::Backspace)]);
        assert_eq!(parse(b"\x08"), vec![key(KeyCode::Backspace)]);
    }

    #[test]
    fn ctrl_letters() {
        assert_eq!(parse(b"\x01"), vec![key_mod(KeyCode::Char('a'), Modifiers::CTRL)]);
        assert_eq!(parse(b"\x03"), vec![key_mod(KeyCode::Char('c'), Modifiers::CTRL)]);
        assert_eq!(parse(b"\x00"), vec![key_mod(KeyCode::Char('@'), Modifiers::CTRL)]);
    }

    #[test]
    fn utf8_characters() {
        assert_eq!(
            parse("é中🎉".as_bytes()),
            vec![
                key(KeyCode::Char('é')),
                key(KeyCode::Char('中')),
                key(KeyCode::Char('🎉')),
            ]
        );
    }

    #[test]
    fn utf8_split_across_reads() {
        let bytes = "中".as_bytes();
        let mut parser = Parser::new();
        assert!(parser.advance(&bytes[..1]).is_empty());
        assert!(parser.advance(&bytes[1..2]).is_empty());
        assert_eq!(parser.advance(&bytes[2..]), vec![key(KeyCode::Char('中'))]);
    }

    #[test]
    fn invalid_utf8_is_skipped() {
        assert_eq!(parse(b"\xC3a"), vec![key(KeyCode::Char('a'))]);
        assert_eq!(parse(b"\x80b"), vec![key(KeyCode::Char('b'))]);
    }

    // ── CSI / SS3 ───────────────────────────────────────────────────────

    #[test]
    fn arrows() {
        assert_eq!(parse(b"\x1b[A"), vec![key(KeyCode::Up)]);
        assert_eq!(parse(b"\x1b[B"), vec![key(KeyCode::Down)]);
        assert_eq!(parse(b"\x1b[C"), vec![key(KeyCode::Right)]);
        assert_eq!(parse(b"\x1b[D"), vec![key(KeyCode::Left)]);
    }

    #[test]
    fn ss3_arrows_and_function_keys() {
        assert_eq!(parse(b"\x1bOA"), vec![key(KeyCode::Up)]);
        assert_eq!(parse(b"\x1bOB"), vec![key(KeyCode::Down)]);
        assert_eq!(parse(b"\x1bOP"), vec![key(KeyCode::F(1))]);
    }

    #[test]
    fn modified_arrow() {
        assert_eq!(
            parse(b"\x1b[1;5A"),
            vec![key_mod(KeyCode::Up, Modifiers::CTRL)]
        );
        assert_eq!(
            parse(b"\x1b[1;4B"),
            vec![key_mod(KeyCode::Down, Modifiers::SHIFT | Modifiers::ALT)]
        );
    }

    #[test]
    fn tilde_keys() {
        assert_eq!(parse(b"\x1b[3~"), vec![key(KeyCode::Delete)]);
        assert_eq!(parse(b"\x1b[5~"), vec![key(KeyCode::PageUp)]);
        assert_eq!(parse(b"\x1b[15~"), vec![key(KeyCode::F(5))]);
        assert_eq!(parse(b"\x1b[24~"), vec![key(KeyCode::F(12))]);
        assert_eq!(parse(b"\x1b[34~"), vec![key(KeyCode::F(20))]);
    }

    #[test]
    fn back_tab() {
        assert_eq!(parse(b"\x1b[Z"), vec![key_mod(KeyCode::Tab, Modifiers::SHIFT)]);
    }

    #[test]
    fn unknown_csi_is_skipped() {
        assert_eq!(parse(b"\x1b[99~x"), vec![key(KeyCode::Char('x'))]);
        assert_eq!(parse(b"\x1b[Iy"), vec![key(KeyCode::Char('y'))]);
    }

    #[test]
    fn csi_split_across_reads() {
        let mut parser = Parser::new();
        assert!(parser.advance(b"\x1b[1;").is_empty());
        assert!(parser.has_pending());
        assert_eq!(
            parser.advance(b"2C"),
            vec![key_mod(KeyCode::Right, Modifiers::SHIFT)]
        );
        assert!(!parser.has_pending());
    }

    // ── Escape / Alt ────────────────────────────────────────────────────

    #[test]
    fn lone_escape_waits_then_flushes() {
        let mut parser = Parser::new();
        assert!(parser.advance(b"\x1b").is_empty());
        assert!(parser.has_pending());
        assert_eq!(parser.flush(), vec![key(KeyCode::Escape)]);
        assert!(!parser.has_pending());
    }

    #[test]
    fn flush_emits_partial_csi_bytes() {
        let mut parser = Parser::new();
        assert!(parser.advance(b"\x1b[").is_empty());
        assert_eq!(
            parser.flush(),
            vec![key(KeyCode::Escape), key(KeyCode::Char('['))]
        );
    }

    #[test]
    fn alt_keys() {
        assert_eq!(parse(b"\x1bx"), vec![key_mod(KeyCode::Char('x'), Modifiers::ALT)]);
        assert_eq!(parse(b"\x1b "), vec![key_mod(KeyCode::Space, Modifiers::ALT)]);
        assert_eq!(parse(b"\x1b\x1b"), vec![key_mod(KeyCode::Escape, Modifiers::ALT)]);
        assert_eq!(
            parse(b"\x1b\x01"),
            vec![key_mod(KeyCode::Char('a'), Modifiers::ALT | Modifiers::CTRL)]
        );
    }

    // ── Mouse ───────────────────────────────────────────────────────────

    #[test]
    fn sgr_mouse_press_and_release() {
        let press = MouseEvent {
            kind: MouseEventKind::Press(MouseButton::Left),
            x: 9,
            y: 4,
            modifiers: Modifiers::empty(),
        };
        assert_eq!(parse(b"\x1b[<0;10;5M"), vec![Event::Mouse(press)]);

        let release = MouseEvent {
            kind: MouseEventKind::Release(MouseButton::Right),
            ..press
        };
        assert_eq!(parse(b"\x1b[<2;10;5m"), vec![Event::Mouse(release)]);
    }

    #[test]
    fn sgr_mouse_scroll_drag_and_modifiers() {
        let events = parse(b"\x1b[<64;1;1M\x1b[<65;1;1M\x1b[<32;3;3M\x1b[<35;3;3M\x1b[<16;1;1M");
        let kinds: Vec<_> = events
            .iter()
            .map(|e| match e {
                Event::Mouse(m) => m.kind,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                MouseEventKind::ScrollUp,
                MouseEventKind::ScrollDown,
                MouseEventKind::Drag(MouseButton::Left),
                MouseEventKind::Move,
                MouseEventKind::Press(MouseButton::Left),
            ]
        );
        assert!(matches!(events[4], Event::Mouse(m) if m.modifiers == Modifiers::CTRL));
    }

    #[test]
    fn sgr_mouse_split_across_reads() {
        let mut parser = Parser::new();
        assert!(parser.advance(b"\x1b[<0;1").is_empty());
        assert_eq!(parser.advance(b";1M").len(), 1);
    }

    // ── Mixed stream ────────────────────────────────────────────────────

    #[test]
    fn mixed_stream() {
        assert_eq!(
            parse(b"a \x1b[Bq"),
            vec![
                key(KeyCode::Char('a')),
                key(KeyCode::Space),
                key(KeyCode::Down),
                key(KeyCode::Char('q')),
            ]
        );
    }
}
