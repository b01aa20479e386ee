// SPDX-License-Identifier: MIT
//
// Backend event → `tb_event`.
//
// Stateless and total: every backend event produces exactly one record,
// built from an all-zero value so unused fields are always 0. Only three
// named keys exist on the C side; every other named key arrives with
// `key == 0` and `ch == 0`. Ctrl+letter is a control key, not a literal,
// so it lands in that bucket too. Alt+letter stays a literal.

use tb_term::input::{Event, KeyCode, KeyEvent, Modifiers};

use crate::ffi::{
    TB_EVENT_KEY, TB_EVENT_OTHER, TB_EVENT_RESIZE, TB_KEY_ARROW_DOWN, TB_KEY_ARROW_UP,
    TB_KEY_SPACE, TbEvent,
};

/// The C key code for a named key, if it has one.
const fn named_key(code: KeyCode) -> Option<u16> {
    match code {
        KeyCode::Space => Some(TB_KEY_SPACE),
        KeyCode::Up => Some(TB_KEY_ARROW_UP),
        KeyCode::Down => Some(TB_KEY_ARROW_DOWN),
        _ => None,
    }
}

#[must_use]
pub fn translate(event: &Event) -> TbEvent {
    match *event {
        Event::Key(key) => translate_key(key),
        Event::Resize { cols, rows } => TbEvent {
            kind: TB_EVENT_RESIZE,
            w: i32::from(cols),
            h: i32::from(rows),
            ..TbEvent::default()
        },
        Event::Mouse(_) => TbEvent::other(),
    }
}

fn translate_key(key: KeyEvent) -> TbEvent {
    let mut ev = TbEvent {
        kind: TB_EVENT_KEY,
        ..TbEvent::default()
    };
    match key.code {
        KeyCode::Char(c) if c != '\0' && !key.modifiers.contains(Modifiers::CTRL) => {
            ev.ch = u32::from(c);
        }
        code => ev.key = named_key(code).unwrap_or(0),
    }
    ev
}
