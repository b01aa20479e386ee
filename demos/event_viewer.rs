// SPDX-License-Identifier: MIT
//
// termbox event viewer: drives the shim exactly the way a C caller would.
//
// Every frame goes through the exported functions: fetch the cell buffer,
// write into it, present. Every key and resize shows up in a scrolling log
// as the raw `tb_event` fields. Press `q` to quit.
//
// Usage:
//   cargo run --example event_viewer
//   TERMBOX_ATTRIBUTES=palette TERMBOX_LOG_FILE=/tmp/tb.log cargo run --example event_viewer
#![allow(unsafe_code)]

use std::collections::VecDeque;
use std::process;

use termbox::ffi::{
    TB_BLACK, TB_DEFAULT, TB_EVENT_KEY, TB_EVENT_OTHER, TB_EVENT_RESIZE, TB_KEY_ARROW_DOWN,
    TB_KEY_ARROW_UP, TB_KEY_SPACE, TB_WHITE, TbCell, TbEvent, tb_cell_buffer, tb_clear,
    tb_height, tb_init, tb_poll_event, tb_present, tb_shutdown, tb_width,
};

const MAX_LOG_ENTRIES: usize = 200;

struct Viewer {
    log: VecDeque<String>,
    events: u64,
}

impl Viewer {
    const fn new() -> Self {
        Self {
            log: VecDeque::new(),
            events: 0,
        }
    }

    fn record(&mut self, ev: &TbEvent) {
        if self.log.len() >= MAX_LOG_ENTRIES {
            self.log.pop_front();
        }
        self.log.push_back(describe(ev));
        self.events += 1;
    }

    fn draw(&self) {
        tb_clear();
        let (Ok(w), Ok(h)) = (usize::try_from(tb_width()), usize::try_from(tb_height())) else {
            return;
        };
        let ptr = tb_cell_buffer();
        if ptr.is_null() || w == 0 || h == 0 {
            return;
        }
        // SAFETY: the buffer holds width * height cells until the next resize,
        // and nothing else touches it before tb_present.
        let cells = unsafe { std::slice::from_raw_parts_mut(ptr, w * h) };
        let mut rows = cells.chunks_exact_mut(w);

        if let Some(row) = rows.next() {
            let header = format!(" termbox event viewer  {w}x{h}  {} events  q quits", self.events);
            put(row, &header, TB_BLACK, TB_WHITE);
        }

        let visible = h.saturating_sub(1);
        let skip = self.log.len().saturating_sub(visible);
        for (row, line) in rows.zip(self.log.iter().skip(skip)) {
            put(row, line, TB_DEFAULT, TB_DEFAULT);
        }

        tb_present();
    }
}

/// Write `text` from the start of `row`, padding the rest with `bg`.
fn put(row: &mut [TbCell], text: &str, fg: u16, bg: u16) {
    let mut chars = text.chars();
    for cell in row {
        let ch = chars.next().unwrap_or(' ');
        *cell = TbCell {
            ch: u32::from(ch),
            fg,
            bg,
        };
    }
}

fn describe(ev: &TbEvent) -> String {
    match ev.kind {
        TB_EVENT_KEY => {
            let name = match ev.key {
                TB_KEY_SPACE => "Space".to_owned(),
                TB_KEY_ARROW_UP => "Up".to_owned(),
                TB_KEY_ARROW_DOWN => "Down".to_owned(),
                0 => char::from_u32(ev.ch).map_or_else(|| "?".to_owned(), |c| format!("'{c}'")),
                other => format!("key {other:#06x}"),
            };
            format!("KEY     key={:#06x} ch={:#06x}  {name}", ev.key, ev.ch)
        }
        TB_EVENT_RESIZE => format!("RESIZE  w={} h={}", ev.w, ev.h),
        TB_EVENT_OTHER => "OTHER".to_owned(),
        other => format!("type {other}"),
    }
}

fn main() {
    if tb_init() != 0 {
        eprintln!("event_viewer: tb_init failed (is stdin a terminal?)");
        process::exit(1);
    }

    let mut viewer = Viewer::new();
    viewer.draw();

    let mut ev = TbEvent::default();
    loop {
        // SAFETY: `ev` is a live, writable tb_event.
        unsafe { tb_poll_event(&raw mut ev) };
        if ev.kind == TB_EVENT_KEY && ev.ch == u32::from('q') {
            break;
        }
        viewer.record(&ev);
        viewer.draw();
    }

    tb_shutdown();
}
