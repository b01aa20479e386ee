// SPDX-License-Identifier: MIT
//
// termbox-shim: the termbox C API on top of tb-term.
//
// C programs written against termbox link this crate as a static or shared
// library and keep calling `tb_init`, `tb_cell_buffer`, `tb_present` and
// `tb_poll_event` as before. Underneath, two pieces do the work:
//
//   mirror     the flat `tb_cell` array C draws into, synced with the
//              backend grid on `tb_cell_buffer` and `tb_present`
//   translate  backend input events → `tb_event` records
//
// Everything else is plumbing: `session` ties one backend to one mirror,
// `ffi` exposes the process-wide session through the C ABI, and `config`
// and `logging` read the TERMBOX_* environment variables.
//
//   C caller ──ffi──▶ Session ──▶ GridMirror ⇄ Backend (tb_term::Screen)
//                         └────▶ translate ◀── Backend::poll_event

pub mod backend;
pub mod config;
pub mod ffi;
pub mod logging;
pub mod mirror;
pub mod palette;
pub mod session;
pub mod translate;

pub use backend::Backend;
pub use config::Config;
pub use ffi::{TbCell, TbEvent};
pub use mirror::GridMirror;
pub use palette::AttributeMode;
pub use session::Session;
