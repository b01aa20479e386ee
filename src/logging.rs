// SPDX-License-Identifier: MIT
//
// File logging for the shim.
//
// The host program owns the terminal, so nothing may be written to stdout
// or stderr. Logs go to `TERMBOX_LOG_FILE` when it is set and nowhere
// otherwise. The global subscriber is installed at most once per process;
// later `tb_init` calls reuse it. A log file that can't be opened doesn't
// count, so a later `tb_init` may try again.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::Config;

const FALLBACK_FILTER: &str = "info";

/// Whether a global subscriber is in place, ours or the host's.
static INSTALLED: Mutex<bool> = Mutex::new(false);

/// Install the file subscriber described by `config` unless one already is.
pub fn init(config: &Config) {
    let Some(path) = config.log_file.as_deref() else {
        return;
    };
    let mut installed = INSTALLED.lock().unwrap_or_else(PoisonError::into_inner);
    if !*installed {
        *installed = install(path, &config.log_filter);
    }
}

#[must_use]
pub fn is_installed() -> bool {
    *INSTALLED.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Returns `false` if nothing was installed and a retry could succeed.
fn install(path: &Path, directives: &str) -> bool {
    let Ok(file) = open_log(path) else {
        // No subscriber yet, so there's nowhere to report this.
        return false;
    };

    let (filter, bad_filter) = match build_filter(directives) {
        Ok(filter) => (filter, None),
        Err(err) => (EnvFilter::new(FALLBACK_FILTER), Some(err)),
    };

    let layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true);

    if tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .is_err()
    {
        // The host already installed a global subscriber; use that one.
        return true;
    }

    if let Some(err) = bad_filter {
        tracing::warn!(directives, %err, "invalid log filter, using `{FALLBACK_FILTER}`");
    }
    tracing::debug!(path = %path.display(), "logging started");
    true
}

fn open_log(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Parse an `EnvFilter` directive string.
///
/// # Errors
///
/// Returns the parse error for malformed directives.
pub fn build_filter(directives: &str) -> Result<EnvFilter, tracing_subscriber::filter::ParseError> {
    EnvFilter::try_new(directives)
}
