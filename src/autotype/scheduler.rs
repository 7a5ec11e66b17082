use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use super::{AutotypeError, AutotypeToken};

pub const DEFAULT_DELAY_MS: u64 = 10;

/// Keystroke injection into the foreground window. Keys use the
/// `SendKeys` notation (`{Tab}`, `+{Tab}`, `{+}`).
pub trait KeystrokeSink {
    /// Fire and forget.
    fn send(&mut self, keys: &str) -> Result<(), AutotypeError>;
    /// Blocks until the target processed the keys.
    fn send_wait(&mut self, keys: &str) -> Result<(), AutotypeError>;
    fn caps_lock_on(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Suffix {
    #[default]
    None,
    Tab,
    Enter,
}

impl Suffix {
    fn keys(self) -> Option<&'static str> {
        match self {
            Suffix::None => None,
            Suffix::Tab => Some("{TAB}"),
            Suffix::Enter => Some("{ENTER}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutotypeSettings {
    /// Pause after every key in milliseconds
    pub delay_ms: u64,
    pub use_send_wait: bool,
}

impl Default for AutotypeSettings {
    fn default() -> Self {
        Self { delay_ms: DEFAULT_DELAY_MS, use_send_wait: false }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutotypeProgress {
    /// 1-based count of keys sent so far, suffix included
    pub step: usize,
    pub keys: String,
}

// Status indicator
//------------------------------------------------------------------------------

/// Cosmetic progress display, e.g. an animated tray icon.
pub trait StatusIndicator {
    fn update(&mut self, step: usize);
}

/// Shared, disposable handle to a [`StatusIndicator`]. Updates after
/// [`StatusHandle::dispose`] are no-ops.
#[derive(Clone, Default)]
pub struct StatusHandle {
    inner: Arc<Mutex<Option<Box<dyn StatusIndicator + Send>>>>,
}

impl StatusHandle {
    pub fn new(indicator: Box<dyn StatusIndicator + Send>) -> Self {
        Self { inner: Arc::new(Mutex::new(Some(indicator))) }
    }

    /// Handle without an indicator.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn update(&self, step: usize) {
        match self.inner.lock() {
            Ok(mut guard) => {
                if let Some(indicator) = guard.as_mut() {
                    indicator.update(step);
                }
            }
            Err(_) => warn!("Status indicator lock poisoned, skipping update"),
        }
    }

    pub fn dispose(&self) {
        if let Ok(mut guard) = self.inner.lock() {
            guard.take();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.lock().map(|g| g.is_none()).unwrap_or(true)
    }
}

// Task
//------------------------------------------------------------------------------

/// Running auto-type sequence. It cannot be cancelled; once started it types
/// every token.
pub struct AutotypeTask {
    progress: Receiver<AutotypeProgress>,
    handle: JoinHandle<Result<(), AutotypeError>>,
}

impl AutotypeTask {
    pub fn progress(&self) -> &Receiver<AutotypeProgress> {
        &self.progress
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn join(self) -> Result<(), AutotypeError> {
        self.handle.join().unwrap_or(Err(AutotypeError::Aborted))
    }
}

// Runs the completion callback exactly once, also when the worker unwinds
struct Completion<F: FnOnce(&Result<(), AutotypeError>)> {
    callback: Option<F>,
}

impl<F: FnOnce(&Result<(), AutotypeError>)> Completion<F> {
    fn finish(mut self, result: &Result<(), AutotypeError>) {
        if let Some(callback) = self.callback.take() {
            callback(result);
        }
    }
}

impl<F: FnOnce(&Result<(), AutotypeError>)> Drop for Completion<F> {
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            callback(&Err(AutotypeError::Aborted));
        }
    }
}

/// Types `tokens` on a dedicated worker thread.
///
/// Commands are interpreted on the way: `Delay:<ms>` changes the pause after
/// each key, `Wait:<ms>` sleeps once and `Legacy` toggles between
/// [`KeystrokeSink::send_wait`] and [`KeystrokeSink::send`]. Unresolved field
/// commands are skipped. `on_complete` runs after the last key whether or not
/// the run succeeded.
pub fn run_autotype<S, F>(
    tokens: Vec<AutotypeToken>,
    suffix: Suffix,
    settings: AutotypeSettings,
    mut sink: S,
    status: StatusHandle,
    on_complete: F,
) -> AutotypeTask
where
    S: KeystrokeSink + Send + 'static,
    F: FnOnce(&Result<(), AutotypeError>) + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let handle = thread::spawn(move || {
        let completion = Completion { callback: Some(on_complete) };
        debug!("Auto-type started with {} tokens", tokens.len());
        let result = type_tokens(&tokens, suffix, settings, &mut sink, &status, &tx);
        match &result {
            Ok(()) => debug!("Auto-type finished"),
            Err(e) => error!("Auto-type failed: {e}"),
        }
        completion.finish(&result);
        result
    });
    AutotypeTask { progress: rx, handle }
}

fn type_tokens<S: KeystrokeSink>(
    tokens: &[AutotypeToken],
    suffix: Suffix,
    settings: AutotypeSettings,
    sink: &mut S,
    status: &StatusHandle,
    tx: &Sender<AutotypeProgress>,
) -> Result<(), AutotypeError> {
    let mut delay = Duration::from_millis(settings.delay_ms);
    let mut send_wait = settings.use_send_wait;
    let mut step = 0;

    let mut emit = |keys: &str, send_wait: bool| -> Result<(), AutotypeError> {
        let keys = if sink.caps_lock_on() { format!("{{CAPSLOCK}}{keys}") } else { keys.to_string() };
        if send_wait {
            sink.send_wait(&keys)?;
        } else {
            sink.send(&keys)?;
        }
        step += 1;
        status.update(step);
        // Receiver may be gone; typing continues regardless
        let _ = tx.send(AutotypeProgress { step, keys });
        Ok(())
    };

    for token in tokens {
        match token.command_parts() {
            None => {
                emit(token.content(), send_wait)?;
                thread::sleep(delay);
            }
            Some(("Delay", Some(ms))) => {
                if let Ok(ms) = ms.parse() {
                    debug!("Auto-type delay set to {ms} ms");
                    delay = Duration::from_millis(ms);
                }
            }
            Some(("Wait", Some(ms))) => {
                if let Ok(ms) = ms.parse() {
                    debug!("Auto-type waiting {ms} ms");
                    thread::sleep(Duration::from_millis(ms));
                }
            }
            Some(("Legacy", _)) => send_wait = !send_wait,
            Some((name, _)) => debug!("Skipping unresolved command {name}"),
        }
    }

    if let Some(keys) = suffix.keys() {
        emit(keys, send_wait)?;
    }
    Ok(())
}
