//! Auto-type: a small scripting language describing what to type into another
//! application, and the worker that types it.
//!
//! Scripts are parsed into [`AutotypeToken`]s by [`parse_script`], filled in
//! from an [`Entry`] by [`expand_tokens`] and typed by [`run_autotype`].
//!
//! | Escape      | Meaning                                   |
//! |-------------|-------------------------------------------|
//! | `\u` `\p`   | user name, password                       |
//! | `\2`        | current two-factor code                   |
//! | `\g` `\i`   | group, title                              |
//! | `\l` `\m`   | url, email                                |
//! | `\o[n]`     | notes, or only line `n`                   |
//! | `\cn` `\ct` | card number, card number tabbed by 4      |
//! | `\ce` `\cv` `\cp` | card expiration, CVV, PIN           |
//! | `\t` `\s` `\n` `\b` | Tab, Shift+Tab, Enter, Backspace  |
//! | `\d<ms>`    | delay between keys                        |
//! | `\w<ms>` `\W<s>` | wait                                 |
//! | `\z`        | toggle legacy (blocking) typing           |
//!
//! Bracketed forms such as `{Delay:500}`, `{UserName}` or `{Tab 3}` are also
//! understood.

mod entry;
mod expand;
mod parser;
mod scheduler;
mod token;

use thiserror::Error;

pub use entry::{Entry, Record, RecordType};
pub use expand::{expand_tokens, resolve_two_factor, typing_tokens, TotpCodeSource, TwoFactorSource};
pub use parser::{default_tokens, describe, parse_script, text_to_tokens};
pub use scheduler::{
    run_autotype, AutotypeProgress, AutotypeSettings, AutotypeTask, KeystrokeSink, StatusHandle,
    StatusIndicator, Suffix, DEFAULT_DELAY_MS,
};
pub use token::{AutotypeToken, TokenKind};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AutotypeError {
    #[error("keystroke injection failed: {0}")]
    Send(String),
    #[error("auto-type worker stopped unexpectedly")]
    Aborted,
}
