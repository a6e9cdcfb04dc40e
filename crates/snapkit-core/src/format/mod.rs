//! Snapshot file format
//!
//! A snapshot file is a sequence of assignments separated by blank lines:
//!
//! ```text
//! exports['greeting 1'] = `
//! hello
//! world
//! `
//!
//! exports['config 1'] = {
//!   "debug": true
//! }
//! ```
//!
//! - `encode`: value → fragment, and whole-file rendering
//! - `decode`: file → mapping, without executing anything

pub mod decode;
pub mod encode;

pub use decode::{decode_file, parse_snapshots, remove_extra_newlines};
pub use encode::{
    encode_entry, encode_structured, encode_text, escape_name, escape_text, format_fragments,
    render_file,
};
