//! # Mailcraft HTML Compiler
//!
//! Serializes an email [`Document`](mailcraft_document::Document) into one
//! self-contained HTML file. Layout uses nested tables (rows become table
//! rows, columns become cells sized by their width percentage) and every
//! style is inlined, so the output survives mail clients without modern
//! CSS support.
//!
//! Rendering is pure and deterministic: the same document always yields
//! byte-identical output.

mod blocks;
mod compiler;
mod sanitize;


pub use blocks::{DEFAULT_BUTTON_TEXT, DEFAULT_HEADING_TEXT};
pub use compiler::{render, render_with_options, CompileOptions};
pub use sanitize::{escape_html, strip_unsafe_markup};
