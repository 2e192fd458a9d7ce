//! Pipeline stages behind the summary and flashcard workflows.
//!
//! ## Data Flow
//!
//! ```text
//!                       ┌──▶ primary (external CLI via process) ──▶ parse ──┐
//! input ──▶ extract ──▶ │                                                    ├──▶ result
//! (URL/path) (pdfium)   └──▶ chunk ──▶ local (model per chunk) ──▶ parse ────┘
//!                            (only when primary fails)
//! ```
//!
//! 1. [`input`]       — canonicalise the user-supplied path or URL to a local file
//! 2. [`extract`]     — pull page text with pdfium (in `spawn_blocking`)
//! 3. [`postprocess`] — clean extracted text
//! 4. [`primary`]     — one attempt with the external AI tool, through [`process`]
//! 5. [`chunk`]       — greedy whitespace chunking for the local model
//! 6. [`local`]       — chunk-by-chunk generation with the local model
//! 7. [`parse`]       — flashcard parsers for both generators

pub mod chunk;
pub mod extract;
pub mod input;
pub mod local;
pub mod parse;
pub mod postprocess;
pub mod primary;
pub mod process;
