//! Pipeline stages for Markdown-to-PDF conversion.
//!
//! Each submodule implements exactly one step, so each is testable on its
//! own and the external tools can be swapped without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! derive ──▶ render ──▶ (artifact exists?) ──▶ stage ──▶ view
//! (.md→.pdf)  (pandoc)                          (copy)    (open)
//! ```
//!
//! 1. [`derive`] — compute the artifact path from the input path
//! 2. [`render`] — run the external renderer and wait for it
//! 3. [`stage`]  — copy the artifact into the destination directory
//! 4. [`view`]   — launch the viewer on the staged copy

pub mod derive;
pub mod render;
pub mod stage;
pub mod view;
