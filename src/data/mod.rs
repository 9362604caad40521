/// Data layer: table model, loading, filtering, summaries and export.
///
/// Architecture:
/// ```text
///  upload bytes (.csv with `;` / .xlsx)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  delimited text, else workbook → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  age range ∧ categorical selections → filtered Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  summary  │  raw + filtered `y` proportions (fallback if empty)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  csv / xlsx bytes
///   └──────────┘
/// ```
///
/// `pipeline::Session` wires the stages together; `cache` memoizes the pure
/// ones.

pub mod cache;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod summary;
