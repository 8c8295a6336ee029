//! # Folio
//!
//! Page-native invoice pagination and PDF export.
//!
//! A browser form captures an invoice: parties, any number of line items,
//! discount and tax, bank details. Folio turns it into a print-ready,
//! paginated document. The table header repeats on every page, rows are
//! never cut at a page boundary, and the summary block (totals plus the
//! bank details, notes and terms footer) is placed exactly once, on the
//! last page, where it can never overlap a row or run into the margin.
//!
//! The page is the unit of layout. Folio never renders a tall canvas and
//! slices it; it counts how many rows each page holds before anything is
//! placed.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON / ExportRequest)
//!       ↓
//!   [model]        — Invoice, parties, line items, adjustments
//!       ↓
//!   [totals]       — Subtotal, discount, tax, total, balance
//!       ↓
//!   [layout]       — Geometry → row groups → composed pages
//!       ↓
//!   [export]       — Hand-off to a DocumentWriter
//!       ↓
//!   [pdf]          — PDF bytes, or a file on disk
//! ```

pub mod error;
pub mod export;
pub mod font;
pub mod layout;
pub mod logo;
pub mod model;
pub mod money;
pub mod numbering;
pub mod pdf;
pub mod style;
pub mod text;
pub mod totals;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::FolioError;
pub use export::{
    export, render, render_json, DocumentWriter, ExportError, ExportRequest, Exporter, PaginatedDocument,
    RenderedDocument,
};
pub use layout::{PageGeometry, PaperFormat};
pub use model::Invoice;
pub use totals::{calc_totals, Totals};
