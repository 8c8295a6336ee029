//! # Page-Aware Layout
//!
//! The page is the unit of layout. Rows are never placed on an endless
//! canvas and sliced afterwards; each page is opened with a known budget,
//! filled, and closed:
//!
//! 1. [`geometry`] fixes the canvas and derives how many rows fit on a page
//!    that carries the summary and on one that does not
//! 2. [`page_break`] splits the rows into page-sized groups and decides
//!    which group carries the summary
//! 3. [`compose`] positions every label, band and rule on each page, with
//!    the table header repeated on every page
//!
//! Column widths for the table live in [`columns`].

pub mod columns;
pub mod compose;
pub mod geometry;
pub mod page_break;

pub use compose::{compose, Compositor, Page};
pub use geometry::{PageGeometry, PaperFormat, RowBudget};
pub use page_break::{paginate, paginate_rows, RowGroup};
