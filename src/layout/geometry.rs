//! # Page Geometry
//!
//! The fixed vertical budget of one paper format. Every page has the same
//! canvas: a margin on all four sides, a header band at the top of the
//! content area (letterhead or running header, with the table header row
//! in its last `row_height`), fixed-height table rows below it, and on the
//! last page a reserved footer area for the summary block.
//!
//! ```text
//!  ┌──────────────────────────────┐  ─┬─ margin
//!  │  letterhead / running header │   │
//!  │ ████ table header row ██████ │   ├─ header_height
//!  │  row 0                       │  ─┘
//!  │  row 1                       │
//!  │  ...                         │
//!  │                              │  ─┬─ reserved_footer_height
//!  │  summary (last page only)    │   │  (includes the bottom margin)
//!  │            Page i of n       │   │
//!  └──────────────────────────────┘  ─┘
//! ```
//!
//! Two row budgets fall out of these constants: how many rows fit on a page
//! that must also hold the summary, and how many fit on a continuation
//! page. Both keep one row of slack.

use serde::{Deserialize, Serialize};

use crate::error::FolioError;

/// Number of lines in the summary totals column.
pub const SUMMARY_LINES: usize = 6;

/// Vertical distance between summary lines.
pub const SUMMARY_LINE_HEIGHT: f64 = 14.0;

/// Height of the summary totals column.
pub const SUMMARY_TOTALS_HEIGHT: f64 = SUMMARY_LINES as f64 * SUMMARY_LINE_HEIGHT;

/// Supported paper formats. One format is used for a whole export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperFormat {
    #[default]
    #[serde(alias = "a4")]
    A4,
    #[serde(alias = "letter")]
    Letter,
}

impl PaperFormat {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PaperFormat::A4 => (595.28, 841.89),
            PaperFormat::Letter => (612.0, 792.0),
        }
    }

    /// Default geometry for this format.
    pub fn geometry(&self) -> PageGeometry {
        let (page_width, page_height) = self.dimensions();
        PageGeometry {
            page_width,
            page_height,
            margin: 48.0,
            row_height: 20.0,
            header_height: 132.0,
            reserved_footer_height: 210.0,
            gap: default_gap(),
        }
    }
}

fn default_gap() -> f64 {
    12.0
}

/// Page canvas constants for one export call, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageGeometry {
    pub page_width: f64,
    pub page_height: f64,
    pub margin: f64,
    pub row_height: f64,
    /// Height of the band above the first row, table header row included.
    pub header_height: f64,
    /// Space kept free at the bottom of the last page for the summary block,
    /// bottom margin included.
    pub reserved_footer_height: f64,
    /// Space between the last row and the summary block.
    #[serde(default = "default_gap")]
    pub gap: f64,
}

impl Default for PageGeometry {
    fn default() -> Self {
        PaperFormat::default().geometry()
    }
}

/// How many rows fit on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowBudget {
    /// Rows that fit on a page that also carries the summary.
    pub first_page: usize,
    /// Rows that fit on a page without the summary.
    pub continuation: usize,
}

impl PageGeometry {
    pub fn usable_height(&self) -> f64 {
        self.page_height - 2.0 * self.margin
    }

    pub fn content_width(&self) -> f64 {
        self.page_width - 2.0 * self.margin
    }

    /// Top of the table header row.
    pub fn table_header_top(&self) -> f64 {
        self.margin + self.header_height - self.row_height
    }

    /// Top of the `k`-th row on a page.
    pub fn row_top(&self, k: usize) -> f64 {
        self.margin + self.header_height + k as f64 * self.row_height
    }

    /// Where the summary block starts on a page whose last row ends at
    /// `last_row_bottom`.
    pub fn summary_top(&self, last_row_bottom: f64) -> f64 {
        (last_row_bottom + self.gap).max(self.page_height - self.reserved_footer_height)
    }

    /// Lowest y any content may reach.
    pub fn content_bottom(&self) -> f64 {
        self.page_height - self.margin
    }

    /// Check the constants and derive the row budgets.
    pub fn row_budget(&self) -> Result<RowBudget, FolioError> {
        self.validate()?;

        let usable = self.usable_height();
        let first =
            ((usable - self.header_height - self.reserved_footer_height) / self.row_height).floor() - 1.0;
        let continuation = ((usable - self.header_height) / self.row_height).floor() - 1.0;

        if continuation <= 0.0 {
            return Err(FolioError::InvalidGeometry(format!(
                "no row fits on a continuation page (usable height {usable:.2}, header {:.2}, row {:.2})",
                self.header_height, self.row_height
            )));
        }

        Ok(RowBudget {
            first_page: first.max(0.0) as usize,
            continuation: continuation as usize,
        })
    }

    fn validate(&self) -> Result<(), FolioError> {
        let positive = [
            ("pageWidth", self.page_width),
            ("pageHeight", self.page_height),
            ("rowHeight", self.row_height),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(FolioError::InvalidGeometry(format!("{name} must be positive, got {value}")));
            }
        }

        let non_negative = [
            ("margin", self.margin),
            ("headerHeight", self.header_height),
            ("reservedFooterHeight", self.reserved_footer_height),
            ("gap", self.gap),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(FolioError::InvalidGeometry(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }

        if self.content_width() <= 0.0 || self.usable_height() <= 0.0 {
            return Err(FolioError::InvalidGeometry(format!(
                "margin {} leaves no content area on a {}x{} page",
                self.margin, self.page_width, self.page_height
            )));
        }

        if self.header_height < self.row_height {
            return Err(FolioError::InvalidGeometry(format!(
                "headerHeight {} cannot hold the table header row ({})",
                self.header_height, self.row_height
            )));
        }

        if self.usable_height() - self.header_height - self.reserved_footer_height < 0.0 {
            return Err(FolioError::InvalidGeometry(format!(
                "header {} and reserved footer {} exceed the usable height {:.2}",
                self.header_height,
                self.reserved_footer_height,
                self.usable_height()
            )));
        }

        if self.reserved_footer_height < self.margin + SUMMARY_TOTALS_HEIGHT {
            return Err(FolioError::InvalidGeometry(format!(
                "reservedFooterHeight {} is smaller than the summary block ({} + margin {})",
                self.reserved_footer_height, SUMMARY_TOTALS_HEIGHT, self.margin
            )));
        }

        if self.gap > self.margin {
            return Err(FolioError::InvalidGeometry(format!(
                "gap {} is larger than the margin {}",
                self.gap, self.margin
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_default_budgets() {
        let budget = PaperFormat::A4.geometry().row_budget().unwrap();
        assert_eq!(budget, RowBudget { first_page: 19, continuation: 29 });
    }

    #[test]
    fn letter_default_budgets() {
        let budget = PaperFormat::Letter.geometry().row_budget().unwrap();
        assert_eq!(budget, RowBudget { first_page: 16, continuation: 27 });
    }

    #[test]
    fn budgets_follow_the_floor_minus_one_rule() {
        let geometry = PageGeometry {
            page_width: 500.0,
            page_height: 1000.0,
            margin: 50.0,
            row_height: 20.0,
            header_height: 100.0,
            reserved_footer_height: 200.0,
            gap: 10.0,
        };
        // usable 900: (900-100-200)/20 = 30 -> 29, (900-100)/20 = 40 -> 39
        let budget = geometry.row_budget().unwrap();
        assert_eq!(budget, RowBudget { first_page: 29, continuation: 39 });
    }

    #[test]
    fn first_page_minus_one_clamps_to_zero() {
        let geometry = PageGeometry {
            page_height: 600.0,
            margin: 40.0,
            header_height: 120.0,
            reserved_footer_height: 390.0,
            ..PageGeometry::default()
        };
        // usable 520, 520-120-390 = 10 -> floor(0.5) - 1 = -1
        let budget = geometry.row_budget().unwrap();
        assert_eq!(budget.first_page, 0);
        assert_eq!(budget.continuation, 19);
    }

    #[test]
    fn summary_must_fit_on_an_empty_page() {
        let geometry = PageGeometry {
            page_width: 300.0,
            page_height: 340.0,
            margin: 20.0,
            row_height: 100.0,
            header_height: 100.0,
            reserved_footer_height: 200.0,
            gap: 10.0,
        };
        // usable 300: exactly header + reserved, no row beside the summary
        let budget = geometry.row_budget().unwrap();
        assert_eq!(budget, RowBudget { first_page: 0, continuation: 1 });

        let shorter = PageGeometry {
            page_height: 330.0,
            ..geometry
        };
        assert!(matches!(shorter.row_budget(), Err(FolioError::InvalidGeometry(_))));
    }

    #[test]
    fn continuation_of_exactly_zero_is_rejected() {
        let geometry = PageGeometry {
            page_width: 300.0,
            page_height: 440.0,
            margin: 20.0,
            row_height: 100.0,
            header_height: 100.0,
            reserved_footer_height: 120.0,
            gap: 10.0,
        };
        // usable 400: (400-100)/100 = 3 -> 2
        assert_eq!(geometry.row_budget().unwrap().continuation, 2);

        let geometry = PageGeometry {
            row_height: 150.0,
            header_height: 150.0,
            ..geometry
        };
        // usable 400: (400-150)/150 = 1 -> 0
        let err = geometry.row_budget().unwrap_err();
        assert!(err.to_string().contains("continuation page"));
    }

    #[test]
    fn rejects_non_positive_and_non_finite() {
        let base = PageGeometry::default();
        for bad in [
            PageGeometry { row_height: 0.0, ..base },
            PageGeometry { page_height: f64::NAN, ..base },
            PageGeometry { page_width: -1.0, ..base },
            PageGeometry { margin: -5.0, ..base },
            PageGeometry { header_height: f64::INFINITY, ..base },
        ] {
            assert!(matches!(bad.row_budget(), Err(FolioError::InvalidGeometry(_))), "{bad:?}");
        }
    }

    #[test]
    fn rejects_header_smaller_than_row() {
        let geometry = PageGeometry {
            header_height: 10.0,
            ..PageGeometry::default()
        };
        assert!(geometry.row_budget().is_err());
    }

    #[test]
    fn rejects_reserved_footer_too_small_for_summary() {
        let geometry = PageGeometry {
            reserved_footer_height: 100.0,
            ..PageGeometry::default()
        };
        let err = geometry.row_budget().unwrap_err();
        assert!(err.to_string().contains("summary block"));
    }

    #[test]
    fn rejects_gap_larger_than_margin() {
        let geometry = PageGeometry {
            gap: 60.0,
            ..PageGeometry::default()
        };
        assert!(geometry.row_budget().is_err());
    }

    #[test]
    fn row_positions() {
        let g = PaperFormat::A4.geometry();
        assert_eq!(g.table_header_top(), 160.0);
        assert_eq!(g.row_top(0), 180.0);
        assert_eq!(g.row_top(3), 240.0);
        assert_eq!(g.summary_top(240.0), g.page_height - 210.0);
        assert_eq!(g.summary_top(700.0), 712.0);
    }

    #[test]
    fn deserializes_with_default_gap() {
        let json = r#"{
            "pageWidth": 612, "pageHeight": 792, "margin": 36,
            "rowHeight": 18, "headerHeight": 120, "reservedFooterHeight": 180
        }"#;
        let geometry: PageGeometry = serde_json::from_str(json).unwrap();
        assert_eq!(geometry.gap, 12.0);
        assert_eq!(geometry.row_height, 18.0);
        let format: PaperFormat = serde_json::from_str(r#""letter""#).unwrap();
        assert_eq!(format, PaperFormat::Letter);
    }
}
