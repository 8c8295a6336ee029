//! # Table Columns
//!
//! The line-item table has four columns. Widths are declared as fractions
//! of the content width or fixed point sizes; `Auto` columns share what is
//! left.

use crate::style::Align;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnWidth {
    /// Fraction of available width (0.0-1.0).
    Fraction(f64),
    /// Fixed width in points.
    Fixed(f64),
    /// Distribute remaining space evenly among Auto columns.
    Auto,
}

/// One column of the line-item table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnDef {
    pub label: &'static str,
    pub width: ColumnWidth,
    pub align: Align,
}

/// Description, Qty, Unit Price, Total.
pub const ITEM_COLUMNS: [ColumnDef; 4] = [
    ColumnDef {
        label: "Description",
        width: ColumnWidth::Fraction(0.5),
        align: Align::Left,
    },
    ColumnDef {
        label: "Qty",
        width: ColumnWidth::Fraction(0.12),
        align: Align::Right,
    },
    ColumnDef {
        label: "Unit Price",
        width: ColumnWidth::Fraction(0.19),
        align: Align::Right,
    },
    ColumnDef {
        label: "Total",
        width: ColumnWidth::Auto,
        align: Align::Right,
    },
];

/// Resolve column widths against `available_width`. Negative leftovers are
/// clamped so `Auto` columns never get a negative width.
pub fn resolve_column_widths(defs: &[ColumnDef], available_width: f64) -> Vec<f64> {
    let mut widths = Vec::with_capacity(defs.len());
    let mut remaining = available_width;
    let mut auto_count = 0;

    for def in defs {
        match def.width {
            ColumnWidth::Fixed(w) => {
                widths.push(w);
                remaining -= w;
            }
            ColumnWidth::Fraction(f) => {
                let w = available_width * f;
                widths.push(w);
                remaining -= w;
            }
            ColumnWidth::Auto => {
                widths.push(0.0);
                auto_count += 1;
            }
        }
    }

    if auto_count > 0 {
        let auto_width = remaining.max(0.0) / auto_count as f64;
        for (width, def) in widths.iter_mut().zip(defs) {
            if matches!(def.width, ColumnWidth::Auto) {
                *width = auto_width;
            }
        }
    }

    widths
}

/// Left edges of columns starting at `x`.
pub fn column_offsets(x: f64, widths: &[f64]) -> Vec<f64> {
    widths
        .iter()
        .scan(x, |left, w| {
            let current = *left;
            *left += w;
            Some(current)
        })
        .collect()
}
