//! # Page Break Decisions
//!
//! Splits the line items into page-sized groups. Rows have a fixed height,
//! so a break decision is a count: the first page takes as many rows as
//! fit next to the summary, every following page takes a continuation
//! budget, and the summary lands on the last group.
//!
//! The summary needs the reserved footer area. When the final continuation
//! page is too full to hold it, an empty closing group is appended so the
//! summary gets a page of its own instead of overlapping the rows. In that
//! case the final continuation slice is not flagged as the last group: with
//! budgets 40/45, 85 rows give `[40, 45, 0]`, not `[40, 45]`.

use std::ops::Range;

use crate::error::FolioError;
use crate::layout::geometry::{PageGeometry, RowBudget};

/// A contiguous run of rows placed on one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowGroup {
    /// Indices into the original row list.
    pub range: Range<usize>,
    /// Whether this page carries the summary block.
    pub is_last_group: bool,
}

impl RowGroup {
    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// The rows of this group, borrowed from the full list.
    pub fn rows<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.range.clone()]
    }
}

/// Split `rows` into page groups for `geometry`.
pub fn paginate<T>(rows: &[T], geometry: &PageGeometry) -> Result<Vec<RowGroup>, FolioError> {
    let budget = geometry.row_budget()?;
    paginate_rows(rows.len(), budget)
}

/// Split `row_count` rows into groups according to `budget`.
pub fn paginate_rows(row_count: usize, budget: RowBudget) -> Result<Vec<RowGroup>, FolioError> {
    if budget.continuation == 0 {
        return Err(FolioError::InvalidGeometry(
            "continuation pages cannot hold any rows".to_string(),
        ));
    }

    if row_count <= budget.first_page {
        log::debug!("paginated {row_count} rows onto a single page");
        return Ok(vec![RowGroup {
            range: 0..row_count,
            is_last_group: true,
        }]);
    }

    let mut groups = vec![RowGroup {
        range: 0..budget.first_page,
        is_last_group: false,
    }];

    let mut start = budget.first_page;
    while start < row_count {
        let end = (start + budget.continuation).min(row_count);
        groups.push(RowGroup {
            range: start..end,
            is_last_group: false,
        });
        start = end;
    }

    // The final continuation slice must leave room for the summary.
    let needs_closing_page = groups
        .last()
        .map(|group| group.len() > budget.first_page)
        .unwrap_or(false);
    if needs_closing_page {
        groups.push(RowGroup {
            range: row_count..row_count,
            is_last_group: true,
        });
    } else if let Some(last) = groups.last_mut() {
        last.is_last_group = true;
    }

    log::debug!(
        "paginated {row_count} rows into {} pages: {:?}",
        groups.len(),
        groups.iter().map(RowGroup::len).collect::<Vec<_>>()
    );

    Ok(groups)
}
