//! Fixed-size pages over the result table

use crate::types::result::TransactionResult;

/// Rows per page in the results table
pub const PAGE_SIZE: usize = 10;

/// Navigation state for one page.
///
/// Callers disable the previous/next controls from `has_previous` and
/// `has_next`; clamping alone would make them silent no-ops at the edges.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView<'a> {
    pub items: &'a [TransactionResult],
    /// 1-based page number after clamping
    pub number: usize,
    pub total_pages: usize,
    /// 1-based index of the first row shown (0 when there are no rows)
    pub first_row: usize,
    /// 1-based index of the last row shown
    pub last_row: usize,
    pub total_rows: usize,
}

impl PageView<'_> {
    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }
}

/// `ceil(len / PAGE_SIZE)`, never less than 1
pub fn total_pages(len: usize) -> usize {
    len.div_ceil(PAGE_SIZE).max(1)
}

/// Clamp a requested page into `[1, total_pages]`
pub fn clamp_page(page_number: usize, len: usize) -> usize {
    page_number.clamp(1, total_pages(len))
}

/// Rows on the requested page
pub fn page(results: &[TransactionResult], page_number: usize) -> &[TransactionResult] {
    let number = clamp_page(page_number, results.len());
    let start = ((number - 1) * PAGE_SIZE).min(results.len());
    let end = (start + PAGE_SIZE).min(results.len());
    &results[start..end]
}

/// Rows on the requested page plus navigation state
pub fn view(results: &[TransactionResult], page_number: usize) -> PageView<'_> {
    let number = clamp_page(page_number, results.len());
    let items = page(results, number);
    let offset = (number - 1) * PAGE_SIZE;

    PageView {
        items,
        number,
        total_pages: total_pages(results.len()),
        first_row: if items.is_empty() { 0 } else { offset + 1 },
        last_row: offset + items.len(),
        total_rows: results.len(),
    }
}
