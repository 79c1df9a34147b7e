use crate::data::model::{TripRecord, TripTable};

// ---------------------------------------------------------------------------
// Per-cycle pagination state
// ---------------------------------------------------------------------------

/// Offset into the filtered table for raw-row pagination. Lives for one
/// filter cycle and starts again at 0 on restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    offset: usize,
    page_size: usize,
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Pager {
            offset: 0,
            page_size,
        }
    }

    /// Rows `[offset, offset + page_size)` of `table`, then advance the
    /// offset. Past the end the page is empty; the offset still advances.
    pub fn next_page<'t>(&mut self, table: &'t TripTable) -> &'t [TripRecord] {
        let page = table.page(self.offset, self.page_size);
        self.offset += self.page_size;
        page
    }
}
