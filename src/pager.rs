use crate::error::PageSizeError;
use crate::record::ObservationRecord;
use serde::Serialize;
use std::fmt;

/// Allowed number of records per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(into = "usize")]
pub enum PageSize {
    #[default]
    Ten,
    Twenty,
    Thirty,
    Fifty,
}

impl PageSize {
    pub const ALL: [PageSize; 4] = [
        PageSize::Ten,
        PageSize::Twenty,
        PageSize::Thirty,
        PageSize::Fifty,
    ];

    pub fn get(self) -> usize {
        match self {
            PageSize::Ten => 10,
            PageSize::Twenty => 20,
            PageSize::Thirty => 30,
            PageSize::Fifty => 50,
        }
    }
}

impl TryFrom<usize> for PageSize {
    type Error = PageSizeError;

    fn try_from(size: usize) -> Result<Self, Self::Error> {
        PageSize::ALL
            .into_iter()
            .find(|candidate| candidate.get() == size)
            .ok_or(PageSizeError::Unsupported(size))
    }
}

impl From<PageSize> for usize {
    fn from(size: PageSize) -> usize {
        size.get()
    }
}

impl std::str::FromStr for PageSize {
    type Err = PageSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let size: usize = s
            .parse()
            .map_err(|_| PageSizeError::NotANumber(s.to_string()))?;
        PageSize::try_from(size)
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// 1-based bounds of the visible page. All zeros when there is nothing to
/// show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VisibleRange {
    pub start: usize,
    pub end: usize,
    pub total: usize,
}

impl VisibleRange {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Read-only snapshot handed to the renderer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView<'a> {
    pub visible_slice: &'a [ObservationRecord],
    pub visible_range: VisibleRange,
    pub current_page: usize,
    pub total_pages: usize,
    pub page_size: PageSize,
}

/// Client-side pagination over the current result set.
///
/// `current_page` always lies in `1..=total_pages()`: every mutation
/// re-clamps it before returning.
#[derive(Debug)]
pub struct Pager {
    records: Vec<ObservationRecord>,
    page_size: PageSize,
    current_page: usize,
}

impl Pager {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            records: Vec::new(),
            page_size,
            current_page: 1,
        }
    }

    pub fn records(&self) -> &[ObservationRecord] {
        &self.records
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.records.len().div_ceil(self.page_size.get()).max(1)
    }

    /// Replace the backing set and go back to the first page.
    pub fn set_records(&mut self, records: Vec<ObservationRecord>) {
        self.records = records;
        self.current_page = 1;
    }

    /// Change the page size, keeping the current page if it still exists.
    pub fn set_page_size(&mut self, size: PageSize) {
        self.page_size = size;
        self.clamp();
    }

    pub fn next_page(&mut self) {
        self.current_page = (self.current_page + 1).min(self.total_pages());
    }

    pub fn prev_page(&mut self) {
        self.current_page = self.current_page.saturating_sub(1).max(1);
    }

    fn clamp(&mut self) {
        self.current_page = self.current_page.clamp(1, self.total_pages());
    }

    pub fn visible_slice(&self) -> &[ObservationRecord] {
        let size = self.page_size.get();
        let start = ((self.current_page - 1) * size).min(self.records.len());
        let end = (start + size).min(self.records.len());
        &self.records[start..end]
    }

    pub fn visible_range(&self) -> VisibleRange {
        let total = self.records.len();
        if total == 0 {
            return VisibleRange {
                start: 0,
                end: 0,
                total,
            };
        }
        let start = (self.current_page - 1) * self.page_size.get() + 1;
        VisibleRange {
            start,
            end: start + self.visible_slice().len() - 1,
            total,
        }
    }

    pub fn view(&self) -> PageView<'_> {
        PageView {
            visible_slice: self.visible_slice(),
            visible_range: self.visible_range(),
            current_page: self.current_page(),
            total_pages: self.total_pages(),
            page_size: self.page_size,
        }
    }
}
