//! Pagination arithmetic and the page strip

use colored::Colorize;

use crate::api::PageMeta;

pub const PAGE_SIZE_OPTIONS: [usize; 4] = [10, 20, 50, 100];

/// `ceil(total / page_size)`; zero page size yields zero pages
pub fn page_count(total: u64, page_size: usize) -> u64 {
    if page_size == 0 {
        0
    } else {
        total.div_ceil(page_size as u64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSlot {
    Page(u64),
    Ellipsis,
}

/// Page buttons around `current`, collapsing long ranges with ellipses
pub fn page_numbers(current: u64, total_pages: u64) -> Vec<PageSlot> {
    use PageSlot::{Ellipsis, Page};

    if total_pages <= 7 {
        return (1..=total_pages).map(Page).collect();
    }
    if current <= 3 {
        return vec![Page(1), Page(2), Page(3), Page(4), Ellipsis, Page(total_pages)];
    }
    if current >= total_pages - 2 {
        return vec![
            Page(1),
            Ellipsis,
            Page(total_pages - 3),
            Page(total_pages - 2),
            Page(total_pages - 1),
            Page(total_pages),
        ];
    }
    vec![
        Page(1),
        Ellipsis,
        Page(current - 1),
        Page(current),
        Page(current + 1),
        Ellipsis,
        Page(total_pages),
    ]
}

/// Footer state for one rendered page of results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub page_size: usize,
    pub total: u64,
    pub pages: u64,
}

impl Pagination {
    pub fn from_meta(meta: &PageMeta) -> Self {
        Self {
            page: meta.page,
            page_size: meta.page_size,
            total: meta.total,
            pages: meta.pages,
        }
    }

    /// "Showing {start}–{end} of {total}", or nothing for an empty result
    pub fn summary(&self) -> Option<String> {
        if self.total == 0 {
            return None;
        }
        let size = self.page_size as u64;
        let start = self.page.saturating_sub(1).saturating_mul(size).saturating_add(1);
        let end = self.page.saturating_mul(size).min(self.total);
        Some(format!("Showing {}–{} of {}", start, end, self.total))
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.pages
    }

    pub fn slots(&self) -> Vec<PageSlot> {
        page_numbers(self.page, self.pages)
    }

    /// Footer line: summary, page strip and page size
    pub fn render(&self) -> Option<String> {
        let summary = self.summary()?;
        let strip: Vec<String> = self
            .slots()
            .into_iter()
            .map(|slot| match slot {
                PageSlot::Page(p) if p == self.page => format!("[{}]", p).bold().to_string(),
                PageSlot::Page(p) => p.to_string(),
                PageSlot::Ellipsis => "…".dimmed().to_string(),
            })
            .collect();
        Some(format!(
            "{}   {}   {} / page",
            summary.dimmed(),
            strip.join(" "),
            self.page_size
        ))
    }
}
