//! Page splitting for ordered listings.
//!
//! Page numbers are 1-based. A requested number outside `1..=num_pages`
//! clamps to the nearest valid page, and an empty collection still has one
//! (empty) page.

use std::num::IntErrorKind;

use serde::{Deserialize, Serialize};

/// Page size for post and group listings.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Page size for the author directory and follower lists.
pub const AUTHOR_PAGE_SIZE: u64 = 20;

/// One page of an ordered result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub page_size: u64,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, number: u64, page_size: u64, total: u64) -> Self {
        Self {
            items,
            number,
            page_size,
            total,
        }
    }

    pub fn num_pages(&self) -> u64 {
        num_pages(self.total, self.page_size)
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn next_page_number(&self) -> Option<u64> {
        self.has_next().then(|| self.number + 1)
    }

    pub fn previous_page_number(&self) -> Option<u64> {
        self.has_previous().then(|| self.number - 1)
    }
}

fn num_pages(total: u64, page_size: u64) -> u64 {
    total.div_ceil(page_size.max(1)).max(1)
}

/// A requested page before the collection size is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: i64,
    pub page_size: u64,
}

/// Offset/limit slice of a collection for a clamped page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub offset: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn new(number: i64, page_size: u64) -> Self {
        Self {
            number,
            page_size: page_size.max(1),
        }
    }

    /// Interpret a raw `page` query parameter; anything non-numeric is page 1.
    /// Numbers beyond `i64` saturate, so they still clamp to the last page.
    pub fn parse(raw: Option<&str>, page_size: u64) -> Self {
        let number = raw
            .and_then(|s| match s.trim().parse::<i64>() {
                Ok(n) => Some(n),
                Err(e) => match e.kind() {
                    IntErrorKind::PosOverflow => Some(i64::MAX),
                    IntErrorKind::NegOverflow => Some(i64::MIN),
                    _ => None,
                },
            })
            .unwrap_or(1);
        Self::new(number, page_size)
    }

    /// Clamp the requested number against `total` items.
    pub fn window(&self, total: u64) -> PageWindow {
        let last = num_pages(total, self.page_size);
        let number = self.number.clamp(1, last.min(i64::MAX as u64) as i64) as u64;
        PageWindow {
            number,
            offset: (number - 1) * self.page_size,
            limit: self.page_size,
        }
    }
}

/// Split an already ordered collection and return the requested page.
pub fn paginate<T>(items: Vec<T>, page_size: u64, page_number: i64) -> Page<T> {
    let request = PageRequest::new(page_number, page_size);
    let total = items.len() as u64;
    let window = request.window(total);
    let page_items = items
        .into_iter()
        .skip(window.offset as usize)
        .take(window.limit as usize)
        .collect();
    Page::new(page_items, window.number, request.page_size, total)
}
