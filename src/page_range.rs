use anyhow::{anyhow, Result};
use std::ops::RangeInclusive;

/// An inclusive, 1-based page interval bound to a document's page count.
///
/// `1 <= start <= end <= page_count` holds for every value of this type.
/// Edits that would break it are rejected and leave the range untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    start: u32,
    end: u32,
    page_count: u32,
}

impl PageRange {
    /// The whole document, `[1, page_count]`. `None` for an empty document.
    pub fn full(page_count: u32) -> Option<Self> {
        if page_count == 0 {
            return None;
        }
        Some(PageRange {
            start: 1,
            end: page_count,
            page_count,
        })
    }

    /// Parse a range like "3", "2-5", "4-end" or "end" against a document
    /// with `page_count` pages
    pub fn parse(s: &str, page_count: u32) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(anyhow!("Empty page range"));
        }

        let (start, end) = match s.find('-') {
            Some(0) => return Err(anyhow!("Invalid page range: {}", s)),
            Some(dash_pos) => (
                parse_bound(&s[..dash_pos], page_count)?,
                parse_bound(&s[dash_pos + 1..], page_count)?,
            ),
            None => {
                let page = parse_bound(s, page_count)?;
                (page, page)
            }
        };

        if start == 0 || end == 0 {
            return Err(anyhow!("Page numbers must be >= 1"));
        }
        if end > page_count {
            return Err(anyhow!(
                "End page {} exceeds total pages {}",
                end,
                page_count
            ));
        }
        if start > end {
            return Err(anyhow!(
                "Start page {} is after end page {}",
                start,
                end
            ));
        }

        Ok(PageRange {
            start,
            end,
            page_count,
        })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Move the first page of the range. Returns whether the edit applied.
    pub fn set_start(&mut self, value: u32) -> bool {
        if value == self.start || value == 0 || value > self.page_count || value > self.end {
            return false;
        }
        self.start = value;
        true
    }

    /// Move the last page of the range. Returns whether the edit applied.
    pub fn set_end(&mut self, value: u32) -> bool {
        if value == self.end || value == 0 || value > self.page_count || value < self.start {
            return false;
        }
        self.end = value;
        true
    }

    /// `[1, page_count]` of the same document
    pub fn whole_document(&self) -> PageRange {
        PageRange {
            start: 1,
            end: self.page_count,
            page_count: self.page_count,
        }
    }

    /// Number of selected pages, never zero
    pub fn count(&self) -> u32 {
        self.end - self.start + 1
    }

    /// Selected 1-based page numbers in ascending order
    pub fn pages(&self) -> RangeInclusive<u32> {
        self.start..=self.end
    }
}

impl std::fmt::Display for PageRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

fn parse_bound(s: &str, page_count: u32) -> Result<u32> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("end") {
        Ok(page_count)
    } else {
        s.parse::<u32>()
            .map_err(|_| anyhow!("Invalid page number: {}", s))
    }
}
