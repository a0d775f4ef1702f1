//! Lazy range iterator
//!
//! Pages through a range with one bounded scan per page. A page holds at
//! most `min(page_size, remaining)` columns, so a count-limited iterator
//! never scans past its count. Each later page restarts the scan at the
//! last key returned (inclusive boundary) and drops that key.
//!
//! Entries, including join values, are decoded one at a time on `next()`.
//! A decode error is yielded once and ends the iteration. `reset()`
//! restarts from the beginning of the range; there is no resume after an
//! error.

use std::collections::VecDeque;

use widecol_core::{BoundPair, Column, Result, ScanBounds, WideMapKey};

use super::WideMap;

/// Lazy, paged iterator over a wide map range
pub struct WideMapIterator<K, V> {
    map: WideMap<K, V>,
    bounds: Option<BoundPair>,
    limit: Option<usize>,
    remaining: Option<usize>,
    buffer: VecDeque<Column>,
    last_key: Option<Vec<u8>>,
    source_exhausted: bool,
    done: bool,
    pages: usize,
}

impl<K: WideMapKey, V: 'static> WideMapIterator<K, V> {
    pub(crate) fn new(map: WideMap<K, V>, bounds: ScanBounds, limit: Option<usize>) -> Self {
        let bounds = match bounds {
            ScanBounds::Empty => None,
            ScanBounds::Range(p) => Some(p),
        };
        let done = bounds.is_none();
        Self {
            map,
            bounds,
            limit,
            remaining: limit,
            buffer: VecDeque::new(),
            last_key: None,
            source_exhausted: false,
            done,
            pages: 0,
        }
    }

    /// Number of scans issued so far
    pub fn pages_fetched(&self) -> usize {
        self.pages
    }

    /// Restart from the beginning of the range
    pub fn reset(&mut self) {
        self.remaining = self.limit;
        self.buffer.clear();
        self.last_key = None;
        self.source_exhausted = false;
        self.done = self.bounds.is_none();
        self.pages = 0;
    }

    fn fetch_page(&mut self, bounds: &BoundPair) -> Result<()> {
        let want = match self.remaining {
            Some(r) => r.min(self.map.page_size()),
            None => self.map.page_size(),
        };
        if want == 0 {
            self.source_exhausted = true;
            return Ok(());
        }

        let (low, high, limit) = match &self.last_key {
            None => (bounds.low.clone(), bounds.high.clone(), want),
            Some(last) if bounds.reverse => (bounds.low.clone(), last.clone(), want + 1),
            Some(last) => (last.clone(), bounds.high.clone(), want + 1),
        };

        let page = self
            .map
            .scan_page(&low, &high, bounds.reverse, Some(limit))?;
        self.pages += 1;
        if page.len() < limit {
            self.source_exhausted = true;
        }

        let mut page = VecDeque::from(page);
        if let (Some(last), Some(first)) = (&self.last_key, page.front()) {
            if &first.name == last {
                page.pop_front();
            }
        }
        self.buffer = page;
        Ok(())
    }
}

impl<K: WideMapKey, V: 'static> Iterator for WideMapIterator<K, V> {
    type Item = Result<(K, V)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.remaining == Some(0) {
            self.done = true;
            return None;
        }

        if self.buffer.is_empty() {
            if self.source_exhausted {
                self.done = true;
                return None;
            }
            let bounds = self.bounds.clone()?;
            if let Err(e) = self.fetch_page(&bounds) {
                self.done = true;
                return Some(Err(e));
            }
        }

        let column = match self.buffer.pop_front() {
            Some(c) => c,
            None => {
                self.done = true;
                return None;
            }
        };
        self.last_key = Some(column.name.clone());
        if let Some(r) = self.remaining.as_mut() {
            *r -= 1;
        }

        match self.map.decode_entry(column) {
            Ok(entry) => Some(Ok(entry)),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
