//! Paginated list cursor
//!
//! ARM list operations return `{ "value": [...], "nextLink": "..." }` pages.
//! [`Pager`] walks them lazily and forward-only: the next page is requested
//! only once the buffered items of the current one are exhausted.

use std::collections::VecDeque;
use std::fmt;

use futures::future::BoxFuture;
use futures::stream::{self, Stream};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One page of a list result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items of this page, in server order.
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    /// Continuation URL. Absent or empty on the last page.
    #[serde(default, skip_serializing)]
    pub next_link: Option<String>,
}

impl<T> Page<T> {
    /// A final page holding `items`.
    pub fn last(items: Vec<T>) -> Self {
        Self {
            value: items,
            next_link: None,
        }
    }

    /// Whether this page carries no items.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// The continuation URL, if another page follows.
    pub fn continuation(&self) -> Option<&str> {
        self.next_link.as_deref().filter(|link| !link.is_empty())
    }
}

/// Fetches the page behind a continuation URL.
pub type PageFetcher<T> = Box<dyn FnMut(String) -> BoxFuture<'static, Result<Page<T>>> + Send>;

/// Lazy, forward-only cursor over a paginated collection.
///
/// A fetch error is returned where the cursor was advanced and fuses it:
/// every later call reports the end of the sequence. Restarting means issuing
/// the original list request again.
pub struct Pager<T> {
    buffer: VecDeque<T>,
    next_link: Option<String>,
    fetch: PageFetcher<T>,
    pages_fetched: usize,
    fused: bool,
}

impl<T> fmt::Debug for Pager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pager")
            .field("buffered", &self.buffer.len())
            .field("next_link", &self.next_link)
            .field("pages_fetched", &self.pages_fetched)
            .field("fused", &self.fused)
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> Pager<T> {
    /// Starts a cursor from an already fetched first page.
    pub fn new<F>(first: Page<T>, fetch: F) -> Self
    where
        F: FnMut(String) -> BoxFuture<'static, Result<Page<T>>> + Send + 'static,
    {
        let next_link = first.continuation().map(ToString::to_string);
        Self {
            buffer: first.value.into(),
            next_link,
            fetch: Box::new(fetch),
            pages_fetched: 1,
            fused: false,
        }
    }

    /// Whether more items may follow.
    pub fn has_more(&self) -> bool {
        !self.fused && (!self.buffer.is_empty() || self.next_link.is_some())
    }

    /// Number of pages received so far, including the first one.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Yields the next item, fetching further pages as needed.
    ///
    /// Returns `None` once the collection is exhausted or after an error.
    pub async fn next(&mut self) -> Option<Result<T>> {
        loop {
            if self.fused {
                return None;
            }
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }
            match self.advance().await {
                Ok(true) => {}
                Ok(false) => return None,
                Err(e) => return Some(Err(e)),
            }
        }
    }

    /// Yields the remaining items of the current page, or the next non-empty
    /// page. `Ok(None)` marks the end.
    pub async fn next_page(&mut self) -> Result<Option<Vec<T>>> {
        loop {
            if self.fused {
                return Ok(None);
            }
            if !self.buffer.is_empty() {
                return Ok(Some(self.buffer.drain(..).collect()));
            }
            if !self.advance().await? {
                return Ok(None);
            }
        }
    }

    /// Drains every remaining item, stopping at the first error.
    pub async fn try_collect(mut self) -> Result<Vec<T>> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await {
            items.push(item?);
        }
        Ok(items)
    }

    /// Adapts the cursor into a [`Stream`] of items.
    pub fn into_stream(self) -> impl Stream<Item = Result<T>> + Send {
        stream::unfold(self, |mut pager| async move {
            pager.next().await.map(|item| (item, pager))
        })
    }

    /// 拉取下一页；返回 `false` 表示没有更多页
    async fn advance(&mut self) -> Result<bool> {
        let Some(link) = self.next_link.take() else {
            self.fused = true;
            return Ok(false);
        };

        match (self.fetch)(link).await {
            Ok(page) => {
                self.pages_fetched += 1;
                self.next_link = page.continuation().map(ToString::to_string);
                if page.is_empty() && self.next_link.is_some() {
                    log::debug!("Skipping empty page {}", self.pages_fetched);
                }
                self.buffer.extend(page.value);
                Ok(true)
            }
            Err(e) => {
                self.fused = true;
                Err(e)
            }
        }
    }
}
