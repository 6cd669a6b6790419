//! Record fetching
//!
//! Top-level items are read page by page following the service cursor.
//! Sub-items are read by parent id in fixed-size chunks with a pause between
//! chunks. A remote failure halts the fetch; everything aggregated before it
//! is still returned alongside the error.

use std::time::Duration;

use tallyboard_core::Record;
use tallyboard_remote::{BoardClient, RemoteError, Transport};
use tokio::time::sleep;

/// Options for record fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Items requested per page (default: 100)
    pub page_size: usize,
    /// Parent ids per sub-item request (default: 20)
    pub child_batch_size: usize,
    /// Pause between sub-item requests (default: 200ms)
    pub child_batch_delay: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            page_size: 100,
            child_batch_size: 20,
            child_batch_delay: Duration::from_millis(200),
        }
    }
}

/// Which part of a board fetch is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
    Items,
    Subitems,
}

/// Progress after one page or chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchProgress {
    pub stage: FetchStage,
    /// Pages or chunks completed in this stage
    pub batches: usize,
    /// Chunk count, known up front only for sub-items
    pub total_batches: Option<usize>,
    /// Records aggregated so far in this stage
    pub fetched: usize,
}

/// Records aggregated by a fetch, plus the error that halted it, if any
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub records: Vec<Record>,
    pub error: Option<RemoteError>,
}

impl FetchOutcome {
    /// Check if the fetch ran to completion
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Convert into a `Result`, discarding partial records on error
    pub fn into_result(self) -> tallyboard_remote::Result<Vec<Record>> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.records),
        }
    }
}

/// Reads records from one board through a [`BoardClient`].
pub struct RecordFetcher<'a, T> {
    client: &'a BoardClient<T>,
    options: FetchOptions,
}

impl<'a, T: Transport> RecordFetcher<'a, T> {
    pub fn new(client: &'a BoardClient<T>) -> Self {
        Self::with_options(client, FetchOptions::default())
    }

    pub fn with_options(client: &'a BoardClient<T>, options: FetchOptions) -> Self {
        Self { client, options }
    }

    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// Fetch every top-level item of the board.
    ///
    /// Stops after a page with no items or no cursor. `on_progress` is
    /// called after each page with the running total.
    pub async fn fetch_all_records<P>(&self, mut on_progress: P) -> FetchOutcome
    where
        P: FnMut(FetchProgress),
    {
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0;

        loop {
            let page = match self
                .client
                .items_page(cursor.as_deref(), self.options.page_size)
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!(pages, fetched = records.len(), error = %e, "item fetch halted");
                    return FetchOutcome {
                        records,
                        error: Some(e),
                    };
                }
            };

            pages += 1;
            let page_len = page.items.len();
            records.extend(page.items);
            tracing::info!(page = pages, items = page_len, fetched = records.len(), "fetched item page");
            on_progress(FetchProgress {
                stage: FetchStage::Items,
                batches: pages,
                total_batches: None,
                fetched: records.len(),
            });

            match page.cursor {
                Some(next) if page_len > 0 => cursor = Some(next),
                _ => break,
            }
        }

        FetchOutcome {
            records,
            error: None,
        }
    }

    /// Fetch the sub-items of `parent_ids`, in chunks.
    pub async fn fetch_child_records<P>(&self, parent_ids: &[String], mut on_progress: P) -> FetchOutcome
    where
        P: FnMut(FetchProgress),
    {
        let mut records = Vec::new();
        let chunk_size = self.options.child_batch_size.max(1);
        let total_batches = parent_ids.len().div_ceil(chunk_size);

        for (index, chunk) in parent_ids.chunks(chunk_size).enumerate() {
            if index > 0 {
                sleep(self.options.child_batch_delay).await;
            }

            match self.client.child_items(chunk).await {
                Ok(children) => records.extend(children),
                Err(e) => {
                    tracing::warn!(
                        chunk = index + 1,
                        total_batches,
                        fetched = records.len(),
                        error = %e,
                        "sub-item fetch halted"
                    );
                    return FetchOutcome {
                        records,
                        error: Some(e),
                    };
                }
            }

            tracing::debug!(chunk = index + 1, total_batches, fetched = records.len(), "fetched sub-item chunk");
            on_progress(FetchProgress {
                stage: FetchStage::Subitems,
                batches: index + 1,
                total_batches: Some(total_batches),
                fetched: records.len(),
            });
        }

        FetchOutcome {
            records,
            error: None,
        }
    }

    /// Fetch all items, then the sub-items of every item that has any.
    ///
    /// Parents come first in the result, followed by sub-items.
    pub async fn fetch_board<P>(&self, mut on_progress: P) -> FetchOutcome
    where
        P: FnMut(FetchProgress),
    {
        let mut outcome = self.fetch_all_records(&mut on_progress).await;
        if !outcome.is_complete() {
            return outcome;
        }

        let parent_ids: Vec<String> = outcome
            .records
            .iter()
            .filter(|r| r.has_children)
            .map(|r| r.id.clone())
            .collect();
        if parent_ids.is_empty() {
            return outcome;
        }

        tracing::info!(parents = parent_ids.len(), "fetching sub-items");
        let children = self.fetch_child_records(&parent_ids, &mut on_progress).await;
        outcome.records.extend(children.records);
        outcome.error = children.error;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = FetchOptions::default();
        assert_eq!(options.page_size, 100);
        assert_eq!(options.child_batch_size, 20);
        assert_eq!(options.child_batch_delay, Duration::from_millis(200));
    }

    #[test]
    fn test_outcome_into_result() {
        let complete = FetchOutcome {
            records: vec![Record::item("1", "a", "9")],
            error: None,
        };
        assert!(complete.is_complete());
        assert_eq!(complete.into_result().unwrap().len(), 1);

        let halted = FetchOutcome {
            records: vec![Record::item("1", "a", "9")],
            error: Some(RemoteError::Http("timeout".into())),
        };
        assert!(!halted.is_complete());
        assert!(halted.into_result().is_err());
    }
}
