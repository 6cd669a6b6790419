//! Batch processing
//!
//! Applies a formula to every record of a board, one record at a time:
//! validate, evaluate, then write the result into the target column.
//! Outcomes are tallied per record; a failing record never stops the batch.
//! The only early exit is cancellation, checked before each record.
//!
//! # Example
//!
//! ```rust,no_run
//! use tallyboard::prelude::*;
//!
//! # async fn run(client: BoardClient<HttpTransport>, records: Vec<Record>, formula: Formula) {
//! let target = TargetColumn::new("numbers9", "Total", "numbers").unwrap();
//! let processor = BatchProcessor::new(&client);
//!
//! let summary = processor
//!     .process_board(&records, &formula, &target, |p| {
//!         println!("{}/{}", p.processed, p.total);
//!     })
//!     .await;
//! println!("{}", summary);
//! # }
//! ```

use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tallyboard_core::{Record, TargetColumn};
use tallyboard_formula::{evaluate, validate_record, Formula, FormulaValue};
use tallyboard_remote::{BoardClient, Transport};

/// Reason recorded when the remote write fails
pub const WRITE_FAILED: &str = "Failed to update column";

/// Options for a batch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingOptions {
    /// Maximum example results kept in the summary (default: 5)
    pub example_limit: usize,
    /// Evaluate without writing (default: false)
    pub dry_run: bool,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            example_limit: 5,
            dry_run: false,
        }
    }
}

/// Outcome of one record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    /// Evaluated and written (or evaluated, in a dry run)
    Success,
    /// Evaluation failed or the write was rejected
    Failed,
    /// Record lacks what the formula needs
    Skipped,
}

/// Per-record result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingResult {
    pub id: String,
    pub name: String,
    pub status: RecordStatus,
    /// Computed value on success; the failure or skip reason otherwise
    pub result: FormulaValue,
}

impl ProcessingResult {
    fn new(record: &Record, status: RecordStatus, result: FormulaValue) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            status,
            result,
        }
    }
}

/// A `(name, result)` pair shown in reports
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Example {
    pub name: String,
    pub result: FormulaValue,
}

/// Running counters, reported after every record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessingProgress {
    pub processed: usize,
    pub total: usize,
    pub success: usize,
    pub failure: usize,
    pub skipped: usize,
}

/// Final report of a batch run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessingSummary {
    /// Records handed to the run
    pub total: usize,
    /// Records actually processed (less than `total` when cancelled)
    pub processed_count: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub skipped_count: usize,
    pub cancelled: bool,
    pub dry_run: bool,
    /// First successful results, up to the example limit
    pub examples: Vec<Example>,
    pub results: Vec<ProcessingResult>,
}

impl ProcessingSummary {
    fn new(total: usize, dry_run: bool) -> Self {
        Self {
            total,
            dry_run,
            results: Vec::with_capacity(total),
            ..Default::default()
        }
    }

    fn record(&mut self, result: ProcessingResult, example_limit: usize) {
        match result.status {
            RecordStatus::Success => {
                self.success_count += 1;
                if self.examples.len() < example_limit {
                    self.examples.push(Example {
                        name: result.name.clone(),
                        result: result.result.clone(),
                    });
                }
            }
            RecordStatus::Failed => self.failure_count += 1,
            RecordStatus::Skipped => self.skipped_count += 1,
        }
        self.processed_count += 1;
        self.results.push(result);
    }

    fn progress(&self) -> ProcessingProgress {
        ProcessingProgress {
            processed: self.processed_count,
            total: self.total,
            success: self.success_count,
            failure: self.failure_count,
            skipped: self.skipped_count,
        }
    }

    /// Results with the given status
    pub fn results_with(&self, status: RecordStatus) -> impl Iterator<Item = &ProcessingResult> {
        self.results.iter().filter(move |r| r.status == status)
    }
}

impl fmt::Display for ProcessingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.cancelled {
            writeln!(
                f,
                "Cancelled after {} of {} records",
                self.processed_count, self.total
            )?;
        } else {
            writeln!(f, "Processed {} records", self.processed_count)?;
        }
        let updated = if self.dry_run { "Evaluated (dry run)" } else { "Updated" };
        writeln!(f, "  {}: {}", updated, self.success_count)?;
        writeln!(f, "  Failed: {}", self.failure_count)?;
        write!(f, "  Skipped: {}", self.skipped_count)?;

        if !self.examples.is_empty() {
            write!(f, "\nExamples:")?;
            for example in &self.examples {
                write!(f, "\n  {}: {}", example.name, example.result)?;
            }
        }
        Ok(())
    }
}

/// Shared cancellation switch, usable as the `should_cancel` predicate
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Applies a formula across records, writing through a [`BoardClient`].
pub struct BatchProcessor<'a, T> {
    client: &'a BoardClient<T>,
    options: ProcessingOptions,
}

impl<'a, T: Transport> BatchProcessor<'a, T> {
    pub fn new(client: &'a BoardClient<T>) -> Self {
        Self::with_options(client, ProcessingOptions::default())
    }

    pub fn with_options(client: &'a BoardClient<T>, options: ProcessingOptions) -> Self {
        Self { client, options }
    }

    /// Process every record
    pub async fn process_board<P>(
        &self,
        records: &[Record],
        formula: &Formula,
        target: &TargetColumn,
        on_progress: P,
    ) -> ProcessingSummary
    where
        P: FnMut(ProcessingProgress),
    {
        self.process_board_with_cancel(records, formula, target, on_progress, || false)
            .await
    }

    /// Process records in order until done or until `should_cancel` returns
    /// true. The check runs before each record; a record already started
    /// finishes.
    pub async fn process_board_with_cancel<P, C>(
        &self,
        records: &[Record],
        formula: &Formula,
        target: &TargetColumn,
        mut on_progress: P,
        should_cancel: C,
    ) -> ProcessingSummary
    where
        P: FnMut(ProcessingProgress),
        C: Fn() -> bool,
    {
        let mut summary = ProcessingSummary::new(records.len(), self.options.dry_run);
        tracing::info!(
            records = records.len(),
            target = %target,
            dry_run = self.options.dry_run,
            "starting batch"
        );

        for record in records {
            if should_cancel() {
                tracing::info!(
                    processed = summary.processed_count,
                    total = summary.total,
                    "batch cancelled"
                );
                summary.cancelled = true;
                break;
            }

            let result = self.process_record(record, formula, target).await;
            summary.record(result, self.options.example_limit);
            on_progress(summary.progress());
        }

        tracing::info!(
            success = summary.success_count,
            failure = summary.failure_count,
            skipped = summary.skipped_count,
            "batch finished"
        );
        summary
    }

    async fn process_record(
        &self,
        record: &Record,
        formula: &Formula,
        target: &TargetColumn,
    ) -> ProcessingResult {
        if let Err(reason) = validate_record(formula, record) {
            tracing::debug!(id = %record.id, %reason, "skipping record");
            return ProcessingResult::new(
                record,
                RecordStatus::Skipped,
                FormulaValue::Error(reason.to_string()),
            );
        }

        let value = evaluate(formula, record);
        let Some(text) = value.to_column_text() else {
            tracing::debug!(id = %record.id, result = %value, "evaluation failed");
            return ProcessingResult::new(record, RecordStatus::Failed, value);
        };

        if self.options.dry_run {
            return ProcessingResult::new(record, RecordStatus::Success, value);
        }

        match self
            .client
            .change_column_value(&record.id, &record.board_id, &target.id, &text)
            .await
        {
            Ok(_) => ProcessingResult::new(record, RecordStatus::Success, value),
            Err(e) => {
                tracing::warn!(id = %record.id, error = %e, "column update failed");
                ProcessingResult::new(
                    record,
                    RecordStatus::Failed,
                    FormulaValue::Error(WRITE_FAILED.to_string()),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn result(name: &str, status: RecordStatus, value: FormulaValue) -> ProcessingResult {
        ProcessingResult {
            id: name.to_string(),
            name: name.to_string(),
            status,
            result: value,
        }
    }

    #[test]
    fn test_summary_counts_and_example_limit() {
        let mut summary = ProcessingSummary::new(8, false);
        for i in 0..6 {
            summary.record(
                result(&format!("r{i}"), RecordStatus::Success, FormulaValue::Number(i as f64)),
                5,
            );
        }
        summary.record(result("bad", RecordStatus::Failed, FormulaValue::Error("NaN".into())), 5);
        summary.record(
            result("skip", RecordStatus::Skipped, FormulaValue::Error("Missing column: Qty".into())),
            5,
        );

        assert_eq!(summary.processed_count, 8);
        assert_eq!(summary.success_count, 6);
        assert_eq!(summary.failure_count, 1);
        assert_eq!(summary.skipped_count, 1);
        assert_eq!(summary.examples.len(), 5);
        assert_eq!(summary.results_with(RecordStatus::Skipped).count(), 1);
        assert_eq!(
            summary.progress(),
            ProcessingProgress {
                processed: 8,
                total: 8,
                success: 6,
                failure: 1,
                skipped: 1
            }
        );
    }

    #[test]
    fn test_summary_display() {
        let mut summary = ProcessingSummary::new(3, false);
        summary.record(result("Widget", RecordStatus::Success, FormulaValue::Number(42.0)), 5);
        summary.record(result("Gadget", RecordStatus::Success, FormulaValue::Boolean(true)), 5);
        summary.cancelled = true;

        assert_eq!(
            summary.to_string(),
            "Cancelled after 2 of 3 records\n  Updated: 2\n  Failed: 0\n  Skipped: 0\nExamples:\n  Widget: 42\n  Gadget: true"
        );
    }

    #[test]
    fn test_summary_display_dry_run_without_examples() {
        let summary = ProcessingSummary::new(0, true);
        assert_eq!(
            summary.to_string(),
            "Processed 0 records\n  Evaluated (dry run): 0\n  Failed: 0\n  Skipped: 0"
        );
    }

    #[test]
    fn test_cancellation_flag_shared() {
        let flag = CancellationFlag::new();
        let other = flag.clone();
        assert!(!flag.is_cancelled());
        other.cancel();
        assert!(flag.is_cancelled());
    }
}
