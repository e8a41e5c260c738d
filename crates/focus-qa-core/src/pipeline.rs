//! Batch driver: pulls images from a source, classifies them on a bounded
//! worker pool and hands verdicts to an output in input order.

use std::num::NonZeroUsize;

use anyhow::Context;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::domain::{AnalysisResult, ImageInfo, ScoreResult};
use crate::focus::FocusClassifier;
use crate::ports::{ImageSource, ProgressEvent, ProgressSink, ResultOutput};

/// Counts and results of a finished batch.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    /// Images classified, including fail-safe verdicts.
    pub processed: usize,
    /// Images that could not be read at all.
    pub skipped: usize,
    /// Images classified as sharp.
    pub sharp: usize,
    /// Images classified as blurry.
    pub blurry: usize,
    /// Every result, in input order.
    pub results: Vec<AnalysisResult>,
}

/// Runs a classifier over every image of a source.
pub struct BatchRunner {
    classifier: FocusClassifier,
    jobs: usize,
    include_details: bool,
}

impl BatchRunner {
    /// Creates a runner using `jobs` worker threads (0 = one per CPU core).
    #[must_use]
    pub fn new(classifier: FocusClassifier, jobs: usize) -> Self {
        let jobs = if jobs == 0 {
            std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
        } else {
            jobs
        };
        Self {
            classifier,
            jobs,
            include_details: false,
        }
    }

    /// Attach the per-measure report to every result.
    #[must_use]
    pub const fn with_details(mut self, include_details: bool) -> Self {
        self.include_details = include_details;
        self
    }

    /// Number of worker threads.
    #[must_use]
    pub const fn jobs(&self) -> usize {
        self.jobs
    }

    /// Classifies one image, applying the fail-safe verdict on failure.
    #[must_use]
    pub fn classify_image(&self, image: &ImageInfo) -> AnalysisResult {
        let (verdict, failure, details) = match self.classifier.analyze_info(image) {
            Ok(report) => (
                report.verdict(),
                None,
                self.include_details.then_some(report),
            ),
            Err(e) => {
                warn!("Using fail-safe verdict for {}: {e}", image.path);
                (ScoreResult::FAIL_SAFE, Some(e.to_string()), None)
            }
        };

        AnalysisResult {
            path: image.path.clone(),
            original_name: image.original_name.clone(),
            timestamp: iso_timestamp(),
            dimensions: image.dimensions(),
            blur_score: verdict.score,
            is_blurry: verdict.is_blurry,
            failure,
            details,
        }
    }

    /// Processes every image of `source`.
    ///
    /// Images are decoded and classified `jobs` at a time so that at most
    /// that many decoded images are held in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker pool cannot be built or the output
    /// fails. Unreadable images are skipped, not errors.
    pub fn run(
        &self,
        source: &dyn ImageSource,
        output: &dyn ResultOutput,
        progress: &dyn ProgressSink,
    ) -> anyhow::Result<BatchSummary> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .context("Failed to build classification worker pool")?;

        let total = source.count_hint();
        info!(
            "Classifying {} images with {} workers",
            total.map_or_else(|| "?".to_string(), |t| t.to_string()),
            self.jobs
        );

        let mut summary = BatchSummary::default();
        let mut images = source.images().enumerate();

        loop {
            let chunk: Vec<_> = images.by_ref().take(self.jobs).collect();
            if chunk.is_empty() {
                break;
            }

            let outcomes: Vec<Result<AnalysisResult, (usize, String)>> = pool.install(|| {
                chunk
                    .into_par_iter()
                    .map(|(index, item)| match item {
                        Ok(image) => {
                            progress.on_event(ProgressEvent::Started {
                                path: image.path.clone(),
                                index,
                                total,
                            });
                            Ok(self.classify_image(&image))
                        }
                        Err(e) => Err((index, format!("{e:#}"))),
                    })
                    .collect()
            });

            for outcome in outcomes {
                match outcome {
                    Ok(result) => {
                        output.write(&result)?;
                        if result.is_blurry {
                            summary.blurry += 1;
                        } else {
                            summary.sharp += 1;
                        }
                        summary.processed += 1;
                        progress.on_event(ProgressEvent::Completed {
                            result: result.clone(),
                        });
                        summary.results.push(result);
                    }
                    Err((index, reason)) => {
                        debug!("Skipping image {index}: {reason}");
                        summary.skipped += 1;
                        progress.on_event(ProgressEvent::Skipped {
                            path: format!("image {index}"),
                            reason,
                        });
                    }
                }
            }
        }

        output.finish()?;

        progress.on_event(ProgressEvent::Finished {
            processed: summary.processed,
            skipped: summary.skipped,
            sharp: summary.sharp,
            blurry: summary.blurry,
        });

        Ok(summary)
    }
}

/// Current time as an RFC 3339 UTC timestamp.
#[must_use]
pub fn iso_timestamp() -> String {
    match time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            debug!("Timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        }
    }
}
