//! Terminal feedback while a batch is classified.

use focus_qa_core::{AnalysisResult, ProgressEvent, ProgressSink};
use indicatif::{ProgressBar as IndicatifBar, ProgressStyle};

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

enum Display {
    /// Nothing is written.
    Silent,
    /// An indicatif bar on stderr.
    Bar(IndicatifBar),
    /// One stderr line per blurry or skipped image.
    Lines,
}

/// [`ProgressSink`] rendering batch progress on stderr.
pub struct ProgressBar {
    display: Display,
}

impl ProgressBar {
    /// `quiet` wins over `show_bar`; without a bar only blurry and skipped
    /// images are reported.
    #[must_use]
    pub fn new(total: Option<u64>, quiet: bool, show_bar: bool) -> Self {
        let display = match (quiet, show_bar) {
            (true, _) => Display::Silent,
            (false, true) => Display::Bar(styled_bar(total)),
            (false, false) => Display::Lines,
        };
        Self { display }
    }
}

fn styled_bar(total: Option<u64>) -> IndicatifBar {
    let bar = total.map_or_else(IndicatifBar::new_spinner, IndicatifBar::new);
    if let Ok(style) = ProgressStyle::default_bar().template(BAR_TEMPLATE) {
        bar.set_style(style.progress_chars("#>-"));
    }
    bar
}

fn blurry_line(result: &AnalysisResult) -> Option<String> {
    match &result.failure {
        Some(reason) => Some(format!("{}: blurry (unreadable: {reason})", result.original_name)),
        None if result.is_blurry => Some(format!(
            "{}: blurry (score {:.1})",
            result.original_name, result.blur_score
        )),
        None => None,
    }
}

impl ProgressSink for ProgressBar {
    fn on_event(&self, event: ProgressEvent) {
        let bar = match &self.display {
            Display::Silent => return,
            Display::Bar(bar) => Some(bar),
            Display::Lines => None,
        };

        match (event, bar) {
            (ProgressEvent::Started { path, total, .. }, Some(bar)) => {
                if let Some(total) = total {
                    bar.set_length(total as u64);
                }
                bar.set_message(path);
            }
            (ProgressEvent::Completed { .. }, Some(bar)) => bar.inc(1),
            (ProgressEvent::Completed { result }, None) => {
                if let Some(line) = blurry_line(&result) {
                    eprintln!("{line}");
                }
            }
            (ProgressEvent::Skipped { path, reason }, bar) => {
                if let Some(bar) = bar {
                    bar.inc(1);
                }
                eprintln!("WARN: Skipping {path}: {reason}");
            }
            (
                ProgressEvent::Finished {
                    processed,
                    skipped,
                    sharp,
                    blurry,
                },
                Some(bar),
            ) => bar.finish_with_message(format!(
                "Done: {processed} processed ({sharp} sharp, {blurry} blurry), {skipped} skipped"
            )),
            (ProgressEvent::Started { .. } | ProgressEvent::Finished { .. }, None) => {}
        }
    }
}
