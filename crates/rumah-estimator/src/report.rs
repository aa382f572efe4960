//! HTML training report and price display formatting.

use std::path::Path;

use anyhow::{Context, Result};
use maud::{html, Markup, PreEscaped, DOCTYPE};
use plotly::common::Mode;
use plotly::layout::{Axis, Layout};
use plotly::{Plot, Scatter};

use crate::cache::CacheStatus;
use crate::pipeline::{ModelSummary, TrainOutcome};

/// Format a price the way the app displays it: `Rp` prefix, `.` as the
/// thousands separator, no decimals.
pub fn format_rupiah(value: f32) -> String {
    let rounded = value.round() as i64;
    // unsigned_abs: `as i64` saturates to i64::MIN, whose abs() would panic.
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    let sign = if rounded < 0 { "-" } else { "" };
    format!("Rp {}{}", sign, grouped)
}

/// Scatter of predicted vs. actual prices on the held-out split.
fn scatter_html(actual: &[f32], predicted: &[f32]) -> String {
    let trace = Scatter::new(actual.to_vec(), predicted.to_vec())
        .mode(Mode::Markers)
        .name("Test split");

    let layout = Layout::new()
        .title("Predicted vs. actual price")
        .x_axis(Axis::new().title("Actual"))
        .y_axis(Axis::new().title("Predicted"));

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(layout);
    plot.to_inline_html(Some("pred-vs-actual"))
}

fn cache_label(status: CacheStatus) -> &'static str {
    match status {
        CacheStatus::Hit => "loaded from cache",
        CacheStatus::Miss => "fitted this run",
    }
}

fn model_row(label: &str, summary: &ModelSummary) -> Markup {
    let params = serde_json::to_string(&summary.params).unwrap_or_default();
    html! {
        tr {
            td { (label) }
            td { code { (params) } }
            td { (cache_label(summary.cache)) }
            td {
                @if let Some(cv) = summary.cv_rmse {
                    (format_rupiah(cv))
                } @else {
                    "-"
                }
            }
        }
    }
}

/// Write the training report for one completed run.
pub fn write_training_report<P: AsRef<Path>>(path: P, outcome: &TrainOutcome) -> Result<()> {
    let summary = &outcome.summary;
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let scatter = scatter_html(outcome.test_actual.as_slice(), outcome.test_predicted.as_slice());

    let markup = html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { "Prediksi Harga Rumah - training report" }
                style {
                    "body { font-family: sans-serif; margin: 2em; } "
                    "table { border-collapse: collapse; } "
                    "td, th { border: 1px solid #999; padding: 4px 8px; }"
                }
            }
            body {
                h1 { "House price training report" }
                p { "Generated " (timestamp) }

                h2 { "Data preview" }
                table {
                    tr {
                        @for name in &summary.feature_names { th { (name) } }
                        th { "Harga" }
                    }
                    @for row in &outcome.preview {
                        tr {
                            @for cell in row { td { (cell) } }
                        }
                    }
                }

                h2 { "Models" }
                table {
                    tr {
                        th { "Model" }
                        th { "Selected hyperparameters" }
                        th { "Cache" }
                        th { "CV RMSE" }
                    }
                    (model_row("Random forest", &summary.rf))
                    (model_row("Gradient boosting", &summary.gbdt))
                    tr {
                        td { "Stacking meta model" }
                        td { "default random forest over base predictions" }
                        td { (cache_label(summary.meta_cache)) }
                        td { "-" }
                    }
                }

                h2 { "Held-out evaluation" }
                p {
                    (summary.n_train) " training rows, " (summary.n_test) " test rows. "
                    "RMSE " (format_rupiah(summary.test_rmse))
                    ", R\u{00b2} " (format!("{:.3}", summary.test_r2)) "."
                }
                (PreEscaped(scatter))
            }
        }
    };

    std::fs::write(&path, markup.into_string())
        .with_context(|| format!("Failed to write report: {}", path.as_ref().display()))?;
    log::info!("Wrote training report to {}", path.as_ref().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rupiah_grouping_uses_dots() {
        assert_eq!(format_rupiah(2_500_000_000.0), "Rp 2.500.000.000");
        assert_eq!(format_rupiah(950.0), "Rp 950");
        assert_eq!(format_rupiah(1_000.4), "Rp 1.000");
        assert_eq!(format_rupiah(-12_345.0), "Rp -12.345");
    }

    #[test]
    fn rupiah_handles_saturating_extremes() {
        let min = format_rupiah(f32::MIN);
        assert!(min.starts_with("Rp -"));
        let max = format_rupiah(f32::MAX);
        assert!(max.starts_with("Rp "));
    }
}
