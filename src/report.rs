//! Plain-text reports for predictions, training runs and datasets.

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::dataset::DatasetSummary;
use crate::types::{DrillingRecord, TargetMetrics, TrainingMetrics, TrajectoryResult};

/// Everything quoted by a prediction report.
#[derive(Debug, Clone, Serialize)]
pub struct DeviationReport {
    pub generated_on: NaiveDate,
    pub record: DrillingRecord,
    pub trajectory: TrajectoryResult,
}

impl DeviationReport {
    /// Report dated today (local time).
    pub fn new(record: DrillingRecord, trajectory: TrajectoryResult) -> Self {
        Self::dated(Local::now().date_naive(), record, trajectory)
    }

    pub fn dated(generated_on: NaiveDate, record: DrillingRecord, trajectory: TrajectoryResult) -> Self {
        Self {
            generated_on,
            record,
            trajectory,
        }
    }

    pub fn render(&self) -> String {
        let r = &self.record;
        let t = &self.trajectory;
        let mut sections = Vec::new();

        sections.push(format!(
            "Drill Hole Deviation Prediction Report\n\
             Date: {}",
            self.generated_on.format("%d/%m/%Y"),
        ));

        sections.push(format!(
            "Drilling parameters:\n\
             - Final depth: {} m\n\
             - Initial azimuth: {}°\n\
             - Initial inclination: {}°\n\
             - Rock type: {}\n\
             - Rotation speed: {} rpm",
            r.depth_final, r.azimuth_initial, r.inclination_initial, r.rock_type, r.rotation_speed,
        ));

        sections.push(format!(
            "Prediction results:\n\
             - Azimuth deviation: {:.2}°\n\
             - Inclination deviation: {:.2}°\n\
             - Predicted final azimuth: {:.2}°\n\
             - Predicted final inclination: {:.2}°\n\
             - Estimated final offset: {:.2} m\n\
             - Deviation magnitude: {:.2}° ({}, {} impact on the final hole position)",
            t.predicted_azimuth_dev,
            t.predicted_inclination_dev,
            t.final_azimuth,
            t.final_inclination,
            t.final_positional_deviation,
            t.deviation_magnitude,
            t.severity,
            t.severity.impact(),
        ));

        let mut recommendations = vec!["Recommendations:".to_string()];
        recommendations.extend(t.severity.recommendations().iter().map(|line| format!("- {line}")));
        sections.push(recommendations.join("\n"));

        sections.join("\n\n") + "\n"
    }
}

fn target_lines(metrics: &TargetMetrics) -> Vec<String> {
    let mut lines = vec![format!(
        "{}: RMSE {:.2}°, R² {:.3}",
        metrics.target, metrics.rmse, metrics.r2
    )];
    let ranked = metrics.ranked_importance();
    if !ranked.is_empty() {
        lines.push("  Feature importance:".to_string());
        lines.extend(
            ranked
                .iter()
                .map(|f| format!("    {:<28} {:.3}", f.feature, f.importance)),
        );
    }
    lines
}

/// Metrics and quality rating of a training run.
pub fn render_training(metrics: &TrainingMetrics) -> String {
    let rating = metrics.performance();
    let mut lines = vec![
        format!("Model: {}", metrics.strategy.display_name()),
        format!(
            "Rows: {} train / {} test",
            metrics.train_rows, metrics.test_rows
        ),
    ];
    lines.extend(target_lines(&metrics.azimuth));
    lines.extend(target_lines(&metrics.inclination));
    lines.push(format!(
        "Mean R² {:.3}: {} ({})",
        metrics.mean_r2(),
        rating,
        rating.description()
    ));
    lines.join("\n") + "\n"
}

/// Dataset exploration summary.
pub fn render_dataset(summary: &DatasetSummary) -> String {
    let mut sections = Vec::new();

    let mut columns = vec![format!(
        "Rows: {} ({} labelled)\n\n{:<24} {:>10} {:>10} {:>10} {:>10}",
        summary.rows, summary.labelled_rows, "column", "mean", "std", "min", "max"
    )];
    columns.extend(summary.columns.iter().map(|c| {
        format!(
            "{:<24} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
            c.name, c.mean, c.std_dev, c.min, c.max
        )
    }));
    sections.push(columns.join("\n"));

    let mut rocks = vec!["Rock types:".to_string()];
    rocks.extend(summary.rock_types.iter().map(|r| match r.rms_deviation {
        Some(rms) => format!("- {}: {} rows, RMS deviation {:.2}°", r.rock_type, r.count, rms),
        None => format!("- {}: {} rows", r.rock_type, r.count),
    }));
    sections.push(rocks.join("\n"));

    if let (Some(az), Some(inc)) = (
        summary.mean_abs_azimuth_deviation,
        summary.mean_abs_inclination_deviation,
    ) {
        sections.push(format!(
            "Mean absolute deviation: azimuth {az:.2}°, inclination {inc:.2}°"
        ));
    }

    if summary.correlations.is_empty() {
        sections.push("No notable correlations (|r| > 0.3).".to_string());
    } else {
        let mut corr = vec!["Notable correlations:".to_string()];
        corr.extend(summary.correlations.iter().map(|c| {
            format!(
                "- {} / {}: r = {:.2} ({} {}, p = {:.3})",
                c.a,
                c.b,
                c.r,
                c.strength(),
                c.direction(),
                c.p_value
            )
        }));
        sections.push(corr.join("\n"));
    }

    sections.join("\n\n") + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trajectory::reconstruct;

    #[test]
    fn test_report_quotes_core_values() {
        let record = DrillingRecord::new(500.0, 350.0, -60.0, "Schist", 120.0);
        let trajectory = reconstruct(350.0, -60.0, 500.0, 20.0, -3.0, 50).expect("reconstruct");
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).expect("valid date");
        let text = DeviationReport::dated(date, record, trajectory).render();

        assert!(text.contains("Date: 09/03/2024"));
        assert!(text.contains("Azimuth deviation: 20.00°"));
        assert!(text.contains("Predicted final azimuth: 10.00°"));
        assert!(text.contains("Predicted final inclination: -63.00°"));
        assert!(text.contains("high, significant impact"));
        assert!(text.contains("Use additional stabilizers"));
    }
}
