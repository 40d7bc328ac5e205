//! Chart and table models for the station page.
//!
//! These are pure functions over readings and predictions. The resulting
//! models serialize to JSON for whatever front end draws them.

use serde::Serialize;

use crate::model::{Prediction, Reading};

/// Rows added to the history table per "load more".
pub const DEFAULT_PAGE_SIZE: usize = 10;

// ---------------------------------------------------------------------------
// Chart
// ---------------------------------------------------------------------------

/// Titles used when rendering the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartLabels {
    pub title: String,
    pub historical: String,
    pub predicted: String,
    pub x_axis: String,
    pub y_axis: String,
}

impl Default for ChartLabels {
    fn default() -> Self {
        Self {
            title: "Ping River Water Level - Historical and Predicted".to_string(),
            historical: "Historical Water Level".to_string(),
            predicted: "Predicted Water Level".to_string(),
            x_axis: "Time".to_string(),
            y_axis: "Water Level (m)".to_string(),
        }
    }
}

/// One line on the chart. `points[i]` belongs to `ChartModel::labels[i]`;
/// `None` leaves a gap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDataset {
    pub label: String,
    pub points: Vec<Option<f64>>,
    pub dashed: bool,
}

/// Historical and forecast series on one shared time axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartModel {
    pub title: String,
    pub x_axis: String,
    pub y_axis: String,
    pub labels: Vec<String>,
    pub historical: ChartDataset,
    pub predicted: ChartDataset,
}

/// Merges readings and predictions into one chart model.
///
/// Labels are the reading timestamps followed by the prediction timestamps.
/// Both datasets are padded with `None` so every point lines up with its
/// label; an unparsable reading stays a gap rather than shifting later
/// points left.
pub fn build_chart(readings: &[Reading], predictions: &[Prediction], labels: &ChartLabels) -> ChartModel {
    let history_len = readings.len();
    let total = history_len + predictions.len();

    let axis: Vec<String> = readings
        .iter()
        .map(|r| r.timestamp.clone())
        .chain(predictions.iter().map(|p| p.timestamp.clone()))
        .collect();

    let mut historical: Vec<Option<f64>> = readings.iter().map(|r| r.value).collect();
    historical.resize(total, None);

    let predicted: Vec<Option<f64>> = std::iter::repeat(None)
        .take(history_len)
        .chain(predictions.iter().map(|p| Some(p.value)))
        .collect();

    ChartModel {
        title: labels.title.clone(),
        x_axis: labels.x_axis.clone(),
        y_axis: labels.y_axis.clone(),
        labels: axis,
        historical: ChartDataset {
            label: labels.historical.clone(),
            points: historical,
            dashed: false,
        },
        predicted: ChartDataset {
            label: labels.predicted.clone(),
            points: predicted,
            dashed: true,
        },
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// One row of the history or prediction table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub timestamp: String,
    pub value: Option<f64>,
    pub highlighted: bool,
}

/// The visible part of the history table, newest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPage {
    pub rows: Vec<TableRow>,
    pub has_more: bool,
}

/// The `visible` most recent readings, newest first. The newest row is
/// highlighted. `has_more` is set while older readings are hidden.
pub fn history_table(readings: &[Reading], visible: usize) -> HistoryPage {
    let rows = readings
        .iter()
        .rev()
        .take(visible)
        .enumerate()
        .map(|(i, r)| TableRow {
            timestamp: r.timestamp.clone(),
            value: r.value,
            highlighted: i == 0,
        })
        .collect();

    HistoryPage {
        rows,
        has_more: visible < readings.len(),
    }
}

/// Visible row count after one more "load more".
pub fn next_visible(visible: usize, page_size: usize) -> usize {
    visible.saturating_add(page_size)
}

/// Predictions as table rows, in chronological order.
pub fn prediction_table(predictions: &[Prediction]) -> Vec<TableRow> {
    predictions
        .iter()
        .map(|p| TableRow {
            timestamp: p.timestamp.clone(),
            value: Some(p.value),
            highlighted: false,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(hour: u32, value: Option<f64>) -> Reading {
        Reading {
            timestamp: format!("24/10/2024 {:02}:00", hour),
            value,
        }
    }

    fn prediction(hour: u32, value: f64) -> Prediction {
        Prediction {
            timestamp: format!("25/10/2024 {:02}:00", hour),
            value,
        }
    }

    // --- Chart --------------------------------------------------------------

    #[test]
    fn test_chart_labels_cover_history_then_forecast() {
        let readings = vec![reading(1, Some(1.0)), reading(2, Some(1.1))];
        let predictions = vec![prediction(0, 1.2)];
        let chart = build_chart(&readings, &predictions, &ChartLabels::default());

        assert_eq!(
            chart.labels,
            vec!["24/10/2024 01:00", "24/10/2024 02:00", "25/10/2024 00:00"]
        );
        assert_eq!(chart.historical.points, vec![Some(1.0), Some(1.1), None]);
        assert_eq!(chart.predicted.points, vec![None, None, Some(1.2)]);
        assert!(chart.predicted.dashed);
        assert!(!chart.historical.dashed);
    }

    #[test]
    fn test_unparsable_reading_stays_a_gap() {
        let readings = vec![reading(1, Some(1.0)), reading(2, None), reading(3, Some(1.2))];
        let chart = build_chart(&readings, &[], &ChartLabels::default());
        assert_eq!(chart.historical.points, vec![Some(1.0), None, Some(1.2)]);
        assert_eq!(chart.historical.points.len(), chart.labels.len());
    }

    #[test]
    fn test_chart_uses_supplied_labels() {
        let labels = ChartLabels {
            title: "P.75".to_string(),
            ..ChartLabels::default()
        };
        let chart = build_chart(&[], &[prediction(0, 1.0)], &labels);
        assert_eq!(chart.title, "P.75");
        assert_eq!(chart.y_axis, "Water Level (m)");
        assert_eq!(chart.historical.points, vec![None]);
    }

    // --- History table ------------------------------------------------------

    #[test]
    fn test_history_table_is_newest_first() {
        let readings: Vec<Reading> = (0..15).map(|h| reading(h, Some(h as f64))).collect();
        let page = history_table(&readings, DEFAULT_PAGE_SIZE);

        assert_eq!(page.rows.len(), 10);
        assert_eq!(page.rows[0].timestamp, "24/10/2024 14:00");
        assert!(page.rows[0].highlighted);
        assert!(page.rows[1..].iter().all(|r| !r.highlighted));
        assert_eq!(page.rows[9].timestamp, "24/10/2024 05:00");
        assert!(page.has_more);
    }

    #[test]
    fn test_load_more_reveals_remaining_rows() {
        let readings: Vec<Reading> = (0..15).map(|h| reading(h, Some(1.0))).collect();
        let visible = next_visible(DEFAULT_PAGE_SIZE, DEFAULT_PAGE_SIZE);
        let page = history_table(&readings, visible);
        assert_eq!(page.rows.len(), 15);
        assert!(!page.has_more);
    }

    #[test]
    fn test_empty_history_table() {
        let page = history_table(&[], DEFAULT_PAGE_SIZE);
        assert!(page.rows.is_empty());
        assert!(!page.has_more);
    }

    #[test]
    fn test_prediction_table_keeps_order() {
        let rows = prediction_table(&[prediction(0, 1.0), prediction(1, 1.05)]);
        assert_eq!(rows[0].timestamp, "25/10/2024 00:00");
        assert_eq!(rows[1].value, Some(1.05));
    }
}
