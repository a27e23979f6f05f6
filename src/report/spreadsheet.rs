//! Spreadsheet export.
//!
//! Lays the analytics payload out as a workbook model (cells, merged ranges,
//! freeze panes and chart definitions referencing cell ranges). The model is
//! serialized as JSON for a downstream XLSX writer; the data sheet can also
//! be written directly as CSV.

use super::format::Formatter;
use crate::analysis::chartable_questions;
use crate::error::ExportError;
use crate::models::{AnalyticsPayload, ReportMetadata};
use serde::Serialize;
use std::io::Write;

/// Name of the data sheet; chart ranges refer to it.
pub const DATA_SHEET: &str = "Analitik";
pub const CHART_SHEET: &str = "Grafik";
pub const SUMMARY_SHEET: &str = "Ringkasan";
pub const TOC_SHEET: &str = "Daftar Isi";

/// Row of the column headers on the data sheet.
pub const HEADER_ROW: usize = 7;

const HEADERS: [&str; 5] = [
    "Pertanyaan",
    "Jawaban",
    "Jumlah Respon",
    "Persentase",
    "Rata-rata",
];
const NO_DATA: &str = "Tidak ada data";
const CHART_HEIGHT_ROWS: usize = 14;
const CHART_STRIDE_ROWS: usize = 16;

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    /// A fraction shown with the `0.00%` number format.
    Percent(f64),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Plain rendering used for CSV output.
    pub fn display(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(text) => text.clone(),
            Cell::Number(number) if number.fract() == 0.0 => format!("{}", *number as i64),
            Cell::Number(number) => number.to_string(),
            Cell::Percent(fraction) => format!("{:.2}%", fraction * 100.0),
        }
    }
}

/// A bar chart over a label range and a count range of the data sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub name: String,
    pub title: String,
    pub kind: &'static str,
    pub grouping: &'static str,
    /// Cell holding the series name.
    pub series_label: String,
    /// Category (answer label) range.
    pub categories: String,
    /// Value (count) range.
    pub values: String,
    pub point_count: usize,
    pub top_left: String,
    pub bottom_right: String,
}

/// One worksheet. Row and column addresses are 1-based.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Worksheet {
    pub title: String,
    pub rows: Vec<Vec<Cell>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub merged: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bold_rows: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freeze_pane: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub charts: Vec<BarChart>,
}

impl Worksheet {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Set the cell at `row`/`col`, growing the grid as needed.
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        if self.rows.len() < row {
            self.rows.resize_with(row, Vec::new);
        }
        let cells = &mut self.rows[row - 1];
        if cells.len() < col {
            cells.resize(col, Cell::Empty);
        }
        cells[col - 1] = cell;
    }

    #[cfg(test)]
    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row.checked_sub(1)?)?.get(col.checked_sub(1)?)
    }

    /// Set a row of cells starting at column A.
    pub fn set_row(&mut self, row: usize, cells: impl IntoIterator<Item = Cell>) {
        for (i, cell) in cells.into_iter().enumerate() {
            self.set(row, i + 1, cell);
        }
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// A workbook of worksheets, data sheet first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workbook {
    pub title: String,
    pub sheets: Vec<Worksheet>,
}

impl Workbook {
    pub fn sheet(&self, title: &str) -> Option<&Worksheet> {
        self.sheets.iter().find(|sheet| sheet.title == title)
    }
}

/// Rows a question occupies on the data sheet.
#[derive(Debug, Clone)]
struct QuestionRange {
    name: String,
    title: String,
    start: usize,
    end: usize,
}

/// Build the export workbook.
pub fn build_workbook(
    payload: &AnalyticsPayload,
    metadata: &ReportMetadata,
    formatter: &Formatter,
) -> Workbook {
    let (data_sheet, ranges) = build_data_sheet(payload, metadata);

    let mut sheets = vec![data_sheet];
    let charts = build_chart_sheet(payload, &ranges);
    if !charts.charts.is_empty() {
        sheets.push(charts);
    }
    sheets.push(build_summary_sheet(payload, metadata, formatter));
    sheets.push(build_toc_sheet(payload, &ranges));

    Workbook {
        title: format!("Analitik {}", metadata.survey_title),
        sheets,
    }
}

fn build_data_sheet(
    payload: &AnalyticsPayload,
    metadata: &ReportMetadata,
) -> (Worksheet, Vec<QuestionRange>) {
    let stats = &payload.stats;
    let mut sheet = Worksheet::new(DATA_SHEET);

    sheet.set(1, 1, Cell::text("Laporan Analitik Survei"));
    sheet.merged.push("A1:E1".to_string());
    sheet.set_row(2, [Cell::text("Survei"), Cell::text(&metadata.survey_title)]);
    sheet.set_row(
        3,
        [
            Cell::text("Total Respon"),
            Cell::Number(stats.total_responses as f64),
        ],
    );
    sheet.set_row(
        4,
        [
            Cell::text("Total Pertanyaan"),
            Cell::Number(stats.total_questions as f64),
        ],
    );
    sheet.set_row(
        5,
        [
            Cell::text("Completion Rate"),
            Cell::Percent(f64::from(stats.completion_rate) / 100.0),
        ],
    );
    sheet.bold_rows.extend([1, 2, 3, 4, 5, HEADER_ROW]);

    sheet.set_row(HEADER_ROW, HEADERS.iter().map(|h| Cell::text(*h)));

    let mut row = HEADER_ROW + 1;
    let mut ranges = Vec::new();

    for (name, summary) in &payload.analytics {
        if !summary.has_data() {
            sheet.set_row(
                row,
                [
                    Cell::text(&summary.title),
                    Cell::text(NO_DATA),
                    Cell::Number(0.0),
                    Cell::Percent(0.0),
                ],
            );
            row += 2;
            continue;
        }

        let start = row;
        for (i, (label, count)) in summary.counts.iter().enumerate() {
            let first = i == 0;
            let average = match summary.average {
                Some(average) if first => Cell::Number((average * 100.0).round() / 100.0),
                _ => Cell::Empty,
            };
            sheet.set_row(
                row,
                [
                    Cell::text(if first { summary.title.as_str() } else { "" }),
                    Cell::text(label),
                    Cell::Number(*count as f64),
                    Cell::Percent(summary.share(*count)),
                    average,
                ],
            );
            row += 1;
        }

        ranges.push(QuestionRange {
            name: name.clone(),
            title: summary.title.clone(),
            start,
            end: row - 1,
        });
        row += 1;
    }

    sheet.freeze_pane = Some(format!("A{}", HEADER_ROW + 1));
    (sheet, ranges)
}

fn build_chart_sheet(payload: &AnalyticsPayload, ranges: &[QuestionRange]) -> Worksheet {
    let mut sheet = Worksheet::new(CHART_SHEET);
    let mut chart_row = 1;

    for (index, (name, _)) in chartable_questions(payload).enumerate() {
        let Some(range) = ranges.iter().find(|range| range.name == name) else {
            continue;
        };

        sheet.charts.push(BarChart {
            name: format!("chart{}", index),
            title: range.title.clone(),
            kind: "bar",
            grouping: "clustered",
            series_label: format!("{}!$A${}", DATA_SHEET, range.start),
            categories: format!("{}!$B${}:$B${}", DATA_SHEET, range.start, range.end),
            values: format!("{}!$C${}:$C${}", DATA_SHEET, range.start, range.end),
            point_count: range.end - range.start + 1,
            top_left: format!("A{}", chart_row),
            bottom_right: format!("K{}", chart_row + CHART_HEIGHT_ROWS),
        });
        chart_row += CHART_STRIDE_ROWS;
    }

    sheet
}

fn build_summary_sheet(
    payload: &AnalyticsPayload,
    metadata: &ReportMetadata,
    formatter: &Formatter,
) -> Worksheet {
    let stats = &payload.stats;
    let mut sheet = Worksheet::new(SUMMARY_SHEET);

    sheet.set_row(1, [Cell::text("Item"), Cell::text("Nilai")]);
    sheet.set_row(2, [Cell::text("Survei"), Cell::text(&metadata.survey_title)]);
    sheet.set_row(
        3,
        [
            Cell::text("Dibuat"),
            Cell::text(formatter.timestamp(&metadata.generated_at)),
        ],
    );
    sheet.set_row(
        4,
        [
            Cell::text("Total Respon"),
            Cell::Number(stats.total_responses as f64),
        ],
    );
    sheet.set_row(
        5,
        [
            Cell::text("Total Pertanyaan"),
            Cell::Number(stats.total_questions as f64),
        ],
    );
    sheet.set_row(
        6,
        [
            Cell::text("Jawaban Terekam"),
            Cell::Number(stats.total_answered as f64),
        ],
    );
    sheet.set_row(
        7,
        [
            Cell::text("Completion Rate"),
            Cell::Percent(f64::from(stats.completion_rate) / 100.0),
        ],
    );
    sheet.bold_rows.push(1);
    sheet
}

fn build_toc_sheet(payload: &AnalyticsPayload, ranges: &[QuestionRange]) -> Worksheet {
    let mut sheet = Worksheet::new(TOC_SHEET);
    sheet.set_row(
        1,
        [
            Cell::text("No"),
            Cell::text("Pertanyaan"),
            Cell::text("Jumlah Jawaban"),
            Cell::text("Lokasi"),
        ],
    );
    sheet.bold_rows.push(1);

    for (i, (name, summary)) in payload.analytics.iter().enumerate() {
        let location = ranges
            .iter()
            .find(|range| range.name == *name)
            .map(|range| Cell::text(format!("{}!A{}", DATA_SHEET, range.start)))
            .unwrap_or(Cell::Empty);

        sheet.set_row(
            i + 2,
            [
                Cell::Number((i + 1) as f64),
                Cell::text(&summary.title),
                Cell::Number(summary.total as f64),
                location,
            ],
        );
    }

    sheet
}

/// Write a worksheet as CSV, padding every row to the sheet width.
pub fn write_sheet_csv<W: Write>(sheet: &Worksheet, writer: W) -> Result<(), ExportError> {
    let width = sheet.width();
    let mut csv_writer = csv::Writer::from_writer(writer);

    for row in &sheet.rows {
        let mut record: Vec<String> = row.iter().map(Cell::display).collect();
        record.resize(width, String::new());
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// The data sheet of a workbook as a CSV string.
pub fn data_sheet_csv(workbook: &Workbook) -> Result<String, ExportError> {
    let sheet = workbook
        .sheet(DATA_SHEET)
        .ok_or_else(|| ExportError::MissingSheet(DATA_SHEET.to_string()))?;

    let mut buffer = Vec::new();
    write_sheet_csv(sheet, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// The workbook model as pretty JSON.
pub fn workbook_json(workbook: &Workbook) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(workbook)?)
}
