//! Fixed-width text rendering of search results

use crate::types::RawResult;

/// Default cap on a column's width, in characters
pub const DEFAULT_MAX_WIDTH: usize = 100;

/// Printed instead of a table when nothing matched
pub const NO_ROWS_MESSAGE: &str = "No rows found for the current filters.";

const ELLIPSIS: &str = "...";

/// Renders raw result sets as column-aligned text tables
#[derive(Debug, Clone, Copy)]
pub struct ResultFormatter {
    max_width: usize,
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_WIDTH)
    }
}

impl ResultFormatter {
    /// Formatter with a custom width cap
    pub fn new(max_width: usize) -> Self {
        Self { max_width }
    }

    /// Width cap in characters
    pub fn max_width(&self) -> usize {
        self.max_width
    }

    /// Shorten `value` to at most `width` characters, ending in `...` when cut
    pub fn clip(value: &str, width: usize) -> String {
        if value.chars().count() <= width {
            return value.to_string();
        }
        if width < ELLIPSIS.len() {
            return ELLIPSIS.chars().take(width).collect();
        }
        let mut clipped: String = value.chars().take(width - ELLIPSIS.len()).collect();
        clipped.push_str(ELLIPSIS);
        clipped
    }

    /// Per-column widths: longest of header and cells, capped
    pub fn column_widths(&self, columns: &[String], cells: &[Vec<String>]) -> Vec<usize> {
        let mut widths: Vec<usize> = columns
            .iter()
            .map(|c| c.chars().count().min(self.max_width))
            .collect();
        for row in cells {
            for (i, value) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(i) {
                    *width = (*width).max(value.chars().count()).min(self.max_width);
                }
            }
        }
        widths
    }

    /// Render the table, or [`NO_ROWS_MESSAGE`] when there are no rows
    pub fn render(&self, raw: &RawResult) -> String {
        if raw.is_empty() {
            return NO_ROWS_MESSAGE.to_string();
        }

        let cells: Vec<Vec<String>> = raw
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|v| v.to_string().replace(['\r', '\n'], " "))
                    .collect()
            })
            .collect();
        let widths = self.column_widths(&raw.columns, &cells);

        let line = |values: &[String]| -> String {
            widths
                .iter()
                .enumerate()
                .map(|(i, width)| {
                    let value = values.get(i).map(String::as_str).unwrap_or("");
                    pad(&Self::clip(value, *width), *width)
                })
                .collect::<Vec<_>>()
                .join(" | ")
        };

        let mut out = Vec::with_capacity(cells.len() + 2);
        out.push(line(&raw.columns));
        out.push(
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("-+-"),
        );
        for row in &cells {
            out.push(line(row));
        }
        out.join("\n")
    }
}

fn pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    let pad_len = width.saturating_sub(len);
    format!("{}{}", s, " ".repeat(pad_len))
}
