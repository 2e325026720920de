// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::SortDirection;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub key: String,
    pub label: String,
    pub sortable: bool,
}

impl Column {
    pub fn sortable(key: &str, label: &str) -> Self {
        Self {
            key: key.to_owned(),
            label: label.to_owned(),
            sortable: true,
        }
    }

    pub fn plain(key: &str, label: &str) -> Self {
        Self {
            key: key.to_owned(),
            label: label.to_owned(),
            sortable: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    cells: Vec<String>,
    hidden: bool,
}

impl Row {
    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }
}

/// Last-applied sort for a table: at most one active column at a time.
/// Transient state, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortState {
    pub column: Option<String>,
    pub direction: Option<SortDirection>,
}

/// An in-memory roster table. Sorting reorders rows in place, filtering
/// hides rows in place; the row set is always a permutation of the rows
/// originally pushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableModel {
    columns: Vec<Column>,
    rows: Vec<Row>,
    sort: SortState,
}

impl TableModel {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            sort: SortState::default(),
        }
    }

    pub fn push_row(&mut self, cells: Vec<String>) {
        self.rows.push(Row {
            cells,
            hidden: false,
        });
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn visible_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(|row| !row.hidden)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn visible_count(&self) -> usize {
        self.visible_rows().count()
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    /// Sorts by the column carrying `column_key`. Repeated activation of
    /// the same column toggles the direction, first use is ascending, and
    /// activating a different column clears the previous mark. An unknown
    /// or non-sortable key leaves the table untouched.
    pub fn sort(&mut self, column_key: &str) {
        let Some(col) = self
            .columns
            .iter()
            .position(|column| column.sortable && column.key == column_key)
        else {
            return;
        };

        let direction = match (&self.sort.column, self.sort.direction) {
            (Some(active), Some(SortDirection::Asc)) if active.as_str() == column_key => {
                SortDirection::Desc
            }
            _ => SortDirection::Asc,
        };
        self.sort = SortState {
            column: Some(column_key.to_owned()),
            direction: Some(direction),
        };

        // std's sort_by is stable, which keeps equal keys in prior order.
        self.rows.sort_by(|left, right| {
            let order = compare_cells(
                left.cells.get(col).map(String::as_str).unwrap_or(""),
                right.cells.get(col).map(String::as_str).unwrap_or(""),
            );
            match direction {
                SortDirection::Asc => order,
                SortDirection::Desc => order.reverse(),
            }
        });
    }

    /// Case-insensitive substring match against the concatenated text of
    /// each row; recomputed from scratch on every call. Non-matching rows
    /// are hidden, not removed. An empty query shows everything.
    pub fn filter(&mut self, query: &str) {
        let needle = query.to_lowercase();
        for row in &mut self.rows {
            row.hidden = if needle.is_empty() {
                false
            } else {
                !row.cells.concat().to_lowercase().contains(&needle)
            };
        }
    }

    /// Serializes the header labels plus every row (hidden included) in
    /// current display order, each field double-quote wrapped. Interior
    /// quotes are not escaped; fields containing `"` produce malformed
    /// output. That mirrors the behavior this export replaces.
    pub fn to_csv(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        lines.push(csv_line(self.columns.iter().map(|column| column.label.as_str())));
        for row in &self.rows {
            lines.push(csv_line(row.cells.iter().map(String::as_str)));
        }
        lines.join("\n")
    }
}

fn csv_line<'a>(fields: impl Iterator<Item = &'a str>) -> String {
    fields
        .map(|field| format!("\"{field}\""))
        .collect::<Vec<String>>()
        .join(",")
}

fn compare_cells(left: &str, right: &str) -> Ordering {
    collation_key(left.trim()).cmp(&collation_key(right.trim()))
}

/// Comparison key for pt-BR text: accented letters collapse onto their
/// base letter and case is ignored, so "Álvaro" sorts with "alvaro".
fn collation_key(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(fold_accent)
        .collect()
}

const fn fold_accent(ch: char) -> char {
    match ch {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        _ => ch,
    }
}
