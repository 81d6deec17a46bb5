//! Bordered, left-aligned text tables with optional per-column width caps.

use std::fmt;

#[derive(Debug, Clone)]
struct Row {
    cells: Vec<String>,
    divider: bool,
}

#[derive(Debug, Clone)]
pub struct TextTable {
    headers: Vec<String>,
    max_widths: Vec<Option<usize>>,
    rows: Vec<Row>,
}

impl TextTable {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        let max_widths = vec![None; headers.len()];
        Self {
            headers,
            max_widths,
            rows: Vec::new(),
        }
    }

    /// Caps the width of the column titled `header`; longer cells wrap on whitespace.
    pub fn with_max_width(mut self, header: &str, width: usize) -> Self {
        if let Some(index) = self.headers.iter().position(|h| h == header) {
            self.max_widths[index] = Some(width);
        }
        self
    }

    pub fn add_row(&mut self, cells: Vec<String>) {
        self.rows.push(Row {
            cells,
            divider: false,
        });
    }

    /// Adds a row followed by a horizontal rule.
    pub fn add_row_with_divider(&mut self, cells: Vec<String>) {
        self.rows.push(Row {
            cells,
            divider: true,
        });
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.cells.len())
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }

    fn cap(&self, column: usize) -> Option<usize> {
        self.max_widths.get(column).copied().flatten()
    }

    fn wrapped(&self, cells: &[String], columns: usize) -> Vec<Vec<String>> {
        (0..columns)
            .map(|column| {
                let text = cells.get(column).map(String::as_str).unwrap_or("");
                wrap(text, self.cap(column))
            })
            .collect()
    }

    pub fn render(&self) -> String {
        let columns = self.column_count();
        let header = self.wrapped(&self.headers, columns);
        let body: Vec<(Vec<Vec<String>>, bool)> = self
            .rows
            .iter()
            .map(|row| (self.wrapped(&row.cells, columns), row.divider))
            .collect();

        let mut widths = vec![0; columns];
        for cells in std::iter::once(&header).chain(body.iter().map(|(cells, _)| cells)) {
            for (column, lines) in cells.iter().enumerate() {
                let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
                widths[column] = widths[column].max(widest);
            }
        }

        let rule = rule_line(&widths);
        let mut out = String::new();
        out.push_str(&rule);
        push_cells(&mut out, &header, &widths);
        out.push_str(&rule);
        for (index, (cells, divider)) in body.iter().enumerate() {
            push_cells(&mut out, cells, &widths);
            if *divider && index + 1 < body.len() {
                out.push_str(&rule);
            }
        }
        out.push_str(&rule);
        out
    }
}

impl fmt::Display for TextTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render().trim_end_matches('\n'))
    }
}

fn rule_line(widths: &[usize]) -> String {
    let mut line = String::from("+");
    for width in widths {
        line.push_str(&"-".repeat(width + 2));
        line.push('+');
    }
    line.push('\n');
    line
}

fn push_cells(out: &mut String, cells: &[Vec<String>], widths: &[usize]) {
    let height = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
    for line in 0..height {
        out.push('|');
        for (column, width) in widths.iter().enumerate() {
            let text = cells
                .get(column)
                .and_then(|lines| lines.get(line))
                .map(String::as_str)
                .unwrap_or("");
            let padding = width - text.chars().count();
            out.push(' ');
            out.push_str(text);
            out.push_str(&" ".repeat(padding + 1));
            out.push('|');
        }
        out.push('\n');
    }
}

/// Splits `text` into display lines: one per embedded newline, then wrapped to `width`.
pub fn wrap(text: &str, width: Option<usize>) -> Vec<String> {
    let mut lines = Vec::new();
    for raw in text.split('\n') {
        match width {
            Some(width) if width > 0 && raw.chars().count() > width => {
                lines.extend(wrap_line(raw, width))
            }
            _ => lines.push(raw.to_string()),
        }
    }
    lines
}

fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        let mut word = word.to_string();
        while word.chars().count() > width {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            out.push(word.chars().take(width).collect());
            word = word.chars().skip(width).collect();
        }
        if word.is_empty() {
            continue;
        }

        let current_len = current.chars().count();
        let word_len = word.chars().count();
        if current.is_empty() {
            current = word;
        } else if current_len + 1 + word_len > width {
            out.push(std::mem::replace(&mut current, word));
        } else {
            current.push(' ');
            current.push_str(&word);
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    if out.is_empty() {
        out.push(String::new());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_simple_table() {
        let mut table = TextTable::new(["ID", "Score"]);
        table.add_row(vec!["RDA-F1-01M".to_string(), "1.00".to_string()]);
        table.add_row(vec!["X".to_string(), "0.50".to_string()]);

        let expected = "\
+------------+-------+
| ID         | Score |
+------------+-------+
| RDA-F1-01M | 1.00  |
| X          | 0.50  |
+------------+-------+
";
        assert_eq!(table.render(), expected);
        assert_eq!(table.to_string(), expected.trim_end());
    }

    #[test]
    fn test_divider_and_multiline_cells() {
        let mut table = TextTable::new(["Name", "Output"]);
        table.add_row_with_divider(vec!["a".to_string(), "one\ntwo".to_string()]);
        table.add_row_with_divider(vec!["b".to_string(), "three".to_string()]);

        let expected = "\
+------+--------+
| Name | Output |
+------+--------+
| a    | one    |
|      | two    |
+------+--------+
| b    | three  |
+------+--------+
";
        assert_eq!(table.render(), expected);
    }

    #[test]
    fn test_column_width_cap_wraps_words() {
        let table = TextTable::new(["Indicator"]).with_max_width("Indicator", 10);
        assert_eq!(table.cap(0), Some(10));
        assert_eq!(
            wrap("Metadata is offered in a way", Some(10)),
            vec!["Metadata", "is offered", "in a way"]
        );
        assert_eq!(wrap("abcdefghijkl", Some(5)), vec!["abcde", "fghij", "kl"]);
        assert_eq!(wrap("short", Some(10)), vec!["short"]);
        assert_eq!(wrap("", Some(10)), vec![""]);
    }
}
