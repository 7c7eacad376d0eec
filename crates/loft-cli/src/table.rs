//! Output formatting: header tables and key/value blocks.
//!
//! Column widths are the widest of header and cells plus four spaces of
//! gutter; everything is left-aligned and the last column is written
//! without trailing padding. Empty cells render as `<none>`.

use std::collections::BTreeMap;
use std::io::{self, Write};

/// Placeholder for missing or empty cells.
pub const NONE: &str = "<none>";

const GUTTER: usize = 4;

/// A table with column headers.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create a table with the given column headers.
    #[must_use]
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(ToString::to_string).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Missing trailing cells render as [`NONE`].
    pub fn add_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    /// Render the table, one trailing newline per row.
    pub fn render<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let widths = self.widths();
        write_row(writer, &self.headers, &widths)?;
        for row in &self.rows {
            write_row(writer, row, &widths)?;
        }
        Ok(())
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(String::len).collect();
        for row in &self.rows {
            for (i, width) in widths.iter_mut().enumerate() {
                let len = match row.get(i) {
                    Some(cell) if !cell.is_empty() => cell.len(),
                    _ => NONE.len(),
                };
                *width = (*width).max(len);
            }
        }
        widths
    }
}

fn write_row<W: Write>(writer: &mut W, cells: &[String], widths: &[usize]) -> io::Result<()> {
    let last = widths.len().saturating_sub(1);
    for (i, width) in widths.iter().enumerate() {
        let cell = match cells.get(i) {
            Some(cell) if !cell.is_empty() => cell.as_str(),
            _ => NONE,
        };
        if i == last {
            write!(writer, "{cell}")?;
        } else {
            write!(writer, "{cell:<pad$}", pad = width + GUTTER)?;
        }
    }
    writeln!(writer)
}

/// A `key: value` block with values aligned past the longest key.
#[derive(Debug, Clone, Default)]
pub struct KvBlock {
    pairs: Vec<(String, String)>,
}

impl KvBlock {
    /// Empty block.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an unordered mapping; keys are sorted lexicographically.
    #[must_use]
    pub fn from_map<V: ToString>(map: &BTreeMap<String, V>) -> Self {
        let mut block = Self::new();
        for (key, value) in map {
            block.push(key, value.to_string());
        }
        block
    }

    /// Append a pair in caller order.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Whether the block holds no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Render one `key:` / value pair per line.
    pub fn render<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let width = self
            .pairs
            .iter()
            .map(|(key, _)| key.len())
            .max()
            .unwrap_or(0)
            + GUTTER;
        for (key, value) in &self.pairs {
            let value = if value.is_empty() { NONE } else { value.as_str() };
            writeln!(writer, "{:<width$}{value}", format!("{key}:"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_table(table: &Table) -> String {
        let mut buf = Vec::new();
        table.render(&mut buf).expect("render");
        String::from_utf8(buf).expect("utf8")
    }

    fn render_kv(block: &KvBlock) -> String {
        let mut buf = Vec::new();
        block.render(&mut buf).expect("render");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn columns_align_to_widest_cell_plus_gutter() {
        let mut table = Table::new(&["NAME", "STATE"]);
        table.add_row(["web-abcdef123", "up"]);
        table.add_row(["web-x", "crashed"]);
        let out = render_table(&table);
        // NAME column width = 13 + 4
        assert_eq!(out, "NAME             STATE\nweb-abcdef123    up\nweb-x            crashed\n");
    }

    #[test]
    fn header_wins_when_wider_than_cells() {
        let mut table = Table::new(&["VERYLONGHEADER", "B"]);
        table.add_row(["x", "y"]);
        let out = render_table(&table);
        assert!(out.starts_with("VERYLONGHEADER    B\n"));
        assert!(out.contains("x                 y\n"));
    }

    #[test]
    fn missing_and_empty_cells_render_none() {
        let mut table = Table::new(&["A", "B", "C"]);
        table.add_row(["1", ""]);
        let out = render_table(&table);
        assert!(out.contains("<none>"));
        let line = out.lines().nth(1).expect("row");
        assert!(line.ends_with("<none>"));
        assert_eq!(line.matches("<none>").count(), 2);
    }

    #[test]
    fn last_column_has_no_trailing_padding() {
        let mut table = Table::new(&["A", "B"]);
        table.add_row(["aa", "b"]);
        let out = render_table(&table);
        for line in out.lines() {
            assert_eq!(line, line.trim_end());
        }
    }

    #[test]
    fn kv_block_aligns_values_past_longest_key() {
        let mut block = KvBlock::new();
        block.push("id", "lorem-ipsum");
        block.push("response_limit", "100");
        let out = render_kv(&block);
        assert_eq!(out, "id:               lorem-ipsum\nresponse_limit:   100\n");
    }

    #[test]
    fn kv_from_map_sorts_keys() {
        let mut map = BTreeMap::new();
        map.insert("b".to_string(), "2");
        map.insert("a".to_string(), "1");
        let out = render_kv(&KvBlock::from_map(&map));
        let first = out.lines().next().expect("line");
        assert!(first.starts_with("a:"));
    }

    #[test]
    fn kv_empty_value_renders_none() {
        let mut block = KvBlock::new();
        block.push("owner", "");
        assert!(render_kv(&block).contains(NONE));
    }
}
