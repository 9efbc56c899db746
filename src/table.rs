use crate::types::DatasetRow;
use colored::Colorize;
use comfy_table::{Attribute, Cell, Table};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Dictionary-encoded column for low-cardinality strings. Each row stores
/// a `u32` code into an interned pool; `None` marks an absent value.
#[derive(Debug, Default)]
pub struct Categorical {
    codes: Vec<Option<u32>>,
    pool: Vec<String>,
    index: HashMap<String, u32>,
}

impl Categorical {
    pub fn push(&mut self, value: Option<&str>) {
        let code = value.map(|v| {
            if let Some(&code) = self.index.get(v) {
                code
            } else {
                let code = u32::try_from(self.pool.len()).unwrap_or(u32::MAX);
                self.pool.push(v.to_string());
                self.index.insert(v.to_string(), code);
                code
            }
        });
        self.codes.push(code);
    }

    #[must_use]
    pub fn get(&self, row: usize) -> Option<&str> {
        let code = self.codes.get(row).copied().flatten()?;
        Some(self.pool[code as usize].as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Number of distinct interned values (absent excluded).
    #[must_use]
    pub fn unique(&self) -> usize {
        self.pool.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&str>> {
        self.codes
            .iter()
            .map(|code| code.map(|c| self.pool[c as usize].as_str()))
    }

    /// Estimated footprint: codes plus the interned pool.
    #[must_use]
    pub fn memory_bytes(&self) -> usize {
        let codes = self.codes.len() * size_of::<Option<u32>>();
        let pool: usize = self
            .pool
            .iter()
            .map(|s| s.len() + size_of::<String>())
            .sum();
        codes + pool
    }
}

/// Columnar, append-only store for the final report. `xmldir`, `user` and
/// `year` are categorical; `ntuple` paths are near-unique and stay plain.
#[derive(Debug, Default)]
pub struct DatasetTable {
    xmldir: Categorical,
    ntuple: Vec<String>,
    size_mb: Vec<f64>,
    user: Categorical,
    year: Categorical,
}

pub struct ColumnSummary {
    pub name: &'static str,
    pub dtype: &'static str,
    pub unique: Option<usize>,
    pub bytes: usize,
}

impl DatasetTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: DatasetRow) {
        self.xmldir.push(Some(&row.xmldir));
        self.ntuple.push(row.ntuple);
        self.size_mb.push(row.size_mb);
        self.user.push(row.user.as_deref());
        self.year.push(row.year.as_deref());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.xmldir.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ntuple.is_empty()
    }

    #[must_use]
    pub fn sizes(&self) -> &[f64] {
        &self.size_mb
    }

    #[must_use]
    pub fn total_size_mb(&self) -> f64 {
        self.size_mb.iter().sum()
    }

    /// Grand total in TB, on the same 1_048_576 divisor as the MB step.
    #[must_use]
    pub fn total_size_tb(&self) -> f64 {
        self.total_size_mb() / 1_048_576.0
    }

    pub fn user_sizes(&self) -> impl Iterator<Item = (Option<&str>, f64)> {
        self.user.iter().zip(self.size_mb.iter().copied())
    }

    pub fn year_sizes(&self) -> impl Iterator<Item = (Option<&str>, f64)> {
        self.year.iter().zip(self.size_mb.iter().copied())
    }

    #[must_use]
    pub fn column_summaries(&self) -> Vec<ColumnSummary> {
        let ntuple_bytes: usize = self
            .ntuple
            .iter()
            .map(|s| s.len() + size_of::<String>())
            .sum();
        vec![
            ColumnSummary {
                name: "xmldir",
                dtype: "category",
                unique: Some(self.xmldir.unique()),
                bytes: self.xmldir.memory_bytes(),
            },
            ColumnSummary {
                name: "ntuple",
                dtype: "str",
                unique: None,
                bytes: ntuple_bytes,
            },
            ColumnSummary {
                name: "size",
                dtype: "f64",
                unique: None,
                bytes: self.size_mb.len() * size_of::<f64>(),
            },
            ColumnSummary {
                name: "user",
                dtype: "category",
                unique: Some(self.user.unique()),
                bytes: self.user.memory_bytes(),
            },
            ColumnSummary {
                name: "year",
                dtype: "category",
                unique: Some(self.year.unique()),
                bytes: self.year.memory_bytes(),
            },
        ]
    }

    /// Persist as delimited text: an index column followed by
    /// `xmldir,ntuple,size,user,year`. Absent values are written empty.
    pub fn write_csv(&self, path: &Path) -> io::Result<()> {
        let mut w = BufWriter::new(File::create(path)?);
        writeln!(w, ",xmldir,ntuple,size,user,year")?;
        for i in 0..self.len() {
            writeln!(
                w,
                "{},{},{},{},{},{}",
                i,
                self.xmldir.get(i).unwrap_or(""),
                self.ntuple[i],
                self.size_mb[i],
                self.user.get(i).unwrap_or(""),
                self.year.get(i).unwrap_or(""),
            )?;
        }
        w.flush()
    }

    fn preview_row(&self, i: usize) -> Vec<Cell> {
        vec![
            Cell::new(i),
            Cell::new(self.xmldir.get(i).unwrap_or("-")),
            Cell::new(&self.ntuple[i]),
            Cell::new(format!("{:.3}", self.size_mb[i])),
            Cell::new(self.user.get(i).unwrap_or("-")),
            Cell::new(self.year.get(i).unwrap_or("-")),
        ]
    }
}

/// First and last `n` rows of the table.
pub fn print_preview(table: &DatasetTable, n: usize) {
    println!("\n{}", "=== Table Preview ===".cyan());
    if table.is_empty() {
        println!("No rows collected.");
        return;
    }

    let mut t = Table::new();
    t.load_preset(comfy_table::presets::UTF8_HORIZONTAL_ONLY);
    t.set_header(vec!["", "xmldir", "ntuple", "size (MB)", "user", "year"]);

    if table.len() <= 2 * n {
        for i in 0..table.len() {
            t.add_row(table.preview_row(i));
        }
    } else {
        for i in 0..n {
            t.add_row(table.preview_row(i));
        }
        t.add_row(vec![Cell::new("..."); 6]);
        for i in table.len() - n..table.len() {
            t.add_row(table.preview_row(i));
        }
    }
    println!("{t}");
}

/// Per-column dtype, cardinality and estimated memory.
pub fn print_column_summary(table: &DatasetTable) {
    println!("\n{}", "=== Columns ===".cyan());

    let summaries = table.column_summaries();
    let mut t = Table::new();
    t.load_preset(comfy_table::presets::UTF8_HORIZONTAL_ONLY);
    t.set_header(vec!["Column", "Dtype", "Unique", "Memory"]);

    let mut total_bytes = 0;
    for col in &summaries {
        total_bytes += col.bytes;
        t.add_row(vec![
            Cell::new(col.name),
            Cell::new(col.dtype),
            Cell::new(col.unique.map_or_else(|| "-".to_string(), |u| u.to_string())),
            Cell::new(human_bytes::human_bytes(col.bytes as f64)),
        ]);
    }
    t.add_row(vec![
        Cell::new("TOTAL").add_attribute(Attribute::Bold),
        Cell::new(""),
        Cell::new(""),
        Cell::new(human_bytes::human_bytes(total_bytes as f64)).add_attribute(Attribute::Bold),
    ]);
    println!("{t}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn row(xmldir: &str, ntuple: &str, size_mb: f64, user: Option<&str>, year: Option<&str>) -> DatasetRow {
        DatasetRow {
            xmldir: xmldir.to_string(),
            ntuple: ntuple.to_string(),
            size_mb,
            user: user.map(str::to_string),
            year: year.map(str::to_string),
        }
    }

    #[test]
    fn test_categorical_interns_repeated_values() {
        let mut col = Categorical::default();
        col.push(Some("2017v2"));
        col.push(Some("2018v1"));
        col.push(Some("2017v2"));
        col.push(None);
        assert_eq!(col.len(), 4);
        assert_eq!(col.unique(), 2);
        assert_eq!(col.get(0), Some("2017v2"));
        assert_eq!(col.get(2), Some("2017v2"));
        assert_eq!(col.get(3), None);
    }

    #[test]
    fn test_table_totals() {
        let mut table = DatasetTable::new();
        table.push(row("2017v2", "/a.root", 1.5, Some("robin"), Some("2017v2")));
        table.push(row("2017v2", "/b.root", 2.5, None, Some("2017v2")));
        assert_eq!(table.len(), 2);
        assert!((table.total_size_mb() - 4.0).abs() < f64::EPSILON);
        assert!((table.total_size_tb() - 4.0 / 1_048_576.0).abs() < 1e-12);
    }

    #[test]
    fn test_write_csv_shape() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");

        let mut table = DatasetTable::new();
        table.push(row("2018v1", "/store/a.root", 1.5, Some("robin"), Some("2018v1")));
        table.push(row("2018v1", "/store/b.root", 0.25, None, None));
        table.write_csv(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], ",xmldir,ntuple,size,user,year");
        assert_eq!(lines[1], "0,2018v1,/store/a.root,1.5,robin,2018v1");
        assert_eq!(lines[2], "1,2018v1,/store/b.root,0.25,,");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_column_summaries_track_cardinality() {
        let mut table = DatasetTable::new();
        table.push(row("2017v2", "/a.root", 1.0, Some("robin"), Some("2017v2")));
        table.push(row("2017v2", "/b.root", 1.0, Some("alice"), Some("2017v2")));

        let summaries = table.column_summaries();
        let user = summaries.iter().find(|c| c.name == "user").unwrap();
        assert_eq!(user.unique, Some(2));
        let xmldir = summaries.iter().find(|c| c.name == "xmldir").unwrap();
        assert_eq!(xmldir.unique, Some(1));
        let ntuple = summaries.iter().find(|c| c.name == "ntuple").unwrap();
        assert!(ntuple.bytes > 0);
    }
}
