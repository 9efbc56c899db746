use colored::Colorize;
use comfy_table::{Attribute, Cell, Table};
use std::collections::HashMap;

/// Descriptive statistics over the `size` column, in MB.
#[derive(Debug)]
pub struct SizeSummary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// File count and total size for one value of a categorical column.
#[derive(Debug)]
pub struct CategoryUsage {
    pub label: String,
    pub files: usize,
    pub total_mb: f64,
}

#[must_use]
pub fn calculate_size_summary(sizes: &[f64]) -> Option<SizeSummary> {
    if sizes.is_empty() {
        return None;
    }

    let mut sorted = sizes.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let count = sorted.len();
    let sum: f64 = sorted.iter().sum();
    let mean = sum / count as f64;

    // Sample (n-1) standard deviation.
    let std_dev = if count > 1 {
        let variance: f64 =
            sorted.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        variance.sqrt()
    } else {
        0.0
    };

    Some(SizeSummary {
        count,
        mean,
        std_dev,
        min: sorted[0],
        q25: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q75: quantile(&sorted, 0.75),
        max: *sorted.last().unwrap(),
    })
}

/// Linear interpolation between order statistics; `sorted` must be
/// ascending and non-empty.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = pos - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}

pub fn print_size_summary(summary_opt: &Option<SizeSummary>) {
    println!("\n{}", "=== Size Statistics (MB) ===".cyan());
    let Some(s) = summary_opt else {
        println!("No sizes to summarize.");
        return;
    };

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_HORIZONTAL_ONLY);
    table.set_header(vec!["Stat", "Value (MB)", ""]);
    table.add_row(vec![Cell::new("count"), Cell::new(s.count), Cell::new("")]);
    let rows: [(&str, f64); 7] = [
        ("mean", s.mean),
        ("std", s.std_dev),
        ("min", s.min),
        ("25%", s.q25),
        ("50%", s.median),
        ("75%", s.q75),
        ("max", s.max),
    ];
    for (name, value) in rows {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(format!("{value:.3}")),
            Cell::new(human_bytes::human_bytes(value * 1_048_576.0)),
        ]);
    }
    println!("{table}");
}

/// Group per-row sizes by a categorical value, largest total first.
/// Rows with an absent value are bucketed under `-`.
#[must_use]
pub fn calculate_usage<'a>(
    pairs: impl Iterator<Item = (Option<&'a str>, f64)>,
) -> Vec<CategoryUsage> {
    let mut groups: HashMap<String, (usize, f64)> = HashMap::new();
    for (label, size_mb) in pairs {
        let entry = groups.entry(label.unwrap_or("-").to_string()).or_default();
        entry.0 += 1;
        entry.1 += size_mb;
    }

    let mut usage: Vec<CategoryUsage> = groups
        .into_iter()
        .map(|(label, (files, total_mb))| CategoryUsage {
            label,
            files,
            total_mb,
        })
        .collect();
    usage.sort_by(|a, b| b.total_mb.partial_cmp(&a.total_mb).unwrap());
    usage
}

pub fn print_usage(title: &str, usage: &[CategoryUsage]) {
    println!("\n{}", format!("=== {title} ===").cyan());
    if usage.is_empty() {
        println!("Nothing to group.");
        return;
    }

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_HORIZONTAL_ONLY);
    table.set_header(vec!["Value", "Files", "Total"]);

    let mut grand_files = 0;
    let mut grand_mb = 0.0;
    for row in usage {
        grand_files += row.files;
        grand_mb += row.total_mb;
        table.add_row(vec![
            Cell::new(&row.label),
            Cell::new(row.files),
            Cell::new(human_bytes::human_bytes(row.total_mb * 1_048_576.0)),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTALS").add_attribute(Attribute::Bold),
        Cell::new(grand_files).add_attribute(Attribute::Bold),
        Cell::new(human_bytes::human_bytes(grand_mb * 1_048_576.0)).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
}
