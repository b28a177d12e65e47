use pestreport_core::extraction::{BackendAvailability, BackendChoice};
use pestreport_core::model::{ParsedSightings, SkippedLine, RECORD_HEADERS};
use pestreport_core::pipeline::RunSummary;
use pestreport_core::report::stats::{AggregateStats, GroupRow};

/// Terminal columns taken by `s`; CJK and full-width characters take two.
fn display_width(s: &str) -> usize {
    s.chars()
        .map(|c| match c as u32 {
            0x1100..=0x115F | 0x2E80..=0xA4CF | 0xAC00..=0xD7A3 | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F | 0xFF00..=0xFF60 | 0xFFE0..=0xFFE6 => 2,
            _ => 1,
        })
        .sum()
}

fn pad(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_width(s));
    format!("{s}{}", " ".repeat(fill))
}

pub fn print_records(parsed: &ParsedSightings) {
    let rows: Vec<[String; 6]> = parsed
        .records
        .iter()
        .map(|r| {
            let [building, floor, department, point, pest_type] = r.text_fields();
            [
                building.to_string(),
                floor.to_string(),
                department.to_string(),
                point.to_string(),
                pest_type.to_string(),
                r.count.to_string(),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = RECORD_HEADERS.iter().map(|h| display_width(h)).collect();
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(display_width(cell));
        }
    }

    let header: Vec<String> = RECORD_HEADERS
        .iter()
        .zip(&widths)
        .map(|(h, w)| pad(h, *w))
        .collect();
    println!("{}", header.join("  ").trim_end());
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    println!("{}", rule.join("  "));

    for row in &rows {
        let cells: Vec<String> = row.iter().zip(&widths).map(|(c, w)| pad(c, *w)).collect();
        println!("{}", cells.join("  ").trim_end());
    }

    println!("\n{} record(s)", parsed.records.len());
    print_skipped(&parsed.skipped_lines);
}

fn print_skipped(skipped: &[SkippedLine]) {
    if skipped.is_empty() {
        return;
    }
    println!("\nSkipped detection lines:");
    for line in skipped {
        println!(
            "  line {}: {} ({})",
            line.line_number, line.line_text, line.reason
        );
    }
}

pub fn print_summary(summary: &RunSummary) {
    println!("{}", summary.message);
    println!();
    print_stats(&summary.stats);
    print_skipped(&summary.skipped_lines);
}

pub fn print_stats(stats: &AggregateStats) {
    println!("  总记录数: {} 条", stats.total_records);
    println!("  虫害总数: {} 只", stats.total_count);
    println!("  平均密度: {:.1} 只/处", stats.average_density);
    println!("  最大单点: {} 只", stats.max_single);

    print_groups("虫害类型", &stats.by_pest_type);
    print_groups("建筑物", &stats.by_building);

    if !stats.top_records.is_empty() {
        println!("\n  高危区域 TOP {}:", stats.top_n);
        for ranked in &stats.top_records {
            let marker = if ranked.is_high_priority() { " *" } else { "" };
            println!("    {:>2}. {}{}", ranked.rank, ranked.record, marker);
        }
    }
}

fn print_groups(key_header: &str, groups: &[GroupRow]) {
    if groups.is_empty() {
        return;
    }
    let key_width = groups
        .iter()
        .map(|g| display_width(&g.key))
        .chain(std::iter::once(display_width(key_header)))
        .max()
        .unwrap_or(0);

    println!("\n  {}  记录数  总数量  占比", pad(key_header, key_width));
    for group in groups {
        println!(
            "  {}  {:>6}  {:>6}  {:>5.1}%",
            pad(&group.key, key_width),
            group.record_count,
            group.total_count,
            group.percentage
        );
    }
}

pub fn print_backends(availability: &BackendAvailability, auto: BackendChoice) {
    let status = |ok: bool| if ok { "available" } else { "not found" };
    println!("  pdftotext  {}", status(availability.pdftotext));
    println!("  embedded   {}", status(availability.embedded));
    println!("\n  auto selects: {auto}");
    if !availability.pdftotext {
        println!("  install poppler-utils for the pdftotext backend");
    }
}
