use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};

use crate::model::{PestSighting, RECORD_HEADERS};
use crate::report::layout::{analysis_blocks, layout, Block, Metric, PlacedBlock, SHEET_COLUMNS};
use crate::report::stats::{AggregateStats, GroupRow, RankedRecord};

/// Sheet holding one row per extracted record.
pub const PRIMARY_SHEET: &str = "虫害情况";
/// Generated analysis sheet, always the first sheet when present.
pub const ANALYSIS_SHEET: &str = "虫害分析";

const PRIMARY_WIDTHS: [f64; 6] = [15.0, 12.0, 15.0, 20.0, 15.0, 15.0];

const HEADER_GREY: u32 = 0xD3D3D3;
const SUBTITLE_GREY: u32 = 0xE7E6E6;
const WARNING_YELLOW: u32 = 0xFFF3CD;
const RANKING_BLUE: u32 = 0x4472C4;

struct Styles {
    title: Format,
    subtitle: Format,
    ranking_title: Format,
    header: Format,
    ranking_header: Format,
    cell: Format,
    highlighted_cell: Format,
    metric_label: Format,
    metric_value: Format,
    metric_warning: Format,
}

impl Styles {
    fn new() -> Self {
        let cell = Format::new()
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin);
        let left = Format::new()
            .set_bold()
            .set_align(FormatAlign::Left)
            .set_align(FormatAlign::VerticalCenter);

        Styles {
            title: left.clone().set_font_size(16.0),
            subtitle: left
                .clone()
                .set_font_size(13.0)
                .set_background_color(Color::RGB(SUBTITLE_GREY)),
            ranking_title: left
                .clone()
                .set_font_size(14.0)
                .set_background_color(Color::RGB(SUBTITLE_GREY)),
            header: cell
                .clone()
                .set_bold()
                .set_font_size(11.0)
                .set_background_color(Color::RGB(HEADER_GREY)),
            ranking_header: cell
                .clone()
                .set_bold()
                .set_font_size(11.0)
                .set_font_color(Color::White)
                .set_background_color(Color::RGB(RANKING_BLUE)),
            highlighted_cell: cell.clone().set_background_color(Color::RGB(WARNING_YELLOW)),
            cell,
            metric_label: left.clone().set_font_size(11.0),
            metric_value: left.clone().set_font_size(13.0),
            metric_warning: left
                .set_font_size(13.0)
                .set_background_color(Color::RGB(WARNING_YELLOW)),
        }
    }
}

/// Render the report workbook in memory.
///
/// With `analysis` set, the analysis sheet is placed before the primary
/// sheet. Rendering always starts from an empty workbook, so the analysis
/// sheet can never appear twice.
pub fn render(
    records: &[PestSighting],
    analysis: Option<&AggregateStats>,
) -> Result<Vec<u8>, XlsxError> {
    let styles = Styles::new();
    let mut workbook = Workbook::new();

    if let Some(stats) = analysis {
        let sheet = workbook.add_worksheet();
        sheet.set_name(ANALYSIS_SHEET)?;
        write_analysis_sheet(sheet, stats, &styles)?;
    }

    let sheet = workbook.add_worksheet();
    sheet.set_name(PRIMARY_SHEET)?;
    write_primary_sheet(sheet, records, &styles)?;

    workbook.save_to_buffer()
}

fn write_primary_sheet(
    sheet: &mut Worksheet,
    records: &[PestSighting],
    styles: &Styles,
) -> Result<(), XlsxError> {
    for (col, header) in RECORD_HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &styles.header)?;
    }

    for (i, record) in records.iter().enumerate() {
        let row = i as u32 + 1;
        for (col, value) in record.text_fields().iter().enumerate() {
            sheet.write_string_with_format(row, col as u16, *value, &styles.cell)?;
        }
        sheet.write_number_with_format(row, 5, f64::from(record.count), &styles.cell)?;
    }

    for (col, width) in PRIMARY_WIDTHS.iter().enumerate() {
        sheet.set_column_width(col as u16, *width)?;
    }
    Ok(())
}

fn write_analysis_sheet(
    sheet: &mut Worksheet,
    stats: &AggregateStats,
    styles: &Styles,
) -> Result<(), XlsxError> {
    for placed in layout(analysis_blocks(stats)) {
        write_block(sheet, &placed, styles)?;
    }

    for col in 0..8u16 {
        sheet.set_column_width(col, 15.0)?;
    }
    sheet.set_column_width(0, 8.0)?;
    sheet.set_column_width(4, 18.0)?;
    sheet.set_column_width(6, 10.0)?;
    Ok(())
}

fn write_block(sheet: &mut Worksheet, placed: &PlacedBlock, styles: &Styles) -> Result<(), XlsxError> {
    let row = placed.start_row;
    match &placed.block {
        Block::Title(text) => {
            sheet.merge_range(row, 0, row + 1, SHEET_COLUMNS - 1, text, &styles.title)?;
        }
        Block::Overview(metrics) => write_overview(sheet, row, metrics, styles)?,
        Block::GroupTable {
            title,
            key_header,
            rows,
        } => write_group_table(sheet, row, title, key_header, rows, styles)?,
        Block::RankedTable { title, rows } => write_ranked_table(sheet, row, title, rows, styles)?,
    }
    Ok(())
}

fn write_overview(
    sheet: &mut Worksheet,
    row: u32,
    metrics: &[Metric],
    styles: &Styles,
) -> Result<(), XlsxError> {
    for (i, metric) in metrics.iter().enumerate() {
        let col = i as u16 * 2;
        sheet.write_string_with_format(row, col, &metric.label, &styles.metric_label)?;
        let value_format = if metric.warning {
            &styles.metric_warning
        } else {
            &styles.metric_value
        };
        sheet.write_string_with_format(row + 1, col, &metric.value, value_format)?;
    }
    Ok(())
}

fn write_group_table(
    sheet: &mut Worksheet,
    row: u32,
    title: &str,
    key_header: &str,
    rows: &[GroupRow],
    styles: &Styles,
) -> Result<(), XlsxError> {
    sheet.merge_range(row, 0, row, 3, title, &styles.subtitle)?;

    let headers = [key_header, "记录数", "总数量（只）", "占比"];
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(row + 1, col as u16, *header, &styles.header)?;
    }

    for (i, group) in rows.iter().enumerate() {
        let r = row + 2 + i as u32;
        sheet.write_string_with_format(r, 0, &group.key, &styles.cell)?;
        sheet.write_number_with_format(r, 1, group.record_count as f64, &styles.cell)?;
        sheet.write_number_with_format(r, 2, group.total_count as f64, &styles.cell)?;
        sheet.write_string_with_format(r, 3, format!("{:.1}%", group.percentage), &styles.cell)?;
    }
    Ok(())
}

fn write_ranked_table(
    sheet: &mut Worksheet,
    row: u32,
    title: &str,
    rows: &[RankedRecord],
    styles: &Styles,
) -> Result<(), XlsxError> {
    sheet.merge_range(row, 0, row, SHEET_COLUMNS - 1, title, &styles.ranking_title)?;

    let headers = ["排名", "建筑物", "楼层", "部门", "监测点位", "虫害类型", "数量"];
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(row + 1, col as u16, *header, &styles.ranking_header)?;
    }

    for (i, ranked) in rows.iter().enumerate() {
        let r = row + 2 + i as u32;
        let format = if ranked.is_high_priority() {
            &styles.highlighted_cell
        } else {
            &styles.cell
        };
        sheet.write_number_with_format(r, 0, ranked.rank as f64, format)?;
        for (j, value) in ranked.record.text_fields().iter().enumerate() {
            sheet.write_string_with_format(r, 1 + j as u16, *value, format)?;
        }
        sheet.write_number_with_format(r, 6, f64::from(ranked.record.count), format)?;
    }
    Ok(())
}
