//! Analysis sheet layout.
//!
//! The sheet is a sequence of typed blocks. Each block knows how many rows it
//! occupies; [`layout`] stacks them top to bottom with a fixed gap, so no two
//! blocks can overlap however many groups or records there are.

use crate::report::stats::{AggregateStats, GroupRow, RankedRecord};

/// Blank rows between consecutive blocks.
pub const BLOCK_GAP: u32 = 2;

/// Widest block, in columns (the ranked table).
pub const SHEET_COLUMNS: u16 = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metric {
    pub label: String,
    pub value: String,
    /// Rendered with a warning fill.
    pub warning: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Sheet title, merged over two rows.
    Title(String),
    /// Label row above value row, one metric every other column.
    Overview(Vec<Metric>),
    /// Subtitle, header row, one row per group.
    GroupTable {
        title: String,
        key_header: String,
        rows: Vec<GroupRow>,
    },
    /// Subtitle, header row, one row per ranked record.
    RankedTable {
        title: String,
        rows: Vec<RankedRecord>,
    },
}

impl Block {
    pub fn row_span(&self) -> u32 {
        match self {
            Block::Title(_) | Block::Overview(_) => 2,
            Block::GroupTable { rows, .. } => 2 + rows.len() as u32,
            Block::RankedTable { rows, .. } => 2 + rows.len() as u32,
        }
    }
}

/// A block with its absolute, 0-based first row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedBlock {
    pub start_row: u32,
    pub block: Block,
}

impl PlacedBlock {
    /// Last row occupied by the block (inclusive).
    pub fn end_row(&self) -> u32 {
        self.start_row + self.block.row_span() - 1
    }
}

/// Assign absolute rows to blocks, stacking them in order.
pub fn layout(blocks: Vec<Block>) -> Vec<PlacedBlock> {
    let mut next_row = 0;
    blocks
        .into_iter()
        .map(|block| {
            let placed = PlacedBlock {
                start_row: next_row,
                block,
            };
            next_row = placed.end_row() + 1 + BLOCK_GAP;
            placed
        })
        .collect()
}

/// The analysis sheet blocks for a set of statistics, in display order.
pub fn analysis_blocks(stats: &AggregateStats) -> Vec<Block> {
    vec![
        Block::Title("虫害情况数据概览".into()),
        Block::Overview(vec![
            Metric {
                label: "总记录数".into(),
                value: format!("{} 条", stats.total_records),
                warning: false,
            },
            Metric {
                label: "虫害总数".into(),
                value: format!("{} 只", stats.total_count),
                warning: false,
            },
            Metric {
                label: "平均密度".into(),
                value: format!("{:.1} 只/处", stats.average_density),
                warning: false,
            },
            Metric {
                label: "⚠️ 最大单点".into(),
                value: format!("{} 只", stats.max_single),
                warning: true,
            },
        ]),
        Block::GroupTable {
            title: "虫害类型统计".into(),
            key_header: "虫害类型".into(),
            rows: stats.by_pest_type.clone(),
        },
        Block::GroupTable {
            title: "建筑物虫害统计".into(),
            key_header: "建筑物".into(),
            rows: stats.by_building.clone(),
        },
        Block::RankedTable {
            title: format!("高危区域分析 - TOP {}", stats.top_n),
            rows: stats.top_records.clone(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PestSighting;
    use crate::report::stats::DEFAULT_TOP_N;

    fn records(n: usize, kinds: usize) -> Vec<PestSighting> {
        (0..n)
            .map(|i| PestSighting {
                building: format!("{}栋", i % kinds),
                floor: "1F".into(),
                department: "厨房".into(),
                monitoring_point: format!("点位{i}"),
                pest_type: format!("虫{}", i % kinds),
                count: i as u32,
            })
            .collect()
    }

    #[test]
    fn test_blocks_never_overlap() {
        for (n, kinds) in [(1, 1), (5, 5), (30, 12), (40, 3)] {
            let stats = AggregateStats::compute(&records(n, kinds), DEFAULT_TOP_N);
            let placed = layout(analysis_blocks(&stats));
            assert_eq!(placed.len(), 5);
            assert_eq!(placed[0].start_row, 0);
            for pair in placed.windows(2) {
                assert_eq!(pair[1].start_row, pair[0].end_row() + 1 + BLOCK_GAP);
            }
        }
    }

    #[test]
    fn test_row_spans() {
        let stats = AggregateStats::compute(&records(15, 4), DEFAULT_TOP_N);
        let blocks = analysis_blocks(&stats);
        let spans: Vec<u32> = blocks.iter().map(Block::row_span).collect();
        assert_eq!(spans, vec![2, 2, 2 + 4, 2 + 4, 2 + 10]);
    }

    #[test]
    fn test_overview_formatting() {
        let stats = AggregateStats::compute(&records(3, 1), DEFAULT_TOP_N);
        let blocks = analysis_blocks(&stats);
        let Block::Overview(metrics) = &blocks[1] else {
            panic!("second block is the overview");
        };
        let values: Vec<&str> = metrics.iter().map(|m| m.value.as_str()).collect();
        assert_eq!(values, vec!["3 条", "3 只", "1.0 只/处", "2 只"]);
        assert!(metrics[3].warning);
        assert!(metrics[..3].iter().all(|m| !m.warning));
    }
}
