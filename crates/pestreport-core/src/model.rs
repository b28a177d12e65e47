use serde::{Deserialize, Serialize};
use std::fmt;

/// Column headers of the primary data sheet, in field order.
pub const RECORD_HEADERS: [&str; 6] = [
    "建筑物",
    "楼层",
    "部门",
    "检查/发现监测点位",
    "虫害类型",
    "发现虫害活动",
];

/// One pest sighting extracted from the pest activity section of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PestSighting {
    pub building: String,
    pub floor: String,
    pub department: String,
    pub monitoring_point: String,
    pub pest_type: String,
    pub count: u32,
}

impl PestSighting {
    /// The five text fields in sheet column order (count excluded).
    pub fn text_fields(&self) -> [&str; 5] {
        [
            &self.building,
            &self.floor,
            &self.department,
            &self.monitoring_point,
            &self.pest_type,
        ]
    }
}

impl fmt::Display for PestSighting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}: {} x{}",
            self.building, self.floor, self.department, self.monitoring_point, self.pest_type,
            self.count
        )
    }
}

/// A detection line that was found but could not be paired into a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedLine {
    /// 1-based line number within the isolated pest section.
    pub line_number: usize,
    pub line_text: String,
    pub reason: String,
}

/// Records paired from a pest section, plus the detection lines that were dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedSightings {
    pub records: Vec<PestSighting>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_lines: Vec<SkippedLine>,
}
