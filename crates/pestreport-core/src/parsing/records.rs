use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::model::{ParsedSightings, PestSighting, SkippedLine};

/// `<CJK pest name> 发现虫害活动 - <count>`, with hyphen, en dash or em dash.
static DETECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([\u{4e00}-\u{9fa5}]+)\s+发现虫害活动\s*[-–—]\s*([0-9]+)")
        .expect("detection pattern is valid")
});

/// `建筑物: .., 楼层: .., 部门: .., 检查/发现监测点位: ..` (ASCII or full-width punctuation).
static DETAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"建筑物[:：]\s*([^,，]+)[,，]\s*楼层[:：]\s*([^,，]+)[,，]\s*部门[:：]\s*([^,，]+)[,，]\s*检查/发现监测点位[:：]\s*(.+)",
    )
    .expect("detail pattern is valid")
});

struct Detection<'a> {
    pest_type: &'a str,
    count: &'a str,
}

fn match_detection(line: &str) -> Option<Detection<'_>> {
    let caps = DETECTION.captures(line)?;
    Some(Detection {
        pest_type: caps.get(1)?.as_str(),
        count: caps.get(2)?.as_str(),
    })
}

/// Pair detection lines with the detail line that immediately follows them.
///
/// Lines are expected to be normalized already. Unpaired or malformed
/// detection lines are reported in `skipped_lines` and never fail the parse.
pub fn pair_records(lines: &[String]) -> ParsedSightings {
    let mut parsed = ParsedSightings::default();

    for (i, raw) in lines.iter().enumerate() {
        let line = raw.trim();
        let Some(detection) = match_detection(line) else {
            continue;
        };

        let skip = |reason: String| SkippedLine {
            line_number: i + 1,
            line_text: line.to_string(),
            reason,
        };

        let Some(next) = lines.get(i + 1).map(|l| l.trim()) else {
            tracing::warn!(line = i + 1, "detection line at end of section, dropped");
            parsed
                .skipped_lines
                .push(skip("no detail line follows".into()));
            continue;
        };

        let Some(caps) = DETAIL.captures(next) else {
            tracing::warn!(line = i + 1, next, "detection line without detail line, dropped");
            parsed
                .skipped_lines
                .push(skip(format!("following line is not a detail line: '{next}'")));
            continue;
        };

        match build_record(&detection, &caps) {
            Ok(record) => {
                tracing::debug!(line = i + 1, %record, "paired pest record");
                parsed.records.push(record);
            }
            Err(reason) => {
                tracing::warn!(line = i + 1, %reason, "pest record dropped");
                parsed.skipped_lines.push(skip(reason));
            }
        }
    }

    parsed
}

fn build_record(detection: &Detection<'_>, caps: &Captures<'_>) -> Result<PestSighting, String> {
    let field = |idx: usize, label: &str| -> Result<String, String> {
        let value = caps.get(idx).map(|m| m.as_str().trim()).unwrap_or_default();
        if value.is_empty() {
            Err(format!("empty {label} field"))
        } else {
            Ok(value.to_string())
        }
    };

    let count = detection
        .count
        .parse::<u32>()
        .map_err(|e| format!("invalid count '{}': {e}", detection.count))?;

    Ok(PestSighting {
        building: field(1, "building")?,
        floor: field(2, "floor")?,
        department: field(3, "department")?,
        monitoring_point: field(4, "monitoring point")?,
        pest_type: detection.pest_type.to_string(),
        count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_pairs_detection_with_detail() {
        let parsed = pair_records(&lines(&[
            "虫害情况",
            "  蟑螂 发现虫害活动 - 3  ",
            "建筑物: A栋, 楼层: 1F, 部门: 厨房, 检查/发现监测点位: 角落",
        ]));
        assert_eq!(
            parsed.records,
            vec![PestSighting {
                building: "A栋".into(),
                floor: "1F".into(),
                department: "厨房".into(),
                monitoring_point: "角落".into(),
                pest_type: "蟑螂".into(),
                count: 3,
            }]
        );
        assert!(parsed.skipped_lines.is_empty());
    }

    #[test]
    fn test_dash_variants() {
        for dash in ["-", "–", "—"] {
            let parsed = pair_records(&lines(&[
                &format!("老鼠 发现虫害活动 {dash}12"),
                "建筑物: B栋, 楼层: B1, 部门: 仓库, 检查/发现监测点位: 门口",
            ]));
            assert_eq!(parsed.records.len(), 1, "dash {dash}");
            assert_eq!(parsed.records[0].count, 12);
            assert_eq!(parsed.records[0].pest_type, "老鼠");
        }
    }

    #[test]
    fn test_fullwidth_punctuation_in_detail() {
        let parsed = pair_records(&lines(&[
            "苍蝇 发现虫害活动 - 5",
            "建筑物：C栋，楼层：2F，部门：餐厅，检查/发现监测点位：窗台",
        ]));
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].building, "C栋");
        assert_eq!(parsed.records[0].monitoring_point, "窗台");
    }

    #[test]
    fn test_last_field_keeps_commas() {
        let parsed = pair_records(&lines(&[
            "蚂蚁 发现虫害活动 - 1",
            "建筑物: A栋, 楼层: 1F, 部门: 厨房, 检查/发现监测点位: 水槽下, 靠墙",
        ]));
        assert_eq!(parsed.records[0].monitoring_point, "水槽下, 靠墙");
    }

    #[test]
    fn test_unpaired_detection_is_skipped() {
        let parsed = pair_records(&lines(&[
            "蟑螂 发现虫害活动 - 3",
            "备注: 无",
            "老鼠 发现虫害活动 - 2",
            "建筑物: A栋, 楼层: 1F, 部门: 厨房, 检查/发现监测点位: 角落",
        ]));
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].pest_type, "老鼠");
        assert_eq!(parsed.skipped_lines.len(), 1);
        assert_eq!(parsed.skipped_lines[0].line_number, 1);
    }

    #[test]
    fn test_detection_at_end_is_skipped() {
        let parsed = pair_records(&lines(&["蟑螂 发现虫害活动 - 3"]));
        assert!(parsed.records.is_empty());
        assert_eq!(parsed.skipped_lines[0].reason, "no detail line follows");
    }

    #[test]
    fn test_detail_must_be_immediately_next() {
        let parsed = pair_records(&lines(&[
            "蟑螂 发现虫害活动 - 3",
            "",
            "建筑物: A栋, 楼层: 1F, 部门: 厨房, 检查/发现监测点位: 角落",
        ]));
        assert!(parsed.records.is_empty());
    }

    #[test]
    fn test_non_cjk_pest_name_is_not_a_detection() {
        let parsed = pair_records(&lines(&[
            "Cockroach 发现虫害活动 - 3",
            "建筑物: A栋, 楼层: 1F, 部门: 厨房, 检查/发现监测点位: 角落",
        ]));
        assert!(parsed.records.is_empty());
        assert!(parsed.skipped_lines.is_empty());
    }

    #[test]
    fn test_overflowing_count_is_skipped() {
        let parsed = pair_records(&lines(&[
            "蟑螂 发现虫害活动 - 99999999999",
            "建筑物: A栋, 楼层: 1F, 部门: 厨房, 检查/发现监测点位: 角落",
        ]));
        assert!(parsed.records.is_empty());
        assert!(parsed.skipped_lines[0].reason.starts_with("invalid count"));
    }

    #[test]
    fn test_blank_field_is_skipped() {
        let parsed = pair_records(&lines(&[
            "蟑螂 发现虫害活动 - 3",
            "建筑物:  , 楼层: 1F, 部门: 厨房, 检查/发现监测点位: 角落",
        ]));
        assert!(parsed.records.is_empty());
        assert_eq!(parsed.skipped_lines[0].reason, "empty building field");
    }
}
