//! Aggregate statistics over a sequence of pest sightings.
//!
//! Everything here is derived on demand from the records; nothing is
//! persisted except through the rendered analysis sheet.

use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::model::PestSighting;

/// Number of records in the high-risk ranking.
pub const DEFAULT_TOP_N: usize = 10;

/// One row of a grouping table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupRow {
    pub key: String,
    pub record_count: usize,
    pub total_count: u64,
    /// Share of the grand total, one decimal place.
    pub percentage: Decimal,
}

/// A record in the high-risk ranking, 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedRecord {
    pub rank: usize,
    pub record: PestSighting,
}

impl RankedRecord {
    /// Ranks 1 to 3 are highlighted as high priority.
    pub fn is_high_priority(&self) -> bool {
        self.rank <= 3
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateStats {
    pub total_records: usize,
    pub total_count: u64,
    /// Sightings per record, rounded half away from zero to one decimal
    /// place; zero without records.
    pub average_density: Decimal,
    pub max_single: u32,
    pub by_pest_type: Vec<GroupRow>,
    pub by_building: Vec<GroupRow>,
    /// Requested ranking size; `top_records` may be shorter.
    pub top_n: usize,
    pub top_records: Vec<RankedRecord>,
}

impl AggregateStats {
    pub fn compute(records: &[PestSighting], top_n: usize) -> Self {
        let total_records = records.len();
        let total_count: u64 = records.iter().map(|r| u64::from(r.count)).sum();
        let average_density = if total_records == 0 {
            Decimal::ZERO
        } else {
            (Decimal::from(total_count) / Decimal::from(total_records as u64))
                .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
        };
        let max_single = records.iter().map(|r| r.count).max().unwrap_or(0);

        AggregateStats {
            total_records,
            total_count,
            average_density,
            max_single,
            by_pest_type: group_by(records, total_count, |r| &r.pest_type),
            by_building: group_by(records, total_count, |r| &r.building),
            top_n,
            top_records: top_records(records, top_n),
        }
    }
}

/// Group records by key, sorted by total count descending.
///
/// Groups with equal totals keep the order in which their key first appeared.
fn group_by<F>(records: &[PestSighting], grand_total: u64, key: F) -> Vec<GroupRow>
where
    F: Fn(&PestSighting) -> &String,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, usize, u64)> = Vec::new();

    for record in records {
        let k = key(record);
        let slot = *index.entry(k.as_str()).or_insert_with(|| {
            groups.push((k.clone(), 0, 0));
            groups.len() - 1
        });
        groups[slot].1 += 1;
        groups[slot].2 += u64::from(record.count);
    }

    let totals: Vec<u64> = groups.iter().map(|g| g.2).collect();
    let percentages = tenths_of_percent(&totals, grand_total);

    let mut rows: Vec<GroupRow> = groups
        .into_iter()
        .zip(percentages)
        .map(|((key, record_count, total_count), tenths)| GroupRow {
            key,
            record_count,
            total_count,
            percentage: Decimal::new(tenths as i64, 1),
        })
        .collect();

    rows.sort_by(|a, b| b.total_count.cmp(&a.total_count));
    rows
}

/// Percentages in tenths of a percent that always add up to exactly 100.0%.
///
/// Each share is floored to a tenth, then the leftover tenths go to the
/// shares with the largest remainders (earliest first on ties). Every value
/// stays within 0.1 of the exact share. A zero grand total yields zeros.
fn tenths_of_percent(totals: &[u64], grand_total: u64) -> Vec<u64> {
    if grand_total == 0 {
        return vec![0; totals.len()];
    }

    let grand = u128::from(grand_total);
    let mut tenths: Vec<u64> = Vec::with_capacity(totals.len());
    let mut remainders: Vec<(usize, u128)> = Vec::with_capacity(totals.len());

    for (i, &total) in totals.iter().enumerate() {
        let scaled = u128::from(total) * 1000;
        tenths.push((scaled / grand) as u64);
        remainders.push((i, scaled % grand));
    }

    let assigned: u64 = tenths.iter().sum();
    let leftover = 1000u64.saturating_sub(assigned) as usize;
    remainders.sort_by(|a, b| b.1.cmp(&a.1));
    for &(i, _) in remainders.iter().take(leftover) {
        tenths[i] += 1;
    }
    tenths
}

fn top_records(records: &[PestSighting], top_n: usize) -> Vec<RankedRecord> {
    let mut ordered: Vec<&PestSighting> = records.iter().collect();
    // Stable: equal counts stay in document order.
    ordered.sort_by(|a, b| b.count.cmp(&a.count));
    ordered
        .into_iter()
        .take(top_n)
        .enumerate()
        .map(|(i, record)| RankedRecord {
            rank: i + 1,
            record: record.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sighting(building: &str, pest_type: &str, count: u32) -> PestSighting {
        PestSighting {
            building: building.into(),
            floor: "1F".into(),
            department: "厨房".into(),
            monitoring_point: "角落".into(),
            pest_type: pest_type.into(),
            count,
        }
    }

    fn percent_sum(rows: &[GroupRow]) -> Decimal {
        rows.iter().map(|r| r.percentage).sum()
    }

    #[test]
    fn test_overview_numbers() {
        let records = vec![
            sighting("A栋", "蟑螂", 3),
            sighting("B栋", "老鼠", 1),
            sighting("A栋", "蟑螂", 4),
        ];
        let stats = AggregateStats::compute(&records, DEFAULT_TOP_N);
        assert_eq!(stats.total_records, 3);
        assert_eq!(stats.total_count, 8);
        assert_eq!(stats.average_density, dec!(2.7));
        assert_eq!(stats.max_single, 4);
    }

    #[test]
    fn test_density_rounds_half_up() {
        // 9 / 20 = 0.45
        let mut records = vec![sighting("A栋", "蟑螂", 0); 20];
        records[0].count = 9;
        let stats = AggregateStats::compute(&records, DEFAULT_TOP_N);
        assert_eq!(stats.average_density, dec!(0.5));

        // 5 / 4 = 1.25
        let records = vec![
            sighting("A栋", "蟑螂", 2),
            sighting("A栋", "蟑螂", 1),
            sighting("A栋", "蟑螂", 1),
            sighting("A栋", "蟑螂", 1),
        ];
        let stats = AggregateStats::compute(&records, DEFAULT_TOP_N);
        assert_eq!(stats.average_density, dec!(1.3));
    }

    #[test]
    fn test_empty_records() {
        let stats = AggregateStats::compute(&[], DEFAULT_TOP_N);
        assert_eq!(stats.total_records, 0);
        assert_eq!(stats.average_density, Decimal::ZERO);
        assert_eq!(stats.max_single, 0);
        assert!(stats.by_pest_type.is_empty());
        assert!(stats.top_records.is_empty());
    }

    #[test]
    fn test_grouping_sorted_by_total() {
        let records = vec![
            sighting("A栋", "蚂蚁", 1),
            sighting("A栋", "蟑螂", 3),
            sighting("B栋", "蟑螂", 4),
            sighting("B栋", "老鼠", 2),
        ];
        let stats = AggregateStats::compute(&records, DEFAULT_TOP_N);
        let keys: Vec<&str> = stats.by_pest_type.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["蟑螂", "老鼠", "蚂蚁"]);
        assert_eq!(stats.by_pest_type[0].record_count, 2);
        assert_eq!(stats.by_pest_type[0].total_count, 7);
        assert_eq!(stats.by_pest_type[0].percentage, dec!(70.0));
    }

    #[test]
    fn test_group_ties_keep_first_seen_order() {
        let records = vec![
            sighting("C栋", "蟑螂", 2),
            sighting("A栋", "蟑螂", 2),
            sighting("B栋", "蟑螂", 2),
        ];
        let stats = AggregateStats::compute(&records, DEFAULT_TOP_N);
        let keys: Vec<&str> = stats.by_building.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["C栋", "A栋", "B栋"]);
    }

    #[test]
    fn test_group_totals_agree() {
        let records: Vec<PestSighting> = (0..23)
            .map(|i| sighting(&format!("{}栋", i % 5), ["蟑螂", "老鼠", "苍蝇"][i % 3], i as u32))
            .collect();
        let stats = AggregateStats::compute(&records, DEFAULT_TOP_N);
        let by_type: u64 = stats.by_pest_type.iter().map(|g| g.total_count).sum();
        let by_building: u64 = stats.by_building.iter().map(|g| g.total_count).sum();
        assert_eq!(by_type, stats.total_count);
        assert_eq!(by_building, stats.total_count);
    }

    #[test]
    fn test_percentages_sum_to_hundred_with_many_groups() {
        // Eleven equal groups: naive rounding gives 9.1 * 11 = 100.1.
        let records: Vec<PestSighting> = (0..11)
            .map(|i| sighting(&format!("{i}号楼"), "蟑螂", 1))
            .collect();
        let stats = AggregateStats::compute(&records, DEFAULT_TOP_N);
        assert_eq!(percent_sum(&stats.by_building), dec!(100.0));
        for row in &stats.by_building {
            assert!(row.percentage == dec!(9.1) || row.percentage == dec!(9.0));
        }
    }

    #[test]
    fn test_thirds() {
        let shares = tenths_of_percent(&[1, 1, 1], 3);
        assert_eq!(shares.iter().sum::<u64>(), 1000);
        assert_eq!(shares, vec![334, 333, 333]);
    }

    #[test]
    fn test_zero_grand_total() {
        assert_eq!(tenths_of_percent(&[0, 0], 0), vec![0, 0]);
    }

    #[test]
    fn test_top_records_stable_and_ranked() {
        let mut counts = vec![50u32, 1, 2];
        counts.extend([5, 5, 9, 3, 3, 7, 5, 1, 2, 8, 4, 3]);
        let records: Vec<PestSighting> = counts
            .iter()
            .enumerate()
            .map(|(i, &c)| sighting(&format!("{i}"), "蟑螂", c))
            .collect();
        let stats = AggregateStats::compute(&records, DEFAULT_TOP_N);
        assert_eq!(stats.top_records.len(), 10);
        assert_eq!(stats.top_records[0].record.count, 50);
        let ranks: Vec<usize> = stats.top_records.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, (1..=10).collect::<Vec<_>>());
        // Equal counts in document order: the three 5s come from records 3, 4, 9.
        let fives: Vec<&str> = stats
            .top_records
            .iter()
            .filter(|r| r.record.count == 5)
            .map(|r| r.record.building.as_str())
            .collect();
        assert_eq!(fives, vec!["3", "4", "9"]);
        for pair in stats.top_records.windows(2) {
            assert!(pair[0].record.count >= pair[1].record.count);
        }
        let flagged = stats.top_records.iter().filter(|r| r.is_high_priority()).count();
        assert_eq!(flagged, 3);
    }

    #[test]
    fn test_top_records_shorter_than_n() {
        let records = vec![sighting("A栋", "蟑螂", 1), sighting("B栋", "老鼠", 2)];
        let stats = AggregateStats::compute(&records, DEFAULT_TOP_N);
        assert_eq!(stats.top_records.len(), 2);
        assert_eq!(stats.top_records[0].record.building, "B栋");
        assert_eq!(stats.top_records[1].rank, 2);
    }
}
