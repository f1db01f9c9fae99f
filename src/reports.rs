//! Aggregations behind every number on the dashboard.
//!
//! All functions are pure over the rows they are given; grouped outputs keep
//! the first-occurrence order of their keys unless a sort is documented.

use crate::error::CorrelationError;
use crate::types::{
    metric_index, CorrelationMatrix, Dataset, DistrictFilter, GroupTotal, MetricKind,
    PermitRecord, SlaCompliance, SlaPair, Summary,
};
use std::collections::{HashMap, HashSet};

pub fn summarize(data: &[PermitRecord]) -> Summary {
    let districts: HashSet<&str> = data.iter().map(|r| r.district_name.as_str()).collect();
    let mandals: HashSet<&str> = data.iter().map(|r| r.mandal_name.as_str()).collect();
    let mut summary = Summary {
        total_districts: districts.len(),
        total_mandals: mandals.len(),
        ..Summary::default()
    };
    for r in data {
        summary.total_applications += u128::from(r.total_received);
        summary.approved_within_sla += u128::from(r.approve_within_sla);
        summary.approved_beyond_sla += u128::from(r.approve_beyond_sla);
        summary.rejected_within_sla += u128::from(r.reject_within_sla);
        summary.rejected_beyond_sla += u128::from(r.reject_beyond_sla);
    }
    summary
}

/// Total applications per district, smallest first.
pub fn by_district(data: &[PermitRecord]) -> Vec<GroupTotal> {
    let mut rows = group_sums(data, |r| &r.district_name, |r| r.total_received);
    // `sort_by` is stable, so equal sums keep first-occurrence order.
    rows.sort_by(|a, b| a.total.cmp(&b.total));
    rows
}

/// Total applications per mandal, largest first.
pub fn by_mandal(data: &[PermitRecord]) -> Vec<GroupTotal> {
    let mut rows = group_sums(data, |r| &r.mandal_name, |r| r.total_received);
    rows.sort_by(|a, b| b.total.cmp(&a.total));
    rows
}

pub fn sla_by_mandal(data: &[PermitRecord]) -> Vec<SlaPair> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<SlaPair> = Vec::new();
    for r in data {
        let i = *index.entry(r.mandal_name.as_str()).or_insert_with(|| {
            rows.push(SlaPair {
                mandal: r.mandal_name.clone(),
                within: 0,
                beyond: 0,
            });
            rows.len() - 1
        });
        rows[i].within += u128::from(r.approve_within_sla);
        rows[i].beyond += u128::from(r.approve_beyond_sla);
    }
    rows
}

/// Per-mandal sum of one metric column, first-occurrence order.
pub fn metric_by_mandal(data: &[PermitRecord], metric: MetricKind) -> Vec<GroupTotal> {
    group_sums(data, |r| &r.mandal_name, |r| metric.value(r))
}

/// Rows of one district (exact name match), or a copy of everything for `All`.
pub fn filter_by_district(data: &[PermitRecord], filter: &DistrictFilter) -> Dataset {
    match filter {
        DistrictFilter::All => data.to_vec(),
        DistrictFilter::District(name) => data
            .iter()
            .filter(|r| &r.district_name == name)
            .cloned()
            .collect(),
    }
}

/// Distinct district names in first-occurrence order.
pub fn districts(data: &[PermitRecord]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    data.iter()
        .filter(|r| seen.insert(r.district_name.as_str()))
        .map(|r| r.district_name.clone())
        .collect()
}

pub fn sla_compliance(summary: &Summary) -> SlaCompliance {
    let within = summary.approved_within_sla;
    let beyond = summary.approved_beyond_sla;
    let total = within as f64 + beyond as f64;
    let share = |v: u128| {
        if total > 0.0 {
            Some(v as f64 / total * 100.0)
        } else {
            None
        }
    };
    SlaCompliance {
        within,
        beyond,
        within_pct: share(within),
        beyond_pct: share(beyond),
    }
}

/// Pearson correlation between total received, within-SLA and beyond-SLA
/// approvals.
pub fn correlation_matrix(data: &[PermitRecord]) -> Result<CorrelationMatrix, CorrelationError> {
    if data.len() < 2 {
        return Err(CorrelationError::InsufficientData { rows: data.len() });
    }

    let columns: Vec<Vec<u64>> = MetricKind::ALL
        .iter()
        .map(|m| data.iter().map(|r| m.value(r)).collect())
        .collect();
    for (metric, col) in MetricKind::ALL.iter().zip(&columns) {
        // Integer check, so float noise cannot hide a constant column.
        if col.iter().all(|v| *v == col[0]) {
            return Err(CorrelationError::DegenerateInput {
                column: metric.column(),
            });
        }
    }

    let centered: Vec<Vec<f64>> = columns.iter().map(|c| center(c)).collect();
    // Distinct integers above 2^53 can collapse to one f64 value.
    for (metric, col) in MetricKind::ALL.iter().zip(&centered) {
        let ss: f64 = col.iter().map(|d| d * d).sum();
        if !(ss > 0.0 && ss.is_finite()) {
            return Err(CorrelationError::DegenerateInput {
                column: metric.column(),
            });
        }
    }
    let mut values = [[0.0f64; 3]; 3];
    for a in MetricKind::ALL {
        let i = metric_index(a);
        values[i][i] = 1.0;
        for b in MetricKind::ALL {
            let j = metric_index(b);
            if j <= i {
                continue;
            }
            let r = pearson(&centered[i], &centered[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        columns: [
            MetricKind::TotalApplications.column(),
            MetricKind::WithinSla.column(),
            MetricKind::BeyondSla.column(),
        ],
        values,
    })
}

pub fn explorer_title(metric: MetricKind, filter: &DistrictFilter) -> String {
    match filter {
        DistrictFilter::All => format!("{} by Mandal", metric.label()),
        DistrictFilter::District(name) => format!("{} by Mandal in {}", metric.label(), name),
    }
}

fn group_sums<K, V>(data: &[PermitRecord], key: K, value: V) -> Vec<GroupTotal>
where
    K: Fn(&PermitRecord) -> &String,
    V: Fn(&PermitRecord) -> u64,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<GroupTotal> = Vec::new();
    for r in data {
        let k = key(r);
        let i = *index.entry(k.as_str()).or_insert_with(|| {
            rows.push(GroupTotal::new(k.clone(), 0));
            rows.len() - 1
        });
        rows[i].total += u128::from(value(r));
    }
    rows
}

fn center(col: &[u64]) -> Vec<f64> {
    let mean = col.iter().map(|v| *v as f64).sum::<f64>() / col.len() as f64;
    col.iter().map(|v| *v as f64 - mean).collect()
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        sxy += a * b;
        sxx += a * a;
        syy += b * b;
    }
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(d: &str, m: &str, received: u64, within: u64, beyond: u64) -> PermitRecord {
        PermitRecord {
            district_name: d.to_string(),
            mandal_name: m.to_string(),
            total_received: received,
            approve_within_sla: within,
            approve_beyond_sla: beyond,
            reject_within_sla: 0,
            reject_beyond_sla: 0,
        }
    }

    fn scenario() -> Dataset {
        vec![rec("A", "X", 10, 7, 3), rec("A", "Y", 5, 5, 0)]
    }

    #[test]
    fn summarize_counts_and_sums() {
        let mut data = scenario();
        data[1].reject_within_sla = 2;
        data[0].reject_beyond_sla = 4;
        let s = summarize(&data);
        assert_eq!(s.total_applications, 15);
        assert_eq!(s.total_districts, 1);
        assert_eq!(s.total_mandals, 2);
        assert_eq!(s.approved_within_sla, 12);
        assert_eq!(s.approved_beyond_sla, 3);
        assert_eq!(s.rejected_within_sla, 2);
        assert_eq!(s.rejected_beyond_sla, 4);
    }

    #[test]
    fn summarize_empty_is_all_zero() {
        assert_eq!(summarize(&[]), Summary::default());
    }

    #[test]
    fn duplicate_pairs_are_summed_not_deduplicated() {
        let data = vec![rec("A", "X", 4, 1, 1), rec("A", "X", 6, 2, 2)];
        assert_eq!(by_mandal(&data), vec![GroupTotal::new("X", 10)]);
        assert_eq!(summarize(&data).total_mandals, 1);
    }

    #[test]
    fn by_mandal_is_descending() {
        assert_eq!(
            by_mandal(&scenario()),
            vec![GroupTotal::new("X", 10), GroupTotal::new("Y", 5)]
        );
    }

    #[test]
    fn by_district_is_ascending_with_stable_ties() {
        let data = vec![
            rec("C", "m1", 9, 0, 0),
            rec("B", "m2", 3, 0, 0),
            rec("A", "m3", 3, 0, 0),
            rec("C", "m4", 1, 0, 0),
        ];
        assert_eq!(
            by_district(&data),
            vec![
                GroupTotal::new("B", 3),
                GroupTotal::new("A", 3),
                GroupTotal::new("C", 10),
            ]
        );
    }

    #[test]
    fn by_mandal_ties_keep_first_occurrence() {
        let data = vec![rec("A", "Q", 2, 0, 0), rec("A", "P", 2, 0, 0)];
        let keys: Vec<String> = by_mandal(&data).into_iter().map(|g| g.key).collect();
        assert_eq!(keys, vec!["Q", "P"]);
    }

    #[test]
    fn sla_pairs_follow_first_occurrence() {
        let data = vec![
            rec("A", "Y", 1, 1, 0),
            rec("B", "X", 1, 2, 5),
            rec("A", "Y", 1, 3, 1),
        ];
        let pairs = sla_by_mandal(&data);
        assert_eq!(pairs.len(), 2);
        assert_eq!((pairs[0].mandal.as_str(), pairs[0].within, pairs[0].beyond), ("Y", 4, 1));
        assert_eq!((pairs[1].mandal.as_str(), pairs[1].within, pairs[1].beyond), ("X", 2, 5));
    }

    #[test]
    fn filter_all_returns_everything_in_order() {
        let data = vec![rec("B", "X", 1, 0, 0), rec("A", "Y", 2, 0, 0)];
        assert_eq!(filter_by_district(&data, &DistrictFilter::All), data);
    }

    #[test]
    fn filter_is_exact_match() {
        let data = vec![
            rec("A", "X", 1, 0, 0),
            rec("a", "Y", 2, 0, 0),
            rec("A ", "Z", 3, 0, 0),
            rec("A", "W", 4, 0, 0),
        ];
        let only_a = filter_by_district(&data, &DistrictFilter::District("A".into()));
        let mandals: Vec<&str> = only_a.iter().map(|r| r.mandal_name.as_str()).collect();
        assert_eq!(mandals, vec!["X", "W"]);
        assert!(filter_by_district(&data, &DistrictFilter::District("Nowhere".into())).is_empty());
    }

    #[test]
    fn metric_by_mandal_on_filtered_rows() {
        let mut data = scenario();
        data.push(rec("B", "X", 100, 100, 0));
        let filtered = filter_by_district(&data, &DistrictFilter::District("A".into()));
        assert_eq!(
            metric_by_mandal(&filtered, MetricKind::WithinSla),
            vec![GroupTotal::new("X", 7), GroupTotal::new("Y", 5)]
        );
        assert_eq!(
            metric_by_mandal(&data, MetricKind::BeyondSla),
            vec![GroupTotal::new("X", 3), GroupTotal::new("Y", 0)]
        );
    }

    #[test]
    fn districts_are_distinct_in_first_occurrence_order() {
        let data = vec![
            rec("B", "X", 1, 0, 0),
            rec("A", "Y", 1, 0, 0),
            rec("B", "Z", 1, 0, 0),
        ];
        assert_eq!(districts(&data), vec!["B", "A"]);
    }

    #[test]
    fn compliance_shares() {
        let c = sla_compliance(&summarize(&scenario()));
        assert_eq!((c.within, c.beyond), (12, 3));
        assert!((c.within_pct.unwrap() - 80.0).abs() < 1e-9);
        assert!((c.beyond_pct.unwrap() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn compliance_without_approvals_has_no_shares() {
        let c = sla_compliance(&Summary::default());
        assert_eq!(c.within_pct, None);
        assert_eq!(c.beyond_pct, None);
    }

    #[test]
    fn correlation_needs_two_rows() {
        assert_eq!(
            correlation_matrix(&[]),
            Err(CorrelationError::InsufficientData { rows: 0 })
        );
        assert_eq!(
            correlation_matrix(&[rec("A", "X", 1, 1, 1)]),
            Err(CorrelationError::InsufficientData { rows: 1 })
        );
    }

    #[test]
    fn correlation_rejects_constant_column() {
        let data = vec![rec("A", "X", 1, 4, 0), rec("A", "Y", 2, 5, 0)];
        assert_eq!(
            correlation_matrix(&data),
            Err(CorrelationError::DegenerateInput {
                column: MetricKind::BeyondSla.column()
            })
        );
    }

    #[test]
    fn correlation_rejects_column_that_collapses_in_f64() {
        let big = 1u64 << 60;
        let data = vec![rec("A", "X", big, 1, 5), rec("A", "Y", big + 1, 2, 3)];
        assert_eq!(
            correlation_matrix(&data),
            Err(CorrelationError::DegenerateInput {
                column: MetricKind::TotalApplications.column()
            })
        );
    }

    #[test]
    fn sums_near_u64_max_stay_exact() {
        let data = vec![
            rec("A", "X", u64::MAX, u64::MAX, 1),
            rec("A", "X", u64::MAX, 2, u64::MAX),
        ];
        let s = summarize(&data);
        assert_eq!(s.total_applications, 2 * u128::from(u64::MAX));
        assert_eq!(s.approved_within_sla, u128::from(u64::MAX) + 2);
        assert_eq!(by_mandal(&data), vec![GroupTotal::new("X", 2 * u128::from(u64::MAX))]);
        let pairs = sla_by_mandal(&data);
        assert_eq!(pairs[0].beyond, u128::from(u64::MAX) + 1);
    }

    #[test]
    fn correlation_of_linear_columns() {
        let data = vec![
            rec("A", "X", 1, 2, 9),
            rec("A", "Y", 2, 4, 6),
            rec("B", "Z", 3, 6, 3),
        ];
        let m = correlation_matrix(&data).unwrap();
        for k in MetricKind::ALL {
            assert_eq!(m.get(k, k), 1.0);
        }
        let up = m.get(MetricKind::TotalApplications, MetricKind::WithinSla);
        let down = m.get(MetricKind::TotalApplications, MetricKind::BeyondSla);
        assert!((up - 1.0).abs() < 1e-12);
        assert!((down + 1.0).abs() < 1e-12);
        assert_eq!(
            m.get(MetricKind::WithinSla, MetricKind::BeyondSla),
            m.get(MetricKind::BeyondSla, MetricKind::WithinSla)
        );
    }

    #[test]
    fn correlation_matches_hand_computed_value() {
        // x = [1,2,3,4], y = [2,1,4,3]: r = 3 / 5 = 0.6
        let data = vec![
            rec("A", "a", 1, 2, 1),
            rec("A", "b", 2, 1, 2),
            rec("A", "c", 3, 4, 1),
            rec("A", "d", 4, 3, 2),
        ];
        let m = correlation_matrix(&data).unwrap();
        let r = m.get(MetricKind::TotalApplications, MetricKind::WithinSla);
        assert!((r - 0.6).abs() < 1e-12, "{r}");
    }

    #[test]
    fn explorer_titles() {
        assert_eq!(
            explorer_title(MetricKind::WithinSla, &DistrictFilter::All),
            "Within SLA by Mandal"
        );
        assert_eq!(
            explorer_title(
                MetricKind::TotalApplications,
                &DistrictFilter::District("Hyderabad".into())
            ),
            "Total Applications by Mandal in Hyderabad"
        );
    }
}
