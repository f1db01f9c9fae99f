use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tabled::Tabled;

pub const COL_DISTRICT: &str = "district_Name";
pub const COL_MANDAL: &str = "mandal_Name";
pub const COL_RECEIVED: &str = "total_No_of_Application_Received";
pub const COL_APPROVE_WITHIN: &str = "no_of_Application_Approve_with_in_BSLA";
pub const COL_APPROVE_BEYOND: &str = "no_of_Application_Approve_Beyond_BSLA";
pub const COL_REJECT_WITHIN: &str = "no_of_Application_Reject_With_in_BSLA";
pub const COL_REJECT_BEYOND: &str = "no_of_Application_Reject_Beyond_BSLA";

/// Every column a source file must carry, in the order they are validated.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    COL_DISTRICT,
    COL_MANDAL,
    COL_RECEIVED,
    COL_APPROVE_WITHIN,
    COL_APPROVE_BEYOND,
    COL_REJECT_WITHIN,
    COL_REJECT_BEYOND,
];

/// One CSV row as it comes off the reader. Cells stay optional so an
/// empty cell is reported instead of silently defaulted.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "district_Name")]
    pub district_name: Option<String>,
    #[serde(rename = "mandal_Name")]
    pub mandal_name: Option<String>,
    #[serde(rename = "total_No_of_Application_Received")]
    pub total_received: Option<String>,
    #[serde(rename = "no_of_Application_Approve_with_in_BSLA")]
    pub approve_within_sla: Option<String>,
    #[serde(rename = "no_of_Application_Approve_Beyond_BSLA")]
    pub approve_beyond_sla: Option<String>,
    #[serde(rename = "no_of_Application_Reject_With_in_BSLA")]
    pub reject_within_sla: Option<String>,
    #[serde(rename = "no_of_Application_Reject_Beyond_BSLA")]
    pub reject_beyond_sla: Option<String>,
}

/// A validated building-permission row for one district/mandal/period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermitRecord {
    pub district_name: String,
    pub mandal_name: String,
    pub total_received: u64,
    pub approve_within_sla: u64,
    pub approve_beyond_sla: u64,
    pub reject_within_sla: u64,
    pub reject_beyond_sla: u64,
}

/// Rows in file order. Duplicate district/mandal pairs are legal.
pub type Dataset = Vec<PermitRecord>;

/// Scalar totals across a whole dataset. Sums are `u128` so adding any
/// number of `u64` cells stays exact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_districts: usize,
    pub total_mandals: usize,
    pub total_applications: u128,
    pub approved_within_sla: u128,
    pub approved_beyond_sla: u128,
    pub rejected_within_sla: u128,
    pub rejected_beyond_sla: u128,
}

/// Within/beyond approval split, as shown on the compliance pie.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlaCompliance {
    pub within: u128,
    pub beyond: u128,
    /// `None` when there are no approvals at all.
    pub within_pct: Option<f64>,
    pub beyond_pct: Option<f64>,
}

/// Group key with its summed count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupTotal {
    pub key: String,
    pub total: u128,
}

impl GroupTotal {
    pub fn new(key: impl Into<String>, total: u128) -> Self {
        Self {
            key: key.into(),
            total,
        }
    }
}

/// Per-mandal approval sums, within and beyond the SLA window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct SlaPair {
    #[serde(rename = "Mandal")]
    #[tabled(rename = "Mandal")]
    pub mandal: String,
    #[serde(rename = "WithinSLA")]
    #[tabled(rename = "WithinSLA")]
    pub within: u128,
    #[serde(rename = "BeyondSLA")]
    #[tabled(rename = "BeyondSLA")]
    pub beyond: u128,
}

/// Column selectable in the explorer and used by the correlation matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    TotalApplications,
    WithinSla,
    BeyondSla,
}

impl MetricKind {
    pub const ALL: [MetricKind; 3] = [
        MetricKind::TotalApplications,
        MetricKind::WithinSla,
        MetricKind::BeyondSla,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MetricKind::TotalApplications => "Total Applications",
            MetricKind::WithinSla => "Within SLA",
            MetricKind::BeyondSla => "Beyond SLA",
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            MetricKind::TotalApplications => COL_RECEIVED,
            MetricKind::WithinSla => COL_APPROVE_WITHIN,
            MetricKind::BeyondSla => COL_APPROVE_BEYOND,
        }
    }

    pub fn value(self, record: &PermitRecord) -> u64 {
        match self {
            MetricKind::TotalApplications => record.total_received,
            MetricKind::WithinSla => record.approve_within_sla,
            MetricKind::BeyondSla => record.approve_beyond_sla,
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MetricKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        MetricKind::ALL
            .into_iter()
            .find(|m| m.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown metric '{}'", wanted))
    }
}

/// District selection for the explorer; `All` leaves the dataset unfiltered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DistrictFilter {
    All,
    District(String),
}

impl DistrictFilter {
    pub const ALL_LABEL: &'static str = "All";
}

impl fmt::Display for DistrictFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistrictFilter::All => f.write_str(Self::ALL_LABEL),
            DistrictFilter::District(name) => f.write_str(name),
        }
    }
}

/// Symmetric Pearson matrix over `MetricKind::ALL`, in that order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: [&'static str; 3],
    pub values: [[f64; 3]; 3],
}

impl CorrelationMatrix {
    pub fn get(&self, a: MetricKind, b: MetricKind) -> f64 {
        self.values[metric_index(a)][metric_index(b)]
    }
}

pub(crate) fn metric_index(metric: MetricKind) -> usize {
    match metric {
        MetricKind::TotalApplications => 0,
        MetricKind::WithinSla => 1,
        MetricKind::BeyondSla => 2,
    }
}

#[derive(Debug, Tabled, Clone)]
pub struct DistrictRow {
    #[tabled(rename = "District")]
    pub district: String,
    #[tabled(rename = "TotalApplications")]
    pub total_applications: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct MandalRow {
    #[tabled(rename = "Mandal")]
    pub mandal: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct MetricRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}
