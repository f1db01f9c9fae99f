use crate::error::OutputError;
use crate::types::{
    CorrelationMatrix, DistrictRow, GroupTotal, MandalRow, MetricKind, MetricRow, SlaCompliance,
    SlaPair, Summary,
};
use crate::util::{format_int, format_number, format_pct};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{builder::Builder, settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), OutputError> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), OutputError> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Markdown table of at most `max_rows` rows, or a placeholder when empty.
pub fn render_table<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    let mut out = Table::new(slice).with(Style::markdown()).to_string();
    if rows.len() > max_rows {
        out.push_str(&format!(
            "\n({} more rows not shown)",
            format_int(rows.len() - max_rows)
        ));
    }
    out
}

pub fn summary_rows(summary: &Summary) -> Vec<MetricRow> {
    let row = |metric: &str, value: String| MetricRow {
        metric: metric.to_string(),
        value,
    };
    vec![
        row("Total Districts", format_int(summary.total_districts)),
        row("Total Mandals", format_int(summary.total_mandals)),
        row("Total Applications", format_int(summary.total_applications)),
        row("Applications Within SLA", format_int(summary.approved_within_sla)),
        row("Applications Beyond SLA", format_int(summary.approved_beyond_sla)),
        row("Applications Rejected Within SLA", format_int(summary.rejected_within_sla)),
        row("Applications Rejected Beyond SLA", format_int(summary.rejected_beyond_sla)),
    ]
}

pub fn compliance_rows(c: &SlaCompliance) -> Vec<MetricRow> {
    vec![
        MetricRow {
            metric: "Within SLA".to_string(),
            value: format!("{} ({})", format_int(c.within), format_pct(c.within_pct)),
        },
        MetricRow {
            metric: "Beyond SLA".to_string(),
            value: format!("{} ({})", format_int(c.beyond), format_pct(c.beyond_pct)),
        },
    ]
}

pub fn district_rows(groups: &[GroupTotal]) -> Vec<DistrictRow> {
    groups
        .iter()
        .map(|g| DistrictRow {
            district: g.key.clone(),
            total_applications: format_int(g.total),
        })
        .collect()
}

pub fn mandal_rows(groups: &[GroupTotal]) -> Vec<MandalRow> {
    groups
        .iter()
        .map(|g| MandalRow {
            mandal: g.key.clone(),
            value: format_int(g.total),
        })
        .collect()
}

/// Square table with metric labels on both axes.
pub fn render_correlation(matrix: &CorrelationMatrix) -> String {
    let mut builder = Builder::default();
    let mut header = vec![String::new()];
    header.extend(MetricKind::ALL.iter().map(|m| m.label().to_string()));
    builder.push_record(header);
    for a in MetricKind::ALL {
        let mut record = vec![a.label().to_string()];
        record.extend(
            MetricKind::ALL
                .iter()
                .map(|b| format_number(matrix.get(a, *b), 3)),
        );
        builder.push_record(record);
    }
    builder.build().with(Style::markdown()).to_string()
}

/// Files written by [`export_reports`].
#[derive(Debug)]
pub struct ExportedFiles {
    pub districts: PathBuf,
    pub mandals: PathBuf,
    pub sla_by_mandal: PathBuf,
    pub summary: PathBuf,
}

/// Write the grouped reports as CSV and the scalar summary as JSON.
pub fn export_reports(
    dir: &Path,
    summary: &Summary,
    districts: &[GroupTotal],
    mandals: &[GroupTotal],
    sla: &[SlaPair],
) -> Result<ExportedFiles, OutputError> {
    std::fs::create_dir_all(dir)?;
    let files = ExportedFiles {
        districts: dir.join("applications_by_district.csv"),
        mandals: dir.join("applications_by_mandal.csv"),
        sla_by_mandal: dir.join("sla_by_mandal.csv"),
        summary: dir.join("summary.json"),
    };
    write_csv(&files.districts, &district_export(districts))?;
    write_csv(&files.mandals, &mandal_export(mandals))?;
    write_csv(&files.sla_by_mandal, sla)?;
    write_json(&files.summary, summary)?;
    Ok(files)
}

// Exported counts stay unformatted so the CSV is machine-readable.
#[derive(Serialize)]
struct DistrictExport<'a> {
    #[serde(rename = "District")]
    district: &'a str,
    #[serde(rename = "TotalApplications")]
    total_applications: u128,
}

#[derive(Serialize)]
struct MandalExport<'a> {
    #[serde(rename = "Mandal")]
    mandal: &'a str,
    #[serde(rename = "TotalApplications")]
    total_applications: u128,
}

fn district_export(groups: &[GroupTotal]) -> Vec<DistrictExport<'_>> {
    groups
        .iter()
        .map(|g| DistrictExport {
            district: &g.key,
            total_applications: g.total,
        })
        .collect()
}

fn mandal_export(groups: &[GroupTotal]) -> Vec<MandalExport<'_>> {
    groups
        .iter()
        .map(|g| MandalExport {
            mandal: &g.key,
            total_applications: g.total,
        })
        .collect()
}
