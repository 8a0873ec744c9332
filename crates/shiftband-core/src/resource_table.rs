use anyhow::{Context, anyhow};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkCenterCapacity {
    pub work_center: String,
    pub no_of_tech: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePeriod {
    pub period: String,
    #[serde(default)]
    pub work_centers: Vec<WorkCenterCapacity>,
}

/// One grid row: `id`, `period`, then one cell per work center in
/// first-seen order. Serializes as a flat JSON object.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRow {
    pub id: String,
    pub period: String,
    pub cells: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    pub accessor_key: String,
    pub header: String,
}

impl ResourceRow {
    pub fn cell(&self, work_center: &str) -> Option<f64> {
        self.cells
            .iter()
            .find(|(name, _)| name == work_center)
            .map(|(_, value)| *value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        ["id", "period"]
            .into_iter()
            .chain(self.cells.iter().map(|(name, _)| name.as_str()))
    }
}

impl Serialize for ResourceRow {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.cells.len() + 2))?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("period", &self.period)?;
        for (name, value) in &self.cells {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

pub fn parse_resource_periods(raw: &str) -> anyhow::Result<Vec<ResourcePeriod>> {
    serde_json::from_str(raw).context("failed to parse resource periods JSON")
}

pub fn work_centers(periods: &[ResourcePeriod]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for center in periods.iter().flat_map(|period| &period.work_centers) {
        if !seen.contains(&center.work_center) {
            seen.push(center.work_center.clone());
        }
    }
    seen
}

#[tracing::instrument(skip_all, fields(periods = periods.len()))]
pub fn to_resource_rows(periods: &[ResourcePeriod]) -> Vec<ResourceRow> {
    let centers = work_centers(periods);
    debug!(work_centers = centers.len(), "collected work centers");

    periods
        .iter()
        .enumerate()
        .map(|(index, entry)| ResourceRow {
            id: format!("row-{index}"),
            period: entry.period.clone(),
            cells: centers
                .iter()
                .map(|center| {
                    let count = entry
                        .work_centers
                        .iter()
                        .find(|wc| &wc.work_center == center)
                        .map(|wc| wc.no_of_tech)
                        .unwrap_or(0.0);
                    (center.clone(), count)
                })
                .collect(),
        })
        .collect()
}

pub fn columns_for(rows: &[ResourceRow]) -> anyhow::Result<Vec<ColumnDef>> {
    let first = rows.first().ok_or_else(|| anyhow!("no resource rows provided"))?;

    Ok(first
        .keys()
        .filter(|key| *key != "id")
        .map(|key| ColumnDef {
            accessor_key: key.to_string(),
            header: if key == "period" {
                "Period".to_string()
            } else {
                key.to_string()
            },
        })
        .collect())
}
