use crate::record::{ObservationRecord, RawTimestamp};
use chrono::NaiveDate;
use csv::Writer;
use log::info;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::Path;

#[derive(Serialize)]
struct ExportRow<'a> {
    id: String,
    common_name: &'a str,
    scientific_name: &'a str,
    location: &'a str,
    image_url: &'a str,
    created_at: String,
    observed_on: String,
}

impl<'a> From<&'a ObservationRecord> for ExportRow<'a> {
    fn from(record: &'a ObservationRecord) -> Self {
        Self {
            id: record.id.to_string(),
            common_name: &record.common_name,
            scientific_name: &record.scientific_name,
            location: &record.location,
            image_url: record.image_url.as_deref().unwrap_or_default(),
            created_at: record
                .created_at
                .as_ref()
                .map(RawTimestamp::raw)
                .unwrap_or_default(),
            observed_on: record.observed_on(),
        }
    }
}

/// Save records to a CSV file
pub fn save_to_csv(
    records: &[ObservationRecord],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = Writer::from_writer(file);

    for record in records {
        writer.serialize(ExportRow::from(record))?;
    }

    writer.flush()?;
    info!("Saved {} sightings to {}", records.len(), path.display());
    Ok(())
}

#[derive(Debug, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub unique_species: usize,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub top_locations: Vec<(String, usize)>,
}

pub fn summarize(records: &[ObservationRecord]) -> Summary {
    let unique_species: HashSet<&str> = records
        .iter()
        .map(|r| r.scientific_name.as_str())
        .filter(|name| !name.is_empty())
        .collect();

    let dates: Vec<NaiveDate> = records
        .iter()
        .filter_map(|r| r.created_at.as_ref().and_then(RawTimestamp::to_date))
        .collect();
    let date_range = dates
        .iter()
        .min()
        .zip(dates.iter().max())
        .map(|(min, max)| (*min, *max));

    let mut location_counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        if !record.location.is_empty() {
            *location_counts.entry(&record.location).or_insert(0) += 1;
        }
    }

    let mut sorted_locations: Vec<_> = location_counts.into_iter().collect();
    sorted_locations.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    Summary {
        total: records.len(),
        unique_species: unique_species.len(),
        date_range,
        top_locations: sorted_locations
            .into_iter()
            .take(3)
            .map(|(location, count)| (location.to_string(), count))
            .collect(),
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.total == 0 {
            return write!(f, "No sightings to summarize");
        }
        writeln!(f, "Summary:")?;
        writeln!(f, "Total sightings: {}", self.total)?;
        writeln!(f, "Unique species: {}", self.unique_species)?;
        if let Some((first, last)) = self.date_range {
            writeln!(f, "Date range: {} to {}", first, last)?;
        }
        write!(f, "Top locations:")?;
        for (location, count) in &self.top_locations {
            write!(f, "\n  {}: {}", location, count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordId;

    fn sighting(id: i64, scientific: &str, location: &str, created: &str) -> ObservationRecord {
        let mut record = ObservationRecord::new(RecordId::Int(id));
        record.scientific_name = scientific.to_string();
        record.location = location.to_string();
        record.created_at = Some(RawTimestamp::Text(created.to_string()));
        record
    }

    fn sample() -> Vec<ObservationRecord> {
        vec![
            sighting(1, "Alouatta seniculus", "Oro Negro", "2024-04-10"),
            sighting(2, "Rupornis magnirostris", "Centro de Armenia", "2024-03-15"),
            sighting(3, "Alouatta seniculus", "Oro Negro", "not-a-date"),
            sighting(4, "", "Parque de la Vida", "2023-12-18"),
            sighting(5, "Iguana iguana", "Barrio Galán", "2024-01-05"),
        ]
    }

    #[test]
    fn test_summarize() {
        let summary = summarize(&sample());
        assert_eq!(summary.total, 5);
        assert_eq!(summary.unique_species, 3);
        assert_eq!(
            summary.date_range,
            Some((
                NaiveDate::from_ymd_opt(2023, 12, 18).unwrap(),
                NaiveDate::from_ymd_opt(2024, 4, 10).unwrap()
            ))
        );
        assert_eq!(summary.top_locations.len(), 3);
        assert_eq!(summary.top_locations[0], ("Oro Negro".to_string(), 2));
        assert_eq!(summary.top_locations[1], ("Barrio Galán".to_string(), 1));
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.date_range, None);
        assert_eq!(summary.to_string(), "No sightings to summarize");
    }

    #[test]
    fn test_save_to_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sightings.csv");
        let mut records = sample();
        records[0].image_url = Some("https://img.example/mono.jpg".into());
        records[1].id = RecordId::Text("obs-2".into());

        save_to_csv(&records, &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec![
                "id",
                "common_name",
                "scientific_name",
                "location",
                "image_url",
                "created_at",
                "observed_on"
            ]
        );
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 5);
        assert_eq!(&rows[0][0], "1");
        assert_eq!(&rows[0][4], "https://img.example/mono.jpg");
        assert_eq!(&rows[0][6], "10 April 2024");
        assert_eq!(&rows[1][0], "obs-2");
        assert_eq!(&rows[2][5], "not-a-date");
        assert_eq!(&rows[2][6], "Invalid date");
    }
}
