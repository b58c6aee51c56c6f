use crate::record::{ObservationRecord, RawTimestamp, RecordId};
use log::{debug, warn};
use serde_json::Value;

/// One step into a JSON value: an object key or an array index.
#[derive(Clone, Copy)]
enum Step {
    Key(&'static str),
    Index(usize),
}

use Step::{Index, Key};

// Ordered accessor fallbacks per logical field. The agent has shipped both
// camelCase and snake_case payloads; the first path holding a non-empty
// string wins.
const COMMON_NAME: &[&[Step]] = &[
    &[Key("species"), Key("commonName")],
    &[Key("species"), Key("common_name")],
    &[Key("commonName")],
    &[Key("common_name")],
];
const SCIENTIFIC_NAME: &[&[Step]] = &[
    &[Key("species"), Key("scientificName")],
    &[Key("species"), Key("scientific_name")],
    &[Key("scientificName")],
    &[Key("scientific_name")],
];
const LOCATION: &[&[Step]] = &[&[Key("location"), Key("location")], &[Key("location")]];
const IMAGE_URL: &[&[Step]] = &[
    &[Key("images"), Index(0), Key("imageUrl")],
    &[Key("images"), Index(0), Key("image_url")],
    &[Key("images"), Index(0)],
    &[Key("imageUrl")],
    &[Key("image_url")],
];
const CREATED_AT: &[&[Step]] = &[&[Key("createdAt")], &[Key("created_at")]];

fn lookup<'a>(value: &'a Value, path: &[Step]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, step| match step {
        Key(key) => current.get(*key),
        Index(index) => current.get(*index),
    })
}

fn first_text(value: &Value, paths: &[&[Step]]) -> Option<String> {
    paths
        .iter()
        .filter_map(|path| lookup(value, path).and_then(Value::as_str))
        .find(|text| !text.is_empty())
        .map(str::to_string)
}

fn extract_id(value: &Value) -> Option<RecordId> {
    match value.get("id")? {
        Value::Number(number) => {
            if let Some(id) = number.as_i64() {
                Some(RecordId::Int(id))
            } else if let Some(id) = number.as_u64() {
                Some(RecordId::UInt(id))
            } else {
                // Integral floats only when they convert to i64 exactly.
                number
                    .as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                    .map(|f| RecordId::Int(f as i64))
            }
        }
        Value::String(id) if !id.trim().is_empty() => Some(RecordId::Text(id.clone())),
        _ => None,
    }
}

fn extract_timestamp(value: &Value) -> Option<RawTimestamp> {
    CREATED_AT
        .iter()
        .filter_map(|path| lookup(value, path))
        .find_map(|raw| match raw {
            Value::String(text) => Some(RawTimestamp::Text(text.clone())),
            Value::Number(number) => number
                .as_i64()
                .or_else(|| number.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
                .map(RawTimestamp::EpochMillis),
            _ => None,
        })
}

fn normalize_one(value: &Value) -> Option<ObservationRecord> {
    let id = extract_id(value)?;
    let mut record = ObservationRecord::new(id);
    record.common_name = first_text(value, COMMON_NAME).unwrap_or_default();
    record.scientific_name = first_text(value, SCIENTIFIC_NAME).unwrap_or_default();
    record.location = first_text(value, LOCATION).unwrap_or_default();
    record.image_url = first_text(value, IMAGE_URL);
    record.created_at = extract_timestamp(value);
    Some(record)
}

/// Reshape the agent's raw result list into observation records.
///
/// Entries without a usable `id` are dropped; missing secondary fields fall
/// back to empty strings. Input order is preserved and a non-array input
/// yields no records.
pub fn normalize(raw: &Value) -> Vec<ObservationRecord> {
    let Some(entries) = raw.as_array() else {
        if !raw.is_null() {
            warn!("Agent result is not a list, ignoring it");
        }
        return Vec::new();
    };

    let records: Vec<ObservationRecord> = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let record = normalize_one(entry);
            if record.is_none() {
                debug!("Dropping result entry {} without a usable id: {}", index, entry);
            }
            record
        })
        .collect();

    let dropped = entries.len() - records.len();
    if dropped > 0 {
        warn!("Dropped {} of {} result entries", dropped, entries.len());
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_drops_entry_without_id() {
        let raw = json!([
            { "species": { "commonName": "Armadillo" } },
            {
                "id": 5,
                "species": { "commonName": "Armadillo", "scientificName": "Dasypus novemcinctus" },
                "location": { "location": "Zona rural" },
                "images": [{ "imageUrl": "https://img.example/armadillo.jpg" }],
                "createdAt": "2023-12-18T09:00:00Z"
            }
        ]);
        let records = normalize(&raw);
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.id, RecordId::Int(5));
        assert_eq!(record.common_name, "Armadillo");
        assert_eq!(record.scientific_name, "Dasypus novemcinctus");
        assert_eq!(record.location, "Zona rural");
        assert_eq!(
            record.image_url.as_deref(),
            Some("https://img.example/armadillo.jpg")
        );
        assert_eq!(
            record.created_at,
            Some(RawTimestamp::Text("2023-12-18T09:00:00Z".into()))
        );
    }

    #[test]
    fn test_non_array_inputs_yield_nothing() {
        assert!(normalize(&Value::Null).is_empty());
        assert!(normalize(&json!({ "id": 1 })).is_empty());
        assert!(normalize(&json!("oops")).is_empty());
        assert!(normalize(&json!(42)).is_empty());
    }

    #[test]
    fn test_snake_case_with_fallbacks() {
        let raw = json!([{
            "id": 7,
            "species": { "common_name": "Ardilla" },
            "location": { "location": "" },
            "created_at": "not-a-date"
        }]);
        let records = normalize(&raw);
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.id, RecordId::Int(7));
        assert_eq!(record.common_name, "Ardilla");
        assert_eq!(record.scientific_name, "");
        assert_eq!(record.location, "");
        assert_eq!(record.image_url, None);
        assert_eq!(record.created_at, Some(RawTimestamp::Text("not-a-date".into())));
        assert_eq!(record.observed_on(), crate::record::INVALID_DATE);
    }

    #[test]
    fn test_flat_fields_and_string_ids() {
        let raw = json!([{
            "id": "obs-12",
            "commonName": "Colibrí esmeralda",
            "scientific_name": "Amazilia saucerottei",
            "location": "Parque de la Vida",
            "images": [{ "image_url": "a.png" }, { "image_url": "b.png" }],
            "createdAt": 1712707200000i64
        }]);
        let record = &normalize(&raw)[0];
        assert_eq!(record.id, RecordId::Text("obs-12".into()));
        assert_eq!(record.common_name, "Colibrí esmeralda");
        assert_eq!(record.scientific_name, "Amazilia saucerottei");
        assert_eq!(record.location, "Parque de la Vida");
        assert_eq!(record.image_url.as_deref(), Some("a.png"));
        assert_eq!(record.created_at, Some(RawTimestamp::EpochMillis(1_712_707_200_000)));
    }

    #[test]
    fn test_unusable_ids_are_dropped() {
        let raw = json!([
            { "id": null },
            { "id": "" },
            { "id": true },
            { "id": { "value": 3 } },
            { "id": 2.5 },
            { "id": 3.0 },
            "not an object",
            null
        ]);
        let records = normalize(&raw);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, RecordId::Int(3));
    }

    #[test]
    fn test_large_numeric_ids_stay_distinct() {
        let raw = json!([
            { "id": 18446744073709551615u64 },
            { "id": 18446744073709551614u64 },
            { "id": 1e19 },
            { "id": -4.0e18 }
        ]);
        let ids: Vec<_> = normalize(&raw).into_iter().map(|r| r.id).collect();
        assert_eq!(
            ids,
            vec![
                RecordId::UInt(u64::MAX),
                RecordId::UInt(u64::MAX - 1),
                RecordId::Int(-4_000_000_000_000_000_000),
            ]
        );
    }

    #[test]
    fn test_preserves_input_order() {
        let raw = json!([{ "id": 3 }, { "id": 1 }, { "id": 2 }]);
        let ids: Vec<_> = normalize(&raw).into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![RecordId::Int(3), RecordId::Int(1), RecordId::Int(2)]);
    }

    #[test]
    fn test_empty_image_list_leaves_url_unset() {
        let raw = json!([{ "id": 1, "images": [] }, { "id": 2, "images": [{ "imageUrl": "" }] }]);
        let records = normalize(&raw);
        assert!(records.iter().all(|r| r.image_url.is_none()));
    }
}
