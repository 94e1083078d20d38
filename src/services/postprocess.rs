use serde_json::{Map, Value};

use crate::error::PostProcessError;
use crate::models::{AttractionVerdict, FreshnessEntry};

impl FreshnessEntry {
    /// Read one ingredient entry of a freshness payload.
    ///
    /// Only `days_left` is required. Optional fields of the wrong type are
    /// logged and left out of the entry, but stay untouched in the payload.
    pub fn from_json(name: &str, value: &Value) -> Result<Self, PostProcessError> {
        let fields = value
            .as_object()
            .ok_or_else(|| PostProcessError::entry(name, "entry is not an object"))?;

        let days_left = match fields.get("days_left") {
            None | Some(Value::Null) => {
                return Err(PostProcessError::entry(name, "days_left is missing"))
            }
            Some(v) => v.as_f64().ok_or_else(|| {
                PostProcessError::entry(name, format!("days_left is not a number: {}", v))
            })?,
        };

        let confidence = match fields.get("confidence") {
            None | Some(Value::Null) => None,
            Some(v) => match v.as_f64() {
                Some(c) if (0.0..=100.0).contains(&c) => Some(c),
                _ => {
                    log::warn!("⚠️ Ignoring odd confidence for {}: {}", name, v);
                    None
                }
            },
        };

        let observation = match fields.get("observation") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(v) => {
                log::warn!("⚠️ Ignoring non-text observation for {}: {}", name, v);
                None
            }
        };

        Ok(FreshnessEntry {
            name: name.to_string(),
            days_left,
            confidence,
            observation,
        })
    }
}

/// Reorder a freshness payload so the items that spoil first come first.
///
/// Keys and values are kept as the model sent them, extra fields included.
/// Entries with the same `days_left` keep their original relative order.
pub fn sort_by_freshness(payload: Value) -> Result<Value, PostProcessError> {
    let map = match payload {
        Value::Object(map) => map,
        other => {
            return Err(PostProcessError::payload(format!(
                "expected an object keyed by ingredient name, got {}",
                json_kind(&other)
            )))
        }
    };

    let mut entries = Vec::with_capacity(map.len());
    for (name, value) in map {
        let entry = FreshnessEntry::from_json(&name, &value)?;
        log::debug!(
            "🥬 {}: {} days left (confidence {:?}, observation {:?})",
            entry.name,
            entry.days_left,
            entry.confidence,
            entry.observation
        );
        entries.push((entry.days_left, name, value));
    }

    // sort_by is stable
    entries.sort_by(|(a, _, _), (b, _, _)| a.total_cmp(b));

    let sorted: Map<String, Value> = entries
        .into_iter()
        .map(|(_, name, value)| (name, value))
        .collect();

    Ok(Value::Object(sorted))
}

/// Decide whether an attraction reply is the model's "nothing here" sentinel.
pub fn attraction_verdict(payload: &Value) -> AttractionVerdict {
    match payload.as_object() {
        Some(map) if map.len() == 1 && map.get("error").is_some_and(Value::is_string) => {
            AttractionVerdict::NotRecognized
        }
        _ => AttractionVerdict::Recognized,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(value: &Value) -> Vec<String> {
        value.as_object().unwrap().keys().cloned().collect()
    }

    #[test]
    fn test_sorts_soonest_to_spoil_first() {
        let payload = json!({"Potato": {"days_left": 5}, "Carrot": {"days_left": 2}});
        let sorted = sort_by_freshness(payload).unwrap();

        assert_eq!(keys(&sorted), vec!["Carrot", "Potato"]);
        assert_eq!(sorted, json!({"Carrot": {"days_left": 2}, "Potato": {"days_left": 5}}));
    }

    #[test]
    fn test_ties_keep_input_order() {
        let payload = json!({
            "Milk": {"days_left": 3},
            "Bread": {"days_left": 1},
            "Eggs": {"days_left": 3},
            "Spinach": {"days_left": 1},
            "Cheese": {"days_left": 3}
        });
        let sorted = sort_by_freshness(payload).unwrap();

        assert_eq!(keys(&sorted), vec!["Bread", "Spinach", "Milk", "Eggs", "Cheese"]);
    }

    #[test]
    fn test_many_distinct_values_are_non_decreasing() {
        let mut map = Map::new();
        for (i, days) in [9, -1, 14, 0, 7, 3, 30, 2].iter().enumerate() {
            map.insert(format!("item{}", i), json!({"days_left": days}));
        }
        let sorted = sort_by_freshness(Value::Object(map)).unwrap();

        let days: Vec<f64> = sorted
            .as_object()
            .unwrap()
            .values()
            .map(|v| v["days_left"].as_f64().unwrap())
            .collect();
        assert!(days.windows(2).all(|w| w[0] <= w[1]), "{:?}", days);
        assert_eq!(days.len(), 8);
    }

    #[test]
    fn test_extra_fields_are_preserved() {
        let payload = json!({
            "Banana": {"days_left": 2, "confidence": 80, "observation": "brown spots", "color": "yellow"}
        });
        let sorted = sort_by_freshness(payload.clone()).unwrap();
        assert_eq!(sorted, payload);
    }

    #[test]
    fn test_fractional_days_sort_by_value() {
        let sorted = sort_by_freshness(json!({
            "A": {"days_left": 2.5},
            "B": {"days_left": 1},
            "C": {"days_left": 4.0},
            "D": {"days_left": 2}
        }))
        .unwrap();
        assert_eq!(keys(&sorted), vec!["B", "D", "A", "C"]);
        assert_eq!(sorted["A"], json!({"days_left": 2.5}));
    }

    #[test]
    fn test_missing_days_left_is_malformed() {
        let err = sort_by_freshness(json!({"Milk": {"confidence": 50}})).unwrap_err();
        assert_eq!(err, PostProcessError::entry("Milk", "days_left is missing"));

        let err = sort_by_freshness(json!({"Milk": {"days_left": null}})).unwrap_err();
        assert_eq!(err, PostProcessError::entry("Milk", "days_left is missing"));
    }

    #[test]
    fn test_non_numeric_days_left_is_malformed() {
        for bad in [json!("five"), json!("5"), json!(true), json!([1]), json!({"n": 1})] {
            let payload = json!({"Apple": {"days_left": 1}, "Milk": {"days_left": bad}});
            let err = sort_by_freshness(payload).unwrap_err();
            match err {
                PostProcessError::MalformedEntry { ingredient, .. } => {
                    assert_eq!(ingredient.as_deref(), Some("Milk"));
                }
            }
        }
    }

    #[test]
    fn test_odd_confidence_passes_through() {
        let payload = json!({
            "Milk": {"days_left": 3, "confidence": "80%"},
            "Eggs": {"days_left": 1, "confidence": 140}
        });
        let sorted = sort_by_freshness(payload).unwrap();

        assert_eq!(keys(&sorted), vec!["Eggs", "Milk"]);
        assert_eq!(sorted["Milk"]["confidence"], "80%");
        assert_eq!(sorted["Eggs"]["confidence"], 140);
    }

    #[test]
    fn test_non_text_observation_passes_through() {
        let payload = json!({"Milk": {"days_left": 1, "observation": ["soft"]}});
        let sorted = sort_by_freshness(payload.clone()).unwrap();
        assert_eq!(sorted, payload);

        let entry = FreshnessEntry::from_json("Milk", &payload["Milk"]).unwrap();
        assert_eq!(entry.observation, None);
    }

    #[test]
    fn test_non_object_payload_is_malformed() {
        let err = sort_by_freshness(json!([{"days_left": 1}])).unwrap_err();
        assert_eq!(
            err,
            PostProcessError::payload("expected an object keyed by ingredient name, got an array")
        );
    }

    #[test]
    fn test_bare_number_entry_is_malformed() {
        // the old "Name: X" answer shape
        let err = sort_by_freshness(json!({"Milk": 3})).unwrap_err();
        assert_eq!(err, PostProcessError::entry("Milk", "entry is not an object"));
    }

    #[test]
    fn test_empty_payload_is_fine() {
        assert_eq!(sort_by_freshness(json!({})).unwrap(), json!({}));
    }

    #[test]
    fn test_freshness_entry_fields() {
        let entry = FreshnessEntry::from_json(
            "Potato",
            &json!({"days_left": 5, "confidence": 80, "observation": "firm"}),
        )
        .unwrap();

        assert_eq!(
            entry,
            FreshnessEntry {
                name: "Potato".to_string(),
                days_left: 5.0,
                confidence: Some(80.0),
                observation: Some("firm".to_string()),
            }
        );
    }

    #[test]
    fn test_attraction_sentinel() {
        let sentinel = json!({"error": "No recognized tourist attraction in the image"});
        assert_eq!(attraction_verdict(&sentinel), AttractionVerdict::NotRecognized);

        let found = json!({"name": "Eiffel Tower", "location": "Paris, France"});
        assert_eq!(attraction_verdict(&found), AttractionVerdict::Recognized);

        let mixed = json!({"name": "Eiffel Tower", "error": "partial"});
        assert_eq!(attraction_verdict(&mixed), AttractionVerdict::Recognized);
    }
}
