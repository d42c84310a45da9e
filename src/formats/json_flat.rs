//! JSON codecs: a flat array-of-objects form classified per key, and the PTV
//! wire document itself.
use serde_json::Value;

use crate::classify::classify_field;
use crate::codec::{Codec, ParseError, RenderError};
use crate::record::{Dataset, Record, normalize_phone, validate_phone};

/// `[{"email": ..., "password": ...}, ...]` — keys go through the field
/// classifier, unmatched keys keep their original JSON values under `extra`.
pub struct JsonFlat;

fn value_as_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl Codec for JsonFlat {
    fn name(&self) -> &'static str {
        "json_flat"
    }

    fn parse(&self, raw: &[u8]) -> Result<Dataset, ParseError> {
        let rows: Vec<serde_json::Map<String, Value>> = serde_json::from_slice(raw)
            .map_err(|e| ParseError::container(self.name(), e.to_string()))?;

        let mut records = Vec::with_capacity(rows.len());
        let mut seen_cols = std::collections::BTreeSet::new();

        for row in rows {
            let mut r = Record::new();
            for (k, v) in row {
                let text = value_as_text(&v);
                if !classify_field(&mut r, &k, &text) {
                    r.extra.insert(k.clone(), v);
                }
                seen_cols.insert(k);
            }
            records.push(r);
        }

        let cols: Vec<String> = seen_cols.into_iter().collect();
        Ok(Dataset::assemble_uniform(self.name(), cols, 1.0, records))
    }

    fn render(&self, ds: &Dataset) -> Result<Vec<u8>, RenderError> {
        let mut rows = Vec::with_capacity(ds.records.len());
        for r in &ds.records {
            let mut m = serde_json::Map::new();
            for (k, v) in crate::classify::record_to_map(r) {
                m.insert(k.to_string(), Value::String(v));
            }
            if let Some(h) = &r.hash {
                m.insert("hash_type".to_string(), Value::String(h.hash_type.to_string()));
            }
            if let Some(s) = &r.salt {
                m.insert("salt".to_string(), Value::String(s.value.clone()));
            }
            for (k, v) in &r.extra {
                m.insert(k.clone(), v.clone());
            }
            if !r.unknowns.is_empty() {
                let unknowns = serde_json::to_value(&r.unknowns)
                    .map_err(|e| RenderError::Incomplete(e.to_string()))?;
                m.insert("unknowns".to_string(), unknowns);
            }
            rows.push(Value::Object(m));
        }
        serde_json::to_vec_pretty(&rows).map_err(|e| RenderError::Incomplete(e.to_string()))
    }
}

/// The PTV universal document (`ptv_version`, `meta`, `records[]`) as its own
/// format, for persisting or re-reading the intermediate form.
pub struct PtvJson;

impl Codec for PtvJson {
    fn name(&self) -> &'static str {
        "ptv_json"
    }

    fn parse(&self, raw: &[u8]) -> Result<Dataset, ParseError> {
        let mut ds: Dataset = serde_json::from_slice(raw)
            .map_err(|e| ParseError::container(self.name(), e.to_string()))?;
        // externally produced documents may carry unnormalized phones
        for r in &mut ds.records {
            if validate_phone(&r.phone).is_err() {
                r.phone = normalize_phone(&r.phone);
            }
        }
        Ok(ds)
    }

    fn render(&self, ds: &Dataset) -> Result<Vec<u8>, RenderError> {
        serde_json::to_vec_pretty(ds).map_err(|e| RenderError::Incomplete(e.to_string()))
    }
}
