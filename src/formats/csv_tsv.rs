//! Header-driven CSV/TSV codecs. Each header cell goes through the field
//! classifier; unmatched headers keep their values under `extra`, so no
//! column is ever dropped.
use std::collections::BTreeMap;

use crate::classify::{classify_field, detect_columns, record_to_map};
use crate::codec::{Codec, ParseError, RenderError};
use crate::record::{Dataset, Record};

pub struct CsvCodec;
pub struct TsvCodec;

fn parse_delimited(name: &'static str, delimiter: u8, raw: &[u8]) -> Result<Dataset, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(raw);

    let headers = reader
        .headers()
        .map_err(|e| ParseError::container(name, e.to_string()))?
        .clone();
    if headers.is_empty() {
        return Err(ParseError::container(name, "no header row"));
    }

    let mut records = Vec::new();
    let mut matched: BTreeMap<String, bool> = BTreeMap::new();

    for row in reader.records() {
        // one damaged row doesn't abort the scan
        let Ok(row) = row else { continue };
        let mut r = Record::new();
        for (i, value) in row.iter().enumerate() {
            let header = headers.get(i).unwrap_or("");
            let key = if header.is_empty() {
                format!("column_{i}")
            } else {
                header.to_string()
            };
            let hit = classify_field(&mut r, &key, value);
            if !hit {
                r.extra_str(key.clone(), value);
            }
            matched.insert(key.to_ascii_lowercase(), hit);
        }
        records.push(r);
    }

    let columns: Vec<String> = matched.keys().cloned().collect();
    let confidence = matched
        .iter()
        .map(|(k, hit)| (k.clone(), if *hit { 1.0 } else { 0.0 }))
        .collect();
    Ok(Dataset::assemble(name, columns, confidence, records))
}

fn render_delimited(delimiter: u8, ds: &Dataset) -> Result<Vec<u8>, RenderError> {
    let cols = detect_columns(&ds.records);
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer
        .write_record(&cols)
        .map_err(|e| RenderError::Incomplete(e.to_string()))?;
    for r in &ds.records {
        let m = record_to_map(r);
        let row: Vec<&str> = cols
            .iter()
            .map(|c| m.get(c.as_str()).map(String::as_str).unwrap_or(""))
            .collect();
        writer
            .write_record(&row)
            .map_err(|e| RenderError::Incomplete(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| RenderError::Incomplete(e.to_string()))
}

impl Codec for CsvCodec {
    fn name(&self) -> &'static str {
        "csv"
    }
    fn parse(&self, raw: &[u8]) -> Result<Dataset, ParseError> {
        parse_delimited(self.name(), b',', raw)
    }
    fn render(&self, ds: &Dataset) -> Result<Vec<u8>, RenderError> {
        render_delimited(b',', ds)
    }
}

impl Codec for TsvCodec {
    fn name(&self) -> &'static str {
        "tsv"
    }
    fn parse(&self, raw: &[u8]) -> Result<Dataset, ParseError> {
        parse_delimited(self.name(), b'\t', raw)
    }
    fn render(&self, ds: &Dataset) -> Result<Vec<u8>, RenderError> {
        render_delimited(b'\t', ds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_headers_and_keeps_unknown_columns() {
        let ds = CsvCodec
            .parse(b"E-Mail,pass,department\na@b.com,pw,sales\n")
            .unwrap();
        let r = &ds.records[0];
        assert_eq!(r.email, "a@b.com");
        assert_eq!(r.password, "pw");
        assert_eq!(r.extra_get("department"), "sales");
        assert_eq!(ds.meta.field_confidence.get("e-mail"), Some(&1.0));
        assert_eq!(ds.meta.field_confidence.get("department"), Some(&0.0));
    }

    #[test]
    fn tsv_uses_tab_delimiter() {
        let ds = TsvCodec.parse(b"user\tpwd\nalice\tsecret1\n").unwrap();
        assert_eq!(ds.records[0].username, "alice");
        assert_eq!(ds.records[0].password, "secret1");
    }

    #[test]
    fn render_emits_detected_columns() {
        let ds = CsvCodec.parse(b"user,pass\nalice,pw\n").unwrap();
        let out = String::from_utf8(CsvCodec.render(&ds).unwrap()).unwrap();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("password,username"));
        assert_eq!(lines.next(), Some("pw,alice"));
    }
}
