//! The PTV intermediate representation: `Dataset`, `Record`, and the hash,
//! salt, and unknown-field types every codec converts through.
//!
//! Records only carry a canonical field when the parser is confident about
//! the mapping. Anything ambiguous goes into `unknowns`, anything
//! format-specific but labeled goes into `extra` — data is never discarded
//! during a parse.
//!
//! The serde derives on these types are the external wire representation:
//! serializing a `Dataset` with `serde_json` yields the PTV document
//! (`ptv_version`, `meta`, `records[]`) with empty fields omitted.
use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Identified hashing algorithm. `Unknown` is a valid terminal state for
/// detection, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashType {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Bcrypt,
    Scrypt,
    Argon2i,
    Argon2id,
    Pbkdf2,
    Mysql,
    Sha512Crypt,
    Sha256Crypt,
    Md5Crypt,
    Apr1,
    Sha1Crypt,
    Unknown,
}

impl HashType {
    /// Wire-level name, matching the serde rename.
    pub fn as_str(&self) -> &'static str {
        match self {
            HashType::Md5 => "md5",
            HashType::Sha1 => "sha1",
            HashType::Sha224 => "sha224",
            HashType::Sha256 => "sha256",
            HashType::Sha384 => "sha384",
            HashType::Sha512 => "sha512",
            HashType::Bcrypt => "bcrypt",
            HashType::Scrypt => "scrypt",
            HashType::Argon2i => "argon2i",
            HashType::Argon2id => "argon2id",
            HashType::Pbkdf2 => "pbkdf2",
            HashType::Mysql => "mysql",
            HashType::Sha512Crypt => "sha512crypt",
            HashType::Sha256Crypt => "sha256crypt",
            HashType::Md5Crypt => "md5crypt",
            HashType::Apr1 => "apr1",
            HashType::Sha1Crypt => "sha1crypt",
            HashType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for HashType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the salt bytes are represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaltEncoding {
    Hex,
    Base64,
    Utf8,
    Raw,
}

/// A hash value with its identified algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hash {
    #[serde(rename = "type")]
    pub hash_type: HashType,
    pub value: String,
}

/// A salt value with its encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Salt {
    pub value: String,
    pub encoding: SaltEncoding,
}

/// A best-guess mapping for an unknown value: the canonical field it might
/// belong to, with a 0.0–1.0 confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PotentialField {
    pub field: String,
    pub confidence: f64,
}

/// A value the parser could not definitively map to a canonical field. The
/// raw value is preserved as-is; `potential_fields` may be empty when the
/// parser has no guess at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnknownField {
    pub value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub potential_fields: Vec<PotentialField>,
}

impl UnknownField {
    pub fn bare(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            potential_fields: Vec::new(),
        }
    }
}

/// One entity (a credential, account, device profile, ...) in the PTV
/// universal format. Canonical fields are only set when classification is
/// confident; empty string means "not set".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Universal identifier, format: `ptv_<uuid4>`.
    pub ptv_id: String,

    // Identity (only set when confirmed)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    /// Normalized: `+<digits>` only, e.g. `+10000000000`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub phone: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    // Credentials (only set when confirmed)
    /// Plaintext password, if known.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<Hash>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<Salt>,

    // Network / source (only set when confirmed)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub domain: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ip: String,
    #[serde(default, skip_serializing_if = "port_is_unset")]
    pub port: u16,

    /// Values the parser couldn't definitively map to a canonical field.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unknowns: Vec<UnknownField>,

    /// Catch-all for format-specific fields with no canonical home.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn port_is_unset(port: &u16) -> bool {
    *port == 0
}

impl Record {
    /// Construct an empty record with a fresh PTV id.
    pub fn new() -> Self {
        Self {
            ptv_id: new_ptv_id(),
            ..Default::default()
        }
    }

    /// Insert a string value into `extra`.
    pub fn extra_str(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.extra
            .insert(key.into(), serde_json::Value::String(value.into()));
    }

    /// Fetch an `extra` value as a string, empty if absent or non-string.
    pub fn extra_get(&self, key: &str) -> &str {
        match self.extra.get(key) {
            Some(serde_json::Value::String(s)) => s,
            _ => "",
        }
    }
}

/// Provenance and confidence data for a parsed dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub source_format: String,
    /// RFC3339 timestamp of the parse.
    pub parsed_at: String,
    pub record_count: usize,
    /// Which canonical fields have data across records.
    pub columns: Vec<String>,
    /// Canonical field name → 0.0–1.0 certainty that a populated column
    /// means what its name implies.
    pub field_confidence: BTreeMap<String, f64>,
}

/// Top-level PTV document: created wholesale by one `parse`, consumed
/// wholesale by one `render`, never mutated in place after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub ptv_version: String,
    pub meta: Meta,
    pub records: Vec<Record>,
}

pub const PTV_VERSION: &str = "1.0";

impl Dataset {
    /// Assemble a dataset with the standard version and parse metadata.
    pub fn assemble(
        source_format: &str,
        columns: Vec<String>,
        field_confidence: BTreeMap<String, f64>,
        records: Vec<Record>,
    ) -> Self {
        Self {
            ptv_version: PTV_VERSION.to_string(),
            meta: Meta {
                source_format: source_format.to_string(),
                parsed_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
                record_count: records.len(),
                columns,
                field_confidence,
            },
            records,
        }
    }

    /// Assemble with the same confidence value for every column.
    pub fn assemble_uniform(
        source_format: &str,
        columns: Vec<String>,
        confidence: f64,
        records: Vec<Record>,
    ) -> Self {
        let conf = columns
            .iter()
            .map(|c| (c.clone(), confidence))
            .collect::<BTreeMap<_, _>>();
        Self::assemble(source_format, columns, conf, records)
    }
}

/// Generate a new `ptv_<uuid4>` identifier.
pub fn new_ptv_id() -> String {
    format!("ptv_{}", uuid::Uuid::new_v4())
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+[0-9]+$").expect("phone regex"))
}

/// Check that a phone number matches the PTV format: `+<digits>` only.
/// Empty is valid (field not set).
pub fn validate_phone(phone: &str) -> Result<(), String> {
    if phone.is_empty() || phone_regex().is_match(phone) {
        Ok(())
    } else {
        Err(format!(
            "invalid phone {phone:?}: must match +<digits> (no spaces or symbols except leading +)"
        ))
    }
}

/// Strip all non-digit characters and prepend `+`. Returns empty when no
/// digits survive.
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.trim().chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        String::new()
    } else {
        format!("+{digits}")
    }
}
