//! The codec contract and the process-wide format registry.
//!
//! Every format implements [`Codec`]: a stable lowercase name plus
//! `parse`/`render`. Codecs are stateless unit structs; arbitrarily many
//! conversions may run in parallel with no coordination.
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use crate::record::Dataset;

/// Terminal parse failures. Unit-level damage is handled inside codecs by
/// skipping the damaged unit and continuing the scan; only an invalid
/// container or a scan that recovers zero records surfaces here.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("{format}: invalid container: {reason}")]
    ContainerInvalid { format: &'static str, reason: String },
    #[error("{format}: no parseable records found")]
    ZeroRecoverable { format: &'static str },
}

impl ParseError {
    pub fn container(format: &'static str, reason: impl Into<String>) -> Self {
        ParseError::ContainerInvalid {
            format,
            reason: reason.into(),
        }
    }
}

/// Render failures. For list-shaped targets codecs skip unencodable records;
/// `Incomplete` is reserved for single-document targets that need a fully
/// valid structural encode.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("record cannot be encoded: {0}")]
    Incomplete(String),
    #[error("render i/o: {0}")]
    Io(#[from] std::io::Error),
}

/// One format: a parse/render pair plus a stable wire-level name.
pub trait Codec: Send + Sync {
    /// Unique, lowercase, stable across versions.
    fn name(&self) -> &'static str;

    /// Must tolerate malformed or partial input by skipping unparseable
    /// sub-units wherever the format allows unit-level recovery.
    fn parse(&self, raw: &[u8]) -> Result<Dataset, ParseError>;

    /// Best-effort encode. Must not fabricate data for empty fields except
    /// where the target format structurally requires a placeholder.
    fn render(&self, ds: &Dataset) -> Result<Vec<u8>, RenderError>;
}

/// Name → codec lookup table. Populated once at startup; `register` replaces
/// an earlier codec with the same name.
#[derive(Default)]
pub struct Registry {
    codecs: RwLock<HashMap<&'static str, Arc<dyn Codec>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, codec: Arc<dyn Codec>) {
        let mut map = self.codecs.write().expect("registry lock poisoned");
        map.insert(codec.name(), codec);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Codec>> {
        let map = self.codecs.read().expect("registry lock poisoned");
        map.get(name).cloned()
    }

    /// All registered names, lexicographically ascending.
    pub fn list(&self) -> Vec<&'static str> {
        let map = self.codecs.read().expect("registry lock poisoned");
        let mut names: Vec<&'static str> = map.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

/// The process-lifetime registry, populated with every built-in codec on
/// first access. There is no teardown.
pub fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let reg = Registry::new();
        crate::formats::register_builtin(&reg);
        reg
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy(&'static str);

    impl Codec for Dummy {
        fn name(&self) -> &'static str {
            self.0
        }
        fn parse(&self, _raw: &[u8]) -> Result<Dataset, ParseError> {
            Ok(Dataset::assemble(self.0, vec![], Default::default(), vec![]))
        }
        fn render(&self, _ds: &Dataset) -> Result<Vec<u8>, RenderError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn list_is_sorted() {
        let reg = Registry::new();
        reg.register(Arc::new(Dummy("zeta")));
        reg.register(Arc::new(Dummy("alpha")));
        reg.register(Arc::new(Dummy("mid")));
        assert_eq!(reg.list(), vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn get_is_total_over_arbitrary_names() {
        let reg = Registry::new();
        assert!(reg.get("").is_none());
        assert!(reg.get("nope").is_none());
        assert!(reg.get("非ASCII✓").is_none());
    }

    #[test]
    fn register_replaces_same_name() {
        let reg = Registry::new();
        reg.register(Arc::new(Dummy("dup")));
        reg.register(Arc::new(Dummy("dup")));
        assert_eq!(reg.list(), vec!["dup"]);
    }

    #[test]
    fn global_registry_has_builtins() {
        let reg = registry();
        let names = reg.list();
        assert!(names.contains(&"kerberos_keytab"));
        assert!(names.contains(&"rainbow_table"));
        assert!(names.contains(&"combolist_user_pass"));
        // sorted
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }
}
