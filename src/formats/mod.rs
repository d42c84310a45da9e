//! Codec instantiations. Registration is an explicit enumeration so the set
//! of available formats is deterministic and testable.
use std::sync::Arc;

use crate::codec::Registry;

pub mod combolist;
pub mod csv_tsv;
pub mod hashlist;
pub mod htpasswd;
pub mod json_flat;
pub mod keytab;
pub mod modular_crypt;
pub mod protobuf;
pub mod rainbow;
pub mod shadow;
pub mod thrift;

/// Register every built-in codec. Called once when the global registry is
/// first touched.
pub fn register_builtin(reg: &Registry) {
    reg.register(Arc::new(combolist::ComboUserPass));
    reg.register(Arc::new(combolist::ComboEmailPass));
    reg.register(Arc::new(combolist::ComboUserPassUrl));
    reg.register(Arc::new(combolist::ComboExtended));
    reg.register(Arc::new(hashlist::HashlistPlain));
    reg.register(Arc::new(hashlist::HashlistUserHash));
    reg.register(Arc::new(hashlist::HashlistHashSalt));
    reg.register(Arc::new(hashlist::JtrPot));
    reg.register(Arc::new(hashlist::HashcatPot));
    reg.register(Arc::new(modular_crypt::ModularCrypt));
    reg.register(Arc::new(shadow::Shadow));
    reg.register(Arc::new(shadow::Passwd));
    reg.register(Arc::new(htpasswd::Htpasswd));
    reg.register(Arc::new(csv_tsv::CsvCodec));
    reg.register(Arc::new(csv_tsv::TsvCodec));
    reg.register(Arc::new(json_flat::JsonFlat));
    reg.register(Arc::new(json_flat::PtvJson));
    reg.register(Arc::new(keytab::KerberosKeytab));
    reg.register(Arc::new(thrift::Thrift));
    reg.register(Arc::new(protobuf::Protobuf));
    reg.register(Arc::new(rainbow::RainbowTable));
}

/// Lossy text view of raw input for the line-oriented codecs. Invalid UTF-8
/// is replaced, never dropped.
pub(crate) fn text_of(raw: &[u8]) -> std::borrow::Cow<'_, str> {
    String::from_utf8_lossy(raw)
}
