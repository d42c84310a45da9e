//! Conversion engine entry point: resolve two format names, parse with the
//! source codec, render with the destination codec.
use log::debug;

use crate::codec::{ParseError, Registry, RenderError};
use crate::record::Dataset;

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// One or both format names are absent from the registry. The message
    /// names every bad name, so a caller can't probe which of two names was
    /// invalid from the error shape.
    #[error("unknown format: {0}")]
    InvalidFormat(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Parse `raw` with the `from` codec and render the resulting dataset with
/// the `to` codec. Both names are resolved before any error is reported.
pub fn convert(
    registry: &Registry,
    from: &str,
    to: &str,
    raw: &[u8],
) -> Result<Vec<u8>, ConvertError> {
    let from_codec = registry.get(from);
    let to_codec = registry.get(to);

    let (from_codec, to_codec) = match (from_codec, to_codec) {
        (Some(f), Some(t)) => (f, t),
        (f, t) => {
            let mut missing = Vec::new();
            if f.is_none() {
                missing.push(from);
            }
            if t.is_none() {
                missing.push(to);
            }
            return Err(ConvertError::InvalidFormat(missing.join(", ")));
        }
    };

    debug!("parsing {} bytes as {from}", raw.len());
    let ds = from_codec.parse(raw)?;
    debug!("parsed {} records, rendering as {to}", ds.meta.record_count);
    let out = to_codec.render(&ds)?;
    debug!("rendered {} bytes", out.len());
    Ok(out)
}

/// Parse only, for callers that want the intermediate dataset.
pub fn parse_as(registry: &Registry, from: &str, raw: &[u8]) -> Result<Dataset, ConvertError> {
    let codec = registry
        .get(from)
        .ok_or_else(|| ConvertError::InvalidFormat(from.to_string()))?;
    Ok(codec.parse(raw)?)
}
