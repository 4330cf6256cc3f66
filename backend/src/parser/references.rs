//! Discovery of symbolic `I$` and `S$` references in per-record text.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

use crate::error::ReferenceResult;
use crate::models::{FieldReference, SampleDescriptor};

/// `I$KEY` preceded by start of text or a non-identifier character.
pub(crate) static ANNOTATION_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^A-Za-z0-9_])I\$([A-Za-z0-9_]+)").expect("static annotation pattern")
});

/// `S$TOKEN` preceded by start of text or a non-identifier character.
pub(crate) static SAMPLE_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^A-Za-z0-9_])S\$([A-Za-z0-9_.*$-]+)").expect("static sample pattern")
});

/// Distinct INFO keys referenced as `I$KEY`.
pub fn scan_annotation_keys(text: &str) -> BTreeSet<String> {
    ANNOTATION_REF
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Distinct raw tokens following `S$`, e.g. `NA12878$GT` or `*`.
pub fn scan_sample_tokens(text: &str) -> BTreeSet<String> {
    SAMPLE_REF
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Distinct sample references, parsed into descriptors.
///
/// Fails on the first malformed token, e.g. `S$NA12878$GT$DP`.
pub fn scan_sample_descriptors(text: &str) -> ReferenceResult<BTreeSet<SampleDescriptor>> {
    scan_sample_tokens(text)
        .iter()
        .map(|token| SampleDescriptor::parse(token))
        .collect()
}

/// Every symbolic reference in `text`, annotation and sample alike.
pub fn scan_references(text: &str) -> ReferenceResult<BTreeSet<FieldReference>> {
    let mut refs: BTreeSet<FieldReference> = scan_annotation_keys(text)
        .into_iter()
        .map(|key| FieldReference::Annotation { key })
        .collect();
    for desc in scan_sample_descriptors(text)? {
        refs.insert(desc.to_reference());
    }
    Ok(refs)
}
