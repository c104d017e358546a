//! Extraction of UUID and PARTUUID identifiers from static table device
//! specifications.

use strum_macros::Display;

/// Device specification substrings for schemes that are never compared.
const UNSUPPORTED_SCHEME_MARKERS: [&str; 2] = ["LABEL=", "/dev/"];

/// Identifier scheme of a device specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum IdentifierScheme {
    #[strum(serialize = "UUID")]
    Uuid,
    #[strum(serialize = "PARTUUID")]
    PartUuid,
}

impl IdentifierScheme {
    /// Text that introduces an identifier of this scheme.
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Uuid => "UUID=",
            Self::PartUuid => "PARTUUID=",
        }
    }
}

/// An identifier borrowed from a device specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identifier<'a> {
    pub scheme: IdentifierScheme,
    pub value: &'a str,
}

/// Whether `spec` references a device by label or by device path.
///
/// `PARTLABEL=` contains `LABEL=` and is skipped as well.
pub fn is_unsupported_scheme(spec: &str) -> bool {
    UNSUPPORTED_SCHEME_MARKERS
        .iter()
        .any(|marker| spec.contains(marker))
}

/// Extracts the identifier from a device specification.
///
/// Returns `None` if `spec` contains neither `UUID=` nor `PARTUUID=`. When
/// the marker is followed by a double quote, the identifier runs up to the
/// last double quote in `spec`; otherwise it is everything after the marker.
///
/// # Panics
///
/// Panics if a marker is present but the identifier is empty, e.g. `UUID=` or
/// `UUID=""`. Callers must skip label and device path specifications first,
/// see [`is_unsupported_scheme`].
pub fn extract(spec: &str) -> Option<Identifier<'_>> {
    // PARTUUID= contains UUID=, so it has to be looked up first.
    let (scheme, start) = [IdentifierScheme::PartUuid, IdentifierScheme::Uuid]
        .into_iter()
        .find_map(|scheme| {
            spec.find(scheme.marker())
                .map(|pos| (scheme, pos + scheme.marker().len()))
        })?;

    let tail = &spec[start..];
    let value = match tail.strip_prefix('"') {
        Some(unquoted) => match spec.rfind('"') {
            Some(end) if end > start => &spec[start + 1..end],
            // Only the opening quote is present
            _ => unquoted,
        },
        None => tail,
    };

    assert!(
        !value.is_empty(),
        "static table device specification '{spec}' has a {scheme} marker but no identifier"
    );

    Some(Identifier { scheme, value })
}
