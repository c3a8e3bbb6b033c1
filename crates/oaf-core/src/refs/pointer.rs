//! Pointer path conventions for both document variants.
//!
//! A pointer such as `#/components/schemas/Pet` names a component of a given
//! kind by its bare name. Names that contain characters not allowed in a
//! path segment may appear literally, percent-escaped (in either hex case),
//! or with `~0`/`~1` token escapes; every form resolves to the same bare
//! name.

use std::borrow::Cow;
use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use serde::Serialize;

use crate::parse::spec::Variant;

/// Characters escaped in a pointer path segment. Unreserved characters and
/// the sub-delimiters allowed inside a segment are left alone.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b':')
    .remove(b'=')
    .remove(b'@');

/// The kind of component a pointer targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Schema,
    Parameter,
    Response,
    RequestBody,
    Header,
    SecurityScheme,
    Link,
    Callback,
    Example,
    PathItem,
}

impl ComponentKind {
    /// Pointer prefix for this kind, or `None` when the variant has no
    /// reusable collection of that kind.
    pub fn prefix(self, variant: Variant) -> Option<&'static str> {
        match variant {
            Variant::Legacy => match self {
                ComponentKind::Schema => Some("#/definitions/"),
                ComponentKind::Parameter => Some("#/parameters/"),
                ComponentKind::Response => Some("#/responses/"),
                ComponentKind::SecurityScheme => Some("#/securityDefinitions/"),
                _ => None,
            },
            Variant::Modern => Some(match self {
                ComponentKind::Schema => "#/components/schemas/",
                ComponentKind::Parameter => "#/components/parameters/",
                ComponentKind::Response => "#/components/responses/",
                ComponentKind::RequestBody => "#/components/requestBodies/",
                ComponentKind::Header => "#/components/headers/",
                ComponentKind::SecurityScheme => "#/components/securitySchemes/",
                ComponentKind::Link => "#/components/links/",
                ComponentKind::Callback => "#/components/callbacks/",
                ComponentKind::Example => "#/components/examples/",
                ComponentKind::PathItem => "#/components/pathItems/",
            }),
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ComponentKind::Schema => "schema",
            ComponentKind::Parameter => "parameter",
            ComponentKind::Response => "response",
            ComponentKind::RequestBody => "request body",
            ComponentKind::Header => "header",
            ComponentKind::SecurityScheme => "security scheme",
            ComponentKind::Link => "link",
            ComponentKind::Callback => "callback",
            ComponentKind::Example => "example",
            ComponentKind::PathItem => "path item",
        };
        f.write_str(label)
    }
}

/// Build the pointer for a bare component name.
pub fn build(kind: ComponentKind, variant: Variant, name: &str) -> Option<String> {
    kind.prefix(variant)
        .map(|prefix| format!("{prefix}{}", escape_token(name)))
}

/// Apply the `~0`/`~1` token escapes so a name with `/` stays one segment.
pub fn escape_token(name: &str) -> Cow<'_, str> {
    if name.contains(['~', '/']) {
        Cow::Owned(name.replace('~', "~0").replace('/', "~1"))
    } else {
        Cow::Borrowed(name)
    }
}

/// Undo the token escapes. `~1` is replaced before `~0`.
pub fn unescape_token(segment: &str) -> Cow<'_, str> {
    if segment.contains('~') {
        Cow::Owned(segment.replace("~1", "/").replace("~0", "~"))
    } else {
        Cow::Borrowed(segment)
    }
}

/// Token-escape then percent-escape a bare name for use as a pointer path
/// segment.
pub fn encode_segment(name: &str) -> String {
    utf8_percent_encode(&escape_token(name), PATH_SEGMENT).to_string()
}

/// Percent-decode then token-unescape a raw segment. Invalid UTF-8 after
/// decoding leaves the percent escapes in place.
pub fn decode_segment(raw: &str) -> String {
    let decoded = percent_decode_str(raw)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(raw));
    unescape_token(&decoded).into_owned()
}

/// Strip the kind's prefix, returning the segment as written (possibly
/// escaped). `None` if the pointer does not follow the convention.
pub fn raw_name<'a>(pointer: &'a str, kind: ComponentKind, variant: Variant) -> Option<&'a str> {
    let name = pointer.strip_prefix(kind.prefix(variant)?)?;
    if name.is_empty() || name.contains('/') {
        return None;
    }
    Some(name)
}

/// Resolve a pointer to a defined bare name, trying the literal segment
/// first and the decoded segment second.
pub fn resolve_name(
    pointer: &str,
    kind: ComponentKind,
    variant: Variant,
    is_defined: impl Fn(&str) -> bool,
) -> Option<String> {
    let raw = raw_name(pointer, kind, variant)?;
    if is_defined(raw) {
        return Some(raw.to_string());
    }
    let decoded = decode_segment(raw);
    (decoded != raw && is_defined(decoded.as_str())).then_some(decoded)
}

/// Decoded bare name of a pointer without checking it is defined.
pub fn bare_name(pointer: &str, kind: ComponentKind, variant: Variant) -> Option<String> {
    raw_name(pointer, kind, variant).map(decode_segment)
}

/// Whether a discriminator mapping value is a pointer or a bare name.
pub fn is_pointer_like(value: &str) -> bool {
    value.starts_with('#') || value.contains('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes_per_variant() {
        assert_eq!(
            ComponentKind::Schema.prefix(Variant::Legacy),
            Some("#/definitions/")
        );
        assert_eq!(
            ComponentKind::SecurityScheme.prefix(Variant::Legacy),
            Some("#/securityDefinitions/")
        );
        assert_eq!(ComponentKind::Link.prefix(Variant::Legacy), None);
        assert_eq!(
            ComponentKind::PathItem.prefix(Variant::Modern),
            Some("#/components/pathItems/")
        );
    }

    #[test]
    fn test_encode_generic_name() {
        assert_eq!(encode_segment("Response[User]"), "Response%5BUser%5D");
        assert_eq!(encode_segment("Map<K, V>"), "Map%3CK%2C%20V%3E");
        assert_eq!(encode_segment("com.acme.User"), "com.acme.User");
    }

    #[test]
    fn test_resolve_literal_and_encoded() {
        let defined = |n: &str| n == "Response[User]";
        assert_eq!(
            resolve_name(
                "#/components/schemas/Response[User]",
                ComponentKind::Schema,
                Variant::Modern,
                defined
            ),
            Some("Response[User]".to_string())
        );
        assert_eq!(
            resolve_name(
                "#/components/schemas/Response%5BUser%5D",
                ComponentKind::Schema,
                Variant::Modern,
                defined
            ),
            Some("Response[User]".to_string())
        );
    }

    #[test]
    fn test_token_escapes() {
        assert_eq!(
            build(ComponentKind::Schema, Variant::Modern, "v1/User~x"),
            Some("#/components/schemas/v1~1User~0x".to_string())
        );
        assert_eq!(encode_segment("v1/Page[User]"), "v1~1Page%5BUser%5D");
        assert_eq!(
            bare_name(
                "#/components/schemas/v1~1User~0x",
                ComponentKind::Schema,
                Variant::Modern
            ),
            Some("v1/User~x".to_string())
        );
        // `~01` is an escaped `~` followed by `1`, not a slash.
        assert_eq!(unescape_token("a~01"), "a~1");
    }

    #[test]
    fn test_resolve_lowercase_and_token_escapes() {
        let defined = |n: &str| n == "Page[User]" || n == "v1/User";
        assert_eq!(
            resolve_name(
                "#/components/schemas/Page%5bUser%5d",
                ComponentKind::Schema,
                Variant::Modern,
                defined
            ),
            Some("Page[User]".to_string())
        );
        assert_eq!(
            resolve_name(
                "#/definitions/v1~1User",
                ComponentKind::Schema,
                Variant::Legacy,
                defined
            ),
            Some("v1/User".to_string())
        );
    }

    #[test]
    fn test_wrong_prefix_is_unresolved() {
        assert_eq!(
            raw_name("#/definitions/Pet", ComponentKind::Schema, Variant::Modern),
            None
        );
        assert_eq!(
            raw_name("other.yaml#/Pet", ComponentKind::Schema, Variant::Legacy),
            None
        );
        assert_eq!(
            raw_name(
                "#/components/schemas/Pet/properties/id",
                ComponentKind::Schema,
                Variant::Modern
            ),
            None
        );
    }

    #[test]
    fn test_pointer_like() {
        assert!(is_pointer_like("#/components/schemas/Dog"));
        assert!(is_pointer_like("other.yaml#/Dog"));
        assert!(!is_pointer_like("Dog"));
    }
}
