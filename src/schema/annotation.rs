//! Typed annotations
//!
//! Entity documents encode most per-node metadata in a `subtype` attribute:
//! a comma separated bag of `key=value` tokens such as
//! `nullable=false,enum=Active;Inactive,interface=navajo://common/Named`.
//! Key membership lives in a separate `key` attribute (`key="optional,id=pk,alt"`).
//! Both are parsed exactly once, here, into plain records; nothing downstream
//! looks at the raw strings again.

use serde::Serialize;

/// Nullability of a message whose subtype says nothing
pub const MESSAGE_NULLABLE_DEFAULT: bool = false;
/// Nullability of a property whose subtype says nothing
pub const PROPERTY_NULLABLE_DEFAULT: bool = true;
/// Key group of a key property that names none
pub const DEFAULT_KEY_GROUP: &str = "default";

/// The parsed `subtype` bag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Annotations {
    /// `nullable=` when present; the default depends on the node kind
    pub nullable: Option<bool>,
    /// `enum=` cases, verbatim and in declaration order
    pub enumeration: Option<Vec<String>>,
    /// `interface=` references
    pub interfaces: Vec<String>,
    /// `isInterface=true`
    pub is_interface: bool,
}

impl Annotations {
    pub fn parse(subtype: Option<&str>) -> Self {
        let mut annotations = Self::default();
        let Some(subtype) = subtype else {
            return annotations;
        };

        for token in subtype.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let Some((key, value)) = token.split_once('=') else {
                tracing::debug!(token, "ignoring subtype token without value");
                continue;
            };
            match key.trim() {
                // first occurrence wins
                "nullable" if annotations.nullable.is_none() => {
                    annotations.nullable = Some(value.trim() == "true");
                }
                "enum" if annotations.enumeration.is_none() => {
                    annotations.enumeration = Some(
                        value
                            .split(';')
                            .filter(|case| !case.is_empty())
                            .map(str::to_string)
                            .collect(),
                    );
                }
                "interface" => annotations.interfaces.extend(
                    value
                        .split(';')
                        .map(str::trim)
                        .filter(|r| !r.is_empty())
                        .map(str::to_string),
                ),
                "isInterface" => annotations.is_interface = value.trim() == "true",
                _ => {}
            }
        }

        annotations
    }

    pub fn message_nullable(&self) -> bool {
        self.nullable.unwrap_or(MESSAGE_NULLABLE_DEFAULT)
    }

    pub fn property_nullable(&self) -> bool {
        self.nullable.unwrap_or(PROPERTY_NULLABLE_DEFAULT)
    }
}

/// The parsed `key` attribute of a property
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeySpec {
    pub optional: bool,
    /// Key groups, in declaration order, never empty
    pub ids: Vec<String>,
}

impl KeySpec {
    /// `None` when the property is not a key at all
    ///
    /// The id list is itself comma separated, so `id=` must be the last
    /// component: `optional,id=pk,alt`.
    pub fn parse(key: Option<&str>) -> Option<Self> {
        let key = key?;
        let (flags, ids) = match key.rfind("id=") {
            Some(index) => (&key[..index], Some(&key[index + 3..])),
            None => (key, None),
        };

        let optional = flags
            .split(',')
            .map(str::trim)
            .any(|flag| flag == "optional" || flag == "optional=true");

        let mut groups: Vec<String> = Vec::new();
        for id in ids.unwrap_or("").split(',').map(str::trim).filter(|id| !id.is_empty()) {
            if !groups.iter().any(|g| g == id) {
                groups.push(id.to_string());
            }
        }
        if groups.is_empty() {
            groups.push(DEFAULT_KEY_GROUP.to_string());
        }

        Some(Self {
            optional,
            ids: groups,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nullable_defaults_differ_by_kind() {
        let empty = Annotations::parse(None);
        assert!(!empty.message_nullable());
        assert!(empty.property_nullable());

        let unrelated = Annotations::parse(Some("minlength=3"));
        assert!(!unrelated.message_nullable());
        assert!(unrelated.property_nullable());
    }

    #[test]
    fn test_explicit_nullable_overrides_default() {
        let yes = Annotations::parse(Some("nullable=true"));
        assert!(yes.message_nullable());

        let no = Annotations::parse(Some("minlength=3,nullable=false"));
        assert!(!no.property_nullable());

        let first_wins = Annotations::parse(Some("nullable=false,nullable=true"));
        assert_eq!(first_wins.nullable, Some(false));
    }

    #[test]
    fn test_enum_cases_are_verbatim() {
        let a = Annotations::parse(Some("nullable=false,enum=Active;inactive;1.5;Pending"));
        assert_eq!(
            a.enumeration.unwrap(),
            vec!["Active", "inactive", "1.5", "Pending"]
        );
    }

    #[test]
    fn test_interfaces_and_interface_flag() {
        let a = Annotations::parse(Some(
            "interface=navajo://common/Named;navajo://common/Dated,isInterface=true,garbage",
        ));
        assert_eq!(a.interfaces, vec!["navajo://common/Named", "navajo://common/Dated"]);
        assert!(a.is_interface);
        assert_eq!(a.enumeration, None);
    }

    #[test]
    fn test_key_spec() {
        assert_eq!(KeySpec::parse(None), None);

        let plain = KeySpec::parse(Some("true")).unwrap();
        assert!(!plain.optional);
        assert_eq!(plain.ids, vec!["default"]);

        let grouped = KeySpec::parse(Some("optional,id=pk,alt")).unwrap();
        assert!(grouped.optional);
        assert_eq!(grouped.ids, vec!["pk", "alt"]);

        let single = KeySpec::parse(Some("id=pk")).unwrap();
        assert!(!single.optional);
        assert_eq!(single.ids, vec!["pk"]);
    }
}
