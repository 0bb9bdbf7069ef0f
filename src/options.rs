use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// A single resolved option value. The search endpoint only takes strings
/// and integers; everything else is rejected during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Str(String),
    Int(i64),
}

impl OptionValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Str(s) => Some(s),
            OptionValue::Int(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            OptionValue::Int(n) => Some(*n),
            OptionValue::Str(_) => None,
        }
    }

    fn to_json(&self) -> Value {
        match self {
            OptionValue::Str(s) => Value::String(s.clone()),
            OptionValue::Int(n) => Value::Number((*n).into()),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Str(s) => f.write_str(s),
            OptionValue::Int(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Str(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::Str(s)
    }
}

impl From<i64> for OptionValue {
    fn from(n: i64) -> Self {
        OptionValue::Int(n)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Str,
    Int,
}

/// Cross-field adjustment applied after defaulting. Reads only the
/// defaulted pre-normalization snapshot, never another rule's output,
/// so the rules are order-independent. Returning `None` nulls the
/// field out of the final mapping.
type Normalizer =
    fn(resolved: &BTreeMap<&'static str, OptionValue>, value: OptionValue) -> Option<OptionValue>;

struct FieldSpec {
    name: &'static str,
    kind: FieldKind,
    /// Optional fields accept an explicit JSON null (treated as unset).
    nullable: bool,
    default: Option<&'static str>,
    /// Empty slice means any value of the right type is accepted.
    allowed: &'static [&'static str],
    normalizer: Option<Normalizer>,
}

/// The full schema of the /2.2/search endpoint, as data.
/// See <https://api.stackexchange.com/docs/search>.
const SCHEMA: &[FieldSpec] = &[
    FieldSpec {
        name: "site",
        kind: FieldKind::Str,
        nullable: false,
        default: Some("stackoverflow"),
        allowed: &[],
        normalizer: None,
    },
    FieldSpec {
        name: "order",
        kind: FieldKind::Str,
        nullable: false,
        default: Some("desc"),
        allowed: &["asc", "desc"],
        normalizer: None,
    },
    FieldSpec {
        name: "sort",
        kind: FieldKind::Str,
        nullable: false,
        default: Some("activity"),
        allowed: &["activity", "creation", "votes", "relevance"],
        normalizer: None,
    },
    FieldSpec {
        name: "tagged",
        kind: FieldKind::Str,
        nullable: true,
        default: None,
        allowed: &[],
        normalizer: None,
    },
    FieldSpec {
        name: "nottagged",
        kind: FieldKind::Str,
        nullable: true,
        default: None,
        allowed: &[],
        // the API only honors nottagged when tagged is present
        normalizer: Some(only_with_tagged),
    },
    FieldSpec {
        name: "intitle",
        kind: FieldKind::Str,
        nullable: true,
        default: None,
        allowed: &[],
        normalizer: None,
    },
    FieldSpec {
        name: "page",
        kind: FieldKind::Int,
        nullable: true,
        default: None,
        allowed: &[],
        normalizer: None,
    },
    FieldSpec {
        name: "pagesize",
        kind: FieldKind::Int,
        nullable: true,
        default: None,
        allowed: &[],
        normalizer: None,
    },
    FieldSpec {
        name: "fromdate",
        kind: FieldKind::Int,
        nullable: true,
        default: None,
        allowed: &[],
        normalizer: None,
    },
    FieldSpec {
        name: "todate",
        kind: FieldKind::Int,
        nullable: true,
        default: None,
        allowed: &[],
        normalizer: None,
    },
    FieldSpec {
        name: "min",
        kind: FieldKind::Int,
        nullable: true,
        default: None,
        allowed: &[],
        // min/max are thresholds on the sort field; relevance has none
        normalizer: Some(not_under_relevance),
    },
    FieldSpec {
        name: "max",
        kind: FieldKind::Int,
        nullable: true,
        default: None,
        allowed: &[],
        normalizer: Some(not_under_relevance),
    },
];

fn only_with_tagged(
    resolved: &BTreeMap<&'static str, OptionValue>,
    value: OptionValue,
) -> Option<OptionValue> {
    // an empty tag list counts as unset
    match resolved.get("tagged") {
        Some(OptionValue::Str(tags)) if !tags.is_empty() => Some(value),
        _ => None,
    }
}

fn not_under_relevance(
    resolved: &BTreeMap<&'static str, OptionValue>,
    value: OptionValue,
) -> Option<OptionValue> {
    match resolved.get("sort") {
        Some(OptionValue::Str(sort)) if sort == "relevance" => None,
        _ => Some(value),
    }
}

impl FieldSpec {
    fn expected(&self) -> &'static str {
        match (self.kind, self.nullable) {
            (FieldKind::Str, false) => "string",
            (FieldKind::Str, true) => "null or string",
            (FieldKind::Int, false) => "integer",
            (FieldKind::Int, true) => "null or integer",
        }
    }

    fn type_mismatch(&self, value: &Value) -> Error {
        Error::TypeMismatch {
            option: self.name,
            expected: self.expected(),
            actual: json_type_name(value).to_string(),
        }
    }

    fn parse(&self, value: &Value) -> Result<OptionValue> {
        match (self.kind, value) {
            (FieldKind::Str, Value::String(s)) => Ok(OptionValue::Str(s.clone())),
            (FieldKind::Int, Value::Number(n)) => {
                n.as_i64().map(OptionValue::Int).ok_or_else(|| self.type_mismatch(value))
            }
            _ => Err(self.type_mismatch(value)),
        }
    }

    fn check_allowed(&self, value: &OptionValue) -> Result<()> {
        if self.allowed.is_empty() {
            return Ok(());
        }
        match value.as_str() {
            Some(s) if self.allowed.contains(&s) => Ok(()),
            _ => Err(Error::InvalidValue {
                option: self.name,
                value: value.to_string(),
                allowed: self.allowed,
            }),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.as_i64().is_some() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The validated, normalized set of query parameters for one search.
///
/// Built once from caller input, normalized immediately, and held
/// immutably afterwards. Fields that are unset or normalized to null
/// are absent from the mapping entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    values: BTreeMap<&'static str, OptionValue>,
}

impl SearchOptions {
    /// Validates and normalizes a raw options value, which must be a
    /// JSON object mapping option names to strings, integers, or null.
    ///
    /// # Examples
    ///
    /// ```
    /// use stackexchange_search::SearchOptions;
    ///
    /// let opts = SearchOptions::from_value(serde_json::json!({
    ///     "tagged": "rust",
    ///     "sort": "votes",
    /// }))
    /// .unwrap();
    ///
    /// assert_eq!(opts.get("site").and_then(|v| v.as_str()), Some("stackoverflow"));
    /// assert_eq!(opts.get("sort").and_then(|v| v.as_str()), Some("votes"));
    /// ```
    pub fn from_value(raw: Value) -> Result<Self> {
        match raw {
            Value::Object(map) => Self::resolve(&map),
            _ => Err(Error::OptionsNotAnObject),
        }
    }

    /// Validates and normalizes a raw options mapping.
    ///
    /// Resolution is pure and deterministic: no I/O, and the same input
    /// always yields the same normalized mapping or the same error.
    pub fn resolve(raw: &Map<String, Value>) -> Result<Self> {
        for key in raw.keys() {
            if !SCHEMA.iter().any(|field| field.name == key) {
                return Err(Error::UnknownOption(key.clone()));
            }
        }

        let mut resolved = BTreeMap::new();
        for field in SCHEMA {
            match raw.get(field.name) {
                Some(Value::Null) if field.nullable => {}
                Some(Value::Null) => return Err(field.type_mismatch(&Value::Null)),
                Some(value) => {
                    let parsed = field.parse(value)?;
                    field.check_allowed(&parsed)?;
                    resolved.insert(field.name, parsed);
                }
                None => {}
            }
            if !resolved.contains_key(field.name) {
                if let Some(default) = field.default {
                    resolved.insert(field.name, OptionValue::from(default));
                }
            }
        }

        // Normalizers all read `resolved`, the defaulted snapshot, so no
        // rule ever observes another rule's output.
        let mut values = BTreeMap::new();
        for field in SCHEMA {
            let Some(value) = resolved.get(field.name) else { continue };
            let kept = match field.normalizer {
                Some(normalize) => normalize(&resolved, value.clone()),
                None => Some(value.clone()),
            };
            if let Some(value) = kept {
                values.insert(field.name, value);
            }
        }

        Ok(Self { values })
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    /// Iterates set fields in stable (alphabetical) order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &OptionValue)> {
        self.values.iter().map(|(name, value)| (*name, value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Renders the options back into a raw mapping. Resolving that
    /// mapping again yields an identical `SearchOptions`.
    pub fn to_map(&self) -> Map<String, Value> {
        self.values
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_json()))
            .collect()
    }
}
