use serde_json::Value;

use super::error::FilterError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Case-insensitive substring match
    PartialText,
    MinNumeric,
    MaxNumeric,
    /// `column > 0` when the flag is true, nothing otherwise
    BooleanPresence,
}

/// One entry of a resource's filter allow-list. Allow-lists are declared as
/// constants next to the resource and never derived from request data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterDef {
    pub name: &'static str,
    pub column: &'static str,
    pub kind: FilterKind,
    pub non_negative: bool,
}

impl FilterDef {
    pub const fn text(name: &'static str, column: &'static str) -> Self {
        Self { name, column, kind: FilterKind::PartialText, non_negative: false }
    }

    pub const fn min(name: &'static str, column: &'static str) -> Self {
        Self { name, column, kind: FilterKind::MinNumeric, non_negative: false }
    }

    pub const fn max(name: &'static str, column: &'static str) -> Self {
        Self { name, column, kind: FilterKind::MaxNumeric, non_negative: false }
    }

    pub const fn presence(name: &'static str, column: &'static str) -> Self {
        Self { name, column, kind: FilterKind::BooleanPresence, non_negative: false }
    }

    pub const fn non_negative(mut self) -> Self {
        self.non_negative = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Number(i64),
    Flag(bool),
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Text(s.to_string())
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        FilterValue::Number(n)
    }
}

impl From<i32> for FilterValue {
    fn from(n: i32) -> Self {
        FilterValue::Number(n.into())
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue::Flag(b)
    }
}

/// Caller-supplied filters in the order they were given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    entries: Vec<(String, FilterValue)>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.entries.push((name.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Last occurrence wins when a name is repeated.
    pub fn get(&self, name: &str) -> Option<&FilterValue> {
        self.entries.iter().rev().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Types raw query-string pairs against an allow-list.
    pub fn parse(allow_list: &[FilterDef], pairs: &[(String, String)]) -> Result<Self, FilterError> {
        let mut entries = Vec::with_capacity(pairs.len());
        for (key, raw) in pairs {
            let def = allow_list
                .iter()
                .find(|d| d.name == key)
                .ok_or_else(|| FilterError::NotAllowed(key.clone()))?;

            let value = match def.kind {
                FilterKind::PartialText => FilterValue::Text(raw.clone()),
                FilterKind::MinNumeric | FilterKind::MaxNumeric => {
                    let n = raw.trim().parse::<i64>().map_err(|_| FilterError::InvalidValue {
                        name: key.clone(),
                        expected: "an integer",
                    })?;
                    FilterValue::Number(n)
                }
                FilterKind::BooleanPresence => {
                    let flag = match raw.trim().to_ascii_lowercase().as_str() {
                        "true" => true,
                        "false" => false,
                        _ => {
                            return Err(FilterError::InvalidValue {
                                name: key.clone(),
                                expected: "a boolean",
                            })
                        }
                    };
                    FilterValue::Flag(flag)
                }
            };
            entries.push((key.clone(), value));
        }
        Ok(Self { entries })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterOrderInfo {
    pub column: String,
    pub sort: SortDirection,
}

/// A statement template with positional `$n` placeholders and its values.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<Value>,
}
