use serde_json::Value;

use super::error::FilterError;
use super::types::{FilterDef, FilterKind, FilterSpec, FilterValue};

/// Compiles a [`FilterSpec`] into a conjunctive, fully parameterized predicate.
pub struct FilterWhere {
    param_values: Vec<Value>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    /// Returns `None` when no clause is active.
    pub fn generate(
        allow_list: &[FilterDef],
        spec: &FilterSpec,
        starting_param_index: usize,
    ) -> Result<Option<(String, Vec<Value>)>, FilterError> {
        Self::validate(allow_list, spec)?;

        let mut filter_where = Self::new(starting_param_index);
        let mut sql_conditions = vec![];
        for def in allow_list {
            if let Some(value) = spec.get(def.name) {
                if let Some(sql) = filter_where.build_sql_condition(def, value)? {
                    sql_conditions.push(sql);
                }
            }
        }

        if sql_conditions.is_empty() {
            return Ok(None);
        }
        Ok(Some((sql_conditions.join(" AND "), filter_where.param_values)))
    }

    /// All checks run before any SQL is produced.
    pub fn validate(allow_list: &[FilterDef], spec: &FilterSpec) -> Result<(), FilterError> {
        for (name, _) in spec.iter() {
            if !allow_list.iter().any(|d| d.name == name) {
                return Err(FilterError::NotAllowed(name.to_string()));
            }
        }

        for def in allow_list {
            if let Some(FilterValue::Number(n)) = spec.get(def.name) {
                if def.non_negative && *n < 0 {
                    return Err(FilterError::NegativeBound(def.name.to_string()));
                }
            }
        }

        for min_def in allow_list.iter().filter(|d| d.kind == FilterKind::MinNumeric) {
            let max_def = allow_list
                .iter()
                .find(|d| d.kind == FilterKind::MaxNumeric && d.column == min_def.column);
            if let Some(max_def) = max_def {
                if let (Some(FilterValue::Number(min)), Some(FilterValue::Number(max))) =
                    (spec.get(min_def.name), spec.get(max_def.name))
                {
                    if min > max {
                        return Err(FilterError::InvertedRange {
                            min: min_def.name.to_string(),
                            max: max_def.name.to_string(),
                        });
                    }
                }
            }
        }

        Ok(())
    }

    fn build_sql_condition(&mut self, def: &FilterDef, value: &FilterValue) -> Result<Option<String>, FilterError> {
        let quoted_column = format!("\"{}\"", def.column);
        match (def.kind, value) {
            (FilterKind::PartialText, FilterValue::Text(s)) => {
                Ok(Some(format!("{} ILIKE {}", quoted_column, self.param(Value::String(format!("%{}%", s))))))
            }
            (FilterKind::MinNumeric, FilterValue::Number(n)) => {
                Ok(Some(format!("{} >= {}", quoted_column, self.param(Value::from(*n)))))
            }
            (FilterKind::MaxNumeric, FilterValue::Number(n)) => {
                Ok(Some(format!("{} <= {}", quoted_column, self.param(Value::from(*n)))))
            }
            (FilterKind::BooleanPresence, FilterValue::Flag(true)) => Ok(Some(format!("{} > 0", quoted_column))),
            (FilterKind::BooleanPresence, FilterValue::Flag(false)) => Ok(None),
            (kind, _) => Err(FilterError::InvalidValue {
                name: def.name.to_string(),
                expected: match kind {
                    FilterKind::PartialText => "a string",
                    FilterKind::MinNumeric | FilterKind::MaxNumeric => "an integer",
                    FilterKind::BooleanPresence => "a boolean",
                },
            }),
        }
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}
