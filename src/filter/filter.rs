use serde_json::Value;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterDef, FilterOrderInfo, FilterSpec, SortDirection, SqlResult};

/// Builds a listing `SELECT` over one table: fixed columns, an optional
/// allow-listed predicate and the resource's canonical ordering.
pub struct Filter {
    table_name: String,
    select_columns: Vec<String>,
    where_clause: Option<(String, Vec<Value>)>,
    order_data: Vec<FilterOrderInfo>,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        if !is_identifier(&table_name) {
            return Err(FilterError::InvalidTableName(table_name));
        }
        Ok(Self {
            table_name,
            select_columns: vec![],
            where_clause: None,
            order_data: vec![],
        })
    }

    pub fn select(&mut self, columns: &[&str]) -> Result<&mut Self, FilterError> {
        for column in columns {
            if !is_identifier(column) {
                return Err(FilterError::InvalidColumn(column.to_string()));
            }
        }
        self.select_columns = columns.iter().map(|c| c.to_string()).collect();
        Ok(self)
    }

    pub fn where_spec(&mut self, allow_list: &[FilterDef], spec: &FilterSpec) -> Result<&mut Self, FilterError> {
        self.where_clause = FilterWhere::generate(allow_list, spec, 0)?;
        Ok(self)
    }

    pub fn order(&mut self, column: &str, sort: SortDirection) -> Result<&mut Self, FilterError> {
        if !is_identifier(column) {
            return Err(FilterError::InvalidColumn(column.to_string()));
        }
        self.order_data.push(FilterOrderInfo { column: column.to_string(), sort });
        Ok(self)
    }

    pub fn to_sql(&self) -> SqlResult {
        let (where_sql, params) = match &self.where_clause {
            Some((sql, params)) => (format!("WHERE {}", sql), params.clone()),
            None => (String::new(), vec![]),
        };

        let query = [
            format!("SELECT {}", self.build_select_clause()),
            format!("FROM \"{}\"", self.table_name),
            where_sql,
            FilterOrder::generate(&self.order_data),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlResult { query, params }
    }

    fn build_select_clause(&self) -> String {
        if self.select_columns.is_empty() {
            "*".to_string()
        } else {
            self.select_columns.iter().map(|c| format!("\"{}\"", c)).collect::<Vec<_>>().join(", ")
        }
    }
}

/// Letters, digits and underscores, not starting with a digit.
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
