use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use super::company::Company;
use crate::database::partial_update::UpdateColumns;
use crate::filter::FilterDef;

pub const JOB_COLUMNS: &[&str] = &["id", "title", "salary", "equity", "company_handle"];

pub const JOB_FILTERS: &[FilterDef] = &[
    FilterDef::text("title", "title"),
    FilterDef::min("minSalary", "salary").non_negative(),
    FilterDef::presence("hasEquity", "equity"),
];

/// `id` and `company_handle` are fixed once a job exists.
pub const JOB_UPDATE: UpdateColumns = UpdateColumns {
    columns: &["title", "salary", "equity"],
    remap: &[],
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobDetail {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company: Company,
}

impl JobDetail {
    pub fn new(job: Job, company: Company) -> Self {
        Self {
            id: job.id,
            title: job.title,
            salary: job.salary,
            equity: job.equity,
            company,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewJob {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub title: String,
    #[validate(range(min = 0, message = "must be >= 0"))]
    pub salary: Option<i32>,
    #[validate(custom(function = "validate_equity"))]
    pub equity: Option<Decimal>,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub company_handle: String,
}

fn validate_equity(equity: &Decimal) -> Result<(), ValidationError> {
    if *equity < Decimal::ZERO || *equity > Decimal::ONE {
        return Err(ValidationError::new("range").with_message("must be between 0 and 1".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn equity_accepts_number_or_string() {
        let from_number: NewJob = serde_json::from_value(serde_json::json!({
            "title": "new", "salary": 10, "equity": 0.5, "companyHandle": "c1"
        }))
        .unwrap();
        let from_string: NewJob = serde_json::from_value(serde_json::json!({
            "title": "new", "salary": 10, "equity": "0.5", "companyHandle": "c1"
        }))
        .unwrap();
        assert_eq!(from_number.equity, from_string.equity);
    }

    #[test]
    fn equity_above_one_rejected() {
        let job = NewJob {
            title: "new".into(),
            salary: Some(10),
            equity: Some(Decimal::from_str("1.5").unwrap()),
            company_handle: "c1".into(),
        };
        assert!(job.validate().unwrap_err().field_errors().contains_key("equity"));
    }

    #[test]
    fn equity_bounds_inclusive() {
        for equity in [Decimal::ZERO, Decimal::ONE] {
            let job = NewJob {
                title: "new".into(),
                salary: None,
                equity: Some(equity),
                company_handle: "c1".into(),
            };
            assert!(job.validate().is_ok());
        }
    }

    #[test]
    fn negative_salary_rejected() {
        let job = NewJob {
            title: "new".into(),
            salary: Some(-1),
            equity: None,
            company_handle: "c1".into(),
        };
        assert!(job.validate().unwrap_err().field_errors().contains_key("salary"));
    }
}
