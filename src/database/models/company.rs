use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::job::Job;
use crate::database::partial_update::UpdateColumns;
use crate::filter::FilterDef;

pub const COMPANY_COLUMNS: &[&str] = &["handle", "name", "description", "num_employees", "logo_url"];

pub const COMPANY_FILTERS: &[FilterDef] = &[
    FilterDef::text("nameLike", "name"),
    FilterDef::min("minEmployees", "num_employees").non_negative(),
    FilterDef::max("maxEmployees", "num_employees").non_negative(),
];

/// The handle is the key and cannot be changed.
pub const COMPANY_UPDATE: UpdateColumns = UpdateColumns {
    columns: &["name", "description"],
    remap: &[("numEmployees", "num_employees"), ("logoUrl", "logo_url")],
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCompany {
    #[validate(length(min = 1, max = 25, message = "must be 1-25 characters"))]
    pub handle: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    pub description: String,
    #[validate(range(min = 0, message = "must be >= 0"))]
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}
