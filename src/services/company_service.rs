use serde_json::Value;
use sqlx::PgPool;

use crate::database::executor;
use crate::database::models::company::{COMPANY_COLUMNS, COMPANY_FILTERS, COMPANY_UPDATE};
use crate::database::models::job::JOB_COLUMNS;
use crate::database::models::{Company, CompanyDetail, Job, NewCompany};
use crate::database::{sql_for_partial_update, DatabaseError, UpdateSpec};
use crate::filter::{Filter, FilterSpec, SortDirection, SqlResult};

const RETURNING: &str = "RETURNING handle, name, description, num_employees, logo_url";

/// Single insert; the primary key and unique name decide duplicates.
pub async fn create(pool: &PgPool, company: &NewCompany) -> Result<Company, DatabaseError> {
    sqlx::query_as::<_, Company>(&format!(
        "INSERT INTO companies (handle, name, description, num_employees, logo_url)
         VALUES ($1, $2, $3, $4, $5)
         {}",
        RETURNING
    ))
    .bind(&company.handle)
    .bind(&company.name)
    .bind(&company.description)
    .bind(company.num_employees)
    .bind(&company.logo_url)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        DatabaseError::from_constraint(
            e,
            || DatabaseError::Duplicate(format!("Duplicate company: {}", company.handle)),
            |_| DatabaseError::InvalidData("Invalid company reference".to_string()),
        )
    })
}

pub fn list_sql(filters: &FilterSpec) -> Result<SqlResult, DatabaseError> {
    let mut filter = Filter::new("companies")?;
    filter
        .select(COMPANY_COLUMNS)?
        .where_spec(COMPANY_FILTERS, filters)?
        .order("name", SortDirection::Asc)?;
    Ok(filter.to_sql())
}

pub async fn find_all(pool: &PgPool, filters: &FilterSpec) -> Result<Vec<Company>, DatabaseError> {
    let sql = list_sql(filters)?;
    Ok(executor::fetch_all_as::<Company>(pool, &sql).await?)
}

pub async fn get(pool: &PgPool, handle: &str) -> Result<CompanyDetail, DatabaseError> {
    let company = sqlx::query_as::<_, Company>(
        "SELECT handle, name, description, num_employees, logo_url
         FROM companies
         WHERE handle = $1",
    )
    .bind(handle)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound(format!("No company: {}", handle)))?;

    let jobs = sqlx::query_as::<_, Job>(&format!(
        "SELECT {} FROM jobs WHERE company_handle = $1 ORDER BY id",
        JOB_COLUMNS.join(", ")
    ))
    .bind(handle)
    .fetch_all(pool)
    .await?;

    Ok(CompanyDetail { company, jobs })
}

pub fn update_sql(handle: &str, changes: &UpdateSpec) -> Result<SqlResult, DatabaseError> {
    let update = sql_for_partial_update(changes, &COMPANY_UPDATE)?;
    let query = format!(
        "UPDATE companies SET {} WHERE handle = {} {}",
        update.set_clause,
        update.next_placeholder(),
        RETURNING
    );
    let mut params = update.params;
    params.push(Value::String(handle.to_string()));
    Ok(SqlResult { query, params })
}

pub async fn update(pool: &PgPool, handle: &str, changes: &UpdateSpec) -> Result<Company, DatabaseError> {
    let sql = update_sql(handle, changes)?;
    executor::fetch_optional_as::<Company>(pool, &sql)
        .await
        .map_err(|e| {
            DatabaseError::from_constraint(
                e,
                || DatabaseError::Duplicate("Duplicate company name".to_string()),
                |_| DatabaseError::InvalidData("Invalid company reference".to_string()),
            )
        })?
        .ok_or_else(|| DatabaseError::NotFound(format!("No company: {}", handle)))
}

/// Jobs of the company go with it (ON DELETE CASCADE).
pub async fn remove(pool: &PgPool, handle: &str) -> Result<(), DatabaseError> {
    let deleted = sqlx::query("DELETE FROM companies WHERE handle = $1")
        .bind(handle)
        .execute(pool)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(DatabaseError::NotFound(format!("No company: {}", handle)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unfiltered_list_orders_by_name() {
        let sql = list_sql(&FilterSpec::new()).unwrap();
        assert_eq!(
            sql.query,
            "SELECT \"handle\", \"name\", \"description\", \"num_employees\", \"logo_url\" FROM \"companies\" ORDER BY \"name\" ASC"
        );
        assert!(sql.params.is_empty());
    }

    #[test]
    fn filtered_list() {
        let spec = FilterSpec::new().with("nameLike", "c").with("minEmployees", 2);
        let sql = list_sql(&spec).unwrap();
        assert!(sql
            .query
            .ends_with("WHERE \"name\" ILIKE $1 AND \"num_employees\" >= $2 ORDER BY \"name\" ASC"));
        assert_eq!(sql.params, vec![json!("%c%"), json!(2)]);
    }

    #[test]
    fn list_rejects_unknown_filter() {
        let spec = FilterSpec::new().with("notAllowed", "blah");
        let err = list_sql(&spec).unwrap_err();
        assert_eq!(err.to_string(), "filter not allowed: notAllowed");
    }

    #[test]
    fn update_remaps_and_keys_by_handle() {
        let changes = UpdateSpec::new().with("name", "New").with("numEmployees", 10);
        let sql = update_sql("c1", &changes).unwrap();
        assert_eq!(
            sql.query,
            "UPDATE companies SET name = $1, num_employees = $2 WHERE handle = $3 RETURNING handle, name, description, num_employees, logo_url"
        );
        assert_eq!(sql.params, vec![json!("New"), json!(10), json!("c1")]);
    }

    #[test]
    fn update_cannot_change_handle() {
        let changes = UpdateSpec::new().with("handle", "c9");
        assert_eq!(update_sql("c1", &changes).unwrap_err().to_string(), "unrecognized field: handle");
    }

    #[test]
    fn update_requires_data() {
        assert_eq!(update_sql("c1", &UpdateSpec::new()).unwrap_err().to_string(), "No data");
    }
}
