use serde_json::Value;
use sqlx::PgPool;

use crate::database::executor;
use crate::database::models::job::{JOB_COLUMNS, JOB_FILTERS, JOB_UPDATE};
use crate::database::models::{Company, Job, JobDetail, NewJob};
use crate::database::{sql_for_partial_update, DatabaseError, UpdateSpec};
use crate::filter::{Filter, FilterSpec, SortDirection, SqlResult};

const RETURNING: &str = "RETURNING id, title, salary, equity, company_handle";

pub async fn create(pool: &PgPool, job: &NewJob) -> Result<Job, DatabaseError> {
    sqlx::query_as::<_, Job>(&format!(
        "INSERT INTO jobs (title, salary, equity, company_handle)
         VALUES ($1, $2, $3, $4)
         {}",
        RETURNING
    ))
    .bind(&job.title)
    .bind(job.salary)
    .bind(job.equity)
    .bind(&job.company_handle)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        DatabaseError::from_constraint(
            e,
            || DatabaseError::Duplicate(format!("Duplicate job: '{}'", job.title)),
            |_| DatabaseError::NotFound(format!("No company: {}", job.company_handle)),
        )
    })
}

pub fn list_sql(filters: &FilterSpec) -> Result<SqlResult, DatabaseError> {
    let mut filter = Filter::new("jobs")?;
    filter
        .select(JOB_COLUMNS)?
        .where_spec(JOB_FILTERS, filters)?
        .order("title", SortDirection::Asc)?;
    Ok(filter.to_sql())
}

pub async fn find_all(pool: &PgPool, filters: &FilterSpec) -> Result<Vec<Job>, DatabaseError> {
    let sql = list_sql(filters)?;
    Ok(executor::fetch_all_as::<Job>(pool, &sql).await?)
}

pub async fn get(pool: &PgPool, id: i32) -> Result<JobDetail, DatabaseError> {
    let job = sqlx::query_as::<_, Job>(&format!("SELECT {} FROM jobs WHERE id = $1", JOB_COLUMNS.join(", ")))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("No job: {}", id)))?;

    let company = sqlx::query_as::<_, Company>(
        "SELECT handle, name, description, num_employees, logo_url
         FROM companies
         WHERE handle = $1",
    )
    .bind(&job.company_handle)
    .fetch_one(pool)
    .await?;

    Ok(JobDetail::new(job, company))
}

/// Equity arrives as a JSON number or a numeric string; the column is
/// NUMERIC, so strings are converted to numbers before binding.
fn normalize_equity(changes: &mut UpdateSpec) -> Result<(), DatabaseError> {
    if let Some(Value::String(raw)) = changes.get("equity") {
        let parsed: f64 = raw
            .trim()
            .parse()
            .map_err(|_| DatabaseError::InvalidData("equity must be a number".to_string()))?;
        let number = serde_json::Number::from_f64(parsed)
            .ok_or_else(|| DatabaseError::InvalidData("equity must be a number".to_string()))?;
        changes.replace("equity", Value::Number(number));
    }
    Ok(())
}

pub fn update_sql(id: i32, changes: &UpdateSpec) -> Result<SqlResult, DatabaseError> {
    let mut changes = changes.clone();
    normalize_equity(&mut changes)?;

    let update = sql_for_partial_update(&changes, &JOB_UPDATE)?;
    let query = format!(
        "UPDATE jobs SET {} WHERE id = {} {}",
        update.set_clause,
        update.next_placeholder(),
        RETURNING
    );
    let mut params = update.params;
    params.push(Value::from(id));
    Ok(SqlResult { query, params })
}

pub async fn update(pool: &PgPool, id: i32, changes: &UpdateSpec) -> Result<Job, DatabaseError> {
    let sql = update_sql(id, changes)?;
    executor::fetch_optional_as::<Job>(pool, &sql)
        .await
        .map_err(|e| {
            DatabaseError::from_constraint(
                e,
                || DatabaseError::Duplicate("Duplicate job title".to_string()),
                |_| DatabaseError::InvalidData("Invalid job reference".to_string()),
            )
        })?
        .ok_or_else(|| DatabaseError::NotFound(format!("No job: {}", id)))
}

pub async fn remove(pool: &PgPool, id: i32) -> Result<(), DatabaseError> {
    let deleted = sqlx::query("DELETE FROM jobs WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(DatabaseError::NotFound(format!("No job: {}", id)));
    }
    Ok(())
}
