use chrono::{DateTime, NaiveDateTime, Utc};
use tokio_postgres::{Row, types::Type};
use tracing::warn;

use common::database::{DbPool, StoreError, StoreErrorKind};

use crate::models::appraisal::{Appraisal, NewAppraisal};

const PING: &str = "SELECT 1";

const LIST_NEWEST_FIRST: &str = "SELECT * FROM appraisals ORDER BY created_at DESC";

const LIST_UNORDERED: &str = "SELECT * FROM appraisals";

const INSERT_APPRAISAL: &str = r#"
    INSERT INTO appraisals (employee_name, employee_id, task_name, feedback, rating)
    VALUES ($1, $2, $3, $4, CAST($5::text AS INTEGER))
    RETURNING *
"#;

pub fn map_appraisal_row(row: &Row) -> Result<Appraisal, tokio_postgres::Error> {
    Ok(Appraisal {
        id: row.try_get("id")?,
        employee_name: row.try_get("employee_name")?,
        employee_id: row.try_get("employee_id")?,
        task_name: row.try_get("task_name")?,
        feedback: row.try_get("feedback")?,
        rating: row.try_get("rating")?,
        created_at: created_at(row)?,
    })
}

/// `None` only when the column is absent. Tables created with a plain
/// `TIMESTAMP` column are read as UTC.
fn created_at(row: &Row) -> Result<Option<DateTime<Utc>>, tokio_postgres::Error> {
    let Some(column) = row.columns().iter().find(|c| c.name() == "created_at") else {
        return Ok(None);
    };

    if *column.type_() == Type::TIMESTAMP {
        let naive: Option<NaiveDateTime> = row.try_get("created_at")?;
        Ok(naive.map(|naive| naive.and_utc()))
    } else {
        row.try_get("created_at")
    }
}

fn map_rows(rows: &[Row]) -> Result<Vec<Appraisal>, StoreError> {
    rows.iter()
        .map(map_appraisal_row)
        .collect::<Result<_, _>>()
        .map_err(StoreError::from)
}

pub async fn ping(pool: &DbPool) -> Result<(), StoreError> {
    let client = pool.get().await?;
    client.query_one(PING, &[]).await?;
    Ok(())
}

/// Newest first. If the store reports the ordering column as missing the
/// query is repeated once without `ORDER BY`.
pub async fn list_appraisals(pool: &DbPool) -> Result<Vec<Appraisal>, StoreError> {
    let client = pool.get().await?;

    let rows = match client.query(LIST_NEWEST_FIRST, &[]).await {
        Ok(rows) => rows,
        Err(e) => {
            let err = StoreError::from(e);
            if !err.is(StoreErrorKind::UndefinedColumn) {
                return Err(err);
            }
            warn!(
                code = err.code.as_deref().unwrap_or("-"),
                "Ordering column missing, listing appraisals unordered: {}", err
            );
            client.query(LIST_UNORDERED, &[]).await?
        }
    };

    map_rows(&rows)
}

pub async fn insert_appraisal(pool: &DbPool, new: &NewAppraisal) -> Result<Appraisal, StoreError> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            INSERT_APPRAISAL,
            &[
                &new.employee_name,
                &new.employee_id,
                &new.task_name,
                &new.feedback,
                &new.rating,
            ],
        )
        .await?;

    map_appraisal_row(&row).map_err(StoreError::from)
}
