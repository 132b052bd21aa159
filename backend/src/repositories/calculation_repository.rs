//! Database repository for calculation records.
//!
//! Operands are persisted as a JSON array in a TEXT column.

use crate::database::models::Calculation;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

const CALCULATION_COLUMNS: &str =
    "id, user_id, operation, operands, result, created_at, updated_at";

#[derive(FromRow)]
struct CalculationRow {
    id: i64,
    user_id: i64,
    operation: String,
    operands: String,
    result: Option<f64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CalculationRow> for Calculation {
    type Error = anyhow::Error;

    fn try_from(row: CalculationRow) -> Result<Self> {
        let operands = serde_json::from_str(&row.operands)
            .with_context(|| format!("corrupt operands for calculation {}", row.id))?;

        Ok(Calculation {
            id: row.id,
            user_id: row.user_id,
            operation: row.operation,
            operands,
            result: row.result,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub struct CalculationRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> CalculationRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_calculation(
        &self,
        user_id: i64,
        operation: &str,
        operands: &[f64],
        result: Option<f64>,
    ) -> Result<Calculation> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, CalculationRow>(&format!(
            "INSERT INTO calculations (user_id, operation, operands, result, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING {CALCULATION_COLUMNS}"
        ))
        .bind(user_id)
        .bind(operation)
        .bind(serde_json::to_string(operands)?)
        .bind(result)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Fetches a calculation regardless of owner; ownership is checked by the caller.
    pub async fn get_calculation_by_id(&self, id: i64) -> Result<Option<Calculation>> {
        let row = sqlx::query_as::<_, CalculationRow>(&format!(
            "SELECT {CALCULATION_COLUMNS} FROM calculations WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Calculation::try_from).transpose()
    }

    pub async fn list_calculations_for_user(
        &self,
        user_id: i64,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Calculation>> {
        let rows = sqlx::query_as::<_, CalculationRow>(&format!(
            "SELECT {CALCULATION_COLUMNS} FROM calculations
             WHERE user_id = ?
             ORDER BY id
             LIMIT ? OFFSET ?"
        ))
        .bind(user_id)
        .bind(limit)
        .bind(skip)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Calculation::try_from).collect()
    }

    pub async fn update_calculation(
        &self,
        id: i64,
        operation: &str,
        operands: &[f64],
        result: Option<f64>,
    ) -> Result<Calculation> {
        let row = sqlx::query_as::<_, CalculationRow>(&format!(
            "UPDATE calculations
             SET operation = ?, operands = ?, result = ?, updated_at = ?
             WHERE id = ?
             RETURNING {CALCULATION_COLUMNS}"
        ))
        .bind(operation)
        .bind(serde_json::to_string(operands)?)
        .bind(result)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    pub async fn delete_calculation(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM calculations WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
