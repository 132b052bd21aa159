//! Calculation records owned by individual users.
//!
//! Results are always recomputed from the stored operation and operands;
//! clients never supply them.

use crate::database::models::{
    Calculation, CreateCalculationRequest, ListQuery, UpdateCalculationRequest, User,
};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::calculation_repository::CalculationRepository;
use crate::services::evaluator::{self, Operation};
use sqlx::SqlitePool;
use tracing::{info, warn};
use validator::Validate;

pub struct CalculationService<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CalculationService<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Browse the caller's own calculations.
    pub async fn list(&self, user: &User, query: &ListQuery) -> ServiceResult<Vec<Calculation>> {
        query
            .validate()
            .map_err(ServiceError::from_validation_errors)?;

        let calculations = CalculationRepository::new(self.pool)
            .list_calculations_for_user(user.id, query.skip(), query.limit())
            .await?;
        Ok(calculations)
    }

    pub async fn create(
        &self,
        user: &User,
        request: CreateCalculationRequest,
    ) -> ServiceResult<Calculation> {
        let (operation, result) = Self::evaluate(&request.operation, &request.operands)?;

        let calculation = CalculationRepository::new(self.pool)
            .create_calculation(user.id, operation.as_str(), &request.operands, Some(result))
            .await?;

        info!(
            "User {} created calculation id={}",
            user.username, calculation.id
        );
        Ok(calculation)
    }

    /// Reads a calculation, enforcing ownership.
    ///
    /// # Errors
    /// - `NotFound` when no row has this id
    /// - `PermissionDenied` when the row belongs to someone else
    pub async fn get(&self, user: &User, id: i64) -> ServiceResult<Calculation> {
        let calculation = CalculationRepository::new(self.pool)
            .get_calculation_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Calculation", id.to_string()))?;

        if calculation.user_id != user.id {
            warn!(
                "User {} attempted to access calculation id={} of another user",
                user.username, id
            );
            return Err(ServiceError::permission_denied(
                "Not authorized to access this calculation",
            ));
        }

        Ok(calculation)
    }

    /// Full replacement (PUT).
    pub async fn replace(
        &self,
        user: &User,
        id: i64,
        request: CreateCalculationRequest,
    ) -> ServiceResult<Calculation> {
        self.get(user, id).await?;
        self.store(id, &request.operation, &request.operands).await
    }

    /// Partial update (PATCH); absent fields keep their stored values.
    pub async fn patch(
        &self,
        user: &User,
        id: i64,
        request: UpdateCalculationRequest,
    ) -> ServiceResult<Calculation> {
        let existing = self.get(user, id).await?;

        let operation = request.operation.unwrap_or(existing.operation);
        let operands = request.operands.unwrap_or(existing.operands);
        self.store(id, &operation, &operands).await
    }

    pub async fn delete(&self, user: &User, id: i64) -> ServiceResult<()> {
        self.get(user, id).await?;
        CalculationRepository::new(self.pool)
            .delete_calculation(id)
            .await?;

        info!("User {} deleted calculation id={}", user.username, id);
        Ok(())
    }

    async fn store(&self, id: i64, operation: &str, operands: &[f64]) -> ServiceResult<Calculation> {
        let (operation, result) = Self::evaluate(operation, operands)?;

        let calculation = CalculationRepository::new(self.pool)
            .update_calculation(id, operation.as_str(), operands, Some(result))
            .await?;
        Ok(calculation)
    }

    fn evaluate(operation: &str, operands: &[f64]) -> ServiceResult<(Operation, f64)> {
        let operation = operation.parse::<Operation>()?;
        let result = evaluator::evaluate(operation, operands)?;
        Ok((operation, result))
    }
}
