use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::db::models::{Medication, MedicationRequest, MedicationRequestRow, SharedMedication};

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Invalid medication request {id}: {reason}")]
    InvalidRow { id: i32, reason: String },
    #[error("Stock of {quantity} units for medication {id} does not fit the database column")]
    StockOutOfRange { id: i32, quantity: u32 },
    #[error("Medication {id} does not exist")]
    MissingMedication { id: i32 },
}

/// Read access to medication requests together with their medication stock.
#[async_trait]
pub trait MedicationRequestRepository: Send + Sync {
    /// Looks up a request by id. `Ok(None)` means no such request exists.
    async fn get_one(&self, id: i32) -> Result<Option<MedicationRequest>, RepositoryError>;

    /// Persists the stock of a medication after it was changed through a
    /// request's handle.
    ///
    /// Stores that hand out live handles have nothing to write back.
    async fn save_stock(&self, _medication: &Medication) -> Result<(), RepositoryError> {
        Ok(())
    }
}

/// Requests held in memory. Every request returned by [`get_one`] shares its
/// medication handle with the store, so stock changes are visible to later
/// lookups.
///
/// [`get_one`]: MedicationRequestRepository::get_one
#[derive(Debug, Default, Clone)]
pub struct InMemoryMedicationRequestRepository {
    requests: HashMap<i32, MedicationRequest>,
}

impl InMemoryMedicationRequestRepository {
    pub fn new(requests: impl IntoIterator<Item = MedicationRequest>) -> Self {
        Self {
            requests: requests
                .into_iter()
                .map(|request| (request.id, request))
                .collect(),
        }
    }

    /// Handle onto the medication with the given id, if any request references it.
    pub fn medication(&self, medication_id: i32) -> Option<SharedMedication> {
        self.requests
            .values()
            .find(|request| request.medication_id == medication_id)
            .map(|request| request.medication.clone())
    }
}

#[async_trait]
impl MedicationRequestRepository for InMemoryMedicationRequestRepository {
    async fn get_one(&self, id: i32) -> Result<Option<MedicationRequest>, RepositoryError> {
        Ok(self.requests.get(&id).cloned())
    }
}

const SELECT_REQUEST: &str = "SELECT r.id, r.patient_name, r.patient_email, r.doctor_name, \
     r.diagnosis, r.quantity, r.request_date, r.medication_id, \
     m.name AS medication_name, m.description AS medication_description, \
     m.quantity AS medication_quantity \
     FROM medication_requests r \
     JOIN medications m ON m.id = r.medication_id \
     WHERE r.id = $1";

/// Postgres-backed store. Each lookup yields a detached medication handle,
/// so stock changes are written back through [`save_stock`].
///
/// [`save_stock`]: MedicationRequestRepository::save_stock
#[derive(Debug, Clone)]
pub struct PgMedicationRequestRepository {
    pool: PgPool,
}

impl PgMedicationRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MedicationRequestRepository for PgMedicationRequestRepository {
    async fn get_one(&self, id: i32) -> Result<Option<MedicationRequest>, RepositoryError> {
        let row = sqlx::query_as::<_, MedicationRequestRow>(SELECT_REQUEST)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(MedicationRequest::try_from).transpose()
    }

    async fn save_stock(&self, medication: &Medication) -> Result<(), RepositoryError> {
        let quantity =
            i32::try_from(medication.quantity).map_err(|_| RepositoryError::StockOutOfRange {
                id: medication.id,
                quantity: medication.quantity,
            })?;

        let result = sqlx::query("UPDATE medications SET quantity = $1 WHERE id = $2")
            .bind(quantity)
            .bind(medication.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::MissingMedication { id: medication.id });
        }

        Ok(())
    }
}

impl TryFrom<MedicationRequestRow> for MedicationRequest {
    type Error = RepositoryError;

    fn try_from(row: MedicationRequestRow) -> Result<Self, Self::Error> {
        let invalid = |reason: &str| RepositoryError::InvalidRow {
            id: row.id,
            reason: reason.to_string(),
        };

        let quantity = u32::try_from(row.quantity)
            .ok()
            .filter(|quantity| *quantity > 0)
            .ok_or_else(|| invalid("requested quantity must be positive"))?;
        let stock = u32::try_from(row.medication_quantity)
            .map_err(|_| invalid("medication stock is negative"))?;

        let medication = Medication::new(
            row.medication_id,
            row.medication_name,
            row.medication_description,
            stock,
        );

        Ok(MedicationRequest {
            id: row.id,
            patient_name: row.patient_name,
            patient_email: row.patient_email,
            doctor_name: row.doctor_name,
            diagnosis: row.diagnosis,
            quantity,
            request_date: row.request_date,
            medication_id: row.medication_id,
            medication: medication.into_shared(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(quantity: i32, medication_quantity: i32) -> MedicationRequestRow {
        MedicationRequestRow {
            id: 7,
            patient_name: "Nikola Nikolić".to_string(),
            patient_email: "nikola@example.com".to_string(),
            doctor_name: "Dr. Petrović".to_string(),
            diagnosis: "Anxiety".to_string(),
            quantity,
            request_date: NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            medication_id: 4,
            medication_name: "Diazepam".to_string(),
            medication_description: "Sedative".to_string(),
            medication_quantity,
        }
    }

    #[test]
    fn converts_valid_row() {
        let request = MedicationRequest::try_from(row(2, 30)).unwrap();

        assert_eq!(request.quantity, 2);
        assert_eq!(request.medication_id, 4);
        let medication = request.lock_medication();
        assert_eq!(medication.name, "Diazepam");
        assert_eq!(medication.quantity, 30);
    }

    #[test]
    fn rejects_non_positive_requested_quantity() {
        let err = MedicationRequest::try_from(row(0, 30)).unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidRow { id: 7, .. }));
    }

    #[test]
    fn rejects_negative_stock() {
        let err = MedicationRequest::try_from(row(2, -1)).unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidRow { id: 7, .. }));
    }

    #[tokio::test]
    async fn in_memory_lookups_share_medication() {
        let medication = Medication::new(1, "Paracetamol", "Pain relief", 10).into_shared();
        let request = MedicationRequest {
            medication: medication.clone(),
            ..MedicationRequest::try_from(row(2, 30)).unwrap()
        };
        let repository = InMemoryMedicationRequestRepository::new([request]);

        let found = repository.get_one(7).await.unwrap().unwrap();
        found.lock_medication().quantity = 3;

        assert_eq!(medication.lock().unwrap().quantity, 3);
        assert!(repository.get_one(8).await.unwrap().is_none());
    }
}
