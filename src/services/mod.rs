use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::db::models::{Medication, MedicationRequest};
use crate::db::repository::{MedicationRequestRepository, RepositoryError};
use email::{EmailError, EmailSender};

pub mod email;

pub const NOTIFICATION_SUBJECT: &str = "New Medication Request";
pub const SUCCESS_MESSAGE: &str = "Medication request is successfully processed.";

/// Outcome of a successfully processed request.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ProcessingResult {
    pub medication_name: String,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum MedicationRequestError {
    #[error("Medication request {id} not found")]
    NotFound { id: i32 },
    #[error("{medication} is out of stock")]
    OutOfStock { medication: String },
    #[error("Insufficient stock of {medication}: {available} available, {requested} requested")]
    InsufficientStock {
        medication: String,
        available: u32,
        requested: u32,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    /// The notification failed after the stock had already been reduced.
    #[error(transparent)]
    Email(#[from] EmailError),
}

/// Validates medication requests against stock, reduces the stock and notifies
/// the patient.
#[derive(Clone)]
pub struct MedicationRequestService {
    repository: Arc<dyn MedicationRequestRepository>,
    email_sender: Arc<dyn EmailSender>,
}

impl MedicationRequestService {
    pub fn new(
        repository: Arc<dyn MedicationRequestRepository>,
        email_sender: Arc<dyn EmailSender>,
    ) -> Self {
        Self {
            repository,
            email_sender,
        }
    }

    /// Processes the request with the given id.
    ///
    /// The steps run strictly in order: fetch the request, check the stock,
    /// reduce it, then email the patient. `NotFound`, `OutOfStock` and
    /// `InsufficientStock` leave the stock untouched and send nothing.
    ///
    /// A failed notification is returned as [`MedicationRequestError::Email`]
    /// and the stock reduction is not undone.
    pub async fn process_medication_request(
        &self,
        request_id: i32,
    ) -> Result<ProcessingResult, MedicationRequestError> {
        let request = self
            .repository
            .get_one(request_id)
            .await?
            .ok_or_else(|| {
                log::warn!("Medication request {} not found", request_id);
                MedicationRequestError::NotFound { id: request_id }
            })?;

        let medication = reserve_stock(&request)?;
        self.repository.save_stock(&medication).await?;

        let body = format!(
            "Patient {} requested {} of medication {}.",
            request.patient_name, request.quantity, medication.name
        );
        if let Err(e) = self
            .email_sender
            .send_email(&request.patient_email, NOTIFICATION_SUBJECT, &body)
            .await
        {
            log::error!(
                "Stock of {} reduced for request {} but the patient notification failed: {}",
                medication.name,
                request.id,
                e
            );
            return Err(e.into());
        }

        log::info!(
            "Processed request {}: {} x{}, {} left in stock",
            request.id,
            medication.name,
            request.quantity,
            medication.quantity
        );

        Ok(ProcessingResult {
            medication_name: medication.name,
            message: SUCCESS_MESSAGE.to_string(),
        })
    }
}

/// Checks the stock of the request's medication and takes the requested
/// quantity out of it. Returns the medication as it is after the decrement.
fn reserve_stock(request: &MedicationRequest) -> Result<Medication, MedicationRequestError> {
    let mut medication = request.lock_medication();

    match medication.quantity {
        0 => {
            log::warn!("Request {}: {} is out of stock", request.id, medication.name);
            Err(MedicationRequestError::OutOfStock {
                medication: medication.name.clone(),
            })
        }
        available if available < request.quantity => {
            log::warn!(
                "Request {}: {} units of {} requested, {} available",
                request.id,
                request.quantity,
                medication.name,
                available
            );
            Err(MedicationRequestError::InsufficientStock {
                medication: medication.name.clone(),
                available,
                requested: request.quantity,
            })
        }
        _ => {
            medication.quantity -= request.quantity;
            Ok(medication.clone())
        }
    }
}
