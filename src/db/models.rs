use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Medication stock shared between every request that references it.
pub type SharedMedication = Arc<Mutex<Medication>>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Medication {
    pub id: i32,
    pub name: String,
    pub description: String,
    /// Units currently in stock.
    pub quantity: u32,
}

impl Medication {
    pub fn new(id: i32, name: impl Into<String>, description: impl Into<String>, quantity: u32) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            quantity,
        }
    }

    pub fn into_shared(self) -> SharedMedication {
        Arc::new(Mutex::new(self))
    }
}

/// A patient's request for a quantity of one medication.
///
/// The request does not own its medication: `medication` is a handle onto
/// stock that other requests may reference as well.
#[derive(Debug, Clone)]
pub struct MedicationRequest {
    pub id: i32,
    pub patient_name: String,
    pub patient_email: String,
    pub doctor_name: String,
    pub diagnosis: String,
    /// Requested units, always positive.
    pub quantity: u32,
    pub request_date: NaiveDateTime,
    pub medication_id: i32,
    pub medication: SharedMedication,
}

impl MedicationRequest {
    /// Locks the referenced medication.
    ///
    /// A poisoned lock still yields the medication: stock updates are a single
    /// assignment, so a panicking holder cannot leave it half-written.
    pub fn lock_medication(&self) -> MutexGuard<'_, Medication> {
        self.medication.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug)]
pub struct MedicationRequestRow {
    pub id: i32,
    pub patient_name: String,
    pub patient_email: String,
    pub doctor_name: String,
    pub diagnosis: String,
    pub quantity: i32,
    pub request_date: NaiveDateTime,
    pub medication_id: i32,
    pub medication_name: String,
    pub medication_description: String,
    pub medication_quantity: i32,
}
