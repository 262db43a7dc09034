//! Processing of patient medication requests: stock validation, stock
//! decrement and patient notification.

pub mod config;
pub mod db;
pub mod handlers;
pub mod services;
pub mod utils;

pub use config::Config;
pub use db::models::{Medication, MedicationRequest, SharedMedication};
pub use db::repository::{MedicationRequestRepository, RepositoryError};
pub use services::email::{EmailError, EmailSender};
pub use services::{MedicationRequestError, MedicationRequestService, ProcessingResult};
