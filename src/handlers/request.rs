use std::sync::Arc;

use teloxide::{prelude::*, types::ParseMode};

use crate::db::models::MedicationRequest;
use crate::db::repository::MedicationRequestRepository;
use crate::services::{MedicationRequestError, MedicationRequestService, ProcessingResult};
use crate::utils::{escape_markdown, format_date};

/// Runs a medication request through the service and tells the user how it went.
///
/// Failures of the request itself are reported to the user; only failures to
/// talk to Telegram are returned as errors.
pub async fn process_request(
    bot: Bot,
    msg: Message,
    service: MedicationRequestService,
    request_id: i32,
) -> ResponseResult<()> {
    let outcome = service.process_medication_request(request_id).await;
    bot.send_message(msg.chat.id, process_reply(&outcome)).await?;
    Ok(())
}

/// Shows a request together with the current stock of its medication.
pub async fn show_request(
    bot: Bot,
    msg: Message,
    repository: Arc<dyn MedicationRequestRepository>,
    request_id: i32,
) -> ResponseResult<()> {
    match repository.get_one(request_id).await {
        Ok(Some(request)) => {
            bot.send_message(msg.chat.id, request_summary(&request))
                .parse_mode(ParseMode::MarkdownV2)
                .await?;
        }
        Ok(None) => {
            bot.send_message(
                msg.chat.id,
                format!("No medication request with id {}.", request_id),
            )
            .await?;
        }
        Err(e) => {
            log::error!("Failed to load medication request {}: {}", request_id, e);
            bot.send_message(
                msg.chat.id,
                "Could not load the request, please try again later.",
            )
            .await?;
        }
    }

    Ok(())
}

fn process_reply(outcome: &Result<ProcessingResult, MedicationRequestError>) -> String {
    match outcome {
        Ok(result) => format!("✅ {}\nMedication: {}", result.message, result.medication_name),
        Err(MedicationRequestError::NotFound { id }) => {
            format!("No medication request with id {}.", id)
        }
        Err(MedicationRequestError::OutOfStock { medication }) => {
            format!("{} is out of stock. The request was not processed.", medication)
        }
        Err(MedicationRequestError::InsufficientStock {
            medication,
            available,
            requested,
        }) => format!(
            "Only {} units of {} are in stock but {} were requested. The request was not processed.",
            available, medication, requested
        ),
        Err(MedicationRequestError::Repository(e)) => {
            log::error!("Medication request store failed: {}", e);
            "Could not process the request, please try again later.".to_string()
        }
        Err(MedicationRequestError::Email(e)) => {
            log::error!("Patient notification failed: {}", e);
            "The stock was reserved but the patient could not be notified. Please contact the patient directly."
                .to_string()
        }
    }
}

fn request_summary(request: &MedicationRequest) -> String {
    let medication = request.lock_medication();
    format!(
        "💊 *Request {}*\n\
        *Patient:* {} \\({}\\)\n\
        *Doctor:* {}\n\
        *Diagnosis:* {}\n\
        *Medication:* {}\n\
        *Requested:* {} units\n\
        *In stock:* {} units\n\
        *Requested on:* {}",
        request.id,
        escape_markdown(&request.patient_name),
        escape_markdown(&request.patient_email),
        escape_markdown(&request.doctor_name),
        escape_markdown(&request.diagnosis),
        escape_markdown(&medication.name),
        request.quantity,
        medication.quantity,
        escape_markdown(&format_date(request.request_date)),
    )
}
