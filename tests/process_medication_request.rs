use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use medication_requests::db::repository::InMemoryMedicationRequestRepository;
use medication_requests::db::seed::sample_requests;
use medication_requests::{
    EmailError, EmailSender, MedicationRequestError, MedicationRequestService, ProcessingResult,
};

#[derive(Debug, Clone, PartialEq)]
struct SentEmail {
    recipient: String,
    subject: String,
    body: String,
}

#[derive(Default)]
struct RecordingEmailSender {
    sent: Mutex<Vec<SentEmail>>,
}

impl RecordingEmailSender {
    fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send_email(&self, recipient: &str, subject: &str, body: &str) -> Result<(), EmailError> {
        self.sent.lock().unwrap().push(SentEmail {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

fn create_service() -> (
    MedicationRequestService,
    Arc<InMemoryMedicationRequestRepository>,
    Arc<RecordingEmailSender>,
) {
    let repository = Arc::new(InMemoryMedicationRequestRepository::new(sample_requests()));
    let sender = Arc::new(RecordingEmailSender::default());
    let service = MedicationRequestService::new(repository.clone(), sender.clone());
    (service, repository, sender)
}

fn stock(repository: &InMemoryMedicationRequestRepository, medication_id: i32) -> u32 {
    let medication = repository.medication(medication_id).unwrap();
    let quantity = medication.lock().unwrap().quantity;
    quantity
}

#[tokio::test]
async fn unknown_request_is_not_found() {
    let (service, repository, sender) = create_service();

    let err = service.process_medication_request(0).await.unwrap_err();

    assert!(matches!(err, MedicationRequestError::NotFound { id: 0 }));
    assert!(sender.sent().is_empty());
    assert_eq!(
        (1..=4).map(|id| stock(&repository, id)).collect::<Vec<_>>(),
        vec![0, 2, 80, 30]
    );
}

#[tokio::test]
async fn empty_stock_is_out_of_stock() {
    let (service, repository, sender) = create_service();

    let err = service.process_medication_request(1).await.unwrap_err();

    assert!(matches!(
        err,
        MedicationRequestError::OutOfStock { ref medication } if medication == "Paracetamol"
    ));
    assert_eq!(stock(&repository, 1), 0);
    assert!(sender.sent().is_empty());
}

#[tokio::test]
async fn partial_stock_is_insufficient() {
    let (service, repository, sender) = create_service();

    let err = service.process_medication_request(2).await.unwrap_err();

    assert!(matches!(
        err,
        MedicationRequestError::InsufficientStock {
            available: 2,
            requested: 5,
            ..
        }
    ));
    assert_eq!(stock(&repository, 2), 2);
    assert!(sender.sent().is_empty());
}

#[tokio::test]
async fn successful_request_reduces_stock_and_notifies_patient() {
    let (service, repository, sender) = create_service();

    let result = service.process_medication_request(3).await.unwrap();

    assert_eq!(
        result,
        ProcessingResult {
            medication_name: "Amoxicillin".to_string(),
            message: "Medication request is successfully processed.".to_string(),
        }
    );
    assert_eq!(stock(&repository, 3), 65);
    assert_eq!(
        sender.sent(),
        vec![SentEmail {
            recipient: "ivana@example.com".to_string(),
            subject: "New Medication Request".to_string(),
            body: "Patient Ivana Lukić requested 15 of medication Amoxicillin.".to_string(),
        }]
    );
}

#[tokio::test]
async fn repeated_processing_drains_stock_until_insufficient() {
    let (service, repository, sender) = create_service();

    for _ in 0..5 {
        service.process_medication_request(3).await.unwrap();
    }
    let err = service.process_medication_request(3).await.unwrap_err();

    assert!(matches!(
        err,
        MedicationRequestError::InsufficientStock {
            available: 5,
            requested: 15,
            ..
        }
    ));
    assert_eq!(stock(&repository, 3), 5);
    assert_eq!(sender.sent().len(), 5);
}
