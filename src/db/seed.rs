use chrono::{Duration, NaiveDateTime, Utc};
use sqlx::PgPool;

use crate::db::models::{Medication, MedicationRequest};

struct SeedRequest {
    id: i32,
    patient_name: &'static str,
    patient_email: &'static str,
    doctor_name: &'static str,
    diagnosis: &'static str,
    quantity: u32,
    days_ago: i64,
    medication: (i32, &'static str, &'static str, u32),
}

static SEED_REQUESTS: [SeedRequest; 4] = [
    SeedRequest {
        id: 1,
        patient_name: "Ana Petrović",
        patient_email: "ana@example.com",
        doctor_name: "Dr. Ilić",
        diagnosis: "Headache",
        quantity: 10,
        days_ago: 5,
        medication: (1, "Paracetamol", "Pain relief", 0),
    },
    SeedRequest {
        id: 2,
        patient_name: "Marko Jovanović",
        patient_email: "marko@example.com",
        doctor_name: "Dr. Kovač",
        diagnosis: "Inflammation",
        quantity: 5,
        days_ago: 3,
        medication: (2, "Ibuprofen", "Anti-inflammatory", 2),
    },
    SeedRequest {
        id: 3,
        patient_name: "Ivana Lukić",
        patient_email: "ivana@example.com",
        doctor_name: "Dr. Janković",
        diagnosis: "Infection",
        quantity: 15,
        days_ago: 2,
        medication: (3, "Amoxicillin", "Antibiotic", 80),
    },
    SeedRequest {
        id: 4,
        patient_name: "Nikola Nikolić",
        patient_email: "nikola@example.com",
        doctor_name: "Dr. Petrović",
        diagnosis: "Anxiety",
        quantity: 2,
        days_ago: 1,
        medication: (4, "Diazepam", "Sedative", 30),
    },
];

fn request_date(now: NaiveDateTime, days_ago: i64) -> NaiveDateTime {
    now - Duration::days(days_ago)
}

/// The sample requests, each with its own medication handle.
pub fn sample_requests() -> Vec<MedicationRequest> {
    let now = Utc::now().naive_utc();

    SEED_REQUESTS
        .iter()
        .map(|seed| {
            let (medication_id, name, description, stock) = seed.medication;
            MedicationRequest {
                id: seed.id,
                patient_name: seed.patient_name.to_string(),
                patient_email: seed.patient_email.to_string(),
                doctor_name: seed.doctor_name.to_string(),
                diagnosis: seed.diagnosis.to_string(),
                quantity: seed.quantity,
                request_date: request_date(now, seed.days_ago),
                medication_id,
                medication: Medication::new(medication_id, name, description, stock).into_shared(),
            }
        })
        .collect()
}

/// Inserts the sample medications and requests. Rows that already exist are left alone.
pub async fn seed_database(pool: &PgPool) -> Result<(), sqlx::Error> {
    let now = Utc::now().naive_utc();
    let mut transaction = pool.begin().await?;

    for seed in &SEED_REQUESTS {
        let (medication_id, name, description, stock) = seed.medication;
        sqlx::query(
            "INSERT INTO medications (id, name, description, quantity) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(medication_id)
        .bind(name)
        .bind(description)
        .bind(stock as i32)
        .execute(&mut *transaction)
        .await?;

        sqlx::query(
            "INSERT INTO medication_requests \
             (id, patient_name, patient_email, doctor_name, diagnosis, quantity, request_date, medication_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) ON CONFLICT (id) DO NOTHING",
        )
        .bind(seed.id)
        .bind(seed.patient_name)
        .bind(seed.patient_email)
        .bind(seed.doctor_name)
        .bind(seed.diagnosis)
        .bind(seed.quantity as i32)
        .bind(request_date(now, seed.days_ago))
        .bind(medication_id)
        .execute(&mut *transaction)
        .await?;
    }

    transaction.commit().await?;
    log::info!("Seeded {} medication requests", SEED_REQUESTS.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_requests_cover_every_stock_tier() {
        let requests = sample_requests();
        let stock_and_requested: Vec<_> = requests
            .iter()
            .map(|request| (request.lock_medication().quantity, request.quantity))
            .collect();

        assert_eq!(stock_and_requested, vec![(0, 10), (2, 5), (80, 15), (30, 2)]);
        assert!(requests
            .iter()
            .all(|request| request.request_date < Utc::now().naive_utc()));
    }
}
