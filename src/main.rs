use std::sync::Arc;

use dotenvy::dotenv;
use envconfig::Envconfig;
use teloxide::prelude::*;

use medication_requests::db::{self, repository::PgMedicationRequestRepository};
use medication_requests::{handlers, Config, MedicationRequestRepository, MedicationRequestService};

type Error = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load environment variables from a .env file if present
    dotenv().ok();

    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    log::info!("Starting the medication request bot...");

    let config = Config::init_from_env()?;

    let pool = db::init_db(&config.database_url).await?;
    let repository: Arc<dyn MedicationRequestRepository> =
        Arc::new(PgMedicationRequestRepository::new(pool));
    let service = MedicationRequestService::new(repository.clone(), config.email_sender()?);
    log::info!("Sending patient emails via {}", config.email_transport);

    let bot = Bot::new(config.telegram_bot_token);

    Dispatcher::builder(bot, handlers::schema())
        .dependencies(dptree::deps![service, repository])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("Shutting down gracefully");
    Ok(())
}
