use medication_requests::db;

type Error = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let pool = db::init_db(&std::env::var("DATABASE_URL")?).await?;
    db::seed::seed_database(&pool).await?;
    Ok(())
}
