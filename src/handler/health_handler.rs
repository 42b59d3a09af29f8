use crate::config::database::DatabaseTrait;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

#[derive(Serialize, Deserialize, Debug)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
    pub uptime_seconds: u64,
    pub version: String,
    pub database: String,
}

static START_TIME: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

pub fn init_start_time() {
    START_TIME.set(Instant::now()).ok();
}

fn uptime_seconds() -> u64 {
    START_TIME
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0)
}

pub async fn health_check(
    State(db): State<Arc<crate::config::database::Database>>,
) -> Json<HealthStatus> {
    let database = match sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(db.get_pool())
        .await
    {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    Json(HealthStatus {
        status: if database == "healthy" { "healthy" } else { "unhealthy" }.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime_seconds: uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
    })
}
