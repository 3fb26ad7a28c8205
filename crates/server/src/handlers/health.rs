use axum::response::IntoResponse;
use chrono::Utc;

use crate::service::ApiResponse;
use crate::types::{HealthResponse, HealthStatus};

pub async fn health_check_handler() -> impl IntoResponse {
    ApiResponse {
        payload: HealthResponse {
            data: HealthStatus {
                status: "alive".to_owned(),
                timestamp: Utc::now().to_rfc3339(),
            },
        },
    }
}
