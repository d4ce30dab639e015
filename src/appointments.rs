//! Placeholder appointments resource. Nothing is stored yet.

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{error::AppError, extractors::AppJson, state::AppState};

#[derive(Debug, Serialize)]
pub struct Appointment {
    pub id: i64,
    pub title: &'static str,
    pub date: &'static str,
}

#[derive(Debug, Serialize)]
pub struct AppointmentsEnvelope {
    pub appointments: Vec<Appointment>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateAppointmentRequest {
    pub title: String,
    pub date: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedAppointment {
    pub message: &'static str,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/appointments", get(list_appointments))
        .route("/appointments/create", post(create_appointment))
}

pub async fn list_appointments() -> Json<AppointmentsEnvelope> {
    Json(AppointmentsEnvelope {
        appointments: vec![
            Appointment {
                id: 1,
                title: "Doctor's Appointment",
                date: "2024-07-01T10:00:00Z",
            },
            Appointment {
                id: 2,
                title: "Meeting with Bob",
                date: "2024-07-02T14:00:00Z",
            },
        ],
    })
}

#[instrument(skip(input))]
pub async fn create_appointment(
    AppJson(input): AppJson<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<CreatedAppointment>), AppError> {
    info!(title = %input.title, date = %input.date, "appointment accepted");
    Ok((
        StatusCode::CREATED,
        Json(CreatedAppointment {
            message: "Appointment created successfully",
        }),
    ))
}
