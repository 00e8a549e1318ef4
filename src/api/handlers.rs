use crate::api::responses::{
    DetectionResponse, DetectionsErrorCode, DetectionsErrorResponse, DetectionsSuccessResponse,
    HealthErrorCode, HealthErrorResponse, HealthStatus, HealthSuccessResponse,
    OccupancyErrorCode, OccupancyErrorResponse, OccupancySuccessResponse, PredictErrorCode,
    PredictErrorResponse, PredictionSuccessResponse, SlotStatusResponse,
};
use crate::error::AppError;
use crate::forecast::{self, ForecastRequest, NoiseSource, RngNoise};
use crate::occupancy::{self, LotAnalysis, OccupancySummary};
use crate::state::AppState;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::SystemTime;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::error;

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

fn format_timestamp(timestamp: SystemTime) -> Result<String, time::error::Format> {
    OffsetDateTime::from(timestamp).format(&Rfc3339)
}

fn fallback_timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

pub enum OccupancyResponse {
    Success(OccupancySuccessResponse),
    Error {
        status: StatusCode,
        body: OccupancyErrorResponse,
    },
}

impl IntoResponse for OccupancyResponse {
    fn into_response(self) -> Response {
        match self {
            OccupancyResponse::Success(body) => (StatusCode::OK, Json(body)).into_response(),
            OccupancyResponse::Error { status, body } => (status, Json(body)).into_response(),
        }
    }
}

pub async fn post_analyze(
    State(state): State<Arc<AppState>>,
    Path(lot_id): Path<String>,
    body: Bytes,
) -> impl IntoResponse {
    build_analyze_response(&state, &lot_id, &body, SystemTime::now())
}

fn build_analyze_response(
    state: &AppState,
    lot_id: &str,
    body: &[u8],
    now: SystemTime,
) -> OccupancyResponse {
    let analysis = match state.analyze_bytes(lot_id, body) {
        Ok(analysis) => analysis,
        Err(AppError::ImageDecode(err)) => {
            return invalid_image_response(&err.to_string(), now);
        }
        Err(err) => {
            error!(error = %err, "Image analysis failed");
            return occupancy_internal_error("image analysis failure");
        }
    };

    match format_timestamp(now) {
        Ok(timestamp) => OccupancyResponse::Success(occupancy_body(analysis, timestamp)),
        Err(_) => occupancy_internal_error("timestamp formatting failure"),
    }
}

pub async fn get_occupancy(
    State(state): State<Arc<AppState>>,
    Path(lot_id): Path<String>,
) -> impl IntoResponse {
    let mut rng = StdRng::from_entropy();
    build_occupancy_response(&state, &lot_id, &mut rng, SystemTime::now())
}

/// Mock snapshot endpoint: no live frame is wired up, so slot states are
/// sampled from the fixed occupancy rate.
fn build_occupancy_response<R: Rng>(
    state: &AppState,
    lot_id: &str,
    rng: &mut R,
    now: SystemTime,
) -> OccupancyResponse {
    let regions = state.layouts().regions_for(lot_id);
    let slots = occupancy::mock_snapshot(regions, rng);
    let summary = OccupancySummary::from_slots(&slots);
    let analysis = LotAnalysis {
        lot_id: lot_id.to_string(),
        slots,
        summary,
    };

    match format_timestamp(now) {
        Ok(timestamp) => OccupancyResponse::Success(occupancy_body(analysis, timestamp)),
        Err(_) => occupancy_internal_error("timestamp formatting failure"),
    }
}

fn occupancy_body(analysis: LotAnalysis, timestamp: String) -> OccupancySuccessResponse {
    let slots = analysis
        .slots
        .into_iter()
        .map(|slot| SlotStatusResponse {
            slot_id: slot.slot_id,
            occupied: slot.occupied,
            confidence: slot.confidence,
            vehicle_category: slot.vehicle_category.map(|category| category.label()),
        })
        .collect();

    OccupancySuccessResponse {
        lot_id: analysis.lot_id,
        slots,
        available_slots: analysis.summary.available,
        total_slots: analysis.summary.total,
        detected_vehicles: analysis.summary.occupied,
        timestamp,
    }
}

fn invalid_image_response(message: &str, now: SystemTime) -> OccupancyResponse {
    let timestamp = format_timestamp(now).unwrap_or_else(|_| fallback_timestamp());
    OccupancyResponse::Error {
        status: StatusCode::BAD_REQUEST,
        body: OccupancyErrorResponse {
            error_code: OccupancyErrorCode::InvalidImage,
            error_message: format!("could not decode image: {message}"),
            timestamp,
        },
    }
}

fn occupancy_internal_error(message: &str) -> OccupancyResponse {
    error!(message = message, "Internal error while handling occupancy request");
    OccupancyResponse::Error {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: OccupancyErrorResponse {
            error_code: OccupancyErrorCode::InternalError,
            error_message: INTERNAL_ERROR_MESSAGE.to_string(),
            timestamp: fallback_timestamp(),
        },
    }
}

pub enum DetectResponse {
    Success(DetectionsSuccessResponse),
    Error {
        status: StatusCode,
        body: DetectionsErrorResponse,
    },
}

impl IntoResponse for DetectResponse {
    fn into_response(self) -> Response {
        match self {
            DetectResponse::Success(body) => (StatusCode::OK, Json(body)).into_response(),
            DetectResponse::Error { status, body } => (status, Json(body)).into_response(),
        }
    }
}

pub async fn post_detect(State(state): State<Arc<AppState>>, body: Bytes) -> impl IntoResponse {
    build_detect_response(&state, &body, SystemTime::now())
}

/// Raw detector output: the filtered vehicle detections for one frame,
/// without any slot matching.
fn build_detect_response(state: &AppState, body: &[u8], now: SystemTime) -> DetectResponse {
    let image = match image::load_from_memory(body) {
        Ok(image) => image,
        Err(err) => {
            let timestamp = format_timestamp(now).unwrap_or_else(|_| fallback_timestamp());
            return DetectResponse::Error {
                status: StatusCode::BAD_REQUEST,
                body: DetectionsErrorResponse {
                    error_code: DetectionsErrorCode::InvalidImage,
                    error_message: format!("could not decode image: {err}"),
                    timestamp,
                },
            };
        }
    };

    let detections: Vec<DetectionResponse> = state
        .detector()
        .detect(&image)
        .into_iter()
        .map(|detection| DetectionResponse {
            bbox: [
                detection.bbox.x1,
                detection.bbox.y1,
                detection.bbox.x2,
                detection.bbox.y2,
            ],
            vehicle_category: detection.category.label(),
            confidence: detection.confidence,
        })
        .collect();

    match format_timestamp(now) {
        Ok(timestamp) => DetectResponse::Success(DetectionsSuccessResponse {
            vehicle_count: detections.len() as u32,
            detections,
            timestamp,
        }),
        Err(_) => detect_internal_error("timestamp formatting failure"),
    }
}

fn detect_internal_error(message: &str) -> DetectResponse {
    error!(message = message, "Internal error while handling /api/detect-vehicles");
    DetectResponse::Error {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: DetectionsErrorResponse {
            error_code: DetectionsErrorCode::InternalError,
            error_message: INTERNAL_ERROR_MESSAGE.to_string(),
            timestamp: fallback_timestamp(),
        },
    }
}

pub enum PredictResponse {
    Success(PredictionSuccessResponse),
    Error {
        status: StatusCode,
        body: PredictErrorResponse,
    },
}

impl IntoResponse for PredictResponse {
    fn into_response(self) -> Response {
        match self {
            PredictResponse::Success(body) => (StatusCode::OK, Json(body)).into_response(),
            PredictResponse::Error { status, body } => (status, Json(body)).into_response(),
        }
    }
}

pub async fn post_predict(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ForecastRequest>,
) -> impl IntoResponse {
    let mut noise = RngNoise::from_entropy();
    build_predict_response(&state, &request, &mut noise, SystemTime::now())
}

fn build_predict_response(
    state: &AppState,
    request: &ForecastRequest,
    noise: &mut dyn NoiseSource,
    now: SystemTime,
) -> PredictResponse {
    let result = match forecast::forecast(request, state.profile(), noise) {
        Ok(result) => result,
        Err(err) => {
            // Every forecast error is a request validation failure
            let timestamp = format_timestamp(now).unwrap_or_else(|_| fallback_timestamp());
            return PredictResponse::Error {
                status: StatusCode::BAD_REQUEST,
                body: PredictErrorResponse {
                    error_code: PredictErrorCode::InvalidRequest,
                    error_message: err.to_string(),
                    timestamp,
                },
            };
        }
    };

    match format_timestamp(now) {
        Ok(timestamp) => PredictResponse::Success(PredictionSuccessResponse {
            predictions: result.predictions,
            confidence: result.confidence,
            model_version: result.model_version,
            timestamp,
        }),
        Err(_) => predict_internal_error("timestamp formatting failure"),
    }
}

fn predict_internal_error(message: &str) -> PredictResponse {
    error!(message = message, "Internal error while handling /api/predict");
    PredictResponse::Error {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: PredictErrorResponse {
            error_code: PredictErrorCode::InternalError,
            error_message: INTERNAL_ERROR_MESSAGE.to_string(),
            timestamp: fallback_timestamp(),
        },
    }
}

pub enum HealthResponse {
    Success(HealthSuccessResponse),
    Error {
        status: StatusCode,
        body: HealthErrorResponse,
    },
}

impl IntoResponse for HealthResponse {
    fn into_response(self) -> Response {
        match self {
            HealthResponse::Success(body) => (StatusCode::OK, Json(body)).into_response(),
            HealthResponse::Error { status, body } => (status, Json(body)).into_response(),
        }
    }
}

pub async fn get_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    build_health_response(&state, SystemTime::now())
}

fn build_health_response(state: &AppState, now: SystemTime) -> HealthResponse {
    // Running without a model is degraded, not down: analysis still answers
    // with empty detections and forecasting is unaffected.
    let model_loaded = state.model_loaded();
    let status = if model_loaded {
        HealthStatus::Ok
    } else {
        HealthStatus::Degraded
    };

    match format_timestamp(now) {
        Ok(timestamp) => HealthResponse::Success(HealthSuccessResponse {
            status,
            model_loaded,
            timestamp,
        }),
        Err(_) => {
            error!("Internal error while handling /api/health");
            HealthResponse::Error {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: HealthErrorResponse {
                    error_code: HealthErrorCode::InternalError,
                    error_message: INTERNAL_ERROR_MESSAGE.to_string(),
                    timestamp: fallback_timestamp(),
                },
            }
        }
    }
}
