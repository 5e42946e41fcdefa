use crate::models::{
    AdminToken, ChannelOutcome, ErrorResponse, HarvestRequest, HarvestResponse, HarvestStatus,
};
use crate::services::document_store::DocumentSink;
use crate::services::supervisor::{Harvester, RetrySupervisor};
use crate::utils::extract_channel_id;
use crate::AppState;
use log::{error, info};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{get, post, State};
use serde_json::Value;

/// Harvests every requested channel and reports one outcome per input entry.
#[post("/", data = "<request>")]
pub async fn harvest_channels(
    _token: AdminToken,
    state: &State<AppState>,
    request: Json<HarvestRequest>,
) -> Result<Json<HarvestResponse>, ErrorResponse> {
    if request.channels.is_empty() {
        return Err(ErrorResponse {
            error: "empty_request".to_string(),
            message: "Provide at least one YouTube channel ID".to_string(),
        });
    }

    let resolved: Vec<Option<String>> = request
        .channels
        .iter()
        .map(|input| extract_channel_id(input))
        .collect();
    let channel_ids: Vec<String> = resolved.iter().flatten().cloned().collect();

    let harvester = Harvester::new(&state.youtube, &state.bundle_store, &state.postgres);
    let mut outcomes = RetrySupervisor::new(harvester, state.retry_failed)
        .run(&channel_ids)
        .await
        .into_iter();

    let results: Vec<ChannelOutcome> = request
        .channels
        .iter()
        .zip(&resolved)
        .filter_map(|(input, channel_id)| match channel_id {
            Some(_) => outcomes.next(),
            None => Some(ChannelOutcome {
                channel_id: input.clone(),
                status: HarvestStatus::Failed("invalid channel reference".to_string()),
            }),
        })
        .collect();

    let response = HarvestResponse::from_outcomes(results);
    info!(
        "Harvest finished: {} succeeded, {} failed",
        response.succeeded, response.failed
    );
    Ok(Json(response))
}

/// Every stored harvest document, newest first.
#[get("/bundles")]
pub async fn list_bundles(
    _token: AdminToken,
    state: &State<AppState>,
) -> Result<Json<Vec<Value>>, Status> {
    match state.bundle_store.scan_bundles().await {
        Ok(bundles) => {
            info!("Found {} stored harvest bundles.", bundles.len());
            Ok(Json(bundles))
        }
        Err(e) => {
            error!("Failed to list harvest bundles: {e}");
            Err(Status::InternalServerError)
        }
    }
}
