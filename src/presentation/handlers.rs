// HTTP request handlers
use crate::application::series_formatter::{format_chart, format_for_tag};
use crate::domain::cache::{CacheEntry, RequestRecord, RequestStatus};
use crate::domain::chart::ChartPayload;
use crate::domain::error::{GroupStoreError, UnsupportedPlotType};
use crate::domain::model_group::{GroupId, GroupStoreState, Model, ModelGroup};
use crate::domain::plot::{PlotRequest, PlotType};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<GroupStoreError> for ApiError {
    fn from(e: GroupStoreError) -> Self {
        let status = match e {
            GroupStoreError::UnknownGroup { .. } => StatusCode::NOT_FOUND,
            GroupStoreError::InvalidStatValue { .. }
            | GroupStoreError::MissingModelProperties { .. } => StatusCode::BAD_REQUEST,
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl From<UnsupportedPlotType> for ApiError {
    fn from(e: UnsupportedPlotType) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

/// Plot parameters as selected in the UI; the plot type comes from the path.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotDataBody {
    pub lat_min: f64,
    pub lat_max: f64,
    pub months: Vec<u8>,
    pub start_year: i32,
    pub end_year: i32,
    pub model_list: Vec<String>,
    pub ref_model: String,
    pub ref_year: i32,
}

impl PlotDataBody {
    /// Rejects latitudes outside -90..=90, an inverted band and months outside 1..=12.
    fn into_request(self, plot_type: PlotType) -> Result<PlotRequest, ApiError> {
        for (field, lat) in [("latMin", self.lat_min), ("latMax", self.lat_max)] {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(ApiError::bad_request(format!(
                    "{} must be within -90..90, got {}",
                    field, lat
                )));
            }
        }
        if self.lat_min > self.lat_max {
            return Err(ApiError::bad_request(format!(
                "latMin {} is greater than latMax {}",
                self.lat_min, self.lat_max
            )));
        }
        if let Some(month) = self.months.iter().find(|m| !(1..=12).contains(*m)) {
            return Err(ApiError::bad_request(format!(
                "month {} is outside 1..12",
                month
            )));
        }

        Ok(PlotRequest {
            plot_type,
            lat_min: self.lat_min,
            lat_max: self.lat_max,
            months: self.months,
            start_year: self.start_year,
            end_year: self.end_year,
            model_list: self.model_list,
            ref_model: self.ref_model,
            ref_year: self.ref_year,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResponse {
    pub cache_key: String,
    pub entry: CacheEntry,
}

#[derive(Serialize)]
pub struct ChartResponse {
    pub status: RequestStatus,
    pub error: Option<String>,
    pub chart: Option<ChartPayload>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheKeysResponse {
    pub active: Option<String>,
    pub keys: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupBody {
    pub name: String,
    #[serde(default)]
    pub model_list: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct VisibilityBody {
    pub visible: bool,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn get_models(State(state): State<Arc<AppState>>) -> Json<RequestRecord<Vec<String>>> {
    Json(state.request_cache.models())
}

pub async fn fetch_models(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let _task = state.request_cache.fetch_models();
    (StatusCode::ACCEPTED, Json(state.request_cache.models()))
}

pub async fn get_plot_types(
    State(state): State<Arc<AppState>>,
) -> Json<RequestRecord<Vec<String>>> {
    Json(state.request_cache.plot_types())
}

pub async fn fetch_plot_types(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let _task = state.request_cache.fetch_plot_types();
    (StatusCode::ACCEPTED, Json(state.request_cache.plot_types()))
}

/// Start fetching plot data; the response reflects the pending entry
pub async fn fetch_plot_data(
    Path(tag): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<PlotDataBody>,
) -> Result<(StatusCode, Json<FetchResponse>), ApiError> {
    let plot_type: PlotType = tag.parse()?;
    let (cache_key, _task) = state
        .request_cache
        .fetch_plot_data(body.into_request(plot_type)?);
    let entry = state
        .request_cache
        .entry(plot_type, &cache_key)
        .unwrap_or_else(CacheEntry::loading);

    Ok((StatusCode::ACCEPTED, Json(FetchResponse { cache_key, entry })))
}

pub async fn active_plot_data(
    Path(tag): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<CacheEntry>, ApiError> {
    let plot_type: PlotType = tag.parse()?;
    Ok(Json(state.request_cache.active_entry_for(plot_type)))
}

pub async fn cached_plot_keys(
    Path(tag): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<CacheKeysResponse>, ApiError> {
    let plot_type: PlotType = tag.parse()?;
    Ok(Json(CacheKeysResponse {
        active: state.request_cache.active_key(plot_type),
        keys: state.request_cache.cached_keys(plot_type),
    }))
}

/// Chart for the active request of a plot type. Unknown plot types get a
/// placeholder rather than an error.
pub async fn plot_chart(
    Path(tag): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Json<ChartResponse> {
    let Ok(plot_type) = tag.parse::<PlotType>() else {
        return Json(ChartResponse {
            status: RequestStatus::Idle,
            error: None,
            chart: Some(format_for_tag(&tag, &[], &GroupStoreState::default())),
        });
    };

    let entry = state.request_cache.active_entry_for(plot_type);
    let chart = entry
        .is_success()
        .then(|| ChartPayload::Chart(format_chart(plot_type, &entry.data, state.groups().state())));

    Json(ChartResponse {
        status: entry.status,
        error: entry.error,
        chart,
    })
}

pub async fn list_groups(State(state): State<Arc<AppState>>) -> Json<Vec<ModelGroup>> {
    Json(state.groups().state().iter().cloned().collect())
}

pub async fn create_group(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GroupBody>,
) -> Result<(StatusCode, Json<ModelGroup>), ApiError> {
    let mut store = state.groups_mut();
    let next_id = store.state().id_counter;
    let id = store.set_models_of_group(next_id, &body.name, &body.model_list);
    tracing::info!("Created model group {} \"{}\"", id, body.name);
    Ok((StatusCode::CREATED, Json(store.group(id)?.clone())))
}

pub async fn get_group(
    Path(id): Path<GroupId>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ModelGroup>, ApiError> {
    Ok(Json(state.groups().group(id)?.clone()))
}

/// Update the group's name and models; an unknown id creates a new group
pub async fn set_group_models(
    Path(id): Path<GroupId>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<GroupBody>,
) -> Result<Json<ModelGroup>, ApiError> {
    let mut store = state.groups_mut();
    let id = store.set_models_of_group(id, &body.name, &body.model_list);
    Ok(Json(store.group(id)?.clone()))
}

pub async fn delete_group(
    Path(id): Path<GroupId>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, ApiError> {
    state.groups_mut().delete_group(id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_group_model_properties(
    Path(id): Path<GroupId>,
    State(state): State<Arc<AppState>>,
    Json(properties): Json<HashMap<String, Model>>,
) -> Result<Json<ModelGroup>, ApiError> {
    let mut store = state.groups_mut();
    store.update_group_model_properties(id, &properties)?;
    Ok(Json(store.group(id)?.clone()))
}

pub async fn set_group_stat_value_visibility(
    Path((id, stat)): Path<(GroupId, String)>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<VisibilityBody>,
) -> Result<Json<ModelGroup>, ApiError> {
    let mut store = state.groups_mut();
    store.set_group_stat_value_visibility_by_tag(id, &stat, body.visible)?;
    Ok(Json(store.group(id)?.clone()))
}

pub async fn set_group_visibility(
    Path(id): Path<GroupId>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<VisibilityBody>,
) -> Result<Json<ModelGroup>, ApiError> {
    let mut store = state.groups_mut();
    store.set_group_visibility(id, body.visible)?;
    Ok(Json(store.group(id)?.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_errors_map_to_status_codes() {
        let unknown: ApiError = GroupStoreError::UnknownGroup { group_id: 3 }.into();
        assert_eq!(unknown.status, StatusCode::NOT_FOUND);
        assert_eq!(unknown.message, "tried to access \"3\" which is not a valid group");

        let invalid: ApiError = "variance"
            .parse::<crate::domain::model_group::StatValue>()
            .unwrap_err()
            .into();
        assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            invalid.message,
            "\"variance\" is not a valid statistical value (mean|median|derivative|percentile)"
        );
    }

    #[test]
    fn test_plot_data_body_uses_camel_case() {
        let body: PlotDataBody = serde_json::from_str(
            r#"{"latMin": -90, "latMax": 90, "months": [1, 2], "startYear": 1960,
                "endYear": 2100, "modelList": ["m"], "refModel": "ref", "refYear": 1980}"#,
        )
        .unwrap();

        let request = body.into_request(PlotType::ZonalMean).unwrap();
        assert_eq!(request.lat_min, -90.0);
        assert_eq!(request.model_list, vec!["m"]);
    }

    fn body(lat_min: f64, lat_max: f64, months: Vec<u8>) -> PlotDataBody {
        PlotDataBody {
            lat_min,
            lat_max,
            months,
            start_year: 1960,
            end_year: 2100,
            model_list: vec!["m".to_string()],
            ref_model: "ref".to_string(),
            ref_year: 1980,
        }
    }

    #[test]
    fn test_plot_data_body_rejects_out_of_range_values() {
        let too_far_south = body(-91.0, 0.0, vec![1]).into_request(PlotType::ZonalMean);
        let err = too_far_south.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "latMin must be within -90..90, got -91");

        let inverted = body(30.0, -30.0, vec![1]).into_request(PlotType::ZonalMean);
        assert_eq!(inverted.unwrap_err().status, StatusCode::BAD_REQUEST);

        let bad_month = body(-30.0, 30.0, vec![12, 13]).into_request(PlotType::ReturnRecovery);
        assert_eq!(bad_month.unwrap_err().message, "month 13 is outside 1..12");

        let nan = body(f64::NAN, 30.0, vec![1]).into_request(PlotType::ZonalMean);
        assert!(nan.is_err());

        assert!(body(-90.0, 90.0, vec![1, 12]).into_request(PlotType::ZonalMean).is_ok());
    }
}
