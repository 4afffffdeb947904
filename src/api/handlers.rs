use crate::error::EngineError;
use crate::models::{Actor, ItemPatch, Role};
use crate::service::policy;
use crate::service::{ProjectService, ServiceError};
use axum::{
    extract::{Json, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 调用方角色 / 供应商ID 请求头
pub const ROLE_HEADER: &str = "x-role";
pub const VENDOR_HEADER: &str = "x-vendor-id";

/// 统一响应体
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// 新增条目请求体
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub cost_group: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectVendorRequest {
    pub vendor_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetRequest {
    pub ffe_budget_limit: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequestBody {
    pub project_name: String,
    #[serde(default)]
    pub client_email: Option<String>,
}

fn ok<T: Serialize>(message: impl Into<String>, data: T) -> Response {
    let body = ApiResponse {
        success: true,
        message: message.into(),
        data: Some(data),
    };
    (StatusCode::OK, Json(body)).into_response()
}

fn fail(status: StatusCode, message: String) -> Response {
    let body: ApiResponse<()> = ApiResponse {
        success: false,
        message,
        data: None,
    };
    (status, Json(body)).into_response()
}

fn status_for(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::Engine(EngineError::InvalidArgument(_)) => StatusCode::BAD_REQUEST,
        ServiceError::Engine(EngineError::NotFound { .. }) => StatusCode::NOT_FOUND,
        ServiceError::Engine(EngineError::PolicyViolation { .. }) => StatusCode::FORBIDDEN,
        ServiceError::Repository(_) | ServiceError::Csv(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: ServiceError) -> Response {
    let status = status_for(&err);
    if status.is_server_error() {
        tracing::error!("request failed: {}", err);
    } else {
        tracing::debug!("request rejected: {}", err);
    }
    fail(status, format!("Error: {}", err))
}

/// 从请求头解析调用方身份
pub fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, Response> {
    let raw = headers
        .get(ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, format!("missing {} header", ROLE_HEADER)))?;
    let role: Role = raw
        .parse()
        .map_err(|e: String| fail(StatusCode::BAD_REQUEST, e))?;
    let vendor_id = headers
        .get(VENDOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    Ok(Actor { role, vendor_id })
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 条目列表 (按角色过滤并裁剪字段)
pub async fn list_items(
    State(service): State<Arc<ProjectService>>,
    Path(project_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(resp) => return resp,
    };
    match service.list_items(&project_id, &actor) {
        Ok(items) => ok(format!("{} items", items.len()), items),
        Err(e) => error_response(e),
    }
}

/// 在成本组中新增条目
pub async fn add_item(
    State(service): State<Arc<ProjectService>>,
    Path(project_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<AddItemRequest>,
) -> Response {
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(resp) => return resp,
    };
    match service.add_item(&project_id, &actor, &req.cost_group) {
        Ok(item) => ok(
            format!("Added position {}", item.cost_group_position),
            policy::redact(&item, actor.role),
        ),
        Err(e) => error_response(e),
    }
}

pub async fn update_item(
    State(service): State<Arc<ProjectService>>,
    Path((project_id, item_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(patch): Json<ItemPatch>,
) -> Response {
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(resp) => return resp,
    };
    match service.update_item(&project_id, &actor, &item_id, &patch) {
        Ok(item) => ok("Item updated", policy::redact(&item, actor.role)),
        Err(e) => error_response(e),
    }
}

pub async fn approve_for_client(
    State(service): State<Arc<ProjectService>>,
    Path((project_id, item_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(resp) => return resp,
    };
    match service.approve_for_client(&project_id, &actor, &item_id) {
        Ok(item) => {
            let message = if item.approved_for_client {
                "Item approved for client"
            } else {
                "Client approval withdrawn"
            };
            ok(message, policy::redact(&item, actor.role))
        }
        Err(e) => error_response(e),
    }
}

pub async fn select_vendor(
    State(service): State<Arc<ProjectService>>,
    Path((project_id, item_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(req): Json<SelectVendorRequest>,
) -> Response {
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(resp) => return resp,
    };
    match service.select_vendor(&project_id, &actor, &item_id, &req.vendor_id) {
        Ok(item) => ok("Vendor selected", policy::redact(&item, actor.role)),
        Err(e) => error_response(e),
    }
}

/// 成本组汇总 / 合计 / FF&E 预算
pub async fn summary(
    State(service): State<Arc<ProjectService>>,
    Path(project_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(resp) => return resp,
    };
    match service.report(&project_id, &actor) {
        Ok(report) => ok("Summary", report),
        Err(e) => error_response(e),
    }
}

/// 设置项目级 FF&E 预算上限
pub async fn set_budget(
    State(service): State<Arc<ProjectService>>,
    Path(project_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<BudgetRequest>,
) -> Response {
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(resp) => return resp,
    };
    match service.set_ffe_budget_limit(&project_id, &actor, req.ffe_budget_limit) {
        Ok(limit) => ok("FF&E budget limit updated", limit),
        Err(e) => error_response(e),
    }
}

/// 供应商报价比较
pub async fn comparison(
    State(service): State<Arc<ProjectService>>,
    Path(project_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(resp) => return resp,
    };
    match service.comparison(&project_id, &actor) {
        Ok(groups) => ok(format!("{} cost groups with offers", groups.len()), groups),
        Err(e) => error_response(e),
    }
}

/// CSV 批量导入 (请求体为分号分隔文本)
pub async fn import_csv(
    State(service): State<Arc<ProjectService>>,
    Path(project_id): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(resp) => return resp,
    };
    match service.import_csv(&project_id, &actor, &body) {
        Ok(report) => ok(
            format!(
                "Imported {} rows, {} rejected",
                report.created.len(),
                report.errors.len()
            ),
            report,
        ),
        Err(e) => error_response(e),
    }
}

pub async fn export_csv(
    State(service): State<Arc<ProjectService>>,
    Path(project_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(resp) => return resp,
    };
    match service.export_csv(&project_id, &actor) {
        Ok(csv) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            csv,
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// 生成支付网关请求体 (不直接调用网关)
pub async fn payment_request(
    State(service): State<Arc<ProjectService>>,
    Path(project_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<PaymentRequestBody>,
) -> Response {
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(resp) => return resp,
    };
    match service.payment_request(
        &project_id,
        &actor,
        &req.project_name,
        req.client_email.as_deref(),
    ) {
        Ok(request) => ok("Payment request prepared", request),
        Err(e) => error_response(e),
    }
}
