// 该文件是 Shanan （山南西风） 项目的一部分。
// src/server.rs - HTTP 服务
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::future::Future;
use std::sync::Arc;

use axum::{
  Json, Router,
  extract::DefaultBodyLimit,
  http::StatusCode,
  response::{IntoResponse, Response},
  routing::{get, post},
};
use serde_json::json;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::{
  config::Config,
  model::SharedModel,
  task::{DetectionTask, TaskError},
};

mod api;
mod browser;
mod views;

pub use self::browser::ALLOWED_EXTENSIONS;

/// 请求体上限
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

const NO_MODEL_MESSAGE: &str = "no model loaded, try again later.";

#[derive(Clone)]
pub struct AppState {
  task: Arc<DetectionTask>,
}

impl AppState {
  /// 创建上传目录并组装共享状态
  pub fn new(config: Config, model: Option<SharedModel>) -> Result<Self, TaskError> {
    Self::from_task(DetectionTask::new(config, model)?)
  }

  pub fn from_task(task: DetectionTask) -> Result<Self, TaskError> {
    task.store().create_dirs()?;
    Ok(AppState {
      task: Arc::new(task),
    })
  }

  pub fn task(&self) -> &Arc<DetectionTask> {
    &self.task
  }
}

pub fn create_app(state: AppState) -> Router {
  let static_dir = state.task.store().root().to_path_buf();

  Router::new()
    .route("/", get(browser::landing).post(browser::upload))
    .route("/uploads/output/:file", get(browser::annotated_view))
    .route("/api/hello", get(api::hello).post(api::hello))
    .route("/api/detect", post(api::detect))
    .nest_service("/static", ServeDir::new(static_dir))
    .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

pub async fn serve(
  listener: TcpListener,
  state: AppState,
  shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
  info!("HTTP 服务监听于 {}", listener.local_addr()?);
  axum::serve(listener, create_app(state))
    .with_graceful_shutdown(shutdown)
    .await?;
  info!("HTTP 服务已停止");
  Ok(())
}

#[derive(Error, Debug)]
pub enum ApiError {
  #[error("{0}")]
  BadRequest(String),
  #[error("{}", NO_MODEL_MESSAGE)]
  ModelUnavailable,
  #[error("{0}")]
  NotFound(String),
  #[error("处理失败: {0}")]
  Processing(TaskError),
  #[error("内部错误: {0}")]
  Internal(String),
}

impl From<TaskError> for ApiError {
  fn from(err: TaskError) -> Self {
    match err {
      TaskError::ModelUnavailable => ApiError::ModelUnavailable,
      TaskError::SourceError(e) => ApiError::BadRequest(format!("无法获取输入图像: {}", e)),
      other => ApiError::Processing(other),
    }
  }
}

impl From<tokio::task::JoinError> for ApiError {
  fn from(err: tokio::task::JoinError) -> Self {
    ApiError::Internal(err.to_string())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::BadRequest(message) => {
        warn!("请求无效: {}", message);
        (StatusCode::BAD_REQUEST, Json(json!({ "data": message }))).into_response()
      }
      ApiError::ModelUnavailable => {
        warn!("没有加载模型，拒绝请求");
        (StatusCode::INTERNAL_SERVER_ERROR, NO_MODEL_MESSAGE).into_response()
      }
      ApiError::NotFound(message) => {
        warn!("资源不存在: {}", message);
        (StatusCode::NOT_FOUND, message).into_response()
      }
      err @ (ApiError::Processing(_) | ApiError::Internal(_)) => {
        error!("请求处理失败: {}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::input::InputError;

  #[test]
  fn task_errors_map_to_status_classes() {
    assert!(matches!(
      ApiError::from(TaskError::ModelUnavailable),
      ApiError::ModelUnavailable
    ));
    assert!(matches!(
      ApiError::from(TaskError::SourceError(InputError::SchemeMismatch("ftp".into()))),
      ApiError::BadRequest(_)
    ));
    assert!(matches!(
      ApiError::from(TaskError::InputError(InputError::InvalidName("x".into()))),
      ApiError::Processing(_)
    ));
  }

  #[test]
  fn no_model_response_is_plain_text_500() {
    let response = ApiError::ModelUnavailable.into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
  }
}
