// 该文件是 Shanan （山南西风） 项目的一部分。
// src/server/api.rs - JSON 接口
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

use axum::{Json, extract::State};
use axum_extra::extract::Multipart;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::{
  output::DetectionRecord,
  server::{ApiError, AppState},
  task::ImageSource,
};

#[derive(Debug, Serialize)]
pub struct DetectResponse {
  #[serde(flatten)]
  pub record: DetectionRecord,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub annotated_image_b64: Option<String>,
}

pub async fn hello() -> Json<Value> {
  Json(json!({ "data": "hello" }))
}

/// `output` 字段只要非空即视为需要输出
fn is_truthy(value: &str) -> bool {
  !value.trim().is_empty()
}

fn multipart_error(err: impl std::fmt::Display) -> ApiError {
  ApiError::BadRequest(format!("multipart 解析失败: {}", err))
}

pub async fn detect(
  State(state): State<AppState>,
  mut multipart: Multipart,
) -> Result<Json<DetectResponse>, ApiError> {
  if !state.task().model_available() {
    return Err(ApiError::ModelUnavailable);
  }

  let mut upload = None;
  let mut url = None;
  let mut output = false;

  while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
    let name = field.name().map(str::to_string);
    let filename = field.file_name().map(str::to_string);
    match name.as_deref() {
      Some("input") => match filename {
        Some(filename) if !filename.is_empty() => {
          let bytes = field.bytes().await.map_err(multipart_error)?;
          if !bytes.is_empty() {
            upload = Some(ImageSource::Upload {
              filename,
              bytes: bytes.to_vec(),
            });
          }
        }
        _ => {
          let text = field.text().await.map_err(multipart_error)?;
          let text = text.trim();
          if !text.is_empty() {
            url = Some(ImageSource::Url(text.to_string()));
          }
        }
      },
      Some("output") => {
        output = is_truthy(&field.text().await.map_err(multipart_error)?);
      }
      other => debug!("忽略表单字段: {:?}", other),
    }
  }

  // 文件优先于 URL
  let source = upload
    .or(url)
    .ok_or_else(|| ApiError::BadRequest("no image found in request".to_string()))?;

  let task = state.task().clone();
  let response = tokio::task::spawn_blocking(move || -> Result<DetectResponse, ApiError> {
    let outcome = task.run_source(source, output)?;
    let annotated_image_b64 = if output {
      let bytes = std::fs::read(task.store().annotated_path(&outcome.name))
        .map_err(|e| ApiError::Internal(format!("读取标注图像失败: {}", e)))?;
      Some(STANDARD.encode(bytes))
    } else {
      None
    };
    info!(
      "检测完成: {} 个对象, 耗时 {:.3}s",
      outcome.record.objects_found, outcome.record.inference_time
    );
    Ok(DetectResponse {
      record: outcome.record,
      annotated_image_b64,
    })
  })
  .await??;

  Ok(Json(response))
}
