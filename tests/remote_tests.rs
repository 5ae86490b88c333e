// 该文件是 Shanan （山南西风） 项目的一部分。
// tests/remote_tests.rs - 远程图像与推理服务测试
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

mod common;

use std::net::SocketAddr;

use axum::{
  Json, Router,
  extract::Path,
  http::{StatusCode, header},
  response::{IntoResponse, Response},
  routing::get,
};
use image::RgbImage;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower::ServiceExt; // for `oneshot`
use url::Url;

use shanan_web::{
  FromUrl,
  model::{DetectResult, Model, ModelError, TfServingBuilder},
};

use common::{MultipartBody, app, body_json, cat_model, jpeg_bytes};

async fn cat_image() -> Response {
  ([(header::CONTENT_TYPE, "image/jpeg")], jpeg_bytes(120, 90)).into_response()
}

async fn model_status(Path(rest): Path<String>) -> Response {
  let state = match rest.trim_start_matches('/') {
    "ready" | "broken" => "AVAILABLE",
    "loading" => "LOADING",
    _ => return (StatusCode::NOT_FOUND, "Servable not found").into_response(),
  };
  Json(json!({
    "model_version_status": [{ "version": "1", "state": state }]
  }))
  .into_response()
}

/// 校验输入为 1×H×W×3，返回两个检测结果
async fn predict(Path(rest): Path<String>, Json(body): Json<Value>) -> Response {
  let len = |pointer: &str| body.pointer(pointer).and_then(Value::as_array).map(Vec::len);
  if len("/instances") != Some(1)
    || len("/instances/0") != Some(48)
    || len("/instances/0/0/0") != Some(3)
  {
    return (StatusCode::BAD_REQUEST, "bad instances").into_response();
  }

  match rest.trim_start_matches('/') {
    "ready:predict" => Json(json!({
      "predictions": [{
        "detection_boxes": [[0.1, 0.1, 0.5, 0.5], [0.2, 0.3, 0.9, 0.8]],
        "detection_class_entities": ["Cat", "Dog"],
        "detection_scores": [0.9, 0.4]
      }]
    }))
    .into_response(),
    "broken:predict" => Json(json!({
      "predictions": [{
        "detection_boxes": [[0.1, 0.1, 0.5, 0.5]],
        "detection_class_entities": ["Cat", "Dog"],
        "detection_scores": [0.9]
      }]
    }))
    .into_response(),
    _ => StatusCode::NOT_FOUND.into_response(),
  }
}

/// 在随机端口启动模拟的图像源与推理服务
async fn spawn_stub_server() -> SocketAddr {
  let router = Router::new()
    .route("/images/cat.jpg", get(cat_image))
    .route("/v1/models/*rest", get(model_status).post(predict));

  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move {
    axum::serve(listener, router).await.unwrap();
  });
  addr
}

/// 阻塞客户端须在阻塞线程中构建与释放
async fn build_and_infer(url: String) -> Result<DetectResult, ModelError> {
  tokio::task::spawn_blocking(move || {
    let model = TfServingBuilder::from_url(&Url::parse(&url).unwrap())?.build()?;
    model.infer(&RgbImage::new(64, 48))
  })
  .await
  .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn tf_serving_decodes_predictions() {
  let addr = spawn_stub_server().await;

  let result = build_and_infer(format!("tfserving://{}/ready", addr))
    .await
    .unwrap();

  let labels = result.iter().map(|item| item.label.as_str()).collect::<Vec<_>>();
  assert_eq!(labels, ["Cat", "Dog"]);
  let dog = result.iter().nth(1).unwrap();
  assert_eq!(dog.bbox, [0.2, 0.3, 0.9, 0.8]);
  assert!((dog.score - 0.4).abs() < 1e-6);
}

#[tokio::test(flavor = "multi_thread")]
async fn tf_serving_rejects_misaligned_predictions() {
  let addr = spawn_stub_server().await;

  let result = build_and_infer(format!("tfserving://{}/broken", addr)).await;

  assert!(matches!(result, Err(ModelError::MalformedOutput(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn tf_serving_build_fails_without_available_version() {
  let addr = spawn_stub_server().await;

  let result = build_and_infer(format!("tfserving://{}/loading", addr)).await;

  assert!(matches!(result, Err(ModelError::Unavailable(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn tf_serving_build_reports_unknown_servable() {
  let addr = spawn_stub_server().await;

  let result = build_and_infer(format!("tfserving://{}/missing", addr)).await;

  assert!(matches!(result, Err(ModelError::StatusError(404, _))));
}

#[tokio::test(flavor = "multi_thread")]
async fn detect_from_url_source() {
  let addr = spawn_stub_server().await;
  let dir = tempfile::tempdir().unwrap();
  let request = MultipartBody::new()
    .text("input", &format!("http://{}/images/cat.jpg", addr))
    .text("output", "1")
    .request("/api/detect");

  let response = app(dir.path(), Some(cat_model()))
    .oneshot(request)
    .await
    .unwrap();

  assert_eq!(response.status(), StatusCode::OK);
  let json = body_json(response).await;
  assert_eq!(json["objects_found"], 1);
  assert!(json["annotated_image_b64"].is_string());

  let annotated_path = std::path::PathBuf::from(json["annotated_image_path"].as_str().unwrap());
  let file_name = annotated_path.file_name().unwrap().to_str().unwrap();
  let name = file_name.strip_suffix(".annotated.jpg").unwrap();
  assert_eq!(name.len(), 32);
  assert!(
    name
      .chars()
      .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
  );

  let source = image::open(dir.path().join(format!("{}.jpg", name))).unwrap();
  assert_eq!((source.width(), source.height()), (640, 480));
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_remote_image_is_a_client_error() {
  let addr = spawn_stub_server().await;
  let dir = tempfile::tempdir().unwrap();
  let request = MultipartBody::new()
    .text("input", &format!("http://{}/images/missing.jpg", addr))
    .request("/api/detect");

  let response = app(dir.path(), Some(cat_model()))
    .oneshot(request)
    .await
    .unwrap();

  assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
