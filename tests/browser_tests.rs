// 该文件是 Shanan （山南西风） 项目的一部分。
// tests/browser_tests.rs - 浏览器上传与结果页测试
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

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use tower::ServiceExt; // for `oneshot`

use common::{MultipartBody, app, body_bytes, body_text, cat_model, jpeg_bytes, png_bytes};

fn get(uri: &str) -> Request<Body> {
  Request::get(uri).body(Body::empty()).unwrap()
}

fn location(response: &axum::response::Response) -> String {
  response
    .headers()
    .get(header::LOCATION)
    .unwrap()
    .to_str()
    .unwrap()
    .to_string()
}

fn set_cookie(response: &axum::response::Response) -> String {
  response
    .headers()
    .get(header::SET_COOKIE)
    .map(|v| v.to_str().unwrap().to_string())
    .unwrap_or_default()
}

#[tokio::test]
async fn landing_page_shows_upload_form() {
  let dir = tempfile::tempdir().unwrap();
  let response = app(dir.path(), Some(cat_model()))
    .oneshot(get("/"))
    .await
    .unwrap();

  assert_eq!(response.status(), StatusCode::OK);
  let html = body_text(response).await;
  assert!(html.contains("enctype=\"multipart/form-data\""));
  assert!(html.contains("name=\"image\""));
  assert!(html.contains("mobilenet_v2"));
}

#[tokio::test]
async fn landing_page_consumes_notice_cookie() {
  let dir = tempfile::tempdir().unwrap();
  let request = Request::get("/")
    .header(header::COOKIE, "notice=No%20selected%20file")
    .body(Body::empty())
    .unwrap();

  let response = app(dir.path(), Some(cat_model()))
    .oneshot(request)
    .await
    .unwrap();

  assert_eq!(response.status(), StatusCode::OK);
  assert!(set_cookie(&response).starts_with("notice="));
  assert!(body_text(response).await.contains("No selected file"));
}

#[tokio::test]
async fn missing_file_part_redirects_home() {
  let dir = tempfile::tempdir().unwrap();
  let request = MultipartBody::new().text("comment", "hi").request("/");

  let response = app(dir.path(), Some(cat_model()))
    .oneshot(request)
    .await
    .unwrap();

  assert_eq!(response.status(), StatusCode::SEE_OTHER);
  assert_eq!(location(&response), "/");
  assert!(set_cookie(&response).contains("No%20file%20part"));
}

#[tokio::test]
async fn empty_filename_redirects_home() {
  let dir = tempfile::tempdir().unwrap();
  let request = MultipartBody::new().file("image", "", b"").request("/");

  let response = app(dir.path(), Some(cat_model()))
    .oneshot(request)
    .await
    .unwrap();

  assert_eq!(response.status(), StatusCode::SEE_OTHER);
  assert_eq!(location(&response), "/");
  assert!(set_cookie(&response).contains("No%20selected%20file"));
}

#[tokio::test]
async fn disallowed_extension_redirects_home() {
  let dir = tempfile::tempdir().unwrap();
  let request = MultipartBody::new()
    .file("image", "picture.png", &png_bytes(8, 8))
    .request("/");

  let response = app(dir.path(), Some(cat_model()))
    .oneshot(request)
    .await
    .unwrap();

  assert_eq!(response.status(), StatusCode::SEE_OTHER);
  assert_eq!(location(&response), "/");
  assert_eq!(std::fs::read_dir(dir.path().join("output")).unwrap().count(), 0);
}

#[tokio::test]
async fn upload_then_view_result() {
  let dir = tempfile::tempdir().unwrap();
  let request = MultipartBody::new()
    .file("image", "Holiday Photo.JPEG", &jpeg_bytes(32, 24))
    .request("/");

  let response = app(dir.path(), Some(cat_model()))
    .oneshot(request)
    .await
    .unwrap();

  assert_eq!(response.status(), StatusCode::SEE_OTHER);
  let target = location(&response);
  assert!(target.starts_with("/uploads/output/Holiday_Photo-"));
  assert!(target.ends_with(".annotated.jpg"));

  let response = app(dir.path(), Some(cat_model()))
    .oneshot(get(&target))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::OK);
  let html = body_text(response).await;
  assert!(html.contains("<td>cat</td>"));

  let image_url = target.replace("/uploads/output/", "/static/output/");
  assert!(html.contains(&image_url));

  let response = app(dir.path(), Some(cat_model()))
    .oneshot(get(&image_url))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::OK);
  let image = image::load_from_memory(&body_bytes(response).await).unwrap();
  assert_eq!((image.width(), image.height()), (640, 480));
}

#[tokio::test]
async fn dotted_filename_result_is_viewable() {
  let dir = tempfile::tempdir().unwrap();
  let request = MultipartBody::new()
    .file("image", "a..b.jpg", &jpeg_bytes(32, 24))
    .request("/");

  let response = app(dir.path(), Some(cat_model()))
    .oneshot(request)
    .await
    .unwrap();

  assert_eq!(response.status(), StatusCode::SEE_OTHER);
  let target = location(&response);
  assert!(target.starts_with("/uploads/output/a__b-"));

  let response = app(dir.path(), Some(cat_model()))
    .oneshot(get(&target))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_result_is_not_found() {
  let dir = tempfile::tempdir().unwrap();

  for uri in [
    "/uploads/output/missing-12345678.annotated.jpg",
    "/uploads/output/missing-12345678.jpg",
    "/uploads/output/bad%20name.annotated.jpg",
  ] {
    let response = app(dir.path(), Some(cat_model()))
      .oneshot(get(uri))
      .await
      .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
  }
}

#[tokio::test]
async fn browser_upload_without_model_is_a_server_error() {
  let dir = tempfile::tempdir().unwrap();
  let request = MultipartBody::new()
    .file("image", "cat.jpg", &jpeg_bytes(32, 24))
    .request("/");

  let response = app(dir.path(), None).oneshot(request).await.unwrap();

  assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
