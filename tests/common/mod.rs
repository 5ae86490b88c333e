// 该文件是 Shanan （山南西风） 项目的一部分。
// tests/common/mod.rs - 集成测试公共工具
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

#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, Response, header},
};
use image::{ImageFormat, Rgb, RgbImage};

use shanan_web::{
  Config,
  model::{DetectItem, DetectResult, Model, ModelError, SharedModel},
  output::{draw::Draw, font::LabelFont},
  server::{AppState, create_app},
  task::DetectionTask,
};

pub const BOUNDARY: &str = "shanan-test-boundary";

/// 总是返回固定结果的模型
pub struct StubModel {
  result: DetectResult,
}

impl Model for StubModel {
  type Input = RgbImage;
  type Output = DetectResult;
  type Error = ModelError;

  fn infer(&self, _input: &Self::Input) -> Result<Self::Output, Self::Error> {
    Ok(self.result.clone())
  }
}

pub fn cat_model() -> SharedModel {
  Arc::new(StubModel {
    result: DetectResult::from(vec![DetectItem {
      label: "cat".to_string(),
      score: 0.9,
      bbox: [0.1, 0.1, 0.5, 0.5],
    }]),
  })
}

pub fn app(upload_dir: &Path, model: Option<SharedModel>) -> Router {
  let config = Config::default().with_upload_dir(upload_dir);
  let draw = Draw::with_font(LabelFont::builtin(16.0).unwrap(), config.max_boxes, config.min_score);
  let state = AppState::from_task(DetectionTask::with_draw(config, model, draw)).unwrap();
  create_app(state)
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
  let image = RgbImage::from_pixel(width, height, Rgb([200, 120, 40]));
  let mut bytes = Cursor::new(Vec::new());
  image.write_to(&mut bytes, ImageFormat::Jpeg).unwrap();
  bytes.into_inner()
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
  let image = RgbImage::from_pixel(width, height, Rgb([10, 20, 30]));
  let mut bytes = Cursor::new(Vec::new());
  image.write_to(&mut bytes, ImageFormat::Png).unwrap();
  bytes.into_inner()
}

#[derive(Default)]
pub struct MultipartBody {
  body: Vec<u8>,
}

impl MultipartBody {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn text(mut self, name: &str, value: &str) -> Self {
    self.body.extend_from_slice(
      format!(
        "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
        BOUNDARY, name, value
      )
      .as_bytes(),
    );
    self
  }

  pub fn file(mut self, name: &str, filename: &str, bytes: &[u8]) -> Self {
    self.body.extend_from_slice(
      format!(
        "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n",
        BOUNDARY, name, filename
      )
      .as_bytes(),
    );
    self.body.extend_from_slice(bytes);
    self.body.extend_from_slice(b"\r\n");
    self
  }

  pub fn request(mut self, uri: &str) -> Request<Body> {
    self
      .body
      .extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    Request::post(uri)
      .header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={}", BOUNDARY),
      )
      .body(Body::from(self.body))
      .unwrap()
  }
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
  axum::body::to_bytes(response.into_body(), usize::MAX)
    .await
    .unwrap()
    .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
  serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
  String::from_utf8(body_bytes(response).await).unwrap()
}
