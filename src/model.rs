// 该文件是 Shanan （山南西风） 项目的一部分。
// src/model.rs - 模型
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

use std::sync::Arc;

use image::RgbImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

/// 在请求之间共享的检测模型，只读使用
pub type SharedModel =
  Arc<dyn Model<Input = RgbImage, Output = DetectResult, Error = ModelError> + Send + Sync>;

#[derive(Error, Debug)]
pub enum ModelError {
  #[error("模型不可用: {0}")]
  Unavailable(String),
  #[error("未知模型: {0}, 可选: {1}")]
  UnknownModel(String, String),
  #[error("模型地址错误: {0}")]
  ModelPathError(String),
  #[error("HTTP 错误: {0}")]
  HttpError(#[from] reqwest::Error),
  #[error("推理服务返回状态 {0}: {1}")]
  StatusError(u16, String),
  #[error("模型输出无效: {0}")]
  MalformedOutput(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectItem {
  pub label: String,
  pub score: f32,
  pub bbox: [f32; 4], // [y_min, x_min, y_max, x_max]
}

#[derive(Debug, Clone, Default)]
pub struct DetectResult {
  pub items: Box<[DetectItem]>,
}

impl DetectResult {
  /// 由下标对齐的框、标签、置信度数组组装结果，顺序与模型输出一致
  pub fn from_aligned(
    boxes: Vec<[f32; 4]>,
    labels: Vec<String>,
    scores: Vec<f32>,
  ) -> Result<Self, ModelError> {
    if boxes.len() != labels.len() || boxes.len() != scores.len() {
      return Err(ModelError::MalformedOutput(format!(
        "数组长度不一致: 框 {}, 标签 {}, 置信度 {}",
        boxes.len(),
        labels.len(),
        scores.len()
      )));
    }

    let items = boxes
      .into_iter()
      .zip(labels)
      .zip(scores)
      .map(|((bbox, label), score)| DetectItem { label, score, bbox })
      .collect::<Vec<_>>();

    Ok(DetectResult {
      items: items.into_boxed_slice(),
    })
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, DetectItem> {
    self.items.iter()
  }
}

impl From<Vec<DetectItem>> for DetectResult {
  fn from(items: Vec<DetectItem>) -> Self {
    DetectResult {
      items: items.into_boxed_slice(),
    }
  }
}

mod registry;
pub use self::registry::{DEFAULT_MODEL, MODEL_REGISTRY, ModelEntry};

mod tf_serving;
pub use self::tf_serving::{TfServing, TfServingBuilder};
