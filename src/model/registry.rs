// 该文件是 Shanan （山南西风） 项目的一部分。
// src/model/registry.rs - 静态模型表
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

use std::str::FromStr;

use super::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelEntry {
  /// 模型名称，同时作为推理服务中的默认 servable 名称
  pub name: &'static str,
  /// 模型来源，写入结果的 `model_used` 字段
  pub handle: &'static str,
}

pub const DEFAULT_MODEL: &str = "mobilenet_v2";

pub const MODEL_REGISTRY: [ModelEntry; 3] = [
  ModelEntry {
    name: "none",
    handle: "",
  },
  ModelEntry {
    name: "mobilenet_v2",
    handle: "https://tfhub.dev/google/openimages_v4/ssd/mobilenet_v2/1",
  },
  ModelEntry {
    name: "inception_resnet_v2",
    handle: "https://tfhub.dev/google/faster_rcnn/openimages_v4/inception_resnet_v2/1",
  },
];

impl ModelEntry {
  /// `none` 条目表示不加载任何模型
  pub fn is_none(&self) -> bool {
    self.handle.is_empty()
  }
}

impl Default for ModelEntry {
  fn default() -> Self {
    MODEL_REGISTRY[1]
  }
}

impl FromStr for ModelEntry {
  type Err = ModelError;

  fn from_str(name: &str) -> Result<Self, Self::Err> {
    MODEL_REGISTRY
      .iter()
      .find(|entry| entry.name == name)
      .copied()
      .ok_or_else(|| {
        let names = MODEL_REGISTRY
          .iter()
          .map(|entry| entry.name)
          .collect::<Vec<_>>()
          .join(", ");
        ModelError::UnknownModel(name.to_string(), names)
      })
  }
}
