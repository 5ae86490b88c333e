// 该文件是 Shanan （山南西风） 项目的一部分。
// src/config.rs - 运行时配置
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

use std::path::{Path, PathBuf};

use crate::model::ModelEntry;

pub const DEFAULT_UPLOAD_DIR: &str = "static/uploads";
pub const DEFAULT_WORK_WIDTH: u32 = 640;
pub const DEFAULT_WORK_HEIGHT: u32 = 480;
pub const DEFAULT_JPEG_QUALITY: u8 = 90;
pub const DEFAULT_MAX_BOXES: usize = 10;
pub const DEFAULT_MIN_SCORE: f32 = 0.1;

/// 处理流水线的运行时配置
///
/// 在启动阶段构建一次，之后只读共享。
#[derive(Debug, Clone)]
pub struct Config {
  /// 上传目录，归一化图片直接存放于此
  pub upload_dir: PathBuf,
  /// 归一化后的宽度
  pub width: u32,
  /// 归一化后的高度
  pub height: u32,
  /// JPEG 编码质量 (1 - 100)
  pub jpeg_quality: u8,
  /// 最多绘制的检测框数量
  pub max_boxes: usize,
  /// 绘制检测框的最低置信度
  pub min_score: f32,
  /// 标签字体文件，未指定时尝试系统字体
  pub font_path: Option<PathBuf>,
  /// 当前使用的模型
  pub model: ModelEntry,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
      width: DEFAULT_WORK_WIDTH,
      height: DEFAULT_WORK_HEIGHT,
      jpeg_quality: DEFAULT_JPEG_QUALITY,
      max_boxes: DEFAULT_MAX_BOXES,
      min_score: DEFAULT_MIN_SCORE,
      font_path: None,
      model: ModelEntry::default(),
    }
  }
}

impl Config {
  pub fn with_upload_dir(mut self, upload_dir: impl Into<PathBuf>) -> Self {
    self.upload_dir = upload_dir.into();
    self
  }

  pub fn with_model(mut self, model: ModelEntry) -> Self {
    self.model = model;
    self
  }

  pub fn with_min_score(mut self, min_score: f32) -> Self {
    self.min_score = min_score;
    self
  }

  pub fn upload_dir(&self) -> &Path {
    &self.upload_dir
  }
}
