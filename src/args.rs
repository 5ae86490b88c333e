// 该文件是 Shanan （山南西风） 项目的一部分。
// src/args.rs - 服务参数配置
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

use std::path::PathBuf;

use clap::Parser;
use url::Url;

use shanan_web::{
  Config,
  config::{
    DEFAULT_JPEG_QUALITY, DEFAULT_MAX_BOXES, DEFAULT_MIN_SCORE, DEFAULT_UPLOAD_DIR,
    DEFAULT_WORK_HEIGHT, DEFAULT_WORK_WIDTH,
  },
  model::{DEFAULT_MODEL, ModelEntry},
};

/// Shanan 目标检测 Web 服务
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 监听地址
  #[arg(long, env = "SHANAN_LISTEN", default_value = "0.0.0.0:5000", value_name = "ADDR")]
  pub listen: String,

  /// 上传目录，标注结果写入其下的 output 子目录
  #[arg(long, env = "SHANAN_UPLOAD_DIR", default_value = DEFAULT_UPLOAD_DIR, value_name = "DIR")]
  pub upload_dir: PathBuf,

  /// 模型名称 (none, mobilenet_v2, inception_resnet_v2)
  #[arg(long, env = "SHANAN_MODEL", default_value = DEFAULT_MODEL, value_name = "NAME")]
  pub model: String,

  /// 推理服务地址，形如 tfserving://host:port[/servable][?tls]
  #[arg(
    long,
    env = "SHANAN_DETECTOR",
    default_value = "tfserving://127.0.0.1:8501",
    value_name = "URL"
  )]
  pub detector: Url,

  /// 归一化宽度
  #[arg(long, default_value_t = DEFAULT_WORK_WIDTH, value_name = "PIXELS")]
  pub width: u32,

  /// 归一化高度
  #[arg(long, default_value_t = DEFAULT_WORK_HEIGHT, value_name = "PIXELS")]
  pub height: u32,

  /// JPEG 编码质量 (1 - 100)
  #[arg(
    long,
    default_value_t = DEFAULT_JPEG_QUALITY,
    value_parser = clap::value_parser!(u8).range(1..=100),
    value_name = "QUALITY"
  )]
  pub jpeg_quality: u8,

  /// 最多绘制的检测框数量
  #[arg(long, default_value_t = DEFAULT_MAX_BOXES, value_name = "COUNT")]
  pub max_boxes: usize,

  /// 绘制检测框的最低置信度 (0.0 - 1.0)
  #[arg(long, default_value_t = DEFAULT_MIN_SCORE, value_name = "THRESHOLD")]
  pub min_score: f32,

  /// 标签字体文件 (TTF/OTF)
  #[arg(long, env = "SHANAN_FONT", value_name = "FILE")]
  pub font: Option<PathBuf>,
}

impl Args {
  pub fn to_config(&self, model: ModelEntry) -> Config {
    let mut config = Config::default()
      .with_upload_dir(&self.upload_dir)
      .with_model(model)
      .with_min_score(self.min_score);
    config.width = self.width;
    config.height = self.height;
    config.jpeg_quality = self.jpeg_quality;
    config.max_boxes = self.max_boxes;
    config.font_path = self.font.clone();
    config
  }
}
