// 该文件是 Shanan （山南西风） 项目的一部分。
// src/output/record.rs - 检测结果记录
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

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{model::DetectResult, output::OutputError};

const JSON_INDENT: &[u8] = b"    ";

/// 单次请求的检测结果，创建后不再修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
  pub objects_found: usize,
  pub detection_class_entities: Vec<String>,
  pub detection_scores: Vec<f32>,
  #[serde(default)]
  pub detection_boxes: Vec<[f32; 4]>,
  /// 推理耗时（秒）
  pub inference_time: f64,
  pub annotated_image_path: Option<String>,
  pub model_used: String,
  #[serde(default)]
  pub processed_at: Option<DateTime<Utc>>,
}

impl DetectionRecord {
  pub fn assemble(
    result: &DetectResult,
    inference_time: Duration,
    annotated_image_path: Option<&Path>,
    model_used: &str,
  ) -> Self {
    DetectionRecord {
      objects_found: result.len(),
      detection_class_entities: result.iter().map(|i| i.label.clone()).collect(),
      detection_scores: result.iter().map(|i| i.score).collect(),
      detection_boxes: result.iter().map(|i| i.bbox).collect(),
      inference_time: inference_time.as_secs_f64(),
      annotated_image_path: annotated_image_path.map(|p| p.display().to_string()),
      model_used: model_used.to_string(),
      processed_at: Some(Utc::now()),
    }
  }

  /// UTF-8，非 ASCII 字符不转义，4 空格缩进
  pub fn write_json(&self, path: &Path) -> Result<(), OutputError> {
    let mut writer = BufWriter::new(File::create(path)?);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(JSON_INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
    self.serialize(&mut serializer)?;
    writer.flush()?;
    debug!("保存检测记录: {}", path.display());
    Ok(())
  }

  pub fn read_json(path: &Path) -> Result<Self, OutputError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
  }
}
