// 该文件是 Shanan （山南西风） 项目的一部分。
// src/task.rs - 单次检测任务
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

//! 一次请求的完整流程：保存 → 归一化 → 推理 → 标注 → 汇总。
//!
//! 整个流程是同步阻塞的，由调用方决定放在哪个线程上执行。
//! 模型为空时任何步骤都不会执行。

use std::time::Instant;

use image::{ImageReader, RgbImage};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
  config::Config,
  input::{ArtifactName, ImageStore, InputError, RemoteImageInput, normalize_with_quality},
  model::{ModelError, SharedModel},
  output::{DetectionRecord, OutputError, Render, SaveAnnotatedOutput, draw::Draw},
};

#[derive(Error, Debug)]
pub enum TaskError {
  #[error("没有加载模型")]
  ModelUnavailable,
  #[error("无法获取输入图像: {0}")]
  SourceError(InputError),
  #[error("输入错误: {0}")]
  InputError(#[from] InputError),
  #[error("模型错误: {0}")]
  ModelError(#[from] ModelError),
  #[error("输出错误: {0}")]
  OutputError(#[from] OutputError),
}

/// 请求携带的图像来源
#[derive(Debug, Clone)]
pub enum ImageSource {
  Upload { filename: String, bytes: Vec<u8> },
  Url(String),
}

#[derive(Debug, Clone)]
pub struct TaskOutcome {
  pub name: ArtifactName,
  pub record: DetectionRecord,
}

pub struct DetectionTask {
  config: Config,
  store: ImageStore,
  model: Option<SharedModel>,
  draw: Draw,
}

impl DetectionTask {
  pub fn new(config: Config, model: Option<SharedModel>) -> Result<Self, TaskError> {
    let draw = Draw::from_config(&config)?;
    Ok(Self::with_draw(config, model, draw))
  }

  pub fn with_draw(config: Config, model: Option<SharedModel>, draw: Draw) -> Self {
    let store = ImageStore::new(config.upload_dir());
    DetectionTask {
      config,
      store,
      model,
      draw,
    }
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn store(&self) -> &ImageStore {
    &self.store
  }

  pub fn model_available(&self) -> bool {
    self.model.is_some()
  }

  /// 把来源图像写入上传目录，返回本次请求的产物名称
  pub fn save_source(&self, source: ImageSource) -> Result<ArtifactName, TaskError> {
    match source {
      ImageSource::Upload { filename, bytes } => {
        let name = ArtifactName::from_client_filename(&filename);
        self.store.save_bytes(&name, &bytes)?;
        info!("保存上传图像 {} 为 {}", filename, name);
        Ok(name)
      }
      ImageSource::Url(url) => {
        let image = RemoteImageInput::parse(&url)
          .map_err(TaskError::SourceError)?
          .into_image();
        let name = ArtifactName::generated();
        self
          .store
          .save_image(&name, &image, self.config.jpeg_quality)?;
        info!("保存远程图像 {} 为 {}", url, name);
        Ok(name)
      }
    }
  }

  fn load_frame(&self, name: &ArtifactName) -> Result<RgbImage, InputError> {
    let path = self.store.image_path(name);
    Ok(ImageReader::open(&path)?.with_guessed_format()?.decode()?.to_rgb8())
  }

  /// 对已保存的图像执行检测；`persist` 为真时保存标注图像和 JSON 记录
  pub fn run(&self, name: &ArtifactName, persist: bool) -> Result<DetectionRecord, TaskError> {
    let model = self.model.as_ref().ok_or(TaskError::ModelUnavailable)?;

    info!("开始任务: {}", name);
    // 先归一化，之后的框坐标换算依赖固定尺寸
    normalize_with_quality(
      &self.store.image_path(name),
      self.config.width,
      self.config.height,
      self.config.jpeg_quality,
    )?;
    let frame = self.load_frame(name)?;

    info!("输入帧获取成功，开始推理...");
    let now = Instant::now();
    let result = model.infer(&frame)?;
    let elapsed = now.elapsed();
    info!("推理完成，耗时: {:.2?}，检测到 {} 个对象", elapsed, result.len());
    if result.is_empty() {
      debug!("未检测到对象: {}", name);
    }

    let annotated_path = if persist {
      let output = SaveAnnotatedOutput::new(
        self.store.annotated_path(name),
        &self.draw,
        self.config.jpeg_quality,
      );
      output.render_result(&frame, &result)?;
      Some(output.path().to_path_buf())
    } else {
      None
    };

    let record = DetectionRecord::assemble(
      &result,
      elapsed,
      annotated_path.as_deref(),
      self.config.model.handle,
    );

    if persist {
      record.write_json(&self.store.record_path(name))?;
    }

    debug!("任务完成: {}", name);
    Ok(record)
  }

  pub fn run_source(&self, source: ImageSource, persist: bool) -> Result<TaskOutcome, TaskError> {
    if !self.model_available() {
      return Err(TaskError::ModelUnavailable);
    }
    let name = self.save_source(source)?;
    let record = self.run(&name, persist)?;
    Ok(TaskOutcome { name, record })
  }
}
