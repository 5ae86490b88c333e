// 该文件是 Shanan （山南西风） 项目的一部分。
// src/output/save_annotated.rs - 保存标注图像
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

use image::RgbImage;
use tracing::info;

use crate::{
  input::write_jpeg,
  model::DetectResult,
  output::{
    OutputError, Render,
    draw::{Draw, DrawDetectionOnImage},
  },
};

pub struct SaveAnnotatedOutput<'a> {
  path: PathBuf,
  draw: &'a Draw,
  quality: u8,
}

impl<'a> SaveAnnotatedOutput<'a> {
  pub fn new(path: impl Into<PathBuf>, draw: &'a Draw, quality: u8) -> Self {
    SaveAnnotatedOutput {
      path: path.into(),
      draw,
      quality,
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  fn save_image(&self, image: &RgbImage) -> Result<(), OutputError> {
    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }

    write_jpeg(&self.path, image, self.quality)?;
    Ok(())
  }
}

impl Render<RgbImage, DetectResult> for SaveAnnotatedOutput<'_> {
  type Error = OutputError;

  fn render_result(&self, frame: &RgbImage, result: &DetectResult) -> Result<(), Self::Error> {
    let (image, drawn) = self.draw.annotate(frame, result);
    self.save_image(&image)?;
    info!("保存标注图像到文件: {} ({} 个框)", self.path.display(), drawn);
    Ok(())
  }
}
