// 该文件是 Shanan （山南西风） 项目的一部分。
// src/input/normalize.rs - 图像归一化
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

use image::{ImageReader, imageops::FilterType};
use tracing::info;

use super::{InputError, write_jpeg};
use crate::config::DEFAULT_JPEG_QUALITY;

/// 居中裁剪并缩放到 `width`×`height`，转为 RGB 后以 JPEG 覆盖原文件
pub fn normalize(path: &Path, width: u32, height: u32) -> Result<PathBuf, InputError> {
  normalize_with_quality(path, width, height, DEFAULT_JPEG_QUALITY)
}

pub fn normalize_with_quality(
  path: &Path,
  width: u32,
  height: u32,
  quality: u8,
) -> Result<PathBuf, InputError> {
  let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
  let (src_w, src_h) = (image.width(), image.height());

  // 不保持原始宽高比，多余部分被裁掉
  let fitted = image
    .resize_to_fill(width, height, FilterType::Lanczos3)
    .to_rgb8();
  write_jpeg(path, &fitted, quality)?;

  info!(
    "归一化图像 {}: {}x{} -> {}x{}",
    path.display(),
    src_w,
    src_h,
    fitted.width(),
    fitted.height()
  );

  Ok(path.to_path_buf())
}
