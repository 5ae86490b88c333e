// 该文件是 Shanan （山南西风） 项目的一部分。
// src/output/font.rs - 标签字体
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

use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use tracing::{debug, warn};

use crate::output::OutputError;

/// 未指定字体时依次尝试的系统字体
pub const SYSTEM_FONT_CANDIDATES: [&str; 3] = [
  "/usr/share/fonts/truetype/liberation/LiberationSansNarrow-Regular.ttf",
  "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
  "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
];

// 内置的默认字体数据
const BUILTIN_FONT: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

pub struct LabelFont {
  font: FontArc,
  scale: PxScale,
}

impl LabelFont {
  /// 加载指定字体，失败时尝试系统字体，全部失败则使用内置字体
  pub fn load(path: Option<&Path>, size: f32) -> Result<Self, OutputError> {
    let candidates = path
      .map(Path::to_path_buf)
      .into_iter()
      .chain(SYSTEM_FONT_CANDIDATES.iter().map(PathBuf::from))
      .collect::<Vec<_>>();
    Self::load_from(&candidates, size)
  }

  pub fn load_from(candidates: &[PathBuf], size: f32) -> Result<Self, OutputError> {
    for path in candidates {
      let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
          debug!("读取字体 {} 失败: {}", path.display(), e);
          continue;
        }
      };
      match FontArc::try_from_vec(data) {
        Ok(font) => {
          debug!("使用字体: {}", path.display());
          return Ok(LabelFont {
            font,
            scale: PxScale::from(size),
          });
        }
        Err(e) => warn!("字体文件无效 {}: {}", path.display(), e),
      }
    }

    warn!("未找到可用字体，使用内置字体");
    Self::builtin(size)
  }

  pub fn builtin(size: f32) -> Result<Self, OutputError> {
    Ok(LabelFont {
      font: FontArc::try_from_slice(BUILTIN_FONT)?,
      scale: PxScale::from(size),
    })
  }

  /// 文本渲染后的 (宽, 高)
  pub fn text_size(&self, text: &str) -> (u32, u32) {
    text_size(self.scale, &self.font, text)
  }

  pub fn draw_text(&self, image: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, text: &str) {
    draw_text_mut(image, color, x, y, self.scale, &self.font, text);
  }
}
