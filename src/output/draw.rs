// 该文件是 Shanan （山南西风） 项目的一部分。
// src/output/draw.rs - 目标检测结果可视化
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

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use tracing::debug;

use crate::{
  config::Config,
  model::{DetectItem, DetectResult},
  output::{OutputError, font::LabelFont},
};

// 文本渲染常量
const LABEL_FONT_SIZE: f32 = 25.0;
const LABEL_MARGIN_RATIO: f32 = 0.05;
const LABEL_TEXT_COLOR: [u8; 3] = [0, 0, 0]; // 黑色
const BOX_THICKNESS: u32 = 4;

/// 标签颜色表
pub const PALETTE: [[u8; 3]; 24] = [
  [240, 248, 255], // aliceblue
  [127, 255, 212], // aquamarine
  [255, 228, 196], // bisque
  [222, 184, 135], // burlywood
  [95, 158, 160],  // cadetblue
  [127, 255, 0],   // chartreuse
  [210, 105, 30],  // chocolate
  [255, 127, 80],  // coral
  [100, 149, 237], // cornflowerblue
  [0, 255, 255],   // cyan
  [189, 183, 107], // darkkhaki
  [255, 140, 0],   // darkorange
  [233, 150, 122], // darksalmon
  [143, 188, 143], // darkseagreen
  [0, 206, 209],   // darkturquoise
  [255, 20, 147],  // deeppink
  [0, 191, 255],   // deepskyblue
  [255, 215, 0],   // gold
  [173, 255, 47],  // greenyellow
  [255, 105, 180], // hotpink
  [240, 230, 140], // khaki
  [173, 216, 230], // lightblue
  [144, 238, 144], // lightgreen
  [255, 160, 122], // lightsalmon
];

/// 按标签取颜色
///
/// 同一进程内同一标签总是得到同一颜色。不同版本或不同进程之间的映射不作保证，
/// 调用方不应依赖具体的颜色值。
pub fn color_for_label(label: &str) -> Rgb<u8> {
  let mut hasher = DefaultHasher::new();
  label.hash(&mut hasher);
  Rgb(PALETTE[(hasher.finish() % PALETTE.len() as u64) as usize])
}

pub fn display_string(item: &DetectItem) -> String {
  format!("{}: {}%", item.label, (100.0 * item.score) as i32)
}

pub struct Draw {
  font: LabelFont,
  thickness: u32,
  max_boxes: usize,
  min_score: f32,
}

impl Draw {
  pub fn new(
    font_path: Option<&Path>,
    max_boxes: usize,
    min_score: f32,
  ) -> Result<Self, OutputError> {
    let font = LabelFont::load(font_path, LABEL_FONT_SIZE)?;
    Ok(Self::with_font(font, max_boxes, min_score))
  }

  pub fn with_font(font: LabelFont, max_boxes: usize, min_score: f32) -> Self {
    Self {
      font,
      thickness: BOX_THICKNESS,
      max_boxes,
      min_score,
    }
  }

  pub fn from_config(config: &Config) -> Result<Self, OutputError> {
    Self::new(config.font_path.as_deref(), config.max_boxes, config.min_score)
  }

  fn draw_outline(
    &self,
    image: &mut RgbImage,
    (left, top, right, bottom): (f32, f32, f32, f32),
    color: Rgb<u8>,
  ) {
    let t = self.thickness;
    let half = (t / 2) as i32;
    let (l, tp, r, b) = (
      left.round() as i32,
      top.round() as i32,
      right.round() as i32,
      bottom.round() as i32,
    );
    let width = (r - l).max(0) as u32 + t;
    let height = (b - tp).max(0) as u32 + t;

    // 上下边
    draw_filled_rect_mut(image, Rect::at(l - half, tp - half).of_size(width, t), color);
    draw_filled_rect_mut(image, Rect::at(l - half, b - half).of_size(width, t), color);
    // 左右边
    draw_filled_rect_mut(image, Rect::at(l - half, tp - half).of_size(t, height), color);
    draw_filled_rect_mut(image, Rect::at(r - half, tp - half).of_size(t, height), color);
  }

  // 在图像上绘制一个矩形边框，bbox 为归一化坐标 [y_min, x_min, y_max, x_max]
  fn draw_bbox_with_labels(
    &self,
    image: &mut RgbImage,
    bbox: &[f32; 4],
    color: Rgb<u8>,
    display_strs: &[String],
  ) {
    let (w, h) = (image.width() as f32, image.height() as f32);
    let [y_min, x_min, y_max, x_max] = *bbox;
    let (left, right, top, bottom) = (x_min * w, x_max * w, y_min * h, y_max * h);

    self.draw_outline(image, (left, top, right, bottom), color);

    // 标签总高度放不进框上方时改为画在框上边缘下方
    let sizes = display_strs
      .iter()
      .map(|s| self.font.text_size(s))
      .collect::<Vec<_>>();
    let total_height =
      (1.0 + 2.0 * LABEL_MARGIN_RATIO) * sizes.iter().map(|(_, th)| *th as f32).sum::<f32>();
    let mut text_bottom = if top > total_height {
      top
    } else {
      top + total_height
    };

    // 自下而上绘制
    for (display_str, (text_width, text_height)) in display_strs.iter().zip(sizes).rev() {
      let text_height = text_height as f32;
      let margin = (LABEL_MARGIN_RATIO * text_height).ceil();
      let rect_top = text_bottom - text_height - 2.0 * margin;
      let rect = Rect::at(left as i32, rect_top as i32).of_size(
        text_width.max(1),
        (text_bottom - rect_top).round().max(1.0) as u32,
      );
      draw_filled_rect_mut(image, rect, color);

      self.font.draw_text(
        image,
        Rgb(LABEL_TEXT_COLOR),
        (left + margin) as i32,
        (text_bottom - text_height - margin) as i32,
        display_str,
      );
      text_bottom -= text_height + 2.0 * margin;
    }
  }
}

pub trait DrawDetectionOnImage {
  /// 就地绘制，返回实际绘制的检测框数量
  fn draw_detections_on_image(&self, image: &mut RgbImage, result: &DetectResult) -> usize;

  /// 在副本上绘制
  fn annotate(&self, image: &RgbImage, result: &DetectResult) -> (RgbImage, usize) {
    let mut annotated = image.clone();
    let drawn = self.draw_detections_on_image(&mut annotated, result);
    (annotated, drawn)
  }
}

impl DrawDetectionOnImage for Draw {
  fn draw_detections_on_image(&self, image: &mut RgbImage, result: &DetectResult) -> usize {
    let mut drawn = 0;
    // 只看模型输出的前 max_boxes 个，不重新排序
    for item in result.iter().take(self.max_boxes) {
      if item.score < self.min_score {
        continue;
      }
      let color = color_for_label(&item.label);
      self.draw_bbox_with_labels(image, &item.bbox, color, &[display_string(item)]);
      drawn += 1;
    }
    debug!("绘制 {} / {} 个检测框", drawn, result.len());
    drawn
  }
}
