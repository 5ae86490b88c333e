// 该文件是 Shanan （山南西风） 项目的一部分。
// src/input.rs - 图像输入与存储
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

use thiserror::Error;

mod image_store;
pub use self::image_store::{
  ArtifactName, ImageStore, has_allowed_extension, secure_filename, write_jpeg,
};

mod normalize;
pub use self::normalize::{normalize, normalize_with_quality};

mod remote_image;
pub use self::remote_image::RemoteImageInput;

#[derive(Error, Debug)]
pub enum InputError {
  #[error("I/O error: {0}")]
  IoError(#[from] std::io::Error),
  #[error("Image loading error: {0}")]
  ImageLoadError(#[from] image::ImageError),
  #[error("URL error: {0}")]
  UrlError(#[from] url::ParseError),
  #[error("URI scheme mismatch: {0}")]
  SchemeMismatch(String),
  #[error("Remote fetch error: {0}")]
  FetchError(#[from] reqwest::Error),
  #[error("Remote image unavailable: {0}")]
  RemoteStatus(String),
  #[error("Invalid artifact name: {0}")]
  InvalidName(String),
}
