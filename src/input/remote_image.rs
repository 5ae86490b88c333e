// 该文件是 Shanan （山南西风） 项目的一部分。
// src/input/remote_image.rs - 从 URL 获取图像
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

use image::RgbImage;
use reqwest::blocking::Client;
use tracing::{error, info};
use url::Url;

use crate::FromUrl;

use super::InputError;

const REMOTE_IMAGE_SCHEMES: [&str; 2] = ["http", "https"];

/// URL 指向的单张图像，下载后立即解码
pub struct RemoteImageInput {
  image: RgbImage,
}

impl FromUrl for RemoteImageInput {
  type Error = InputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if !REMOTE_IMAGE_SCHEMES.contains(&url.scheme()) {
      error!(
        "URI scheme mismatch: expected one of {:?}, found '{}'",
        REMOTE_IMAGE_SCHEMES,
        url.scheme()
      );
      return Err(InputError::SchemeMismatch(url.scheme().to_string()));
    }

    info!("下载图像: {}", url);
    let response = Client::new().get(url.clone()).send()?;
    let status = response.status();
    if !status.is_success() {
      return Err(InputError::RemoteStatus(format!("{} 返回 {}", url, status)));
    }

    let bytes = response.bytes()?;
    let image = image::load_from_memory(&bytes)?.to_rgb8();
    info!("图像下载完成: {}x{}", image.width(), image.height());

    Ok(RemoteImageInput { image })
  }
}

impl RemoteImageInput {
  pub fn parse(url: &str) -> Result<Self, InputError> {
    Self::from_url(&Url::parse(url.trim())?)
  }

  pub fn into_image(self) -> RgbImage {
    self.image
  }
}
