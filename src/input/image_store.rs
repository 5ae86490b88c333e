// 该文件是 Shanan （山南西风） 项目的一部分。
// src/input/image_store.rs - 上传目录中的图像文件
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
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::{RgbImage, codecs::jpeg::JpegEncoder};
use tracing::debug;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use super::InputError;

const OUTPUT_DIR: &str = "output";
const IMAGE_SUFFIX: &str = ".jpg";
const ANNOTATED_IMAGE_SUFFIX: &str = ".annotated.jpg";
const ANNOTATED_RECORD_SUFFIX: &str = ".annotated.json";
const FALLBACK_STEM: &str = "image";
const UNIQUE_SUFFIX_LEN: usize = 8;

/// 一次请求所有派生文件共用的名称
///
/// 上传文件名经过清洗后附加随机后缀，URL 来源直接使用随机 UUID，
/// 因此并发请求之间不会互相覆盖。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactName(String);

impl ArtifactName {
  pub fn generated() -> Self {
    ArtifactName(Uuid::new_v4().simple().to_string())
  }

  pub fn from_client_filename(filename: &str) -> Self {
    let secured = secure_filename(filename);
    let stem = Path::new(&secured)
      .file_stem()
      .and_then(|s| s.to_str())
      .filter(|s| !s.is_empty())
      .unwrap_or(FALLBACK_STEM)
      .replace('.', "_");
    let unique = Uuid::new_v4().simple().to_string();
    ArtifactName(format!("{}-{}", stem, &unique[..UNIQUE_SUFFIX_LEN]))
  }

  /// 校验来自请求路径的名称
  pub fn parse(name: &str) -> Result<Self, InputError> {
    let valid = !name.is_empty()
      && !name.starts_with('.')
      && !name.contains("..")
      && name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
      Ok(ArtifactName(name.to_string()))
    } else {
      Err(InputError::InvalidName(name.to_string()))
    }
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl std::fmt::Display for ArtifactName {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

/// 把客户端提供的文件名变成可以安全落盘的形式
///
/// 先做 NFKD 分解并丢弃非 ASCII 字符，`Café.jpg` 得到 `Cafe.jpg`。
pub fn secure_filename(filename: &str) -> String {
  let spaced = filename
    .nfkd()
    .filter(char::is_ascii)
    .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
    .collect::<String>();
  let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
  joined
    .chars()
    .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    .collect::<String>()
    .trim_matches(|c| c == '.' || c == '_')
    .to_string()
}

pub fn has_allowed_extension(filename: &str, allowed: &[&str]) -> bool {
  filename
    .rsplit_once('.')
    .map(|(_, ext)| allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)))
    .unwrap_or(false)
}

pub fn write_jpeg(path: &Path, image: &RgbImage, quality: u8) -> Result<(), InputError> {
  let mut writer = BufWriter::new(File::create(path)?);
  let encoder = JpegEncoder::new_with_quality(&mut writer, quality);
  image.write_with_encoder(encoder)?;
  writer.flush()?;
  Ok(())
}

#[derive(Debug, Clone)]
pub struct ImageStore {
  root: PathBuf,
}

impl ImageStore {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    ImageStore { root: root.into() }
  }

  pub fn create_dirs(&self) -> Result<(), InputError> {
    std::fs::create_dir_all(self.output_dir())?;
    Ok(())
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn output_dir(&self) -> PathBuf {
    self.root.join(OUTPUT_DIR)
  }

  pub fn image_path(&self, name: &ArtifactName) -> PathBuf {
    self.root.join(format!("{}{}", name, IMAGE_SUFFIX))
  }

  pub fn annotated_path(&self, name: &ArtifactName) -> PathBuf {
    self
      .output_dir()
      .join(format!("{}{}", name, ANNOTATED_IMAGE_SUFFIX))
  }

  pub fn record_path(&self, name: &ArtifactName) -> PathBuf {
    self
      .output_dir()
      .join(format!("{}{}", name, ANNOTATED_RECORD_SUFFIX))
  }

  /// 原样写入上传的字节
  pub fn save_bytes(&self, name: &ArtifactName, bytes: &[u8]) -> Result<PathBuf, InputError> {
    let path = self.image_path(name);
    std::fs::write(&path, bytes)?;
    debug!("保存上传文件: {} ({} 字节)", path.display(), bytes.len());
    Ok(path)
  }

  pub fn save_image(
    &self,
    name: &ArtifactName,
    image: &RgbImage,
    quality: u8,
  ) -> Result<PathBuf, InputError> {
    let path = self.image_path(name);
    write_jpeg(&path, image, quality)?;
    debug!("保存图像: {}", path.display());
    Ok(path)
  }
}
