// 该文件是 Shanan （山南西风） 项目的一部分。
// src/model/tf_serving.rs - TensorFlow Serving 远程检测模型
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

use std::time::Duration;

use image::RgbImage;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  model::{DetectResult, Model, ModelError},
};

const TF_SERVING_DEFAULT_PORT: u16 = 8501;
const TF_SERVING_STATE_AVAILABLE: &str = "AVAILABLE";

pub struct TfServingBuilder {
  host: String,
  port: u16,
  servable: Option<String>,
  tls: bool,
}

impl FromUrlWithScheme for TfServingBuilder {
  const SCHEME: &'static str = "tfserving";
}

impl FromUrl for TfServingBuilder {
  type Error = ModelError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(ModelError::ModelPathError(format!(
        "模型地址必须使用 {} 方案, 实际为 {}",
        Self::SCHEME,
        url.scheme()
      )));
    }

    let host = url
      .host_str()
      .ok_or_else(|| ModelError::ModelPathError(format!("模型地址缺少主机: {}", url)))?
      .to_string();

    let servable = {
      let path = url.path().trim_matches('/');
      (!path.is_empty()).then(|| path.to_string())
    };

    let tls = url.query_pairs().any(|(k, _)| k == "tls");

    Ok(TfServingBuilder {
      host,
      port: url.port().unwrap_or(TF_SERVING_DEFAULT_PORT),
      servable,
      tls,
    })
  }
}

#[derive(Deserialize)]
struct ModelStatusResponse {
  #[serde(default)]
  model_version_status: Vec<ModelVersionStatus>,
}

#[derive(Deserialize)]
struct ModelVersionStatus {
  #[serde(default)]
  version: String,
  state: String,
}

impl TfServingBuilder {
  /// 地址中没有给出 servable 时使用的名称
  pub fn default_servable(mut self, name: &str) -> Self {
    if self.servable.is_none() {
      self.servable = Some(name.to_string());
    }
    self
  }

  fn model_url(&self) -> Result<String, ModelError> {
    let servable = self
      .servable
      .as_deref()
      .ok_or_else(|| ModelError::ModelPathError("未指定 servable 名称".to_string()))?;
    let scheme = if self.tls { "https" } else { "http" };
    Ok(format!(
      "{}://{}:{}/v1/models/{}",
      scheme, self.host, self.port, servable
    ))
  }

  /// 连接推理服务并确认模型已就绪
  pub fn build(self) -> Result<TfServing, ModelError> {
    let model_url = self.model_url()?;
    info!("检查推理服务模型状态: {}", model_url);

    // 推理不设超时
    let client = Client::builder().timeout(None::<Duration>).build()?;

    let response = client.get(&model_url).send()?;
    let status = response.status();
    if !status.is_success() {
      let body = response.text().unwrap_or_default();
      error!("模型状态查询失败: {} {}", status, body);
      return Err(ModelError::StatusError(status.as_u16(), body));
    }

    let model_status: ModelStatusResponse = response.json()?;
    let available = model_status
      .model_version_status
      .iter()
      .find(|v| v.state == TF_SERVING_STATE_AVAILABLE);

    match available {
      Some(version) => debug!("模型版本 {} 可用", version.version),
      None => {
        return Err(ModelError::Unavailable(format!(
          "{} 没有处于 {} 状态的版本",
          model_url, TF_SERVING_STATE_AVAILABLE
        )));
      }
    }

    info!("模型加载完成");
    Ok(TfServing {
      client,
      predict_url: format!("{}:predict", model_url),
    })
  }
}

pub struct TfServing {
  client: Client,
  predict_url: String,
}

#[derive(Serialize)]
struct PredictRequest {
  instances: [Vec<Vec<[f32; 3]>>; 1],
}

#[derive(Deserialize)]
struct PredictResponse {
  predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
struct Prediction {
  detection_boxes: Vec<[f32; 4]>,
  detection_class_entities: Vec<String>,
  detection_scores: Vec<f32>,
}

/// 转为 H×W×3 的 [0, 1] 浮点张量
fn to_float_tensor(image: &RgbImage) -> Vec<Vec<[f32; 3]>> {
  image
    .rows()
    .map(|row| {
      row
        .map(|p| {
          [
            p[0] as f32 / 255.0,
            p[1] as f32 / 255.0,
            p[2] as f32 / 255.0,
          ]
        })
        .collect()
    })
    .collect()
}

impl Prediction {
  fn into_result(self) -> Result<DetectResult, ModelError> {
    DetectResult::from_aligned(
      self.detection_boxes,
      self.detection_class_entities,
      self.detection_scores,
    )
  }
}

impl Model for TfServing {
  type Input = RgbImage;
  type Output = DetectResult;
  type Error = ModelError;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    debug!("设置模型输入: {}x{}", input.width(), input.height());
    let request = PredictRequest {
      instances: [to_float_tensor(input)],
    };

    debug!("执行模型推理");
    let response = self.client.post(&self.predict_url).json(&request).send()?;
    let status = response.status();
    if !status.is_success() {
      let body = response.text().unwrap_or_default();
      error!("推理请求失败: {} {}", status, body);
      return Err(ModelError::StatusError(status.as_u16(), body));
    }

    let response: PredictResponse = response.json()?;
    let prediction = response
      .predictions
      .into_iter()
      .next()
      .ok_or_else(|| ModelError::MalformedOutput("推理结果为空".to_string()))?;

    let result = prediction.into_result()?;
    debug!("检测到 {} 个物体", result.len());
    Ok(result)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn url_without_path_uses_default_servable() {
    let url = Url::parse("tfserving://127.0.0.1").unwrap();
    let builder = TfServingBuilder::from_url(&url)
      .unwrap()
      .default_servable("mobilenet_v2");

    assert_eq!(
      builder.model_url().unwrap(),
      "http://127.0.0.1:8501/v1/models/mobilenet_v2"
    );
  }

  #[test]
  fn url_path_and_tls_flag_are_honoured() {
    let url = Url::parse("tfserving://detector.local:9000/openimages?tls").unwrap();
    let builder = TfServingBuilder::from_url(&url)
      .unwrap()
      .default_servable("mobilenet_v2");

    assert_eq!(
      builder.model_url().unwrap(),
      "https://detector.local:9000/v1/models/openimages"
    );
  }

  #[test]
  fn wrong_scheme_is_rejected() {
    let url = Url::parse("http://127.0.0.1:8501").unwrap();
    assert!(matches!(
      TfServingBuilder::from_url(&url),
      Err(ModelError::ModelPathError(_))
    ));
  }

  #[test]
  fn prediction_payload_is_decoded() {
    let body = r#"{
      "predictions": [{
        "detection_boxes": [[0.1, 0.2, 0.6, 0.7]],
        "detection_class_entities": ["Cat"],
        "detection_scores": [0.87],
        "detection_class_labels": [7]
      }]
    }"#;
    let response: PredictResponse = serde_json::from_str(body).unwrap();
    let result = response
      .predictions
      .into_iter()
      .next()
      .unwrap()
      .into_result()
      .unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result.items[0].label, "Cat");
    assert_eq!(result.items[0].bbox, [0.1, 0.2, 0.6, 0.7]);
  }

  #[test]
  fn float_tensor_is_row_major() {
    let mut image = RgbImage::new(2, 1);
    image.put_pixel(1, 0, image::Rgb([255, 0, 51]));
    let tensor = to_float_tensor(&image);

    assert_eq!(tensor.len(), 1);
    assert_eq!(tensor[0].len(), 2);
    assert_eq!(tensor[0][1], [1.0, 0.0, 0.2]);
  }
}
