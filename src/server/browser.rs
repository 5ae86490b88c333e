// 该文件是 Shanan （山南西风） 项目的一部分。
// src/server/browser.rs - 浏览器上传与结果页
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

use axum::{
  extract::{Path, State},
  response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::{
  Multipart,
  cookie::{Cookie, CookieJar},
};
use tracing::{info, warn};

use crate::{
  input::{ArtifactName, has_allowed_extension},
  output::{DetectionRecord, OutputError},
  server::{ApiError, AppState, views},
  task::ImageSource,
};

pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

const NOTICE_COOKIE: &str = "notice";
const ANNOTATED_SUFFIX: &str = ".annotated.jpg";

fn notice_cookie(value: String) -> Cookie<'static> {
  Cookie::build((NOTICE_COOKIE, value)).path("/").build()
}

/// 带一次性提示跳回首页
fn back_with_notice(jar: CookieJar, notice: &str) -> Response {
  info!("上传被拒绝: {}", notice);
  let jar = jar.add(notice_cookie(urlencoding::encode(notice).into_owned()));
  (jar, Redirect::to("/")).into_response()
}

pub async fn landing(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
  let notice = jar
    .get(NOTICE_COOKIE)
    .and_then(|c| urlencoding::decode(c.value()).ok())
    .map(|s| s.into_owned());
  let jar = if notice.is_some() {
    jar.remove(notice_cookie(String::new()))
  } else {
    jar
  };

  let task = state.task();
  let html = views::landing_page(
    &task.config().model,
    task.model_available(),
    notice.as_deref(),
  );
  (jar, Html(html))
}

pub async fn upload(
  State(state): State<AppState>,
  jar: CookieJar,
  mut multipart: Multipart,
) -> Result<Response, ApiError> {
  let mut file = None;
  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| ApiError::BadRequest(format!("multipart 解析失败: {}", e)))?
  {
    if field.name() != Some("image") {
      continue;
    }
    let filename = field.file_name().unwrap_or_default().to_string();
    let bytes = field
      .bytes()
      .await
      .map_err(|e| ApiError::BadRequest(format!("multipart 解析失败: {}", e)))?;
    file = Some((filename, bytes));
  }

  let Some((filename, bytes)) = file else {
    return Ok(back_with_notice(jar, "No file part"));
  };
  if filename.is_empty() {
    return Ok(back_with_notice(jar, "No selected file"));
  }
  if !has_allowed_extension(&filename, ALLOWED_EXTENSIONS) {
    return Ok(back_with_notice(jar, "Only .jpg and .jpeg files are allowed"));
  }
  if !state.task().model_available() {
    return Err(ApiError::ModelUnavailable);
  }

  let task = state.task().clone();
  let source = ImageSource::Upload {
    filename,
    bytes: bytes.to_vec(),
  };
  let outcome = tokio::task::spawn_blocking(move || task.run_source(source, true)).await??;

  let location = format!(
    "/uploads/output/{}{}",
    urlencoding::encode(outcome.name.as_str()),
    ANNOTATED_SUFFIX
  );
  Ok(Redirect::to(&location).into_response())
}

pub async fn annotated_view(
  State(state): State<AppState>,
  Path(file): Path<String>,
) -> Result<Html<String>, ApiError> {
  let name = file
    .strip_suffix(ANNOTATED_SUFFIX)
    .and_then(|stem| ArtifactName::parse(stem).ok())
    .ok_or_else(|| ApiError::NotFound(format!("no such result: {}", file)))?;

  let record_path = state.task().store().record_path(&name);
  let record = match DetectionRecord::read_json(&record_path) {
    Ok(record) => record,
    Err(OutputError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
      warn!("检测记录不存在: {}", record_path.display());
      return Err(ApiError::NotFound(format!("no such result: {}", file)));
    }
    Err(e) => return Err(ApiError::Internal(e.to_string())),
  };

  let image_url = format!(
    "/static/output/{}{}",
    urlencoding::encode(name.as_str()),
    ANNOTATED_SUFFIX
  );
  Ok(Html(views::result_page(name.as_str(), &image_url, &record)))
}
