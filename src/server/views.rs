// 该文件是 Shanan （山南西风） 项目的一部分。
// src/server/views.rs - 浏览器页面
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

use crate::{model::ModelEntry, output::DetectionRecord};

const STYLE: &str = "body{font-family:sans-serif;margin:2em auto;max-width:760px}\
table{border-collapse:collapse}td,th{border:1px solid #ccc;padding:4px 8px}\
.notice{background:#ffe9a8;padding:8px}";

pub fn escape_html(text: &str) -> String {
  let mut escaped = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '&' => escaped.push_str("&amp;"),
      '<' => escaped.push_str("&lt;"),
      '>' => escaped.push_str("&gt;"),
      '"' => escaped.push_str("&quot;"),
      '\'' => escaped.push_str("&#39;"),
      c => escaped.push(c),
    }
  }
  escaped
}

fn page(title: &str, body: &str) -> String {
  format!(
    "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n\
     <style>{}</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
    escape_html(title),
    STYLE,
    body
  )
}

pub fn landing_page(model: &ModelEntry, model_available: bool, notice: Option<&str>) -> String {
  let notice = notice
    .map(|notice| format!("<p class=\"notice\">{}</p>\n", escape_html(notice)))
    .unwrap_or_default();
  let model = if model.is_none() {
    "<p>Model: none</p>\n".to_string()
  } else {
    format!(
      "<p>Model: {} (<code>{}</code>){}</p>\n",
      escape_html(model.name),
      escape_html(model.handle),
      if model_available { "" } else { ", not loaded" }
    )
  };
  let body = format!(
    "<h1>Object Detection</h1>\n{}{}\
     <form method=\"post\" action=\"/\" enctype=\"multipart/form-data\">\n\
     <input type=\"file\" name=\"image\" accept=\".jpg,.jpeg\">\n\
     <button type=\"submit\">Upload</button>\n\
     </form>",
    notice, model
  );
  page("Object Detection", &body)
}

pub fn result_page(name: &str, image_url: &str, record: &DetectionRecord) -> String {
  let rows = record
    .detection_class_entities
    .iter()
    .zip(&record.detection_scores)
    .enumerate()
    .map(|(i, (label, score))| {
      format!(
        "<tr><td>{}</td><td>{}</td><td>{:.1}%</td></tr>\n",
        i + 1,
        escape_html(label),
        100.0 * score
      )
    })
    .collect::<String>();

  let mut body = format!(
    "<h1>{}</h1>\n<img src=\"{}\" alt=\"annotated {}\">\n",
    escape_html(name),
    escape_html(image_url),
    escape_html(name)
  );
  body.push_str(&format!(
    "<p>{} objects found in {:.3}s using <code>{}</code></p>\n",
    record.objects_found,
    record.inference_time,
    escape_html(&record.model_used)
  ));
  body.push_str("<table>\n<tr><th>#</th><th>Label</th><th>Score</th></tr>\n");
  body.push_str(&rows);
  body.push_str("</table>\n<p><a href=\"/\">Upload another image</a></p>");
  page(name, &body)
}
