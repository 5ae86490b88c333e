// 该文件是 Shanan （山南西风） 项目的一部分。
// src/main.rs - 目标检测 Web 服务主程序
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

mod args;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::{net::TcpListener, sync::Notify};
use tracing::{error, info, warn};
use url::Url;

use shanan_web::{
  FromUrl,
  model::{ModelEntry, SharedModel, TfServingBuilder},
  server::{self, AppState},
};

/// 模型加载失败时服务照常启动，检测接口返回错误
fn load_model(detector: &Url, entry: &ModelEntry) -> Option<SharedModel> {
  if entry.is_none() {
    warn!("未配置模型，检测接口不可用");
    return None;
  }

  info!("加载模型 {} ({})", entry.name, entry.handle);
  let model = TfServingBuilder::from_url(detector)
    .map(|builder| builder.default_servable(entry.name))
    .and_then(TfServingBuilder::build);
  match model {
    Ok(model) => {
      info!("模型加载完成");
      Some(Arc::new(model))
    }
    Err(e) => {
      error!("模型加载失败，检测接口不可用: {}", e);
      None
    }
  }
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = args::Args::parse();

  info!("监听地址: {}", args.listen);
  info!("上传目录: {}", args.upload_dir.display());
  info!("推理服务: {}", args.detector);

  let entry: ModelEntry = args.model.parse()?;
  let config = args.to_config(entry);
  let model = load_model(&args.detector, &entry);
  let state = AppState::new(config, model)?;

  let shutdown = Arc::new(Notify::new());
  {
    let shutdown = shutdown.clone();
    ctrlc::set_handler(move || {
      info!("收到中断信号，准备退出...");
      shutdown.notify_one();
    })?;
  }

  let runtime = tokio::runtime::Builder::new_multi_thread()
    .enable_all()
    .build()?;
  runtime.block_on(async move {
    let listener = TcpListener::bind(&args.listen).await?;
    server::serve(listener, state, async move { shutdown.notified().await }).await
  })?;

  Ok(())
}
