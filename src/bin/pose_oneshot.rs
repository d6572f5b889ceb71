// 该文件是 Shanan （山南西风） 项目的一部分。
// src/bin/pose_oneshot.rs - 单帧姿态后处理
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

use anyhow::Result;
use clap::Parser;
use url::Url;

use shanan_pose::{
  FromUrl,
  input::InputWrapper,
  model::{CocoLabel, YoloV8Pose, YoloV8PoseBuilder},
  output::OutputWrapper,
  task::{OneShotTask, Task},
};
use tracing::info;

/// Shanan 姿态后处理参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 模型配置，例如 yolov8pose://640x640?score=0.6
  #[arg(long, value_name = "MODEL")]
  pub model: Url,
  /// 输入来源，例如 tensor:///data/frame.json
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 输出路径，例如 log:// 或 folder:///data/records
  #[arg(long, value_name = "OUTPUT")]
  pub output: Url,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("模型配置: {}", args.model);
  info!("输入来源: {}", args.input);
  info!("输出路径: {}", args.output);

  let input = InputWrapper::from_url(&args.input)?;
  let model: YoloV8Pose<CocoLabel> = YoloV8PoseBuilder::from_url(&args.model)?.build()?;
  let output = OutputWrapper::from_url(&args.output)?;

  OneShotTask.run_task(input.into_frames(), model, output)?;

  Ok(())
}
