// 该文件是 Shanan （山南西风） 项目的一部分。
// src/bin/pose_pipeline.rs - 读取与解码分离的流水线后处理
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
  input::{Backpressure, InputWrapper},
  model::{CocoLabel, YoloV8Pose, YoloV8PoseBuilder},
  output::OutputWrapper,
  task::{PipelinedTask, Task},
};
use tracing::info;

/// Shanan 姿态后处理参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 模型配置
  #[arg(long, value_name = "MODEL")]
  pub model: Url,
  /// 输入来源
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 输出路径
  #[arg(long, value_name = "OUTPUT")]
  pub output: Url,

  #[arg(long, value_name = "FRAME_NUMBER")]
  pub frame_number: Option<usize>,

  /// 帧队列深度
  #[arg(long, default_value = "4", value_name = "DEPTH")]
  pub queue_depth: usize,

  /// 队列满时丢弃最旧的帧而不是阻塞读取
  #[arg(long)]
  pub drop_oldest: bool,
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

  let backpressure = if args.drop_oldest {
    Backpressure::DropOldest
  } else {
    Backpressure::Block
  };

  PipelinedTask::default()
    .with_frame_number(args.frame_number)
    .with_queue_depth(args.queue_depth)
    .with_backpressure(backpressure)
    .with_interrupt(true)
    .run_task(input.into_frames(), model, output)?;

  Ok(())
}
