// 该文件是 Shanan （山南西风） 项目的一部分。
// src/task.rs - 任务定义
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

use std::{
  sync::mpsc::{self, Receiver},
  thread,
  time::{Duration, Instant},
};
use tracing::{debug, info, warn};

use crate::{
  input::{Backpressure, frame_queue},
  model::Model,
  output::Render,
};

pub trait Task<I, M, O>: Sized {
  type Error;
  fn run_task(self, input: I, model: M, output: O) -> Result<(), Self::Error>;
}

/// 安装 Ctrl-C 处理器，收到信号后 30 秒仍未退出则强制结束
fn interrupt_channel() -> anyhow::Result<Receiver<()>> {
  let (tx, rx) = mpsc::channel();
  ctrlc::set_handler(move || {
    info!("收到中断信号，准备退出...");
    let _ = tx.send(());
    thread::spawn(|| {
      thread::sleep(Duration::from_secs(30));
      warn!("强制退出程序");
      std::process::exit(1);
    });
  })?;
  Ok(rx)
}

pub struct OneShotTask;

impl<
  F,
  D,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = F>,
  M: Model<Input = F, Output = D, Error = ME>,
  O: Render<F, D, Error = RE>,
> Task<I, M, O> for OneShotTask
{
  type Error = anyhow::Error;

  fn run_task(self, mut input: I, model: M, output: O) -> Result<(), Self::Error> {
    info!("开始任务...");
    let frame = input.next().ok_or_else(|| anyhow::anyhow!("没有输入帧"))?;
    info!("输入帧获取成功，开始解码...");
    let now = Instant::now();
    let result = model.decode(&frame)?;
    let decoded = now.elapsed();
    info!("解码完成，耗时: {:.2?}", decoded);
    output.render_result(&frame, &result)?;
    info!("渲染完成，耗时: {:.2?}", now.elapsed());

    Ok(())
  }
}

/// 对同一帧重复解码，用于测量后处理耗时
#[derive(Debug)]
pub struct RepeatShotTask {
  repeat: usize,
}

impl Default for RepeatShotTask {
  fn default() -> Self {
    Self { repeat: 1000 }
  }
}

impl RepeatShotTask {
  /// 统计平均耗时时跳过的预热次数
  const WARM_UP: usize = 2;

  pub fn with_repeat(mut self, repeat: usize) -> Self {
    self.repeat = repeat.max(1);
    self
  }
}

impl<
  F,
  D,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = F>,
  M: Model<Input = F, Output = D, Error = ME>,
  O: Render<F, D, Error = RE>,
> Task<I, M, O> for RepeatShotTask
{
  type Error = anyhow::Error;

  fn run_task(self, mut input: I, model: M, output: O) -> Result<(), Self::Error> {
    info!("开始任务...");
    let frame = input.next().ok_or_else(|| anyhow::anyhow!("没有输入帧"))?;
    info!("输入帧获取成功，开始解码...");
    let mut times = Vec::with_capacity(self.repeat);
    for i in 0..self.repeat {
      let now = Instant::now();
      let result = model.decode(&frame)?;
      let elapsed = now.elapsed();
      debug!("({})解码完成，耗时: {:.2?}", i, elapsed);
      output.render_result(&frame, &result)?;
      times.push(elapsed);
    }

    let skip = if times.len() > Self::WARM_UP {
      Self::WARM_UP
    } else {
      0
    };
    let measured = &times[skip..];
    warn!(
      "平均解码时间: {:.2?} ({} 次)",
      measured.iter().sum::<Duration>() / measured.len() as u32,
      measured.len()
    );

    Ok(())
  }
}

#[derive(Default, Debug)]
pub struct ContinuousTask {
  frame_number: Option<usize>,
}

impl ContinuousTask {
  pub fn with_frame_number(mut self, frame_number: Option<usize>) -> Self {
    self.frame_number = frame_number;
    self
  }
}

impl<
  F,
  D,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = F>,
  M: Model<Input = F, Output = D, Error = ME>,
  O: Render<F, D, Error = RE>,
> Task<I, M, O> for ContinuousTask
{
  type Error = anyhow::Error;

  fn run_task(self, input: I, model: M, output: O) -> Result<(), Self::Error> {
    info!("开始任务...");
    let rx = interrupt_channel()?;

    let mut frame_index = 0usize;
    let mut now = Instant::now();
    for frame in input {
      frame_index = frame_index.wrapping_add(1);
      debug!("处理第 {} 帧", frame_index);
      let result = model.decode(&frame)?;
      let elapsed_a = now.elapsed();
      output.render_result(&frame, &result)?;
      let elapsed_b = now.elapsed();
      now = Instant::now();
      info!("解码完成，耗时: {:.2?} / {:.2?}", elapsed_a, elapsed_b);
      if self.frame_number.is_some_and(|n| frame_index >= n) {
        info!("达到指定帧数 {}, 退出任务循环", frame_index);
        break;
      }
      if rx.try_recv().is_ok() {
        warn!("中断信号接收，退出任务循环");
        break;
      }
    }

    info!("任务完成，退出");
    Ok(())
  }
}

/// 读取线程与解码线程通过有界队列交接帧
#[derive(Debug)]
pub struct PipelinedTask {
  frame_number: Option<usize>,
  queue_depth: usize,
  backpressure: Backpressure,
  interrupt: bool,
}

impl Default for PipelinedTask {
  fn default() -> Self {
    Self {
      frame_number: None,
      queue_depth: 4,
      backpressure: Backpressure::Block,
      interrupt: false,
    }
  }
}

impl PipelinedTask {
  pub fn with_frame_number(mut self, frame_number: Option<usize>) -> Self {
    self.frame_number = frame_number;
    self
  }

  pub fn with_queue_depth(mut self, queue_depth: usize) -> Self {
    self.queue_depth = queue_depth;
    self
  }

  pub fn with_backpressure(mut self, backpressure: Backpressure) -> Self {
    self.backpressure = backpressure;
    self
  }

  /// 是否响应 Ctrl-C；进程内只能安装一次处理器
  pub fn with_interrupt(mut self, interrupt: bool) -> Self {
    self.interrupt = interrupt;
    self
  }
}

impl<
  F: Send,
  D,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = F> + Send,
  M: Model<Input = F, Output = D, Error = ME>,
  O: Render<F, D, Error = RE>,
> Task<I, M, O> for PipelinedTask
{
  type Error = anyhow::Error;

  fn run_task(self, input: I, model: M, output: O) -> Result<(), Self::Error> {
    info!(
      "开始流水线任务，队列深度: {}, 策略: {:?}",
      self.queue_depth, self.backpressure
    );
    let interrupt = if self.interrupt {
      Some(interrupt_channel()?)
    } else {
      None
    };
    let (sender, receiver) = frame_queue(self.queue_depth, self.backpressure);

    thread::scope(|scope| -> anyhow::Result<()> {
      scope.spawn(move || {
        for frame in input {
          if sender.send(frame).is_err() {
            debug!("帧队列已关闭，停止读取");
            break;
          }
        }
        if sender.dropped() > 0 {
          warn!("共丢弃 {} 帧", sender.dropped());
        }
      });

      // 消费端出错或提前结束时 receiver 被释放，读取线程随之退出
      let mut frame_index = 0usize;
      for frame in receiver {
        frame_index = frame_index.wrapping_add(1);
        let now = Instant::now();
        let result = model.decode(&frame)?;
        output.render_result(&frame, &result)?;
        info!("第 {} 帧处理完成，耗时: {:.2?}", frame_index, now.elapsed());
        if self.frame_number.is_some_and(|n| frame_index >= n) {
          info!("达到指定帧数 {}, 退出任务循环", frame_index);
          break;
        }
        if interrupt.as_ref().is_some_and(|rx| rx.try_recv().is_ok()) {
          warn!("中断信号接收，退出任务循环");
          break;
        }
      }

      info!("任务完成，共处理 {} 帧", frame_index);
      Ok(())
    })
  }
}
