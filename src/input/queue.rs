// 该文件是 Shanan （山南西风） 项目的一部分。
// src/input/queue.rs - 有界帧队列
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

//! 生产者（读取推理输出）与消费者（后处理）之间的帧交接。

use std::sync::{
  Arc,
  atomic::{AtomicBool, AtomicUsize, Ordering},
};

use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use thiserror::Error;
use tracing::debug;

/// 队列满时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backpressure {
  /// 阻塞生产者直到有空位
  #[default]
  Block,
  /// 丢弃最旧的一帧，生产者不阻塞
  DropOldest,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("帧队列已关闭")]
pub struct QueueClosed;

#[derive(Debug, Default)]
struct Shared {
  closed: AtomicBool,
  dropped: AtomicUsize,
}

/// 创建有界帧队列，容量至少为 1
pub fn frame_queue<T>(capacity: usize, policy: Backpressure) -> (FrameSender<T>, FrameReceiver<T>) {
  let (sender, receiver) = channel::bounded(capacity.max(1));
  let shared = Arc::new(Shared::default());
  let drain = match policy {
    Backpressure::Block => None,
    Backpressure::DropOldest => Some(receiver.clone()),
  };

  (
    FrameSender {
      inner: sender,
      drain,
      shared: shared.clone(),
    },
    FrameReceiver {
      inner: receiver,
      shared,
    },
  )
}

pub struct FrameSender<T> {
  inner: Sender<T>,
  /// 仅在 DropOldest 策略下持有，用于移除最旧的帧
  drain: Option<Receiver<T>>,
  shared: Arc<Shared>,
}

impl<T> FrameSender<T> {
  pub fn send(&self, frame: T) -> Result<(), QueueClosed> {
    if self.shared.closed.load(Ordering::Acquire) {
      return Err(QueueClosed);
    }

    let Some(drain) = &self.drain else {
      return self.inner.send(frame).map_err(|_| QueueClosed);
    };

    let mut frame = frame;
    loop {
      match self.inner.try_send(frame) {
        Ok(()) => return Ok(()),
        Err(TrySendError::Full(rejected)) => {
          if drain.try_recv().is_ok() {
            let dropped = self.shared.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            debug!("帧队列已满，丢弃最旧的一帧 (累计 {})", dropped);
          }
          if self.shared.closed.load(Ordering::Acquire) {
            return Err(QueueClosed);
          }
          frame = rejected;
        }
        Err(TrySendError::Disconnected(_)) => return Err(QueueClosed),
      }
    }
  }

  /// 因队列满而丢弃的帧数
  pub fn dropped(&self) -> usize {
    self.shared.dropped.load(Ordering::Relaxed)
  }
}

pub struct FrameReceiver<T> {
  inner: Receiver<T>,
  shared: Arc<Shared>,
}

impl<T> FrameReceiver<T> {
  /// 阻塞等待下一帧；所有发送端关闭且队列为空时返回 None
  pub fn recv(&self) -> Option<T> {
    self.inner.recv().ok()
  }

  pub fn dropped(&self) -> usize {
    self.shared.dropped.load(Ordering::Relaxed)
  }
}

impl<T> Iterator for FrameReceiver<T> {
  type Item = T;

  fn next(&mut self) -> Option<Self::Item> {
    self.recv()
  }
}

impl<T> Drop for FrameReceiver<T> {
  fn drop(&mut self) {
    self.shared.closed.store(true, Ordering::Release);
  }
}
