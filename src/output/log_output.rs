// 该文件是 Shanan （山南西风） 项目的一部分。
// src/output/log_output.rs - 日志输出
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

use thiserror::Error;
use tracing::{debug, info};

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::TensorFrame,
  model::{PoseResult, WithLabel},
  output::Render,
};

#[derive(Error, Debug)]
pub enum LogOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

/// 将检测结果写入日志，`log://?keypoints` 同时输出关节点与骨架
#[derive(Debug, Default)]
pub struct LogOutput {
  keypoints: bool,
}

impl FromUrlWithScheme for LogOutput {
  const SCHEME: &'static str = "log";
}

impl FromUrl for LogOutput {
  type Error = LogOutputError;

  fn from_url(url: &url::Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(LogOutputError::SchemeMismatch);
    }

    let keypoints = url.query_pairs().any(|(k, _)| k == "keypoints");
    Ok(LogOutput { keypoints })
  }
}

impl LogOutput {
  pub fn with_keypoints(mut self, keypoints: bool) -> Self {
    self.keypoints = keypoints;
    self
  }
}

impl<T: WithLabel> Render<TensorFrame, PoseResult<T>> for LogOutput {
  type Error = LogOutputError;

  fn render_result(&self, frame: &TensorFrame, result: &PoseResult<T>) -> Result<(), Self::Error> {
    info!(
      "帧 {}: {} 个目标, {} 个关节点, {} 条骨架",
      frame.source().unwrap_or("-"),
      result.detections.len(),
      result.keypoints.len(),
      result.segments.len()
    );

    for detection in result.detections.iter() {
      let bbox = &detection.bbox;
      info!(
        "检测: {}, 置信度: {:.2}%, 位置: ({:.4}, {:.4}, {:.4}, {:.4})",
        detection.kind.to_label_str(),
        detection.score * 100.0,
        bbox.xmin,
        bbox.ymin,
        bbox.xmax(),
        bbox.ymax()
      );
    }

    if self.keypoints {
      for keypoint in result.keypoints.iter() {
        debug!(
          "关节点: ({:.4}, {:.4}), 置信度: {:.2}%",
          keypoint.x,
          keypoint.y,
          keypoint.score * 100.0
        );
      }
      for segment in result.segments.iter() {
        debug!(
          "骨架: {} - {}, ({:.4}, {:.4}) -> ({:.4}, {:.4})",
          segment.joints.0,
          segment.joints.1,
          segment.from.x,
          segment.from.y,
          segment.to.x,
          segment.to.y
        );
      }
    }

    Ok(())
  }
}
