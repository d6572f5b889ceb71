// 该文件是 Shanan （山南西风） 项目的一部分。
// src/output/directory_record.rs - 目录记录输出
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
  fs::File,
  io::BufWriter,
  path::{Path, PathBuf},
  sync::Mutex,
};

use chrono::{Datelike, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::TensorFrame,
  model::{BBox, JointSegment, Keypoint, PoseResult, WithLabel},
  output::Render,
};

#[derive(Error, Debug)]
pub enum DirectoryRecordOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("路径解码错误: {0}")]
  PathDecodeError(#[from] std::string::FromUtf8Error),
  #[error("帧计数器锁已损坏")]
  CounterPoisoned,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionRecord {
  pub label: String,
  pub score: f32,
  pub bbox: BBox,
}

/// 每帧写出的 JSON 记录
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoseRecord {
  pub source: Option<String>,
  pub detections: Vec<DetectionRecord>,
  pub keypoints: Vec<Keypoint>,
  pub segments: Vec<JointSegment>,
}

impl PoseRecord {
  pub fn new<T: WithLabel>(frame: &TensorFrame, result: &PoseResult<T>, label_with_name: bool) -> Self {
    let detections = result
      .detections
      .iter()
      .map(|item| DetectionRecord {
        label: if label_with_name {
          item.kind.to_label_str()
        } else {
          item.kind.to_label_id().to_string()
        },
        score: item.score,
        bbox: item.bbox,
      })
      .collect();

    Self {
      source: frame.source().map(str::to_string),
      detections,
      keypoints: result.keypoints.to_vec(),
      segments: result.segments.to_vec(),
    }
  }
}

/// `folder:///dir?always&record=id`
pub struct DirectoryRecordOutput {
  directory: PathBuf,
  label_with_name: bool,
  frame_counters: Mutex<u16>,
  always: bool,
}

impl FromUrlWithScheme for DirectoryRecordOutput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn from_url(uri: &url::Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(DirectoryRecordOutputError::SchemeMismatch);
    }

    let label_with_name = !uri.query_pairs().any(|(k, v)| k == "record" && v == "id");
    let always = uri.query_pairs().any(|(k, _)| k == "always");

    let directory = PathBuf::from(urlencoding::decode(uri.path())?.into_owned());
    Ok(Self::new(directory)
      .with_label_name(label_with_name)
      .with_always(always))
  }
}

impl DirectoryRecordOutput {
  pub fn new(directory: PathBuf) -> Self {
    DirectoryRecordOutput {
      directory,
      label_with_name: true,
      frame_counters: Mutex::new(0),
      always: false,
    }
  }

  pub fn with_label_name(mut self, label_with_name: bool) -> Self {
    self.label_with_name = label_with_name;
    self
  }

  /// 为 true 时无检测结果的帧也写出记录
  pub fn with_always(mut self, always: bool) -> Self {
    self.always = always;
    self
  }

  pub fn directory(&self) -> &Path {
    &self.directory
  }

  fn frame_id(&self) -> Result<u16, DirectoryRecordOutputError> {
    let mut counter = self
      .frame_counters
      .lock()
      .map_err(|_| DirectoryRecordOutputError::CounterPoisoned)?;
    let id = counter.wrapping_add(1);
    *counter = id;
    Ok(id)
  }

  fn frame_path(&self) -> Result<PathBuf, DirectoryRecordOutputError> {
    let now = Utc::now();
    let directory = self
      .directory
      .join(now.year().to_string())
      .join(format!("{:02}", now.month()))
      .join(format!("{:02}", now.day()));
    if !directory.exists() {
      std::fs::create_dir_all(&directory)?;
    }

    Ok(directory.join(format!(
      "{}-{:04X}.json",
      now.format("%H-%M-%S"),
      self.frame_id()?
    )))
  }
}

impl<T: WithLabel> Render<TensorFrame, PoseResult<T>> for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn render_result(&self, frame: &TensorFrame, result: &PoseResult<T>) -> Result<(), Self::Error> {
    if !self.always && result.is_empty() {
      return Ok(());
    }

    let path = self.frame_path()?;
    let record = PoseRecord::new(frame, result, self.label_with_name);
    serde_json::to_writer(BufWriter::new(File::create(&path)?), &record)?;
    debug!("记录已写入 {}", path.display());
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::{CocoLabel, Detection};

  fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("shanan-pose-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
  }

  fn count_json(dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
      return 0;
    };
    entries
      .filter_map(Result::ok)
      .map(|entry| entry.path())
      .map(|path| {
        if path.is_dir() {
          count_json(&path)
        } else {
          usize::from(path.extension().is_some_and(|ext| ext == "json"))
        }
      })
      .sum()
  }

  #[test]
  fn url_options_are_parsed() {
    let url = url::Url::parse("folder:///tmp/records?always&record=id").unwrap();
    let output = DirectoryRecordOutput::from_url(&url).unwrap();
    assert!(output.always);
    assert!(!output.label_with_name);
    assert_eq!(output.directory(), Path::new("/tmp/records"));
  }

  #[test]
  fn url_path_is_percent_decoded() {
    let url = url::Url::parse("folder:///tmp/pose records/记录").unwrap();
    let output = DirectoryRecordOutput::from_url(&url).unwrap();
    assert_eq!(output.directory(), Path::new("/tmp/pose records/记录"));
  }

  #[test]
  fn empty_results_are_skipped_unless_always() {
    let dir = temp_dir("skip");
    let empty = PoseResult::<CocoLabel>::empty();
    let frame = TensorFrame::default();

    let output = DirectoryRecordOutput::new(dir.clone());
    output.render_result(&frame, &empty).unwrap();
    assert_eq!(count_json(&dir), 0);

    let output = output.with_always(true);
    output.render_result(&frame, &empty).unwrap();
    assert_eq!(count_json(&dir), 1);
    let _ = std::fs::remove_dir_all(&dir);
  }

  #[test]
  fn record_uses_label_names() {
    let result = PoseResult {
      detections: vec![Detection {
        kind: CocoLabel::from_label_id(0),
        score: 0.9,
        bbox: BBox::new(0.0, 0.0, 0.5, 0.5),
      }]
      .into_boxed_slice(),
      ..PoseResult::empty()
    };
    let frame = TensorFrame::default().with_source("a.json");
    let record = PoseRecord::new(&frame, &result, true);
    assert_eq!(record.detections[0].label, "person");
    assert_eq!(record.source.as_deref(), Some("a.json"));
    let record = PoseRecord::new(&frame, &result, false);
    assert_eq!(record.detections[0].label, "0");
  }
}
