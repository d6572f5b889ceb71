// 该文件是 Shanan （山南西风） 项目的一部分。
// src/model.rs - 模型
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

use serde::Serialize;

pub trait Model {
  type Input;
  type Output;
  type Error;

  fn decode(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

pub trait WithLabel: Sized + std::fmt::Debug {
  /// 标签表可表示的类别数量
  const CLASS_COUNT: usize;

  fn to_label_str(&self) -> String;
  fn to_label_id(&self) -> u32;
  fn from_label_id(id: u32) -> Self;
}

/// 归一化坐标下的轴对齐边界框
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BBox {
  pub xmin: f32,
  pub ymin: f32,
  pub width: f32,
  pub height: f32,
}

impl BBox {
  pub fn new(xmin: f32, ymin: f32, width: f32, height: f32) -> Self {
    Self {
      xmin,
      ymin,
      width,
      height,
    }
  }

  pub fn from_corners(xmin: f32, ymin: f32, xmax: f32, ymax: f32) -> Self {
    Self::new(xmin, ymin, xmax - xmin, ymax - ymin)
  }

  pub fn xmax(&self) -> f32 {
    self.xmin + self.width
  }

  pub fn ymax(&self) -> f32 {
    self.ymin + self.height
  }

  pub fn area(&self) -> f32 {
    self.width * self.height
  }
}

#[derive(Debug, Clone)]
pub struct Detection<T> {
  pub kind: T,
  /// 置信度，0 表示已被 NMS 抑制
  pub score: f32,
  pub bbox: BBox,
}

/// 单个关节点，坐标归一化到 [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Keypoint {
  pub x: f32,
  pub y: f32,
  pub score: f32,
}

/// 骨架连线，两端关节点均携带置信度
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JointSegment {
  pub joints: (usize, usize),
  pub from: Keypoint,
  pub to: Keypoint,
}

#[derive(Debug, Clone)]
pub struct PoseResult<T> {
  pub detections: Box<[Detection<T>]>,
  pub keypoints: Box<[Keypoint]>,
  pub segments: Box<[JointSegment]>,
}

impl<T> PoseResult<T> {
  pub fn empty() -> Self {
    Self {
      detections: Box::new([]),
      keypoints: Box::new([]),
      segments: Box::new([]),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.detections.is_empty()
  }

  pub fn len(&self) -> usize {
    self.detections.len()
  }
}

impl<T> Default for PoseResult<T> {
  fn default() -> Self {
    Self::empty()
  }
}

pub mod anchor;
pub mod decode;
mod error;
mod label;
pub mod nms;
pub mod quant;
pub mod skeleton;
mod yolov8_pose;

pub use self::error::{ConfigError, DecodeError};
pub use self::label::{COCO_CLASSES, CocoLabel, PersonLabel};
pub use self::yolov8_pose::{PoseConfig, YoloV8Pose, YoloV8PoseBuilder};
