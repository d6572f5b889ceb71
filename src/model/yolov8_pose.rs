// 该文件是 Shanan （山南西风） 项目的一部分。
// src/model/yolov8_pose.rs - YOLOv8 姿态模型后处理
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

use std::{marker::PhantomData, str::FromStr};

use tracing::{debug, info, warn};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::{TensorEncoding, TensorFrame},
  model::{
    ConfigError, DecodeError, Model, PoseResult, WithLabel,
    anchor::{self, AnchorGrid},
    decode::{self, ScoreMatrix},
    nms, skeleton,
  },
};

const YOLOV8_POSE_INPUT_W: u32 = 640;
const YOLOV8_POSE_INPUT_H: u32 = 640;
const YOLOV8_POSE_STRIDES: [u32; 3] = [8, 16, 32];
const YOLOV8_POSE_REGRESSION_LENGTH: usize = 15;
const YOLOV8_POSE_MAX_REGRESSION_LENGTH: usize = 255;
const YOLOV8_POSE_CLASS_NUM: usize = 1;
const YOLOV8_POSE_SCORE_THRESH: f32 = 0.6;
const YOLOV8_POSE_IOU_THRESH: f32 = 0.7;
const YOLOV8_POSE_JOINT_THRESH: f32 = 0.1;
// 关节点偏移的放大系数，随模型导出方式调整
const YOLOV8_POSE_KEYPOINT_SCALE: f32 = 4.0;

/// 后处理配置
#[derive(Debug, Clone, PartialEq)]
pub struct PoseConfig {
  pub network_width: u32,
  pub network_height: u32,
  /// 每个检测头的步长，顺序与张量顺序一致
  pub strides: Vec<u32>,
  /// 距离分布的区间数为 regression_length + 1
  pub regression_length: usize,
  pub num_classes: usize,
  pub score_threshold: f32,
  pub iou_threshold: f32,
  pub joint_threshold: f32,
  /// 跨类别 NMS
  pub cross_class_nms: bool,
  pub keypoint_scale: f32,
  /// 边界框与分数张量的元素编码
  pub encoding: TensorEncoding,
}

impl Default for PoseConfig {
  fn default() -> Self {
    Self {
      network_width: YOLOV8_POSE_INPUT_W,
      network_height: YOLOV8_POSE_INPUT_H,
      strides: YOLOV8_POSE_STRIDES.to_vec(),
      regression_length: YOLOV8_POSE_REGRESSION_LENGTH,
      num_classes: YOLOV8_POSE_CLASS_NUM,
      score_threshold: YOLOV8_POSE_SCORE_THRESH,
      iou_threshold: YOLOV8_POSE_IOU_THRESH,
      joint_threshold: YOLOV8_POSE_JOINT_THRESH,
      cross_class_nms: true,
      keypoint_scale: YOLOV8_POSE_KEYPOINT_SCALE,
      encoding: TensorEncoding::Quantized,
    }
  }
}

impl PoseConfig {
  /// 边界框张量通道深度：4 条边 × (regression_length + 1) 个区间
  pub fn box_channels(&self) -> usize {
    4 * (self.regression_length + 1)
  }

  pub fn validate(&self, max_classes: usize) -> Result<(), ConfigError> {
    if self.network_width == 0 || self.network_height == 0 {
      return Err(ConfigError::InvalidNetworkSize {
        width: self.network_width,
        height: self.network_height,
      });
    }
    // 分数阈值必须为正，保证进入 NMS 的置信度不会与抑制标记 0 混淆
    if !(self.score_threshold > 0.0 && self.score_threshold <= 1.0) {
      return Err(ConfigError::InvalidThreshold {
        name: "score",
        value: self.score_threshold,
      });
    }
    for (name, value) in [("iou", self.iou_threshold), ("joint", self.joint_threshold)] {
      if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::InvalidThreshold { name, value });
      }
    }
    // 通道深度 4 × (regression_length + 1) 不得溢出
    if self.regression_length > YOLOV8_POSE_MAX_REGRESSION_LENGTH {
      return Err(ConfigError::InvalidRegressionLength {
        value: self.regression_length,
        max: YOLOV8_POSE_MAX_REGRESSION_LENGTH,
      });
    }
    if self.num_classes == 0 || self.num_classes > max_classes {
      return Err(ConfigError::InvalidClassCount {
        count: self.num_classes,
        max: max_classes,
      });
    }
    if !(self.keypoint_scale.is_finite() && self.keypoint_scale > 0.0) {
      return Err(ConfigError::InvalidKeypointScale(self.keypoint_scale));
    }
    Ok(())
  }
}

pub struct YoloV8Pose<T> {
  config: PoseConfig,
  grids: Box<[AnchorGrid]>,
  _phantom: PhantomData<fn() -> T>,
}

impl<T> YoloV8Pose<T> {
  pub fn config(&self) -> &PoseConfig {
    &self.config
  }

  /// 预先生成的锚点网格，在各帧之间只读共享
  pub fn grids(&self) -> &[AnchorGrid] {
    &self.grids
  }
}

#[derive(Debug, Clone, Default)]
pub struct YoloV8PoseBuilder {
  config: PoseConfig,
}

impl FromUrlWithScheme for YoloV8PoseBuilder {
  const SCHEME: &'static str = "yolov8pose";
}

fn parse_param<V: FromStr>(key: &str, value: &str) -> Result<V, ConfigError> {
  value.parse().map_err(|_| ConfigError::InvalidParameter {
    key: key.to_string(),
    value: value.to_string(),
  })
}

fn parse_network_size(value: &str) -> Result<(u32, u32), ConfigError> {
  let invalid = || ConfigError::InvalidParameter {
    key: "size".to_string(),
    value: value.to_string(),
  };
  let (w, h) = value.split_once(['x', 'X']).ok_or_else(invalid)?;
  let w = w.parse().map_err(|_| invalid())?;
  let h = h.parse().map_err(|_| invalid())?;
  Ok((w, h))
}

impl FromUrl for YoloV8PoseBuilder {
  type Error = ConfigError;

  /// `yolov8pose://640x640?strides=8,16,32&reg=15&classes=1&score=0.6&iou=0.7&joint=0.1&kpt_scale=4.0&cross_class=true&encoding=quantized`
  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(ConfigError::SchemeMismatch(Self::SCHEME));
    }

    let mut config = PoseConfig::default();

    if let Some(size) = url.host_str().filter(|h| !h.is_empty()) {
      let (w, h) = parse_network_size(size)?;
      config.network_width = w;
      config.network_height = h;
    }

    for (key, value) in url.query_pairs() {
      match key.as_ref() {
        "strides" => {
          config.strides = value
            .split(',')
            .filter(|s| !s.is_empty())
            .map(|s| parse_param("strides", s.trim()))
            .collect::<Result<_, _>>()?;
        }
        "reg" => config.regression_length = parse_param(&key, &value)?,
        "classes" => config.num_classes = parse_param(&key, &value)?,
        "score" => config.score_threshold = parse_param(&key, &value)?,
        "iou" => config.iou_threshold = parse_param(&key, &value)?,
        "joint" => config.joint_threshold = parse_param(&key, &value)?,
        "kpt_scale" => config.keypoint_scale = parse_param(&key, &value)?,
        "cross_class" => config.cross_class_nms = parse_param(&key, &value)?,
        "encoding" => config.encoding = parse_param(&key, &value)?,
        other => warn!("忽略未知的模型参数: {}={}", other, value),
      }
    }

    Ok(YoloV8PoseBuilder { config })
  }
}

impl YoloV8PoseBuilder {
  pub fn new(config: PoseConfig) -> Self {
    Self { config }
  }

  pub fn network_size(mut self, width: u32, height: u32) -> Self {
    self.config.network_width = width;
    self.config.network_height = height;
    self
  }

  pub fn strides(mut self, strides: impl Into<Vec<u32>>) -> Self {
    self.config.strides = strides.into();
    self
  }

  pub fn regression_length(mut self, regression_length: usize) -> Self {
    self.config.regression_length = regression_length;
    self
  }

  pub fn num_classes(mut self, num_classes: usize) -> Self {
    self.config.num_classes = num_classes;
    self
  }

  pub fn score_threshold(mut self, threshold: f32) -> Self {
    self.config.score_threshold = threshold;
    self
  }

  pub fn iou_threshold(mut self, threshold: f32) -> Self {
    self.config.iou_threshold = threshold;
    self
  }

  pub fn joint_threshold(mut self, threshold: f32) -> Self {
    self.config.joint_threshold = threshold;
    self
  }

  pub fn cross_class_nms(mut self, cross_class: bool) -> Self {
    self.config.cross_class_nms = cross_class;
    self
  }

  pub fn keypoint_scale(mut self, scale: f32) -> Self {
    self.config.keypoint_scale = scale;
    self
  }

  pub fn encoding(mut self, encoding: TensorEncoding) -> Self {
    self.config.encoding = encoding;
    self
  }

  pub fn config(&self) -> &PoseConfig {
    &self.config
  }

  pub fn build<T: WithLabel>(self) -> Result<YoloV8Pose<T>, ConfigError> {
    let config = self.config;
    config.validate(T::CLASS_COUNT)?;

    info!(
      "YOLOv8 姿态后处理: 输入 {}x{}, 步长 {:?}, 回归区间 {}, 类别 {}",
      config.network_width,
      config.network_height,
      config.strides,
      config.regression_length + 1,
      config.num_classes
    );
    info!(
      "阈值: 分数 {}, IoU {}, 关节点 {}; 跨类别 NMS: {}; 关节点放大系数: {}; 编码: {}",
      config.score_threshold,
      config.iou_threshold,
      config.joint_threshold,
      config.cross_class_nms,
      config.keypoint_scale,
      config.encoding
    );

    let grids = anchor::generate_grids(&config.strides, config.network_width, config.network_height)?;

    Ok(YoloV8Pose {
      config,
      grids: grids.into_boxed_slice(),
      _phantom: PhantomData,
    })
  }
}

impl<T: WithLabel> Model for YoloV8Pose<T> {
  type Input = TensorFrame;
  type Output = PoseResult<T>;
  type Error = DecodeError;

  fn decode(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    if input.is_empty() {
      debug!("本帧没有可用的输出张量");
      return Ok(PoseResult::empty());
    }

    let heads = decode::group_heads(input.tensors(), &self.config)?;
    for (head_idx, (head, grid)) in heads.iter().zip(self.grids.iter()).enumerate() {
      decode::check_head(head_idx, head, grid, &self.config)?;
      debug!(
        "检测头 {}: 边界框 {:?}, 分数 {:?}, 关节点 {:?}",
        head_idx,
        head.boxes.shape(),
        head.scores.shape(),
        head.keypoints.shape()
      );
    }

    let scores = ScoreMatrix::gather(&heads, self.config.num_classes);
    let decodings = decode::decode_heads::<T>(&heads, &scores, &self.grids, &self.config);
    let candidates = decodings.len();

    let decodings = nms::nms(
      decodings,
      self.config.iou_threshold,
      self.config.cross_class_nms,
    );
    debug!("候选 {} 个, NMS 后保留 {} 个", candidates, decodings.len());

    let (keypoints, segments) = skeleton::filter_keypoints(&decodings, self.config.joint_threshold);
    let detections: Vec<_> = decodings.into_iter().map(|d| d.detection).collect();

    Ok(PoseResult {
      detections: detections.into_boxed_slice(),
      keypoints: keypoints.into_boxed_slice(),
      segments: segments.into_boxed_slice(),
    })
  }
}
