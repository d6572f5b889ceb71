// 该文件是 Shanan （山南西风） 项目的一部分。
// tests/common/mod.rs - 测试用合成张量帧
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

#![allow(dead_code)]

use shanan_pose::{
  frame::{QuantInfo, RawTensor, TensorEncoding, TensorFrame, TensorShape},
  model::{PersonLabel, YoloV8Pose, YoloV8PoseBuilder},
};

pub const NETWORK: u32 = 64;
pub const STRIDES: [u32; 3] = [8, 16, 32];
pub const BINS: usize = 16;
pub const BOX_CHANNELS: usize = 4 * BINS;
pub const KEYPOINT_CHANNELS: usize = 51;

/// 量化模式下边界框 logits 的缩放，u8 值 80 对应 logit 20
pub const BOX_SCALE: f32 = 0.25;
const PEAK_LOGIT: f32 = 20.0;

pub fn model(encoding: TensorEncoding) -> YoloV8Pose<PersonLabel> {
  YoloV8PoseBuilder::default()
    .network_size(NETWORK, NETWORK)
    .strides(STRIDES)
    .encoding(encoding)
    .build()
    .unwrap()
}

/// 一个检测头的实数内容，按锚点行优先排列
struct Head {
  side: usize,
  boxes: Vec<f32>,
  scores: Vec<f32>,
  keypoints: Vec<f32>,
}

/// 构造 64×64 网络、三个检测头的合成帧
pub struct SyntheticFrame {
  heads: Vec<Head>,
}

impl Default for SyntheticFrame {
  fn default() -> Self {
    Self::new()
  }
}

impl SyntheticFrame {
  pub fn new() -> Self {
    let heads = STRIDES
      .iter()
      .map(|&stride| {
        let side = (NETWORK / stride) as usize;
        let anchors = side * side;
        Head {
          side,
          boxes: vec![0.0; anchors * BOX_CHANNELS],
          scores: vec![0.0; anchors],
          keypoints: vec![0.0; anchors * KEYPOINT_CHANNELS],
        }
      })
      .collect();
    Self { heads }
  }

  /// 在 (row, col) 锚点放置一个四边距离均为 `distance` 个区间的目标
  ///
  /// 小数距离由相邻两个区间各占一半概率得到，只支持 .0 与 .5。
  pub fn with_anchor(mut self, head: usize, row: usize, col: usize, score: f32, distance: f32) -> Self {
    let h = &mut self.heads[head];
    let anchor = row * h.side + col;
    h.scores[anchor] = score;

    let low = distance.floor() as usize;
    let half = distance.fract() > 0.25;
    let base = anchor * BOX_CHANNELS;
    for side in 0..4 {
      let logits = &mut h.boxes[base + side * BINS..base + (side + 1) * BINS];
      logits.fill(0.0);
      logits[low] = PEAK_LOGIT;
      if half {
        logits[low + 1] = PEAK_LOGIT;
      }
    }
    self
  }

  /// 设置某个锚点全部关节点的原始值（未除以 255）
  pub fn with_keypoints(mut self, head: usize, row: usize, col: usize, x: f32, y: f32, score: f32) -> Self {
    let h = &mut self.heads[head];
    let base = (row * h.side + col) * KEYPOINT_CHANNELS;
    for triple in h.keypoints[base..base + KEYPOINT_CHANNELS].chunks_exact_mut(3) {
      triple[0] = x;
      triple[1] = y;
      triple[2] = score;
    }
    self
  }

  pub fn float_frame(&self) -> TensorFrame {
    let mut tensors = Vec::new();
    for (i, h) in self.heads.iter().enumerate() {
      tensors.push(
        RawTensor::float(
          format!("boxes{}", i),
          TensorShape::new(h.side, h.side, BOX_CHANNELS),
          h.boxes.clone(),
        )
        .unwrap(),
      );
      tensors.push(
        RawTensor::float(
          format!("scores{}", i),
          TensorShape::new(h.side, h.side, 1),
          h.scores.clone(),
        )
        .unwrap(),
      );
      tensors.push(
        RawTensor::float(
          format!("keypoints{}", i),
          TensorShape::new(h.side, h.side, KEYPOINT_CHANNELS),
          h.keypoints.clone(),
        )
        .unwrap(),
      );
    }
    TensorFrame::new(tensors)
  }

  /// 量化：边界框 scale 0.25，分数 scale 1/255，关节点按原始字节
  pub fn quantized_frame(&self) -> TensorFrame {
    let quantize = |values: &[f32], scale: f32| -> Vec<u8> {
      values
        .iter()
        .map(|v| (v / scale).round().clamp(0.0, 255.0) as u8)
        .collect()
    };

    let mut tensors = Vec::new();
    for (i, h) in self.heads.iter().enumerate() {
      tensors.push(
        RawTensor::quantized(
          format!("boxes{}", i),
          TensorShape::new(h.side, h.side, BOX_CHANNELS),
          QuantInfo::new(BOX_SCALE, 0.0),
          quantize(&h.boxes, BOX_SCALE),
        )
        .unwrap(),
      );
      tensors.push(
        RawTensor::quantized(
          format!("scores{}", i),
          TensorShape::new(h.side, h.side, 1),
          QuantInfo::new(1.0 / 255.0, 0.0),
          quantize(&h.scores, 1.0 / 255.0),
        )
        .unwrap(),
      );
      tensors.push(
        RawTensor::quantized(
          format!("keypoints{}", i),
          TensorShape::new(h.side, h.side, KEYPOINT_CHANNELS),
          QuantInfo::default(),
          quantize(&h.keypoints, 1.0),
        )
        .unwrap(),
      );
    }
    TensorFrame::new(tensors)
  }
}
