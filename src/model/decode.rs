// 该文件是 Shanan （山南西风） 项目的一部分。
// src/model/decode.rs - 边界框与关节点解码
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

use tracing::{debug, error};

use crate::{
  frame::{QuantInfo, RawTensor, TensorData},
  model::{
    BBox, ConfigError, DecodeError, Detection, Keypoint, PoseConfig, WithLabel,
    anchor::{AnchorCenter, AnchorGrid},
    quant::{self, Element},
  },
};

/// 每个检测头的输出张量数量：边界框、分数、关节点
pub const TENSORS_PER_HEAD: usize = 3;
/// 每个目标的关节点数量
pub const NUM_KEYPOINTS: usize = 17;
/// 关节点张量通道深度 (x, y, score) × 17
pub const KEYPOINT_CHANNELS: usize = NUM_KEYPOINTS * 3;
/// 边界框的四条边 (left, top, right, bottom)
const BOX_SIDES: usize = 4;

/// 单个检测头的三个输出张量
#[derive(Debug, Clone, Copy)]
pub struct HeadTensors<'a> {
  pub boxes: &'a RawTensor,
  pub scores: &'a RawTensor,
  pub keypoints: &'a RawTensor,
}

/// 一个检测结果及其关节点，仅在单次解码内有效
#[derive(Debug, Clone)]
pub struct Decoding<T> {
  pub detection: Detection<T>,
  pub keypoints: [Keypoint; NUM_KEYPOINTS],
}

/// 将张量按检测头三个一组拆分
///
/// 若三个张量的通道深度互不相同，则按深度识别角色（部分运行时会打乱输出顺序）；
/// 否则按 (边界框, 分数, 关节点) 的位置顺序处理。
pub fn group_heads<'a>(
  tensors: &'a [RawTensor],
  config: &PoseConfig,
) -> Result<Vec<HeadTensors<'a>>, DecodeError> {
  if tensors.len() % TENSORS_PER_HEAD != 0 {
    error!(
      "张量数量 {} 不是 {} 的整数倍",
      tensors.len(),
      TENSORS_PER_HEAD
    );
    return Err(DecodeError::TensorCount {
      count: tensors.len(),
      per_head: TENSORS_PER_HEAD,
    });
  }

  let heads = tensors.len() / TENSORS_PER_HEAD;
  if heads != config.strides.len() {
    error!(
      "检测头数量 {} 与步长数量 {} 不一致",
      heads,
      config.strides.len()
    );
    return Err(
      ConfigError::HeadCountMismatch {
        heads,
        strides: config.strides.len(),
      }
      .into(),
    );
  }

  tensors
    .chunks_exact(TENSORS_PER_HEAD)
    .enumerate()
    .map(|(head, group)| assign_roles(head, group, config))
    .collect()
}

fn assign_roles<'a>(
  head: usize,
  group: &'a [RawTensor],
  config: &PoseConfig,
) -> Result<HeadTensors<'a>, DecodeError> {
  let box_depth = config.box_channels();
  let score_depth = config.num_classes;
  let distinct =
    box_depth != score_depth && box_depth != KEYPOINT_CHANNELS && score_depth != KEYPOINT_CHANNELS;

  if !distinct {
    let head_tensors = HeadTensors {
      boxes: &group[0],
      scores: &group[1],
      keypoints: &group[2],
    };
    check_depth(head, head_tensors.boxes, box_depth)?;
    check_depth(head, head_tensors.scores, score_depth)?;
    check_depth(head, head_tensors.keypoints, KEYPOINT_CHANNELS)?;
    return Ok(head_tensors);
  }

  let find = |depth: usize| group.iter().find(|t| t.shape().channels == depth);
  match (find(box_depth), find(score_depth), find(KEYPOINT_CHANNELS)) {
    (Some(boxes), Some(scores), Some(keypoints)) => {
      if !std::ptr::eq(boxes, &group[0]) || !std::ptr::eq(scores, &group[1]) {
        debug!(
          "检测头 {}: 输出顺序交换 - 边界框 {}, 分数 {}, 关节点 {}",
          head,
          boxes.name(),
          scores.name(),
          keypoints.name()
        );
      }
      Ok(HeadTensors {
        boxes,
        scores,
        keypoints,
      })
    }
    _ => {
      let depths: Vec<usize> = group.iter().map(|t| t.shape().channels).collect();
      error!(
        "检测头 {}: 通道深度 {:?} 无法匹配 (边界框 {}, 分数 {}, 关节点 {})",
        head, depths, box_depth, score_depth, KEYPOINT_CHANNELS
      );
      Err(DecodeError::UnknownLayout { head, depths })
    }
  }
}

fn check_depth(head: usize, tensor: &RawTensor, expected: usize) -> Result<(), DecodeError> {
  let actual = tensor.shape().channels;
  if actual != expected {
    error!(
      "检测头 {}: 张量 {} 通道深度期望 {}, 实际 {}",
      head,
      tensor.name(),
      expected,
      actual
    );
    return Err(DecodeError::ChannelMismatch {
      head,
      tensor: tensor.name().to_string(),
      expected,
      actual,
    });
  }
  Ok(())
}

/// 检查检测头张量与锚点网格、配置编码是否一致
pub fn check_head(
  head: usize,
  tensors: &HeadTensors<'_>,
  grid: &AnchorGrid,
  config: &PoseConfig,
) -> Result<(), DecodeError> {
  for tensor in [tensors.boxes, tensors.scores, tensors.keypoints] {
    let proposals = tensor.shape().proposals();
    if proposals != grid.len() {
      error!(
        "检测头 {}: 张量 {} 候选数量 {} 与步长 {} 的网格 {} 不一致",
        head,
        tensor.name(),
        proposals,
        grid.stride(),
        grid.len()
      );
      return Err(DecodeError::GridMismatch {
        head,
        tensor: tensor.name().to_string(),
        stride: grid.stride(),
        expected: grid.len(),
        actual: proposals,
      });
    }
  }

  // 关节点张量可以是任意编码，它只做 /255 归一化
  for tensor in [tensors.boxes, tensors.scores] {
    if tensor.encoding() != config.encoding {
      error!(
        "张量 {} 编码为 {}, 配置为 {}",
        tensor.name(),
        tensor.encoding(),
        config.encoding
      );
      return Err(DecodeError::EncodingMismatch {
        tensor: tensor.name().to_string(),
        expected: config.encoding,
        actual: tensor.encoding(),
      });
    }
  }

  Ok(())
}

/// 所有检测头拼接后的实数分数矩阵，行号即全局候选序号
#[derive(Debug, Clone)]
pub struct ScoreMatrix {
  num_classes: usize,
  values: Vec<f32>,
}

impl ScoreMatrix {
  pub fn gather(heads: &[HeadTensors<'_>], num_classes: usize) -> Self {
    let total: usize = heads.iter().map(|h| h.scores.data().len()).sum();
    let mut values = Vec::with_capacity(total);
    for head in heads {
      values.extend(head.scores.to_f32_vec());
    }
    Self {
      num_classes,
      values,
    }
  }

  pub fn rows(&self) -> usize {
    self.values.len() / self.num_classes
  }

  /// 返回 (类别编号, 置信度)；单类别时类别编号恒为 0
  pub fn best(&self, row: usize) -> (u32, f32) {
    let start = row * self.num_classes;
    let scores = &self.values[start..start + self.num_classes];
    if self.num_classes == 1 {
      return (0, scores[0]);
    }

    let mut class_id = 0usize;
    let mut best = f32::MIN;
    for (c, &score) in scores.iter().enumerate() {
      if score > best {
        best = score;
        class_id = c;
      }
    }
    (class_id as u32, best)
  }
}

/// 按行做数值稳定的 softmax
pub fn softmax_rows(values: &mut [f32], cols: usize) {
  for row in values.chunks_exact_mut(cols) {
    let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut sum = 0.0;
    for v in row.iter_mut() {
      *v = (*v - max).exp();
      sum += *v;
    }
    for v in row.iter_mut() {
      *v /= sum;
    }
  }
}

/// 离散分布在区间序号 0..n 上的期望
pub fn expected_distance(probabilities: &[f32]) -> f32 {
  probabilities
    .iter()
    .enumerate()
    .map(|(k, p)| k as f32 * p)
    .sum()
}

pub fn sigmoid(x: f32) -> f32 {
  1.0 / (1.0 + (-x).exp())
}

/// 将 4×bins 的距离分布（会被就地 softmax）解码为归一化边界框
pub fn decode_box(
  distribution: &mut [f32],
  bins: usize,
  center: &AnchorCenter,
  stride: f32,
  network_width: f32,
  network_height: f32,
) -> BBox {
  softmax_rows(distribution, bins);

  let mut distances = [0.0f32; BOX_SIDES];
  for (d, row) in distances.iter_mut().zip(distribution.chunks_exact(bins)) {
    *d = expected_distance(row) * stride;
  }

  let xmin = center[0] - distances[0];
  let ymin = center[1] - distances[1];
  let xmax = center[2] + distances[2];
  let ymax = center[3] + distances[3];

  BBox::new(
    xmin / network_width,
    ymin / network_height,
    (xmax - xmin) / network_width,
    (ymax - ymin) / network_height,
  )
}

/// 将已除以 255 的 17×(x, y, score) 解码为归一化关节点
pub fn decode_keypoints(
  raw: &[f32],
  center: &AnchorCenter,
  stride: f32,
  keypoint_scale: f32,
  network_width: f32,
  network_height: f32,
) -> [Keypoint; NUM_KEYPOINTS] {
  let mut keypoints = [Keypoint::default(); NUM_KEYPOINTS];
  for (kp, triple) in keypoints.iter_mut().zip(raw.chunks_exact(3)) {
    let x = stride * (triple[0] * keypoint_scale - 0.5) + center[0];
    let y = stride * (triple[1] * keypoint_scale - 0.5) + center[1];
    *kp = Keypoint {
      x: x / network_width,
      y: y / network_height,
      score: sigmoid(triple[2]),
    };
  }
  keypoints
}

/// 单个检测头解码时共享的配置与缓冲区
struct HeadDecoder<'a> {
  config: &'a PoseConfig,
  scores: &'a ScoreMatrix,
  distribution: Vec<f32>,
  raw_keypoints: [f32; KEYPOINT_CHANNELS],
}

impl HeadDecoder<'_> {
  /// 解码一个检测头，`row` 为该检测头第一个锚点的全局序号；返回保留数量
  fn decode<T: WithLabel, B: Element, K: Element>(
    &mut self,
    boxes: &[B],
    box_quant: QuantInfo,
    keypoints: &[K],
    grid: &AnchorGrid,
    row: usize,
    out: &mut Vec<Decoding<T>>,
  ) -> usize {
    let config = self.config;
    let bins = config.regression_length + 1;
    let box_depth = config.box_channels();
    let network_width = config.network_width as f32;
    let network_height = config.network_height as f32;
    let stride = grid.stride() as f32;
    let mut kept = 0usize;

    for (anchor, center) in grid.centers().iter().enumerate() {
      let (class_id, score) = self.scores.best(row + anchor);
      // NaN 分数同样丢弃
      if !(score >= config.score_threshold) {
        continue;
      }

      let offset = anchor * box_depth;
      quant::real_into(
        &boxes[offset..offset + box_depth],
        box_quant,
        &mut self.distribution,
      );
      let bbox = decode_box(
        &mut self.distribution,
        bins,
        center,
        stride,
        network_width,
        network_height,
      );

      let offset = anchor * KEYPOINT_CHANNELS;
      quant::normalized_into(
        &keypoints[offset..offset + KEYPOINT_CHANNELS],
        &mut self.raw_keypoints,
      );
      let keypoints = decode_keypoints(
        &self.raw_keypoints,
        center,
        stride,
        config.keypoint_scale,
        network_width,
        network_height,
      );

      out.push(Decoding {
        detection: Detection {
          kind: T::from_label_id(class_id),
          score,
          bbox,
        },
        keypoints,
      });
      kept += 1;
    }

    kept
  }
}

/// 解码所有检测头；低于分数阈值的锚点在解码前跳过
///
/// 结果顺序为检测头顺序、再按锚点顺序，不按置信度排序。
/// 元素编码在每个检测头解析一次。
pub fn decode_heads<T: WithLabel>(
  heads: &[HeadTensors<'_>],
  scores: &ScoreMatrix,
  grids: &[AnchorGrid],
  config: &PoseConfig,
) -> Vec<Decoding<T>> {
  let mut decoder = HeadDecoder {
    config,
    scores,
    distribution: vec![0.0f32; config.box_channels()],
    raw_keypoints: [0.0f32; KEYPOINT_CHANNELS],
  };

  let mut decodings = Vec::new();
  let mut row = 0usize;

  for (head_idx, (head, grid)) in heads.iter().zip(grids).enumerate() {
    let quant = head.boxes.quant();
    let out = &mut decodings;
    let kept = match (head.boxes.data(), head.keypoints.data()) {
      (TensorData::Quantized(b), TensorData::Quantized(k)) => {
        decoder.decode::<T, _, _>(b, quant, k, grid, row, out)
      }
      (TensorData::Quantized(b), TensorData::Float(k)) => {
        decoder.decode::<T, _, _>(b, quant, k, grid, row, out)
      }
      (TensorData::Float(b), TensorData::Quantized(k)) => {
        decoder.decode::<T, _, _>(b, quant, k, grid, row, out)
      }
      (TensorData::Float(b), TensorData::Float(k)) => {
        decoder.decode::<T, _, _>(b, quant, k, grid, row, out)
      }
    };
    row += grid.len();

    debug!(
      "检测头 {}: 步长 {}, 保留候选 {} / {}",
      head_idx,
      grid.stride(),
      kept,
      grid.len()
    );
  }

  decodings
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::frame::{QuantInfo, TensorShape};
  use crate::model::PersonLabel;
  use approx::assert_abs_diff_eq;

  fn float_tensor(name: &str, h: usize, w: usize, c: usize) -> RawTensor {
    RawTensor::float(name, TensorShape::new(h, w, c), vec![0.0; h * w * c]).unwrap()
  }

  fn small_config() -> PoseConfig {
    PoseConfig {
      network_width: 32,
      network_height: 32,
      strides: vec![16],
      ..PoseConfig::default()
    }
  }

  #[test]
  fn softmax_rows_sum_to_one() {
    let mut values = vec![
      1.0, 2.0, 3.0, 4.0, //
      -50.0, 0.0, 50.0, 100.0, //
      0.0, 0.0, 0.0, 0.0, //
      1000.0, 999.0, -1000.0, 3.0,
    ];
    softmax_rows(&mut values, 4);
    for row in values.chunks_exact(4) {
      assert!(row.iter().all(|&p| p >= 0.0));
      assert_abs_diff_eq!(row.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
    }
    assert_abs_diff_eq!(values[8], 0.25, epsilon = 1e-6);
  }

  #[test]
  fn expected_distance_is_bin_weighted_sum() {
    assert_abs_diff_eq!(expected_distance(&[0.0, 0.0, 1.0, 0.0]), 2.0);
    assert_abs_diff_eq!(expected_distance(&[0.25, 0.25, 0.25, 0.25]), 1.5);
  }

  #[test]
  fn sigmoid_is_centered() {
    assert_abs_diff_eq!(sigmoid(0.0), 0.5);
    assert!(sigmoid(10.0) > 0.999);
    assert!(sigmoid(-10.0) < 0.001);
  }

  #[test]
  fn box_from_one_hot_distribution() {
    // 每条边在第 k 个区间上取极大 logit
    let bins = 16;
    let mut distribution = vec![0.0f32; 4 * bins];
    for (side, k) in [1usize, 2, 3, 4].iter().enumerate() {
      distribution[side * bins + k] = 100.0;
    }
    let center = [100.0, 200.0, 100.0, 200.0];
    let bbox = decode_box(&mut distribution, bins, &center, 8.0, 640.0, 640.0);

    assert_abs_diff_eq!(bbox.xmin, (100.0 - 8.0) / 640.0, epsilon = 1e-5);
    assert_abs_diff_eq!(bbox.ymin, (200.0 - 16.0) / 640.0, epsilon = 1e-5);
    assert_abs_diff_eq!(bbox.width, (8.0 + 24.0) / 640.0, epsilon = 1e-5);
    assert_abs_diff_eq!(bbox.height, (16.0 + 32.0) / 640.0, epsilon = 1e-5);
  }

  #[test]
  fn keypoints_follow_offset_formula() {
    let mut raw = [0.0f32; KEYPOINT_CHANNELS];
    // 关节点 0: x = 0.25, y = 0.125, 原始分数 0
    raw[0] = 0.25;
    raw[1] = 0.125;
    raw[2] = 0.0;
    let center = [24.0, 40.0, 24.0, 40.0];
    let keypoints = decode_keypoints(&raw, &center, 16.0, 4.0, 320.0, 160.0);

    // 16 * (0.25 * 4 - 0.5) + 24 = 32
    assert_abs_diff_eq!(keypoints[0].x, 32.0 / 320.0, epsilon = 1e-6);
    // 16 * (0.125 * 4 - 0.5) + 40 = 40
    assert_abs_diff_eq!(keypoints[0].y, 40.0 / 160.0, epsilon = 1e-6);
    assert_abs_diff_eq!(keypoints[0].score, 0.5, epsilon = 1e-6);
    // 零偏移落在中心左上方半个步长处
    assert_abs_diff_eq!(keypoints[16].x, 16.0 / 320.0, epsilon = 1e-6);
  }

  #[test]
  fn group_heads_rejects_partial_groups() {
    let config = small_config();
    let tensors = vec![float_tensor("a", 2, 2, 64), float_tensor("b", 2, 2, 1)];
    assert_eq!(
      group_heads(&tensors, &config).unwrap_err(),
      DecodeError::TensorCount {
        count: 2,
        per_head: 3
      }
    );
  }

  #[test]
  fn group_heads_checks_stride_count() {
    let mut config = small_config();
    config.strides = vec![8, 16];
    let tensors = vec![
      float_tensor("boxes", 2, 2, 64),
      float_tensor("scores", 2, 2, 1),
      float_tensor("kpts", 2, 2, 51),
    ];
    assert_eq!(
      group_heads(&tensors, &config).unwrap_err(),
      DecodeError::Config(ConfigError::HeadCountMismatch {
        heads: 1,
        strides: 2
      })
    );
  }

  #[test]
  fn group_heads_identifies_roles_by_depth() {
    let config = small_config();
    let tensors = vec![
      float_tensor("kpts", 2, 2, 51),
      float_tensor("boxes", 2, 2, 64),
      float_tensor("scores", 2, 2, 1),
    ];
    let heads = group_heads(&tensors, &config).unwrap();
    assert_eq!(heads[0].boxes.name(), "boxes");
    assert_eq!(heads[0].scores.name(), "scores");
    assert_eq!(heads[0].keypoints.name(), "kpts");
  }

  #[test]
  fn group_heads_reports_unknown_layout() {
    let config = small_config();
    let tensors = vec![
      float_tensor("boxes", 2, 2, 64),
      float_tensor("scores", 2, 2, 2),
      float_tensor("kpts", 2, 2, 51),
    ];
    assert_eq!(
      group_heads(&tensors, &config).unwrap_err(),
      DecodeError::UnknownLayout {
        head: 0,
        depths: vec![64, 2, 51]
      }
    );
  }

  #[test]
  fn check_head_detects_grid_and_encoding_mismatch() {
    let config = small_config();
    let grid = AnchorGrid::new(16, 32, 32).unwrap();

    let tensors = vec![
      float_tensor("boxes", 2, 2, 64),
      float_tensor("scores", 2, 2, 1),
      float_tensor("kpts", 1, 2, 51),
    ];
    let heads = group_heads(&tensors, &config).unwrap();
    assert!(matches!(
      check_head(0, &heads[0], &grid, &config),
      Err(DecodeError::GridMismatch { expected: 4, actual: 2, .. })
    ));

    let tensors = vec![
      float_tensor("boxes", 2, 2, 64),
      float_tensor("scores", 2, 2, 1),
      float_tensor("kpts", 2, 2, 51),
    ];
    let heads = group_heads(&tensors, &config).unwrap();
    assert!(matches!(
      check_head(0, &heads[0], &grid, &config),
      Err(DecodeError::EncodingMismatch { .. })
    ));
  }

  #[test]
  fn score_matrix_picks_best_class() {
    let scores = RawTensor::quantized(
      "scores",
      TensorShape::new(1, 2, 3),
      QuantInfo::new(0.1, 0.0),
      vec![1, 9, 3, 7, 2, 2],
    )
    .unwrap();
    let boxes = float_tensor("boxes", 1, 2, 64);
    let kpts = float_tensor("kpts", 1, 2, 51);
    let heads = [HeadTensors {
      boxes: &boxes,
      scores: &scores,
      keypoints: &kpts,
    }];
    let matrix = ScoreMatrix::gather(&heads, 3);
    assert_eq!(matrix.rows(), 2);
    let (class_id, score) = matrix.best(0);
    assert_eq!(class_id, 1);
    assert_abs_diff_eq!(score, 0.9, epsilon = 1e-6);
    assert_eq!(matrix.best(1).0, 0);
  }

  #[test]
  fn decode_heads_skips_low_scores() {
    let config = PoseConfig {
      encoding: crate::frame::TensorEncoding::Float,
      ..small_config()
    };
    let grid = AnchorGrid::new(16, 32, 32).unwrap();
    let boxes = float_tensor("boxes", 2, 2, 64);
    let scores = RawTensor::float("scores", TensorShape::new(2, 2, 1), vec![0.1, 0.9, f32::NAN, 0.6])
      .unwrap();
    let kpts = float_tensor("kpts", 2, 2, 51);
    let heads = [HeadTensors {
      boxes: &boxes,
      scores: &scores,
      keypoints: &kpts,
    }];
    let matrix = ScoreMatrix::gather(&heads, 1);
    let decodings: Vec<Decoding<PersonLabel>> =
      decode_heads(&heads, &matrix, std::slice::from_ref(&grid), &config);

    let kept: Vec<f32> = decodings.iter().map(|d| d.detection.score).collect();
    assert_eq!(kept, vec![0.9, 0.6]);
    // 全零分布的期望距离为 7.5 个区间
    let bbox = decodings[0].detection.bbox;
    assert_abs_diff_eq!(bbox.xmin, (24.0 - 7.5 * 16.0) / 32.0, epsilon = 1e-5);
  }

  #[test]
  fn decode_heads_mixes_box_and_keypoint_encodings() {
    let config = small_config();
    let grid = AnchorGrid::new(16, 32, 32).unwrap();
    // 反量化后全零：raw 8, zero_point 8
    let boxes = RawTensor::quantized(
      "boxes",
      TensorShape::new(2, 2, 64),
      QuantInfo::new(0.5, 8.0),
      vec![8; 2 * 2 * 64],
    )
    .unwrap();
    let scores = RawTensor::quantized(
      "scores",
      TensorShape::new(2, 2, 1),
      QuantInfo::new(0.01, 0.0),
      vec![0, 0, 0, 90],
    )
    .unwrap();
    let quantized_kpts = RawTensor::quantized(
      "kpts",
      TensorShape::new(2, 2, 51),
      QuantInfo::new(0.1, 7.0),
      vec![51; 2 * 2 * 51],
    )
    .unwrap();
    let float_kpts =
      RawTensor::float("kpts", TensorShape::new(2, 2, 51), vec![51.0; 2 * 2 * 51]).unwrap();

    let decode = |keypoints: &RawTensor| -> Vec<Decoding<PersonLabel>> {
      let heads = [HeadTensors {
        boxes: &boxes,
        scores: &scores,
        keypoints,
      }];
      let matrix = ScoreMatrix::gather(&heads, 1);
      decode_heads(&heads, &matrix, std::slice::from_ref(&grid), &config)
    };
    let a = decode(&quantized_kpts);
    let b = decode(&float_kpts);

    assert_eq!(a.len(), 1);
    assert_eq!(a[0].keypoints, b[0].keypoints);
    assert_eq!(a[0].detection.bbox, b[0].detection.bbox);
    // 锚点 (1, 1) 中心 (24, 24)，关节点 x = 16 * (0.2 * 4 - 0.5) + 24
    assert_abs_diff_eq!(a[0].keypoints[0].x, 28.8 / 32.0, epsilon = 1e-5);
    let bbox = a[0].detection.bbox;
    assert_abs_diff_eq!(bbox.xmin, (24.0 - 7.5 * 16.0) / 32.0, epsilon = 1e-5);
  }
}
