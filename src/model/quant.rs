// 该文件是 Shanan （山南西风） 项目的一部分。
// src/model/quant.rs - 反量化
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

use std::ops::Range;

use crate::frame::{QuantInfo, RawTensor, TensorData};

/// 关节点原始值的归一化除数
pub const KEYPOINT_NORMALIZER: f32 = 255.0;

pub fn dequantize(raw: u8, scale: f32, zero_point: f32) -> f32 {
  (raw as f32 - zero_point) * scale
}

pub fn dequantize_into(raw: &[u8], quant: QuantInfo, out: &mut [f32]) {
  real_into(raw, quant, out);
}

/// 张量元素类型；编码在每个检测头解析一次，逐锚点的读取按元素类型单态化
pub trait Element: Copy {
  /// 边界框与分数使用的实数值
  fn real(self, quant: QuantInfo) -> f32;
  /// 关节点使用的归一化值
  fn normalized(self) -> f32;
}

impl Element for u8 {
  fn real(self, quant: QuantInfo) -> f32 {
    dequantize(self, quant.scale, quant.zero_point)
  }

  fn normalized(self) -> f32 {
    self as f32 / KEYPOINT_NORMALIZER
  }
}

impl Element for f32 {
  fn real(self, _quant: QuantInfo) -> f32 {
    self
  }

  fn normalized(self) -> f32 {
    self / KEYPOINT_NORMALIZER
  }
}

pub fn real_into<E: Element>(raw: &[E], quant: QuantInfo, out: &mut [f32]) {
  debug_assert_eq!(raw.len(), out.len());
  for (o, &r) in out.iter_mut().zip(raw) {
    *o = r.real(quant);
  }
}

pub fn normalized_into<E: Element>(raw: &[E], out: &mut [f32]) {
  debug_assert_eq!(raw.len(), out.len());
  for (o, &r) in out.iter_mut().zip(raw) {
    *o = r.normalized();
  }
}

/// 读取张量中一段元素的实数值：量化数据做反量化，浮点数据原样复制
pub fn real_values_into(tensor: &RawTensor, range: Range<usize>, out: &mut [f32]) {
  match tensor.data() {
    TensorData::Quantized(data) => real_into(&data[range], tensor.quant(), out),
    TensorData::Float(data) => real_into(&data[range], tensor.quant(), out),
  }
}

/// 整个张量的实数值
pub fn real_values(tensor: &RawTensor) -> Vec<f32> {
  let mut out = vec![0.0; tensor.data().len()];
  real_values_into(tensor, 0..out.len(), &mut out);
  out
}

/// 关节点数据只除以 255，不经过量化公式
pub fn normalized_values_into(tensor: &RawTensor, range: Range<usize>, out: &mut [f32]) {
  match tensor.data() {
    TensorData::Quantized(data) => normalized_into(&data[range], out),
    TensorData::Float(data) => normalized_into(&data[range], out),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::frame::TensorShape;
  use approx::assert_abs_diff_eq;

  #[test]
  fn dequantize_matches_formula() {
    for &(scale, zero_point) in &[(0.003_921_568_6, 0.0), (0.125, 128.0), (1.7, 3.5)] {
      for raw in 0..=u8::MAX {
        let expected = (raw as f32 - zero_point) * scale;
        assert_abs_diff_eq!(dequantize(raw, scale, zero_point), expected, epsilon = 1e-6);
      }
    }
  }

  #[test]
  fn float_tensor_is_not_dequantized() {
    let tensor = RawTensor::float("scores", TensorShape::new(1, 2, 1), vec![0.25, 0.75]).unwrap();
    assert_eq!(real_values(&tensor), vec![0.25, 0.75]);
  }

  #[test]
  fn quantized_slice_uses_tensor_quant_info() {
    let tensor = RawTensor::quantized(
      "boxes",
      TensorShape::new(1, 1, 4),
      QuantInfo::new(0.5, 10.0),
      vec![10, 12, 14, 20],
    )
    .unwrap();
    let mut out = [0.0; 2];
    real_values_into(&tensor, 2..4, &mut out);
    assert_eq!(out, [2.0, 5.0]);
  }

  #[test]
  fn keypoints_are_divided_by_255_only() {
    let quantized = RawTensor::quantized(
      "kpts",
      TensorShape::new(1, 1, 3),
      QuantInfo::new(0.1, 7.0),
      vec![0, 51, 255],
    )
    .unwrap();
    let float = RawTensor::float("kpts", TensorShape::new(1, 1, 3), vec![0.0, 51.0, 255.0]).unwrap();

    let mut a = [0.0; 3];
    let mut b = [0.0; 3];
    normalized_values_into(&quantized, 0..3, &mut a);
    normalized_values_into(&float, 0..3, &mut b);
    assert_abs_diff_eq!(a[1], 0.2, epsilon = 1e-6);
    assert_abs_diff_eq!(a[2], 1.0, epsilon = 1e-6);
    assert_eq!(a, b);
  }
}
