// 该文件是 Shanan （山南西风） 项目的一部分。
// src/frame.rs - 模型输出张量帧定义
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

use std::str::FromStr;

use thiserror::Error;

/// 张量形状：候选高度 × 候选宽度 × 通道深度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TensorShape {
  pub height: usize,
  pub width: usize,
  pub channels: usize,
}

impl TensorShape {
  pub fn new(height: usize, width: usize, channels: usize) -> Self {
    Self {
      height,
      width,
      channels,
    }
  }

  /// 候选（锚点）数量，溢出时饱和
  pub fn proposals(&self) -> usize {
    self.height.saturating_mul(self.width)
  }

  /// 元素总数，溢出时饱和
  pub fn len(&self) -> usize {
    self.checked_len().unwrap_or(usize::MAX)
  }

  /// 元素总数，溢出时为 None
  pub fn checked_len(&self) -> Option<usize> {
    self
      .height
      .checked_mul(self.width)?
      .checked_mul(self.channels)
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// 定点量化参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantInfo {
  pub scale: f32,
  pub zero_point: f32,
}

impl QuantInfo {
  pub fn new(scale: f32, zero_point: f32) -> Self {
    Self { scale, zero_point }
  }
}

impl Default for QuantInfo {
  fn default() -> Self {
    Self {
      scale: 1.0,
      zero_point: 0.0,
    }
  }
}

/// 张量元素编码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TensorEncoding {
  /// 8 位定点量化
  #[default]
  Quantized,
  /// 32 位浮点
  Float,
}

impl FromStr for TensorEncoding {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "quantized" | "uint8" | "u8" => Ok(TensorEncoding::Quantized),
      "float" | "float32" | "f32" => Ok(TensorEncoding::Float),
      other => Err(format!("未知的张量编码: {}", other)),
    }
  }
}

impl std::fmt::Display for TensorEncoding {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      TensorEncoding::Quantized => write!(f, "quantized"),
      TensorEncoding::Float => write!(f, "float"),
    }
  }
}

/// 张量数据，按元素编码区分
#[derive(Debug, Clone, PartialEq)]
pub enum TensorData {
  Quantized(Box<[u8]>),
  Float(Box<[f32]>),
}

impl TensorData {
  pub fn len(&self) -> usize {
    match self {
      TensorData::Quantized(data) => data.len(),
      TensorData::Float(data) => data.len(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn encoding(&self) -> TensorEncoding {
    match self {
      TensorData::Quantized(_) => TensorEncoding::Quantized,
      TensorData::Float(_) => TensorEncoding::Float,
    }
  }
}

#[derive(Error, Debug)]
pub enum TensorError {
  #[error("张量 {name} 数据长度不匹配: 形状 {shape:?} 期望长度 {expected}, 实际长度 {actual}")]
  LengthMismatch {
    name: String,
    shape: TensorShape,
    expected: usize,
    actual: usize,
  },
  #[error("张量 {name} 形状 {shape:?} 的元素数量溢出")]
  ShapeOverflow { name: String, shape: TensorShape },
}

/// 单个输出张量（只读）
#[derive(Debug, Clone, PartialEq)]
pub struct RawTensor {
  name: String,
  shape: TensorShape,
  quant: QuantInfo,
  data: TensorData,
}

impl RawTensor {
  pub fn new(
    name: impl Into<String>,
    shape: TensorShape,
    quant: QuantInfo,
    data: TensorData,
  ) -> Result<Self, TensorError> {
    let name = name.into();
    let Some(expected) = shape.checked_len() else {
      return Err(TensorError::ShapeOverflow { name, shape });
    };
    if data.len() != expected {
      return Err(TensorError::LengthMismatch {
        name,
        shape,
        expected,
        actual: data.len(),
      });
    }

    Ok(Self {
      name,
      shape,
      quant,
      data,
    })
  }

  pub fn quantized(
    name: impl Into<String>,
    shape: TensorShape,
    quant: QuantInfo,
    data: Vec<u8>,
  ) -> Result<Self, TensorError> {
    Self::new(
      name,
      shape,
      quant,
      TensorData::Quantized(data.into_boxed_slice()),
    )
  }

  pub fn float(
    name: impl Into<String>,
    shape: TensorShape,
    data: Vec<f32>,
  ) -> Result<Self, TensorError> {
    Self::new(
      name,
      shape,
      QuantInfo::default(),
      TensorData::Float(data.into_boxed_slice()),
    )
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn shape(&self) -> TensorShape {
    self.shape
  }

  pub fn quant(&self) -> QuantInfo {
    self.quant
  }

  pub fn data(&self) -> &TensorData {
    &self.data
  }

  pub fn encoding(&self) -> TensorEncoding {
    self.data.encoding()
  }

  /// 全部元素的实数值：量化数据按 scale/zero_point 反量化，浮点数据原样复制
  pub fn to_f32_vec(&self) -> Vec<f32> {
    crate::model::quant::real_values(self)
  }
}

/// 一帧推理输出：按检测头顺序排列的张量集合
#[derive(Debug, Clone, Default)]
pub struct TensorFrame {
  source: Option<String>,
  tensors: Vec<RawTensor>,
}

impl TensorFrame {
  pub fn new(tensors: Vec<RawTensor>) -> Self {
    Self {
      source: None,
      tensors,
    }
  }

  pub fn with_source(mut self, source: impl Into<String>) -> Self {
    self.source = Some(source.into());
    self
  }

  /// 帧来源描述（例如张量文件路径）
  pub fn source(&self) -> Option<&str> {
    self.source.as_deref()
  }

  pub fn tensors(&self) -> &[RawTensor] {
    &self.tensors
  }

  pub fn len(&self) -> usize {
    self.tensors.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tensors.is_empty()
  }
}

impl From<Vec<RawTensor>> for TensorFrame {
  fn from(tensors: Vec<RawTensor>) -> Self {
    Self::new(tensors)
  }
}
