// 该文件是 Shanan （山南西风） 项目的一部分。
// src/model/error.rs - 解码错误定义
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

use crate::frame::TensorEncoding;

/// 配置错误，在任何解码工作之前报告
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
  #[error("网络输入尺寸无效: {width}x{height}")]
  InvalidNetworkSize { width: u32, height: u32 },
  #[error("步长列表为空")]
  EmptyStrides,
  #[error("步长 {stride} 对网络尺寸 {width}x{height} 无效")]
  InvalidStride { stride: u32, width: u32, height: u32 },
  #[error("阈值 {name} = {value} 超出范围")]
  InvalidThreshold { name: &'static str, value: f32 },
  #[error("类别数量 {count} 无效，标签表最多支持 {max} 类")]
  InvalidClassCount { count: usize, max: usize },
  #[error("回归长度 {value} 无效，最大为 {max}")]
  InvalidRegressionLength { value: usize, max: usize },
  #[error("关节点放大系数无效: {0}")]
  InvalidKeypointScale(f32),
  #[error("检测头数量 {heads} 与步长数量 {strides} 不一致")]
  HeadCountMismatch { heads: usize, strides: usize },
  #[error("模型地址必须使用 {0} 方案")]
  SchemeMismatch(&'static str),
  #[error("模型参数 {key} 的值 {value} 无效")]
  InvalidParameter { key: String, value: String },
}

/// 单帧解码错误；出错时不产生任何部分结果
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
  #[error("配置错误: {0}")]
  Config(#[from] ConfigError),
  #[error("张量数量 {count} 不是每个检测头 {per_head} 个张量的整数倍")]
  TensorCount { count: usize, per_head: usize },
  #[error("检测头 {head}: 无法识别张量布局, 通道深度 {depths:?}")]
  UnknownLayout { head: usize, depths: Vec<usize> },
  #[error("检测头 {head}: 张量 {tensor} 通道深度期望 {expected}, 实际 {actual}")]
  ChannelMismatch {
    head: usize,
    tensor: String,
    expected: usize,
    actual: usize,
  },
  #[error("检测头 {head}: 张量 {tensor} 候选数量期望 {expected} (步长 {stride}), 实际 {actual}")]
  GridMismatch {
    head: usize,
    tensor: String,
    stride: u32,
    expected: usize,
    actual: usize,
  },
  #[error("张量 {tensor} 编码期望 {expected}, 实际 {actual}")]
  EncodingMismatch {
    tensor: String,
    expected: TensorEncoding,
    actual: TensorEncoding,
  },
}
