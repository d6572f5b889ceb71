// 该文件是 Shanan （山南西风） 项目的一部分。
// src/model/anchor.rs - 锚点中心网格
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

use tracing::debug;

use crate::model::ConfigError;

/// 像素坐标下的锚点中心 `[cx, cy, cx, cy]`
///
/// 重复两次是为了直接与 `[-l, -t, r, b]` 相加得到边界框。
pub type AnchorCenter = [f32; 4];

/// 单个步长层级的锚点中心网格
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorGrid {
  stride: u32,
  width: usize,
  height: usize,
  centers: Box<[AnchorCenter]>,
}

impl AnchorGrid {
  /// 按行优先顺序（外层行、内层列）生成中心点，与张量的候选展开顺序一致
  pub fn new(stride: u32, network_width: u32, network_height: u32) -> Result<Self, ConfigError> {
    if stride == 0 || stride > network_width || stride > network_height {
      return Err(ConfigError::InvalidStride {
        stride,
        width: network_width,
        height: network_height,
      });
    }

    let width = (network_width / stride) as usize;
    let height = (network_height / stride) as usize;
    let s = stride as f32;

    let mut centers = Vec::with_capacity(width * height);
    for row in 0..height {
      for col in 0..width {
        let cx = (col as f32 + 0.5) * s;
        let cy = (row as f32 + 0.5) * s;
        centers.push([cx, cy, cx, cy]);
      }
    }

    Ok(Self {
      stride,
      width,
      height,
      centers: centers.into_boxed_slice(),
    })
  }

  pub fn stride(&self) -> u32 {
    self.stride
  }

  pub fn width(&self) -> usize {
    self.width
  }

  pub fn height(&self) -> usize {
    self.height
  }

  pub fn centers(&self) -> &[AnchorCenter] {
    &self.centers
  }

  pub fn len(&self) -> usize {
    self.centers.len()
  }

  pub fn is_empty(&self) -> bool {
    self.centers.is_empty()
  }
}

/// 为每个检测头生成锚点网格，顺序与步长列表一致
pub fn generate_grids(
  strides: &[u32],
  network_width: u32,
  network_height: u32,
) -> Result<Vec<AnchorGrid>, ConfigError> {
  if network_width == 0 || network_height == 0 {
    return Err(ConfigError::InvalidNetworkSize {
      width: network_width,
      height: network_height,
    });
  }
  if strides.is_empty() {
    return Err(ConfigError::EmptyStrides);
  }

  strides
    .iter()
    .map(|&stride| {
      let grid = AnchorGrid::new(stride, network_width, network_height)?;
      debug!(
        "步长 {}: 网格 {}x{}, 共 {} 个锚点",
        stride,
        grid.width(),
        grid.height(),
        grid.len()
      );
      Ok(grid)
    })
    .collect()
}
