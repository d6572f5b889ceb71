// 该文件是 Shanan （山南西风） 项目的一部分。
// src/model/nms.rs - 非极大值抑制
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

use crate::model::{BBox, Detection, WithLabel, decode::Decoding};

/// 可参与 NMS 的检测结果
pub trait Suppressible {
  fn bbox(&self) -> &BBox;
  fn score(&self) -> f32;
  fn class_id(&self) -> u32;
  /// 置信度置 0，标记为已抑制
  fn suppress(&mut self);
}

impl<T: WithLabel> Suppressible for Detection<T> {
  fn bbox(&self) -> &BBox {
    &self.bbox
  }

  fn score(&self) -> f32 {
    self.score
  }

  fn class_id(&self) -> u32 {
    self.kind.to_label_id()
  }

  fn suppress(&mut self) {
    self.score = 0.0;
  }
}

impl<T: WithLabel> Suppressible for Decoding<T> {
  fn bbox(&self) -> &BBox {
    &self.detection.bbox
  }

  fn score(&self) -> f32 {
    self.detection.score
  }

  fn class_id(&self) -> u32 {
    self.detection.kind.to_label_id()
  }

  fn suppress(&mut self) {
    self.detection.suppress();
  }
}

/// 计算两个边界框的 IoU
pub fn iou(a: &BBox, b: &BBox) -> f32 {
  let overlap_w = (a.xmax().min(b.xmax()) - a.xmin.max(b.xmin)).max(0.0);
  let overlap_h = (a.ymax().min(b.ymax()) - a.ymin.max(b.ymin)).max(0.0);
  let overlap = overlap_w * overlap_h;
  let union = a.area() + b.area() - overlap;

  if union > 0.0 { overlap / union } else { 0.0 }
}

/// 贪心 NMS，只做标记：被抑制项的置信度置 0
///
/// 按输入顺序处理（不按置信度排序），相同框时保留序号较小者。
pub fn nms_in_place<D: Suppressible>(items: &mut [D], iou_threshold: f32, cross_class: bool) {
  for i in 0..items.len() {
    if items[i].score() == 0.0 {
      continue;
    }
    let (head, tail) = items.split_at_mut(i + 1);
    let current = &head[i];
    for other in tail.iter_mut() {
      if (cross_class || current.class_id() == other.class_id())
        && other.score() != 0.0
        && iou(current.bbox(), other.bbox()) >= iou_threshold
      {
        other.suppress();
      }
    }
  }
}

/// NMS 后只保留未被抑制的结果，保持原有相对顺序
pub fn nms<D: Suppressible>(mut items: Vec<D>, iou_threshold: f32, cross_class: bool) -> Vec<D> {
  nms_in_place(&mut items, iou_threshold, cross_class);
  items.retain(|item| item.score() != 0.0);
  items
}
