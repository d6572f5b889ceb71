// 该文件是 Shanan （山南西风） 项目的一部分。
// src/model/label.rs - 类别标签
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

use crate::model::WithLabel;

/// COCO 数据集类别名称
pub const COCO_CLASSES: [&str; 80] = [
  "person",
  "bicycle",
  "car",
  "motorcycle",
  "airplane",
  "bus",
  "train",
  "truck",
  "boat",
  "traffic light",
  "fire hydrant",
  "stop sign",
  "parking meter",
  "bench",
  "bird",
  "cat",
  "dog",
  "horse",
  "sheep",
  "cow",
  "elephant",
  "bear",
  "zebra",
  "giraffe",
  "backpack",
  "umbrella",
  "handbag",
  "tie",
  "suitcase",
  "frisbee",
  "skis",
  "snowboard",
  "sports ball",
  "kite",
  "baseball bat",
  "baseball glove",
  "skateboard",
  "surfboard",
  "tennis racket",
  "bottle",
  "wine glass",
  "cup",
  "fork",
  "knife",
  "spoon",
  "bowl",
  "banana",
  "apple",
  "sandwich",
  "orange",
  "broccoli",
  "carrot",
  "hot dog",
  "pizza",
  "donut",
  "cake",
  "chair",
  "couch",
  "potted plant",
  "bed",
  "dining table",
  "toilet",
  "tv",
  "laptop",
  "mouse",
  "remote",
  "keyboard",
  "cell phone",
  "microwave",
  "oven",
  "toaster",
  "sink",
  "refrigerator",
  "book",
  "clock",
  "vase",
  "scissors",
  "teddy bear",
  "hair drier",
  "toothbrush",
];

/// COCO 80 类标签
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CocoLabel(u32);

impl WithLabel for CocoLabel {
  const CLASS_COUNT: usize = COCO_CLASSES.len();

  fn to_label_str(&self) -> String {
    COCO_CLASSES
      .get(self.0 as usize)
      .unwrap_or(&"unknown")
      .to_string()
  }

  fn to_label_id(&self) -> u32 {
    self.0
  }

  fn from_label_id(id: u32) -> Self {
    CocoLabel(id)
  }
}

/// 单类别姿态模型的标签，类别编号恒为 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PersonLabel;

impl WithLabel for PersonLabel {
  const CLASS_COUNT: usize = 1;

  fn to_label_str(&self) -> String {
    COCO_CLASSES[0].to_string()
  }

  fn to_label_id(&self) -> u32 {
    0
  }

  fn from_label_id(_id: u32) -> Self {
    PersonLabel
  }
}
