// 该文件是 Shanan （山南西风） 项目的一部分。
// src/model/skeleton.rs - 关节点与骨架连线过滤
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

use crate::model::{
  JointSegment, Keypoint,
  decode::{Decoding, NUM_KEYPOINTS},
};

/// COCO 关节点顺序，下标即模型输出的关节点编号
pub const KEYPOINT_NAMES: [&str; NUM_KEYPOINTS] = [
  "nose",
  "left_eye",
  "right_eye",
  "left_ear",
  "right_ear",
  "left_shoulder",
  "right_shoulder",
  "left_elbow",
  "right_elbow",
  "left_wrist",
  "right_wrist",
  "left_hip",
  "right_hip",
  "left_knee",
  "right_knee",
  "left_ankle",
  "right_ankle",
];

/// 骨架连线拓扑
pub const JOINT_PAIRS: [(usize, usize); 16] = [
  (0, 1),
  (1, 3),
  (0, 2),
  (2, 4),
  (5, 6),
  (5, 7),
  (7, 9),
  (6, 8),
  (8, 10),
  (5, 11),
  (6, 12),
  (11, 12),
  (11, 13),
  (12, 14),
  (13, 15),
  (14, 16),
];

/// 过滤单个目标的关节点与连线，结果追加到输出列表
///
/// 单个关节点要求分数严格大于阈值，连线要求两端分数均大于等于阈值。
pub fn filter_skeleton(
  keypoints: &[Keypoint; NUM_KEYPOINTS],
  joint_threshold: f32,
  out_keypoints: &mut Vec<Keypoint>,
  out_segments: &mut Vec<JointSegment>,
) {
  out_keypoints.extend(
    keypoints
      .iter()
      .filter(|kp| kp.score > joint_threshold)
      .copied(),
  );

  for &(a, b) in JOINT_PAIRS.iter() {
    let (from, to) = (keypoints[a], keypoints[b]);
    if from.score >= joint_threshold && to.score >= joint_threshold {
      out_segments.push(JointSegment {
        joints: (a, b),
        from,
        to,
      });
    }
  }
}

/// 对 NMS 后的每个目标独立过滤，输出所有目标的关节点与连线
pub fn filter_keypoints<T>(
  decodings: &[Decoding<T>],
  joint_threshold: f32,
) -> (Vec<Keypoint>, Vec<JointSegment>) {
  let mut keypoints = Vec::new();
  let mut segments = Vec::new();
  for decoding in decodings {
    filter_skeleton(
      &decoding.keypoints,
      joint_threshold,
      &mut keypoints,
      &mut segments,
    );
  }
  (keypoints, segments)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::{BBox, Detection, PersonLabel};

  fn decoding(scores: [f32; NUM_KEYPOINTS]) -> Decoding<PersonLabel> {
    let mut keypoints = [Keypoint::default(); NUM_KEYPOINTS];
    for (i, (kp, score)) in keypoints.iter_mut().zip(scores).enumerate() {
      *kp = Keypoint {
        x: i as f32 / 100.0,
        y: 0.5,
        score,
      };
    }
    Decoding {
      detection: Detection {
        kind: PersonLabel,
        score: 0.9,
        bbox: BBox::new(0.0, 0.0, 1.0, 1.0),
      },
      keypoints,
    }
  }

  #[test]
  fn topology_references_valid_joints() {
    for &(a, b) in JOINT_PAIRS.iter() {
      assert!(a < NUM_KEYPOINTS && b < NUM_KEYPOINTS);
      assert_ne!(a, b);
    }
    assert_eq!(KEYPOINT_NAMES[5], "left_shoulder");
    assert_eq!(KEYPOINT_NAMES[12], "right_hip");
  }

  #[test]
  fn pair_needs_both_endpoints_at_threshold() {
    let mut scores = [0.0; NUM_KEYPOINTS];
    // (0, 1): 0.1 与 0.09
    scores[0] = 0.1;
    scores[1] = 0.09;
    let (keypoints, segments) = filter_keypoints(&[decoding(scores)], 0.1);
    assert!(keypoints.is_empty());
    assert!(segments.is_empty());
  }

  #[test]
  fn keypoint_threshold_is_strict_but_pair_threshold_is_not() {
    let mut scores = [0.0; NUM_KEYPOINTS];
    // (5, 6) 两端恰好等于阈值
    scores[5] = 0.1;
    scores[6] = 0.1;
    scores[7] = 0.5;
    let (keypoints, segments) = filter_keypoints(&[decoding(scores)], 0.1);

    // 只有 7 号关节点严格大于阈值
    assert_eq!(keypoints.len(), 1);
    assert_eq!(keypoints[0].score, 0.5);

    let joints: Vec<_> = segments.iter().map(|s| s.joints).collect();
    assert_eq!(joints, vec![(5, 6), (5, 7)]);
    assert_eq!(segments[0].from.score, 0.1);
    assert_eq!(segments[0].to.score, 0.1);
  }

  #[test]
  fn detections_are_filtered_independently() {
    let confident = decoding([0.9; NUM_KEYPOINTS]);
    let weak = decoding([0.05; NUM_KEYPOINTS]);

    let (keypoints, segments) = filter_keypoints(&[weak.clone(), confident, weak], 0.1);
    assert_eq!(keypoints.len(), NUM_KEYPOINTS);
    assert_eq!(segments.len(), JOINT_PAIRS.len());
  }

  #[test]
  fn no_detections_yield_nothing() {
    let (keypoints, segments) = filter_keypoints::<PersonLabel>(&[], 0.1);
    assert!(keypoints.is_empty());
    assert!(segments.is_empty());
  }
}
