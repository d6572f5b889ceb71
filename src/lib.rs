// 该文件是 Shanan （山南西风） 项目的一部分。
// src/lib.rs - 姿态后处理库主文件
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

//! YOLOv8 姿态模型的 NPU 输出后处理。
//!
//! 一帧输出张量依次经过反量化、锚点网格、DFL 边界框解码、关节点解码、
//! 分数过滤、贪心 NMS 与骨架过滤，得到 [`model::PoseResult`]。
//! 输入、模型与输出均通过 URL 配置，见 [`FromUrl`]。

pub mod frame;
pub mod input;
pub mod model;
pub mod output;
pub mod task;

/// 从 URL 构造，URL 的查询参数即配置项
pub trait FromUrl {
  type Error;
  fn from_url(url: &url::Url) -> Result<Self, Self::Error>
  where
    Self: Sized;
}

/// 绑定固定 URL 方案的 [`FromUrl`]
pub trait FromUrlWithScheme: FromUrl {
  const SCHEME: &'static str;
}
