// 该文件是 Shanan （山南西风） 项目的一部分。
// src/input.rs - 张量帧输入
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

use crate::{FromUrl, frame::TensorFrame};

mod queue;
pub use self::queue::{Backpressure, FrameReceiver, FrameSender, QueueClosed, frame_queue};

#[cfg(feature = "tensor_file_input")]
mod tensor_file;
#[cfg(feature = "tensor_file_input")]
pub use self::tensor_file::{
  TensorDump, TensorFileInput, TensorFileInputError, TensorFileIter, load_frame, save_frame,
};

#[derive(Error, Debug)]
pub enum InputError {
  #[cfg(feature = "tensor_file_input")]
  #[error("张量文件输入错误: {0}")]
  TensorFileInputError(#[from] TensorFileInputError),
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

pub enum InputWrapper {
  #[cfg(feature = "tensor_file_input")]
  TensorFile(TensorFileInput),
}

impl FromUrl for InputWrapper {
  type Error = InputError;

  fn from_url(url: &url::Url) -> Result<Self, Self::Error> {
    #[cfg(feature = "tensor_file_input")]
    {
      use crate::FromUrlWithScheme;

      if url.scheme() == TensorFileInput::SCHEME {
        let input = TensorFileInput::from_url(url)?;
        return Ok(InputWrapper::TensorFile(input));
      }
    }
    let _ = url;
    Err(InputError::SchemeMismatch)
  }
}

impl InputWrapper {
  pub fn into_frames(self) -> InputWrapperIter {
    match self {
      #[cfg(feature = "tensor_file_input")]
      InputWrapper::TensorFile(input) => InputWrapperIter::TensorFile(input.into_frames()),
    }
  }
}

pub enum InputWrapperIter {
  #[cfg(feature = "tensor_file_input")]
  TensorFile(TensorFileIter),
}

impl Iterator for InputWrapperIter {
  type Item = TensorFrame;

  fn next(&mut self) -> Option<Self::Item> {
    match self {
      #[cfg(feature = "tensor_file_input")]
      InputWrapperIter::TensorFile(input) => input.next(),
    }
  }
}
