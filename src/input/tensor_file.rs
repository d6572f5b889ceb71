// 该文件是 Shanan （山南西风） 项目的一部分。
// src/input/tensor_file.rs - 张量文件输入
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

use std::{
  fs::File,
  io::{BufReader, BufWriter},
  path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::{QuantInfo, RawTensor, TensorData, TensorError, TensorFrame, TensorShape},
};

#[derive(Error, Debug)]
pub enum TensorFileInputError {
  #[error("URI schema mismatch")]
  SchemaMismatch,
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("张量错误: {0}")]
  TensorError(#[from] TensorError),
  #[error("路径解码错误: {0}")]
  PathDecodeError(#[from] std::string::FromUtf8Error),
  #[error("参数 {key} 的值 {value} 无效")]
  InvalidParameter { key: String, value: String },
  #[error("目录 {0} 中没有张量文件")]
  EmptyDirectory(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TensorDataRecord {
  Quantized(Vec<u8>),
  Float(Vec<f32>),
}

fn default_scale() -> f32 {
  1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorRecord {
  #[serde(default)]
  pub name: String,
  /// [height, width, channels]
  pub shape: [usize; 3],
  #[serde(default = "default_scale")]
  pub scale: f32,
  #[serde(default)]
  pub zero_point: f32,
  pub data: TensorDataRecord,
}

/// 单帧张量转储文件的内容
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TensorDump {
  pub tensors: Vec<TensorRecord>,
}

impl TensorDump {
  pub fn into_frame(self) -> Result<TensorFrame, TensorError> {
    let tensors = self
      .tensors
      .into_iter()
      .map(|record| {
        let [height, width, channels] = record.shape;
        let data = match record.data {
          TensorDataRecord::Quantized(data) => TensorData::Quantized(data.into_boxed_slice()),
          TensorDataRecord::Float(data) => TensorData::Float(data.into_boxed_slice()),
        };
        RawTensor::new(
          record.name,
          TensorShape::new(height, width, channels),
          QuantInfo::new(record.scale, record.zero_point),
          data,
        )
      })
      .collect::<Result<Vec<_>, _>>()?;
    Ok(TensorFrame::new(tensors))
  }

  pub fn from_frame(frame: &TensorFrame) -> Self {
    let tensors = frame
      .tensors()
      .iter()
      .map(|tensor| {
        let shape = tensor.shape();
        TensorRecord {
          name: tensor.name().to_string(),
          shape: [shape.height, shape.width, shape.channels],
          scale: tensor.quant().scale,
          zero_point: tensor.quant().zero_point,
          data: match tensor.data() {
            TensorData::Quantized(data) => TensorDataRecord::Quantized(data.to_vec()),
            TensorData::Float(data) => TensorDataRecord::Float(data.to_vec()),
          },
        }
      })
      .collect();
    Self { tensors }
  }
}

/// 读取一个张量转储文件
pub fn load_frame(path: &Path) -> Result<TensorFrame, TensorFileInputError> {
  let reader = BufReader::new(File::open(path)?);
  let dump: TensorDump = serde_json::from_reader(reader)?;
  debug!("读取张量文件 {}: {} 个张量", path.display(), dump.tensors.len());
  Ok(dump.into_frame()?.with_source(path.display().to_string()))
}

/// 将一帧张量写为转储文件
pub fn save_frame(path: &Path, frame: &TensorFrame) -> Result<(), TensorFileInputError> {
  let writer = BufWriter::new(File::create(path)?);
  serde_json::to_writer(writer, &TensorDump::from_frame(frame))?;
  Ok(())
}

/// 从单个 JSON 文件或目录读取张量帧
///
/// `tensor:///path/frame.json`、`tensor:///path/dir?repeat=3`、`tensor:///path/dir?loop`
pub struct TensorFileInput {
  paths: Vec<PathBuf>,
  /// None 表示无限循环
  repeat: Option<usize>,
}

impl FromUrlWithScheme for TensorFileInput {
  const SCHEME: &'static str = "tensor";
}

impl FromUrl for TensorFileInput {
  type Error = TensorFileInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(TensorFileInputError::SchemaMismatch);
    }

    let mut repeat = Some(1);
    for (k, v) in url.query_pairs() {
      match k.as_ref() {
        "repeat" => {
          let n: usize = v
            .parse()
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| TensorFileInputError::InvalidParameter {
              key: k.to_string(),
              value: v.to_string(),
            })?;
          repeat = Some(n);
        }
        "loop" => repeat = None,
        _ => {}
      }
    }

    let path = PathBuf::from(urlencoding::decode(url.path())?.into_owned());
    let input = Self::open(&path)?;
    Ok(Self { repeat, ..input })
  }
}

impl TensorFileInput {
  /// 打开文件或目录；目录中的 `*.json` 按文件名排序
  pub fn open(path: &Path) -> Result<Self, TensorFileInputError> {
    let paths = if path.is_dir() {
      let mut paths = Vec::new();
      for entry in std::fs::read_dir(path)? {
        let entry_path = entry?.path();
        if entry_path.extension().is_some_and(|ext| ext == "json") {
          paths.push(entry_path);
        }
      }
      paths.sort();
      if paths.is_empty() {
        return Err(TensorFileInputError::EmptyDirectory(
          path.display().to_string(),
        ));
      }
      paths
    } else {
      if !path.exists() {
        return Err(std::io::Error::new(
          std::io::ErrorKind::NotFound,
          format!("张量文件不存在: {}", path.display()),
        )
        .into());
      }
      vec![path.to_path_buf()]
    };

    info!("张量输入: {} 个文件", paths.len());
    Ok(Self {
      paths,
      repeat: Some(1),
    })
  }

  pub fn with_repeat(mut self, repeat: Option<usize>) -> Self {
    self.repeat = repeat;
    self
  }

  pub fn paths(&self) -> &[PathBuf] {
    &self.paths
  }

  pub fn into_frames(self) -> TensorFileIter {
    TensorFileIter {
      inner: self,
      index: 0,
      pass: 0,
      failures: 0,
    }
  }
}

pub struct TensorFileIter {
  inner: TensorFileInput,
  index: usize,
  pass: usize,
  failures: usize,
}

impl Iterator for TensorFileIter {
  type Item = TensorFrame;

  fn next(&mut self) -> Option<Self::Item> {
    let paths = &self.inner.paths;
    loop {
      if self.index >= paths.len() {
        self.pass += 1;
        if self.inner.repeat.is_some_and(|r| self.pass >= r) {
          return None;
        }
        self.index = 0;
      }

      let path = &paths[self.index];
      self.index += 1;
      match load_frame(path) {
        Ok(frame) => {
          self.failures = 0;
          return Some(frame);
        }
        Err(e) => {
          error!("读取张量文件 {} 失败: {}", path.display(), e);
          self.failures += 1;
          // 所有文件都无法读取时停止，避免无限循环
          if self.failures >= paths.len() {
            return None;
          }
        }
      }
    }
  }
}
