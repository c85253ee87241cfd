// ============================================================
// Layer 4 — CIFAR Binary Reader
// ============================================================
// Reads the "binary version" archives of CIFAR-10 and CIFAR-100.
//
// Record layout (fixed size, no header):
//
//   CIFAR-10   [label:1][pixels:3072]
//   CIFAR-100  [coarse:1][fine:1][pixels:3072]
//
// Pixels are stored as three 32×32 planes (R, G, B), row major.
// For CIFAR-100 only the fine label (100 classes) is kept.
//
// File names inside the extracted directory:
//
//   CIFAR-10   data_batch_1.bin … data_batch_5.bin, test_batch.bin
//   CIFAR-100  train.bin, test.bin

use std::{fmt, fs, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::error::TrainError;

pub const IMAGE_SIDE: usize = 32;
pub const CHANNELS: usize = 3;
pub const IMAGE_BYTES: usize = CHANNELS * IMAGE_SIDE * IMAGE_SIDE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    Cifar10,
    Cifar100,
}

impl DatasetKind {
    pub fn num_classes(self) -> usize {
        match self {
            Self::Cifar10 => 10,
            Self::Cifar100 => 100,
        }
    }

    /// Directory the binary archive extracts to, under `data/`.
    pub fn default_data_dir(self) -> &'static str {
        match self {
            Self::Cifar10 => "data/cifar-10-batches-bin",
            Self::Cifar100 => "data/cifar-100-binary",
        }
    }

    /// Label bytes preceding the pixels of every record.
    fn label_bytes(self) -> usize {
        match self {
            Self::Cifar10 => 1,
            Self::Cifar100 => 2,
        }
    }

    fn record_len(self) -> usize {
        self.label_bytes() + IMAGE_BYTES
    }

    fn files(self, split: Split) -> Vec<String> {
        match (self, split) {
            (Self::Cifar10, Split::Train) => (1..=5).map(|i| format!("data_batch_{i}.bin")).collect(),
            (Self::Cifar10, Split::Test) => vec!["test_batch.bin".into()],
            (Self::Cifar100, Split::Train) => vec!["train.bin".into()],
            (Self::Cifar100, Split::Test) => vec!["test.bin".into()],
        }
    }
}

impl FromStr for DatasetKind {
    type Err = TrainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cifar10" => Ok(Self::Cifar10),
            "cifar100" => Ok(Self::Cifar100),
            other => Err(TrainError::config(format!(
                "dataset can only be cifar10 or cifar100, got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cifar10 => f.write_str("cifar10"),
            Self::Cifar100 => f.write_str("cifar100"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Test,
}

/// One labelled image, pixels in CHW byte order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CifarImage {
    pub pixels: Vec<u8>,
    pub label: usize,
}

/// Decode every record in one archive file.
pub fn parse_records(bytes: &[u8], kind: DatasetKind, path: &Path) -> Result<Vec<CifarImage>, TrainError> {
    let record_len = kind.record_len();
    if bytes.len() % record_len != 0 {
        return Err(TrainError::Dataset {
            path: path.to_path_buf(),
            reason: format!(
                "size {} is not a multiple of the {record_len}-byte record length",
                bytes.len()
            ),
        });
    }

    let label_at = kind.label_bytes() - 1;
    bytes
        .chunks_exact(record_len)
        .enumerate()
        .map(|(i, record)| {
            let label = record[label_at] as usize;
            if label >= kind.num_classes() {
                return Err(TrainError::Dataset {
                    path: path.to_path_buf(),
                    reason: format!("record {i} has label {label} outside 0..{}", kind.num_classes()),
                });
            }
            Ok(CifarImage { pixels: record[kind.label_bytes()..].to_vec(), label })
        })
        .collect()
}

/// Load the full train or test split from an extracted archive directory.
pub fn load_split(dir: &Path, kind: DatasetKind, split: Split) -> Result<Vec<CifarImage>, TrainError> {
    let mut images = Vec::new();
    for name in kind.files(split) {
        let path = dir.join(name);
        let bytes = fs::read(&path).map_err(|e| TrainError::io(&path, e))?;
        images.extend(parse_records(&bytes, kind, &path)?);
    }
    tracing::info!("Loaded {} {:?} images of {} from '{}'", images.len(), split, kind, dir.display());
    Ok(images)
}

/// Writes tiny CIFAR-10 archives for workflow tests: `per_file`
/// records in each of the five training files and `test_count`
/// in the test file. Pixels depend on the label so the classes
/// are separable.
#[cfg(test)]
pub(crate) fn write_synthetic_cifar10(dir: &Path, per_file: usize, test_count: usize) {
    let records = |count: usize, offset: usize| -> Vec<u8> {
        (0..count)
            .flat_map(|i| {
                let label = ((i + offset) % 10) as u8;
                let mut bytes = vec![label];
                bytes.extend(std::iter::repeat(label * 25 + (i % 3) as u8).take(IMAGE_BYTES));
                bytes
            })
            .collect()
    };
    fs::create_dir_all(dir).unwrap();
    for (n, name) in DatasetKind::Cifar10.files(Split::Train).iter().enumerate() {
        fs::write(dir.join(name), records(per_file, n * per_file)).unwrap();
    }
    for name in DatasetKind::Cifar10.files(Split::Test) {
        fs::write(dir.join(name), records(test_count, 0)).unwrap();
    }
}
