// ============================================================
// Layer 6 — State Encoding
// ============================================================
// Model and optimizer records ↔ opaque byte blobs, using Burn's
// named MessagePack recorder at full precision. The blobs are
// what the checkpoint store hashes and writes to disk.
//
// Decoding never panics: malformed bytes are a State error, and
// a blob recorded for another architecture (different depth,
// width or class count) is rejected with a Config error before
// any record is loaded into the model.
//
// Records are backend independent: a model trained on
// Autodiff<NdArray> decodes into a plain NdArray model for
// evaluation.

use burn::{
    module::AutodiffModule,
    optim::Optimizer,
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkBytesRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};

use crate::domain::error::TrainError;
use crate::ml::model::CifarNet;

fn recorder() -> NamedMpkBytesRecorder<FullPrecisionSettings> {
    NamedMpkBytesRecorder::<FullPrecisionSettings>::new()
}

/// Fail unless `recorded` names the same architecture as `model`.
pub fn check_architecture<B: Backend>(model: &CifarNet<B>, recorded: &str) -> Result<(), TrainError> {
    let expected = model.architecture();
    if recorded != expected {
        return Err(TrainError::config(format!(
            "checkpoint was recorded for {recorded}, but the configured network is {expected}; \
             pass the same --arch/--depth/--widen-factor and dataset used for training"
        )));
    }
    Ok(())
}

pub fn encode_model<B: Backend>(model: &CifarNet<B>) -> Result<Vec<u8>, TrainError> {
    Recorder::<B>::record(&recorder(), model.clone().into_record(), ())
        .map_err(|e| TrainError::State(format!("cannot encode model: {e}")))
}

/// Load weights from `bytes` into an already constructed model.
/// `architecture` is the fingerprint stored alongside the bytes.
pub fn decode_model<B: Backend>(
    model: CifarNet<B>,
    architecture: &str,
    bytes: &[u8],
    device: &B::Device,
) -> Result<CifarNet<B>, TrainError> {
    check_architecture(&model, architecture)?;
    let record = Recorder::<B>::load(&recorder(), bytes.to_vec(), device)
        .map_err(|e| TrainError::State(format!("cannot decode model: {e}")))?;
    Ok(model.load_record(record))
}

pub fn encode_optimizer<B, M, O>(optim: &O) -> Result<Vec<u8>, TrainError>
where
    B: AutodiffBackend,
    M: AutodiffModule<B>,
    O: Optimizer<M, B>,
{
    Recorder::<B>::record(&recorder(), optim.to_record(), ())
        .map_err(|e| TrainError::State(format!("cannot encode optimizer: {e}")))
}

pub fn decode_optimizer<B, M, O>(optim: O, bytes: &[u8], device: &B::Device) -> Result<O, TrainError>
where
    B: AutodiffBackend,
    M: AutodiffModule<B>,
    O: Optimizer<M, B>,
{
    let record = Recorder::<B>::load(&recorder(), bytes.to_vec(), device)
        .map_err(|e| TrainError::State(format!("cannot decode optimizer: {e}")))?;
    Ok(optim.load_record(record))
}
