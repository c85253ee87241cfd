// Classifier head access for post-hoc weight rescaling.
//
// Burn's Linear stores its weight as [d_in, d_out], i.e. one
// column per class. WeightMatrix wants one row per class, so
// both directions go through a transpose.

use burn::{module::Param, prelude::*};

use crate::domain::{error::TrainError, weights::WeightMatrix};
use crate::ml::model::CifarNet;

/// Copy the `fc` weights out as a [classes, features] matrix.
pub fn read_classifier<B: Backend>(model: &CifarNet<B>) -> Result<WeightMatrix, TrainError> {
    let weight = model.fc.weight.val();
    let [features, classes] = weight.dims();
    let data: Vec<f32> = weight.transpose().into_data().iter::<f32>().collect();
    WeightMatrix::from_rows(classes, features, data)
}

/// Return `model` with its `fc` weights replaced; the bias is kept.
pub fn write_classifier<B: Backend>(
    mut model: CifarNet<B>,
    weights: &WeightMatrix,
) -> Result<CifarNet<B>, TrainError> {
    let current = model.fc.weight.val();
    let [features, classes] = current.dims();
    if weights.rows() != classes || weights.cols() != features {
        return Err(TrainError::Shape {
            expected: format!("{classes}x{features} classifier"),
            found: format!("{}x{}", weights.rows(), weights.cols()),
        });
    }

    let device = current.device();
    let tensor = Tensor::<B, 2>::from_data(
        TensorData::new(weights.as_slice().to_vec(), [classes, features]),
        &device,
    )
    .transpose();
    model.fc.weight = Param::from_tensor(tensor);
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    use crate::domain::frequency::ClassFrequencyProfile;
    use crate::ml::model::NetworkConfig;
    use crate::training::rescale::rescale;

    #[test]
    fn rows_are_class_weight_vectors() {
        let device = <NdArray as Backend>::Device::default();
        let model: CifarNet<NdArray> = NetworkConfig::new(10, 1).init(&device);
        let w = read_classifier(&model).unwrap();
        assert_eq!((w.rows(), w.cols()), (10, 64));

        let raw: Vec<f32> = model.fc.weight.val().into_data().iter::<f32>().collect();
        // raw is [features, classes]: element (f, c) at f * 10 + c
        assert_eq!(w.row(3)[7], raw[7 * 10 + 3]);
    }

    #[test]
    fn rescaled_head_changes_logits_not_shape() {
        let device = <NdArray as Backend>::Device::default();
        let model: CifarNet<NdArray> = NetworkConfig::new(10, 1).init(&device);
        let before = read_classifier(&model).unwrap();
        let profile = ClassFrequencyProfile::exponential(50_000.0, 10, 100.0).unwrap();
        let scaled = rescale(&before, &profile, 1.0).unwrap();

        let model = write_classifier(model, &scaled).unwrap();
        let after = read_classifier(&model).unwrap();
        assert_eq!(after, scaled);
        assert_eq!(after.row(0), before.row(0));
    }

    #[test]
    fn wrong_shape_is_rejected() {
        let device = <NdArray as Backend>::Device::default();
        let model: CifarNet<NdArray> = NetworkConfig::new(10, 1).init(&device);
        let wrong = WeightMatrix::from_rows(9, 64, vec![0.0; 9 * 64]).unwrap();
        assert!(matches!(write_classifier(model, &wrong), Err(TrainError::Shape { .. })));
    }
}
