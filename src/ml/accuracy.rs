// ============================================================
// Layer 6 — Top-k Accuracy
// ============================================================
// A label is "within top-k" when fewer than k classes score
// strictly higher than it. Ties count in the label's favour.
//
// NaN ranks above every number, as in torch.topk: a NaN in
// another class outranks the label, and a NaN label score is
// never a hit. Diverged logits therefore score 0%, not 100%.
//
// Counting happens on the host after one device→host copy of
// the logits; batches are at most a few hundred rows.

use burn::prelude::*;

/// Correct predictions in one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopKHits {
    pub top1: usize,
    pub top5: usize,
}

/// Number of classes scoring strictly above `label` in `row`.
pub fn label_rank(row: &[f32], label: usize) -> usize {
    let target = row[label];
    if target.is_nan() {
        return row.len();
    }
    row.iter().filter(|&&s| s.is_nan() || s > target).count()
}

/// Count top-1 and top-5 hits over a row-major `[n, num_classes]` score slice.
pub fn top_k_hits(scores: &[f32], num_classes: usize, labels: &[usize]) -> TopKHits {
    let mut hits = TopKHits::default();
    for (row, &label) in scores.chunks_exact(num_classes).zip(labels) {
        let rank = label_rank(row, label);
        if rank < 1 {
            hits.top1 += 1;
        }
        if rank < 5 {
            hits.top5 += 1;
        }
    }
    hits
}

/// Tensor front-end: logits `[n, classes]`, targets `[n]`.
pub fn batch_hits<B: Backend>(logits: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> TopKHits {
    let [_, num_classes] = logits.dims();
    let scores: Vec<f32> = logits.into_data().iter::<f32>().collect();
    let labels: Vec<usize> = targets.into_data().iter::<i64>().map(|l| l as usize).collect();
    top_k_hits(&scores, num_classes, &labels)
}

/// Hits as percentages of `n`.
pub fn percentages(hits: TopKHits, n: usize) -> (f64, f64) {
    if n == 0 {
        return (0.0, 0.0);
    }
    let n = n as f64;
    (100.0 * hits.top1 as f64 / n, 100.0 * hits.top5 as f64 / n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn label_ranked_first_hits_both() {
        // ranking 3 > 1 > 0 > 2 > 4 > …
        let row = [0.7, 0.8, 0.6, 0.9, 0.5, 0.1, 0.0, -0.1, -0.2, -0.3];
        let hits = top_k_hits(&row, 10, &[3]);
        assert_eq!(hits, TopKHits { top1: 1, top5: 1 });
        assert_eq!(percentages(hits, 1), (100.0, 100.0));
    }

    #[test]
    fn nan_logits_are_misses() {
        let hits = top_k_hits(&[f32::NAN; 10], 10, &[3]);
        assert_eq!(hits, TopKHits { top1: 0, top5: 0 });
        assert_eq!(percentages(hits, 1), (0.0, 0.0));
    }

    #[test]
    fn nan_in_other_class_outranks_label() {
        let mut row = [0.0f32; 10];
        row[2] = 5.0;
        row[7] = f32::NAN;
        assert_eq!(label_rank(&row, 2), 1);
        assert_eq!(top_k_hits(&row, 10, &[2]), TopKHits { top1: 0, top5: 1 });
    }

    #[test]
    fn label_ranked_sixth_misses_both() {
        let row = [0.9, 0.8, 0.7, 0.6, 0.5, 0.4, 0.3, 0.2, 0.1, 0.0];
        let hits = top_k_hits(&row, 10, &[5]);
        assert_eq!(hits, TopKHits { top1: 0, top5: 0 });
    }

    #[test]
    fn label_ranked_third_is_top5_only() {
        let row = [0.1, 0.9, 0.8, 0.7, 0.0];
        assert_eq!(top_k_hits(&row, 5, &[3]), TopKHits { top1: 0, top5: 1 });
    }

    #[test]
    fn ties_favour_the_label() {
        let row = [0.5, 0.5, 0.1];
        assert_eq!(top_k_hits(&row, 3, &[1]).top1, 1);
    }

    #[test]
    fn tensor_front_end_matches_slice_version() {
        let device = Default::default();
        let logits = Tensor::<NdArray, 2>::from_data(
            TensorData::new(vec![0.1f32, 0.9, 0.0, 0.8, 0.1, 0.1], [2, 3]),
            &device,
        );
        let targets = Tensor::<NdArray, 1, Int>::from_data(TensorData::new(vec![1i64, 2], [2]), &device);
        let hits = batch_hits(logits, targets);
        assert_eq!(hits.top1, 1);
        assert_eq!(hits.top5, 2);
        assert_eq!(percentages(TopKHits::default(), 0), (0.0, 0.0));
    }
}
