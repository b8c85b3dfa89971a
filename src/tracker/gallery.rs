//! Bounded store of recent appearance embeddings for one track.

use std::collections::VecDeque;

use ndarray::Array1;

/// Fixed-capacity ring of embeddings; the oldest entry is evicted first.
#[derive(Debug, Clone)]
pub struct Gallery {
    samples: VecDeque<Array1<f32>>,
    capacity: usize,
}

impl Gallery {
    /// A capacity of zero is treated as one so a track always keeps its latest look.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, embedding: Array1<f32>) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(embedding);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Array1<f32>> {
        self.samples.iter()
    }

    /// Smallest cosine distance `1 - a.b` between `embedding` and any stored sample.
    /// Inputs are assumed unit-normalized. `None` when the gallery is empty.
    pub fn min_cosine_distance(&self, embedding: &Array1<f32>) -> Option<f32> {
        self.samples
            .iter()
            .map(|sample| 1.0 - sample.dot(embedding))
            .min_by(f32::total_cmp)
    }
}
