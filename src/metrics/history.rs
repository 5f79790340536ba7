use std::collections::VecDeque;
use std::num::NonZeroUsize;

/// Fixed-capacity FIFO of response-time samples (seconds).
///
/// Samples stay in arrival order; sorting only ever happens on a
/// snapshot copy at query time.
#[derive(Debug, Clone)]
pub struct BoundedHistory {
    samples: VecDeque<f64>,
    capacity: NonZeroUsize,
}

impl BoundedHistory {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            // Cap the eager allocation; large capacities grow on demand.
            samples: VecDeque::with_capacity(capacity.get().min(1024)),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest one first when full.
    pub fn push(&mut self, value: f64) {
        if self.samples.len() == self.capacity.get() {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    /// Copy of the current contents, oldest first.
    pub fn snapshot(&self) -> Vec<f64> {
        self.samples.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }
}
