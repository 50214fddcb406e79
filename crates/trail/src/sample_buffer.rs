use std::collections::VecDeque;

use na::Point2;

pub const DEFAULT_CAPACITY: usize = 20;

/// One recorded pointer position, in normalized device coordinates, with the
/// time (seconds on the app clock) it was captured.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub position: Point2<f32>,
    pub timestamp: f64,
}

/// Bounded, chronologically ordered queue of pointer samples.
///
/// Appending past capacity evicts from the head, so the buffer always holds the
/// most recent `capacity` samples.
#[derive(Clone, Debug)]
pub struct SampleBuffer {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl SampleBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Adds a sample at the tail. Samples with a non-finite timestamp are dropped,
    /// they could never age out of the trail.
    pub fn append(&mut self, position: Point2<f32>, timestamp: f64) {
        if !timestamp.is_finite() {
            log::warn!("dropping pointer sample with timestamp {timestamp}");
            return;
        }

        // keep timestamps non-decreasing even if the caller's clock stutters
        let timestamp = match self.samples.back() {
            Some(last) if timestamp < last.timestamp => {
                log::trace!(
                    "clamping out-of-order sample {timestamp} to {}",
                    last.timestamp
                );
                last.timestamp
            }
            _ => timestamp,
        };

        self.samples.push_back(Sample {
            position,
            timestamp,
        });
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn snapshot(&self) -> impl ExactSizeIterator<Item = &Sample> + DoubleEndedIterator + '_ {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Changes the bound, dropping the oldest samples if the buffer no longer fits.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Removes samples from the head while `expired` holds for them.
    pub(crate) fn evict_front_while(&mut self, mut expired: impl FnMut(&Sample) -> bool) -> usize {
        let mut evicted = 0;
        while self.samples.front().is_some_and(&mut expired) {
            self.samples.pop_front();
            evicted += 1;
        }
        evicted
    }
}
