use crate::sample_buffer::SampleBuffer;

pub const DEFAULT_MAX_AGE: f64 = 0.1;

/// Trail positions packed as `x, y` pairs in chronological order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlattenedTrail {
    pub positions: Vec<f32>,
    pub count: usize,
}

impl FlattenedTrail {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.count = 0;
    }

    /// Packs two positions per slot (`x0, y0, x1, y1`) so the array satisfies
    /// uniform-buffer array stride rules. Unused slots are zeroed. When the trail
    /// doesn't fit, the oldest positions are dropped so the newest always reach the
    /// shader. Returns how many positions were written.
    pub fn pack_vec4(&self, slots: &mut [[f32; 4]]) -> usize {
        slots.fill([0.0; 4]);
        let written = self.count.min(slots.len() * 2);
        let skipped = self.count - written;
        let newest = &self.positions[skipped * 2..self.count * 2];
        for (i, pair) in newest.chunks_exact(2).enumerate() {
            let lane = (i % 2) * 2;
            slots[i / 2][lane] = pair[0];
            slots[i / 2][lane + 1] = pair[1];
        }
        written
    }
}

/// Age-based view over a [`SampleBuffer`].
///
/// This bound is independent from the buffer's capacity: the capacity is a hard
/// ceiling on how many samples exist, the age decides which of them are still
/// part of the trail.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailWindow {
    max_age: f64,
}

impl Default for TrailWindow {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_AGE)
    }
}

impl TrailWindow {
    pub fn new(max_age: f64) -> Self {
        Self { max_age }
    }

    pub fn max_age(&self) -> f64 {
        self.max_age
    }

    pub fn set_max_age(&mut self, max_age: f64) {
        self.max_age = max_age;
    }

    /// Drops every sample whose age at `now` is at least `max_age`. Returns the
    /// number of samples removed.
    pub fn prune(&self, buffer: &mut SampleBuffer, now: f64) -> usize {
        // timestamps are non-decreasing, so expired samples are always a prefix
        buffer.evict_front_while(|sample| now - sample.timestamp >= self.max_age)
    }

    pub fn flatten(&self, buffer: &SampleBuffer) -> FlattenedTrail {
        let mut trail = FlattenedTrail::default();
        self.flatten_into(buffer, &mut trail);
        trail
    }

    /// Like [`TrailWindow::flatten`], reusing the storage of `out`.
    pub fn flatten_into(&self, buffer: &SampleBuffer, out: &mut FlattenedTrail) {
        out.clear();
        out.positions.reserve(buffer.len() * 2);
        for sample in buffer.snapshot() {
            out.positions.push(sample.position.x);
            out.positions.push(sample.position.y);
        }
        out.count = buffer.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use na::Point2;

    fn buffer_with(times: &[f64]) -> SampleBuffer {
        let mut buffer = SampleBuffer::new(times.len().max(1));
        for (i, t) in times.iter().enumerate() {
            buffer.append(Point2::new(i as f32 * 0.25, -(i as f32) * 0.25), *t);
        }
        buffer
    }

    #[test]
    fn prunes_by_age_and_keeps_survivor() {
        let window = TrailWindow::new(0.1);
        let mut buffer = SampleBuffer::new(20);
        buffer.append(Point2::new(-0.3, 0.2), 4.85);
        buffer.append(Point2::new(0.4, -0.6), 4.95);

        assert_eq!(window.prune(&mut buffer, 5.0), 1);
        let trail = window.flatten(&buffer);
        assert_eq!(trail.count, 1);
        assert_eq!(trail.positions, vec![0.4, -0.6]);
    }

    #[test]
    fn age_equal_to_max_is_evicted() {
        let window = TrailWindow::new(0.5);
        let mut buffer = buffer_with(&[1.0, 1.25, 1.5]);
        window.prune(&mut buffer, 1.5);
        let times: Vec<f64> = buffer.snapshot().map(|s| s.timestamp).collect();
        assert_eq!(times, vec![1.25, 1.5]);
    }

    #[test]
    fn prune_is_idempotent() {
        let window = TrailWindow::new(0.1);
        let mut buffer = buffer_with(&[0.0, 0.05, 0.12, 0.15, 0.2]);
        let first = window.prune(&mut buffer, 0.2);
        let once: Vec<_> = buffer.snapshot().copied().collect();
        let second = window.prune(&mut buffer, 0.2);
        let twice: Vec<_> = buffer.snapshot().copied().collect();
        assert_eq!(first, 2);
        assert_eq!(second, 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn prune_preserves_order() {
        let window = TrailWindow::new(1.0);
        let mut buffer = buffer_with(&[0.0, 0.5, 1.2, 1.4, 1.9]);
        window.prune(&mut buffer, 2.0);
        let xs: Vec<f32> = buffer.snapshot().map(|s| s.position.x).collect();
        assert_eq!(xs, vec![0.5, 0.75, 1.0]);
    }

    #[test]
    fn everything_expired_leaves_empty_trail() {
        let window = TrailWindow::default();
        let mut buffer = buffer_with(&[0.0, 0.01]);
        window.prune(&mut buffer, 10.0);
        let trail = window.flatten(&buffer);
        assert!(trail.is_empty());
        assert!(trail.positions.is_empty());
    }

    #[test]
    fn flatten_length_tracks_count() {
        let window = TrailWindow::new(f64::INFINITY);
        let mut buffer = SampleBuffer::new(6);
        let mut trail = FlattenedTrail::default();
        for t in 0..10 {
            buffer.append(Point2::new(t as f32, 0.0), t as f64);
            window.flatten_into(&buffer, &mut trail);
            assert_eq!(trail.positions.len(), 2 * trail.count);
            assert!(trail.count <= buffer.capacity());
        }
        assert_eq!(trail.positions[0], 4.0);
    }

    #[test]
    fn packs_pairs_into_vec4_slots() {
        let trail = FlattenedTrail {
            positions: vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            count: 3,
        };
        let mut slots = [[9.0; 4]; 3];
        assert_eq!(trail.pack_vec4(&mut slots), 3);
        assert_eq!(
            slots,
            [[1.0, 2.0, 3.0, 4.0], [5.0, 6.0, 0.0, 0.0], [0.0; 4]]
        );
    }

    #[test]
    fn packing_keeps_newest_when_slots_run_out() {
        let trail = FlattenedTrail {
            positions: (0..10).map(|v| v as f32).collect(),
            count: 5,
        };
        let mut slots = [[0.0; 4]; 1];
        assert_eq!(trail.pack_vec4(&mut slots), 2);
        assert_eq!(slots, [[6.0, 7.0, 8.0, 9.0]]);
    }

    #[test]
    fn oversized_trail_still_packs_latest_sample_last() {
        let window = TrailWindow::new(f64::INFINITY);
        let mut buffer = SampleBuffer::new(25);
        for i in 0..25 {
            buffer.append(Point2::new(i as f32 / 100.0, 0.0), i as f64);
        }
        let trail = window.flatten(&buffer);
        let mut slots = [[0.0; 4]; 10];
        assert_eq!(trail.pack_vec4(&mut slots), 20);
        assert_eq!(slots[0][0], 0.05);
        assert_eq!(slots[9], [0.23, 0.0, 0.24, 0.0]);
    }
}
