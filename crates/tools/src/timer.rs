use std::collections::VecDeque;
use std::time::Duration;

/// Sliding window over the most recent frame times, for the HUD readout.
#[derive(Debug)]
pub struct FrameTimer {
    window: VecDeque<Duration>,
    limit: usize,
    total: Duration,
}

impl FrameTimer {
    /// Keep the last `limit` frames (at least one).
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            window: VecDeque::with_capacity(limit),
            limit,
            total: Duration::ZERO,
        }
    }

    pub fn record(&mut self, dt: Duration) {
        if self.window.len() == self.limit {
            if let Some(oldest) = self.window.pop_front() {
                self.total -= oldest;
            }
        }
        self.window.push_back(dt);
        self.total += dt;
    }

    /// Mean frame time over the window, zero before the first frame.
    pub fn average(&self) -> Duration {
        match self.window.len() {
            0 => Duration::ZERO,
            n => self.total / n as u32,
        }
    }

    pub fn fps(&self) -> f32 {
        let avg = self.average().as_secs_f32();
        if avg > 0.0 { 1.0 / avg } else { 0.0 }
    }

    /// Frames currently in the window.
    pub fn count(&self) -> usize {
        self.window.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn steady_frames_give_matching_fps() {
        let mut timer = FrameTimer::new(60);
        for _ in 0..30 {
            timer.record(ms(16));
        }
        assert_eq!(timer.count(), 30);
        assert_eq!(timer.average(), ms(16));
        assert!((timer.fps() - 62.5).abs() < 0.01);
    }

    #[test]
    fn slow_frames_age_out_of_window() {
        let mut timer = FrameTimer::new(4);
        timer.record(ms(100));
        for _ in 0..4 {
            timer.record(ms(10));
        }
        assert_eq!(timer.count(), 4);
        assert_eq!(timer.average(), ms(10));
        assert!((timer.fps() - 100.0).abs() < 0.01);
    }

    #[test]
    fn no_frames_reads_zero() {
        let timer = FrameTimer::new(0);
        assert_eq!(timer.count(), 0);
        assert_eq!(timer.average(), Duration::ZERO);
        assert_eq!(timer.fps(), 0.0);
    }

    #[test]
    fn zero_limit_still_keeps_latest_frame() {
        let mut timer = FrameTimer::new(0);
        timer.record(ms(40));
        timer.record(ms(20));
        assert_eq!(timer.count(), 1);
        assert_eq!(timer.average(), ms(20));
    }
}
