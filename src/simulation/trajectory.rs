//! Linear motion primitive used by vehicles

use super::types::Point;

/// Moves a point along a straight line toward a fixed target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTrajectory {
    current: Point,
    target: Point,
}

impl LinearTrajectory {
    pub fn new(start: Point, target: Point) -> Self {
        Self {
            current: start,
            target,
        }
    }

    pub fn current(&self) -> Point {
        self.current
    }

    pub fn target(&self) -> Point {
        self.target
    }

    pub fn remaining(&self) -> f32 {
        self.current.distance(&self.target)
    }

    pub fn is_finished(&self) -> bool {
        self.current == self.target
    }

    /// Move up to `max_dist` toward the target.
    ///
    /// If the target is within reach the point lands exactly on it. Returns the
    /// new point and the distance actually travelled.
    pub fn advance(&mut self, max_dist: f32) -> (Point, f32) {
        let remaining = self.remaining();
        if max_dist >= remaining {
            self.current = self.target;
            return (self.current, remaining);
        }

        let t = max_dist / remaining;
        self.current = self.current.lerp(&self.target, t);
        (self.current, max_dist)
    }
}
