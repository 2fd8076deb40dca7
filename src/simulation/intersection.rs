//! Intersection control for the traffic simulation
//!
//! Every side of a controlled intersection behaves like a stop sign. Vehicles
//! queue per approach direction, wait out a dwell time, and are released one
//! at a time in clockwise rotation.

use log::{debug, warn};
use std::collections::VecDeque;

use super::types::{Direction, VehicleId};
use super::vehicle::Vehicle;

/// Stop-sign scheduler for one intersection tile
#[derive(Debug, Clone)]
pub struct Intersection {
    /// Waiting vehicles per approach direction, indexed by `Direction::index`
    queues: [VecDeque<VehicleId>; 4],
    /// Remaining dwell time of each queue's head vehicle
    wait_timers: [f32; 4],
    last_dequeue_dir: Direction,
    /// Time left for the last released vehicle to clear the intersection
    clear_timer: f32,
    stop_wait_time: f32,
    clear_time: f32,
}

impl Intersection {
    pub fn new(stop_wait_time: f32, clear_time: f32) -> Self {
        Self {
            queues: Default::default(),
            wait_timers: [0.0; 4],
            // so Up is served first
            last_dequeue_dir: Direction::Left,
            clear_timer: 0.0,
            stop_wait_time,
            clear_time,
        }
    }

    /// Queue a vehicle that arrived from side `dir` and hold it in place.
    ///
    /// A vehicle arriving at an empty queue starts its dwell clock at once.
    pub fn enqueue(&mut self, vehicle: &mut Vehicle, dir: Direction) {
        let queue = &mut self.queues[dir.index()];
        if queue.is_empty() {
            self.wait_timers[dir.index()] = self.stop_wait_time;
        }
        queue.push_back(vehicle.id);
        vehicle.set_waiting(true);
    }

    /// Advance timers and release at most one vehicle.
    ///
    /// `vehicles` is indexed by vehicle id. Returns the released vehicle.
    pub fn step(&mut self, tick: f32, vehicles: &mut [Vehicle]) -> Option<VehicleId> {
        for timer in &mut self.wait_timers {
            *timer = (*timer - tick).max(0.0);
        }

        self.clear_timer = (self.clear_timer - tick).max(0.0);
        if self.clear_timer > 0.0 {
            return None;
        }

        let mut dir = self.last_dequeue_dir;
        for _ in 0..Direction::ALL.len() {
            dir = dir.clockwise();
            let i = dir.index();
            if self.wait_timers[i] > 0.0 || self.queues[i].is_empty() {
                continue;
            }

            let released = self.dequeue(dir, vehicles);
            self.last_dequeue_dir = dir;
            self.clear_timer = self.clear_time;
            return released;
        }

        None
    }

    fn dequeue(&mut self, dir: Direction, vehicles: &mut [Vehicle]) -> Option<VehicleId> {
        let i = dir.index();
        let vehicle_id = self.queues[i].pop_front()?;
        match vehicles.get_mut(vehicle_id.0) {
            Some(vehicle) => vehicle.set_waiting(false),
            None => warn!("Released unknown vehicle {}", vehicle_id),
        }

        // the next vehicle in line has to stop too
        if !self.queues[i].is_empty() {
            self.wait_timers[i] = self.stop_wait_time;
        }

        debug!("Released vehicle {} from {:?} queue", vehicle_id, dir);
        Some(vehicle_id)
    }

    /// Queue lengths in `Direction::ALL` order
    pub fn queue_lengths(&self) -> [usize; 4] {
        [
            self.queues[0].len(),
            self.queues[1].len(),
            self.queues[2].len(),
            self.queues[3].len(),
        ]
    }

    pub fn queue(&self, dir: Direction) -> &VecDeque<VehicleId> {
        &self.queues[dir.index()]
    }

    pub fn wait_timers(&self) -> [f32; 4] {
        self.wait_timers
    }

    pub fn last_dequeue_dir(&self) -> Direction {
        self.last_dequeue_dir
    }

    pub fn clear_timer(&self) -> f32 {
        self.clear_timer
    }

    /// No queued vehicles and no running timers
    pub fn is_idle(&self) -> bool {
        self.queues.iter().all(VecDeque::is_empty)
            && self.wait_timers.iter().all(|t| *t == 0.0)
            && self.clear_timer == 0.0
    }
}
