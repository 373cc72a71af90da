use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use utoipa::ToSchema;

use super::projection::ScenePosition;

pub const DEFAULT_TRAIL_CAPACITY: usize = 600;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TrailPolicy {
    #[default]
    Cap,
    Wrap,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrailConfig {
    pub capacity: usize,
    pub policy: TrailPolicy,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_TRAIL_CAPACITY,
            policy: TrailPolicy::Cap,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrailBuffer {
    capacity: usize,
    policy: TrailPolicy,
    samples: VecDeque<ScenePosition>,
}

impl TrailBuffer {
    pub fn new(config: &TrailConfig) -> Self {
        Self::with_capacity(config.capacity, config.policy)
    }

    pub fn with_capacity(capacity: usize, policy: TrailPolicy) -> Self {
        Self {
            capacity,
            policy,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[cfg(test)]
    pub fn policy(&self) -> TrailPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() >= self.capacity
    }

    /// Returns false if the sample was not stored.
    pub fn push(&mut self, position: ScenePosition) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.is_full() {
            match self.policy {
                TrailPolicy::Cap => return false,
                TrailPolicy::Wrap => {
                    self.samples.pop_front();
                }
            }
        }
        self.samples.push_back(position);
        true
    }

    #[cfg(test)]
    pub fn last(&self) -> Option<&ScenePosition> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScenePosition> {
        self.samples.iter()
    }

    pub fn valid_samples(&mut self) -> &[ScenePosition] {
        self.samples.make_contiguous()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(i: usize) -> ScenePosition {
        ScenePosition::new(i as f64, 1.0, -(i as f64))
    }

    #[test]
    fn test_cap_policy_saturates() {
        let mut trail = TrailBuffer::with_capacity(600, TrailPolicy::Cap);
        for i in 0..600 {
            assert!(trail.push(sample(i)));
        }
        assert!(trail.is_full());
        assert!(!trail.push(sample(600)));

        assert_eq!(trail.len(), 600);
        assert_eq!(trail.last(), Some(&sample(599)));
        assert_eq!(trail.valid_samples()[0], sample(0));
    }

    #[test]
    fn test_wrap_policy_drops_oldest() {
        let mut trail = TrailBuffer::with_capacity(3, TrailPolicy::Wrap);
        for i in 0..5 {
            assert!(trail.push(sample(i)));
        }
        assert_eq!(trail.len(), 3);
        assert_eq!(trail.valid_samples(), &[sample(2), sample(3), sample(4)]);
    }

    #[test]
    fn test_zero_capacity() {
        let mut trail = TrailBuffer::with_capacity(0, TrailPolicy::Wrap);
        assert!(!trail.push(sample(0)));
        assert!(trail.is_empty());
    }

    #[test]
    fn test_from_config() {
        let trail = TrailBuffer::new(&TrailConfig::default());
        assert_eq!(trail.capacity(), DEFAULT_TRAIL_CAPACITY);
        assert_eq!(trail.policy(), TrailPolicy::Cap);
        assert!(trail.is_empty());
    }
}
