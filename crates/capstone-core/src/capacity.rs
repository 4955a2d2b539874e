//! Seat arithmetic for a topic.
//!
//! An [`Occupancy`] is always read fresh from the store at decision time and
//! must not be cached across calls.

use serde::{Deserialize, Serialize};

/// Approved seats against capacity, as read at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupancy {
  pub approved:     u32,
  pub max_students: u32,
}

impl Occupancy {
  pub fn new(approved: u32, max_students: u32) -> Self { Self { approved, max_students } }

  pub fn seats_left(&self) -> u32 { self.max_students.saturating_sub(self.approved) }

  /// `max_students - approved == n`.
  pub fn has_exactly_n_seats_left(&self, n: u32) -> bool {
    i64::from(self.max_students) - i64::from(self.approved) == i64::from(n)
  }

  pub fn is_full(&self) -> bool { self.approved >= self.max_students }

  /// The occupancy after one more seat is taken.
  pub fn admit(self) -> Self { Self { approved: self.approved + 1, ..self } }

  /// The occupancy after one seat is given back.
  pub fn release(self) -> Self {
    Self { approved: self.approved.saturating_sub(1), ..self }
  }
}
