//! Pagination bounds derived from a result total.

use serde::{Deserialize, Serialize};

/// First/prev/next/last page bounds for a listing.
///
/// Always recomputed from total, size and the requested page; never stored
/// alongside the result, so the fields cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
  pub total: u64,
  pub size: u32,
  pub current: u32,
  pub first: u32,
  pub prev: u32,
  pub next: u32,
  pub last: u32,
}

impl Pagination {
  pub fn new(total: u64, size: u32, current: u32) -> Self {
    let size = size.max(1);
    let last = if total > 0 {
      ((total + u64::from(size) - 1) / u64::from(size)) as u32
    } else {
      1
    };
    let current = current.clamp(1, last);

    Self {
      total,
      size,
      current,
      first: 1,
      prev: current.saturating_sub(1).max(1),
      next: (current + 1).min(last),
      last,
    }
  }

  /// Zero-based offset of the first item on the current page.
  pub fn offset(&self) -> u64 {
    u64::from(self.current - 1) * u64::from(self.size)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_last_page_formula() {
    // last == max(1, ceil(total/size)) for total > 0, else 1
    for size in 1..=100u32 {
      for total in [0u64, 1, 47, 48, 49, 100, 101, 4800, 4801] {
        let p = Pagination::new(total, size, 1);
        let expected = if total > 0 {
          ((total + u64::from(size) - 1) / u64::from(size)).max(1) as u32
        } else {
          1
        };
        assert_eq!(p.last, expected, "total={} size={}", total, size);
      }
    }
  }

  #[test]
  fn test_current_always_within_bounds() {
    for requested in [0u32, 1, 2, 3, 50, 1000] {
      let p = Pagination::new(100, 48, requested);
      assert!(p.current >= 1 && p.current <= p.last, "requested={}", requested);
    }
  }

  #[test]
  fn test_documented_scenario() {
    // size=48, total=100 -> last=3, prev(1)=1, next(1)=2, next(3)=3
    let p = Pagination::new(100, 48, 1);
    assert_eq!(p.last, 3);
    assert_eq!(p.prev, 1);
    assert_eq!(p.next, 2);

    let p = Pagination::new(100, 48, 3);
    assert_eq!(p.next, 3);
    assert_eq!(p.prev, 2);
  }

  #[test]
  fn test_empty_result_has_single_page() {
    let p = Pagination::new(0, 48, 5);
    assert_eq!(p.current, 1);
    assert_eq!(p.last, 1);
    assert_eq!(p.next, 1);
    assert_eq!(p.prev, 1);
  }

  #[test]
  fn test_offset() {
    assert_eq!(Pagination::new(100, 48, 1).offset(), 0);
    assert_eq!(Pagination::new(100, 48, 2).offset(), 48);
    assert_eq!(Pagination::new(100, 48, 3).offset(), 96);
  }
}
