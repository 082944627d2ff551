//! Price series and event markers
//!
//! The price series is a fixed-capacity ring: the retained window is what a
//! chart draws, while the session high/low are watermarks over everything
//! observed since the last history reload, so eviction never moves them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One observed price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub value: Decimal,
    pub observed_at: DateTime<Utc>,
}

impl PricePoint {
    pub fn new(value: Decimal, observed_at: DateTime<Utc>) -> Self {
        Self { value, observed_at }
    }
}

/// Bounded, insertion-ordered price history with session watermarks
#[derive(Debug, Clone)]
pub struct PriceSeries {
    points: VecDeque<PricePoint>,
    capacity: usize,
    high: Option<Decimal>,
    low: Option<Decimal>,
    change_pct: Option<Decimal>,
}

impl PriceSeries {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
            high: None,
            low: None,
            change_pct: None,
        }
    }

    /// Record a new price, evicting the oldest point once full.
    pub fn push(&mut self, point: PricePoint) {
        self.change_pct = self.latest().and_then(|prev| {
            if prev.value.is_zero() {
                None
            } else {
                Some((point.value - prev.value) / prev.value * Decimal::ONE_HUNDRED)
            }
        });

        self.high = Some(match self.high {
            Some(high) => high.max(point.value),
            None => point.value,
        });
        self.low = Some(match self.low {
            Some(low) => low.min(point.value),
            None => point.value,
        });

        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    /// Replace the series from a bulk history fetch (oldest first).
    ///
    /// This is the one operation that resets the watermarks: they are
    /// recomputed over the loaded records only.
    pub fn reload<I: IntoIterator<Item = PricePoint>>(&mut self, history: I) {
        self.points.clear();
        self.high = None;
        self.low = None;
        self.change_pct = None;
        for point in history {
            self.push(point);
        }
    }

    /// Most recent point, if any.
    pub fn latest(&self) -> Option<&PricePoint> {
        self.points.back()
    }

    /// Change of the latest point relative to the one before it, percent.
    pub fn change_pct(&self) -> Option<Decimal> {
        self.change_pct
    }

    /// Session high watermark.
    pub fn high(&self) -> Option<Decimal> {
        self.high
    }

    /// Session low watermark.
    pub fn low(&self) -> Option<Decimal> {
        self.low
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Retained points, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &PricePoint> {
        self.points.iter()
    }

    /// Snapshot of the retained window, oldest first.
    pub fn to_vec(&self) -> Vec<PricePoint> {
        self.points.iter().copied().collect()
    }
}

/// Annotation attached to the price timeline (eliminations, system events)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMarker {
    pub observed_at: DateTime<Utc>,
    pub label: String,
}

/// Bounded marker log, oldest evicted first
#[derive(Debug, Clone)]
pub struct MarkerLog {
    markers: VecDeque<EventMarker>,
    capacity: usize,
}

impl MarkerLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            markers: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, marker: EventMarker) {
        if self.markers.len() == self.capacity {
            self.markers.pop_front();
        }
        self.markers.push_back(marker);
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Markers oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &EventMarker> {
        self.markers.iter()
    }

    pub fn to_vec(&self) -> Vec<EventMarker> {
        self.markers.iter().cloned().collect()
    }
}
