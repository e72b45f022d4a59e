//! Decay
//!
//! Two independent rules, both quantized: at most one step per call no matter
//! how many decay intervals have gone by since the last step.

use crate::core::clock::Millis;
use crate::game::config::CaptureSettings;
use crate::game::state::{HitTracker, Ownership, Team};

/// Decay capture progress while a capture attempt is underway.
///
/// When a step takes progress to zero the attempt is abandoned and
/// `capturing` falls back to `Nobody`.
pub fn decay_capture(ownership: &mut Ownership, capture: &CaptureSettings, now: Millis) {
    let Some(interval) = capture.decay_interval_ms() else {
        return;
    };
    if !ownership.is_capture_active() {
        return;
    }
    if now.saturating_sub(ownership.last_decay_millis) <= interval {
        return;
    }

    let before = ownership.capture_hits;
    ownership.capture_hits = before.saturating_sub(1);
    ownership.last_decay_millis = now;

    if before > 0 && ownership.capture_hits == 0 {
        tracing::debug!("{:?} capture attempt decayed away", ownership.capturing);
        ownership.capturing = Team::Nobody;
    }
}

/// Let an idle side's raw hit count drift back toward zero (TargetTest).
///
/// Both the last hit and the last decay step must be older than the
/// interval.
pub fn decay_hits(tracker: &mut HitTracker, capture: &CaptureSettings, now: Millis) {
    let Some(interval) = capture.decay_interval_ms() else {
        return;
    };
    let idle = now.saturating_sub(tracker.last_hit_millis) > interval;
    let due = now.saturating_sub(tracker.last_decay_millis) > interval;
    if idle && due {
        tracker.hits = tracker.hits.saturating_sub(1);
        tracker.last_decay_millis = now;
    }
}
