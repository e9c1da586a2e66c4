use crate::events::Pose;

/// Command sent to the lock actuator when a turn gesture completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockCommand {
    Clockwise,
    CounterClockwise,
}

impl LockCommand {
    /// Wire form, written to the actuator as a single line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clockwise => "1",
            Self::CounterClockwise => "0",
        }
    }
}

/// Rotation magnitude required to complete a turn, relative to the bucket
/// the gesture started in. Compared in f64 so `start * 1.2` sits a hair
/// below the exact product and the integer bucket on the threshold fires.
const TURN_RATIO: f64 = 1.2;

/// The pose that opens a gesture instance.
const TRIGGER_POSE: Pose = Pose::Fist;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Not in the triggering pose (or not evaluating at all).
    Idle,
    /// Fist is held; waiting for the roll bucket to leave the band around
    /// the captured start bucket.
    Tracking { start_bucket: i32 },
    /// A command was emitted for this fist interval; hold until the pose
    /// changes.
    Fired,
}

/// Edge-triggered detector for the fist-and-twist gesture.
///
/// One gesture instance spans a contiguous interval of `Fist` ticks: entry
/// captures the current roll bucket, a sufficient relative rotation fires
/// exactly one command, and leaving the pose re-arms. The whole machine
/// only evaluates while the band reports arm sync, mirroring the firmware's
/// own guard.
///
/// `tick` is a pure decision; the caller performs the actuator write.
#[derive(Debug)]
pub struct GestureLatch {
    arm_synced: bool,
    unlocked: bool,
    phase: Phase,
}

impl Default for GestureLatch {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureLatch {
    pub fn new() -> Self {
        Self {
            arm_synced: false,
            unlocked: false,
            phase: Phase::Idle,
        }
    }

    /// Feed one tick of (pose, roll bucket). Returns a command at most once
    /// per fist interval.
    ///
    /// The completion test is relative to the gesture's own start: clockwise
    /// fires at `start * 1.2`, counter-clockwise at `start / 1.2`. A start
    /// bucket of zero is a dead zone: both scaled thresholds collapse onto
    /// the start bucket itself, so no rotation from there ever reads as a
    /// completed turn. A fist held across the -π/π roll seam also defeats
    /// the comparison (the bucket jumps between the extremes); neither
    /// boundary is corrected here.
    pub fn tick(&mut self, pose: Pose, roll_bucket: i32) -> Option<LockCommand> {
        if !self.arm_synced || pose != TRIGGER_POSE {
            self.phase = Phase::Idle;
            return None;
        }

        if self.phase == Phase::Idle {
            self.phase = Phase::Tracking {
                start_bucket: roll_bucket,
            };
        }

        let Phase::Tracking { start_bucket } = self.phase else {
            // Fired: hold until the pose changes.
            return None;
        };

        if start_bucket == 0 {
            return None;
        }

        let command = if roll_bucket as f64 >= start_bucket as f64 * TURN_RATIO {
            Some(LockCommand::Clockwise)
        } else if roll_bucket as f64 <= start_bucket as f64 / TURN_RATIO {
            Some(LockCommand::CounterClockwise)
        } else {
            None
        };

        if command.is_some() {
            self.phase = Phase::Fired;
        }
        command
    }

    /// The band locked onto an arm; gesture evaluation may begin.
    pub fn on_arm_sync(&mut self) {
        self.arm_synced = true;
    }

    /// The band lost its arm fit. Evaluation stops and any gesture in
    /// progress is abandoned.
    pub fn on_arm_unsync(&mut self) {
        self.arm_synced = false;
        self.phase = Phase::Idle;
    }

    /// The band disconnected entirely. Full reset.
    pub fn on_unpair(&mut self) {
        self.arm_synced = false;
        self.unlocked = false;
        self.phase = Phase::Idle;
    }

    /// The band's own gesture lock released.
    pub fn on_unlock(&mut self) {
        self.unlocked = true;
    }

    /// The band's own gesture lock engaged.
    pub fn on_lock(&mut self) {
        self.unlocked = false;
    }

    pub fn is_arm_synced(&self) -> bool {
        self.arm_synced
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synced_latch() -> GestureLatch {
        let mut latch = GestureLatch::new();
        latch.on_arm_sync();
        latch
    }

    #[test]
    fn idle_without_arm_sync() {
        let mut latch = GestureLatch::new();
        assert_eq!(latch.tick(Pose::Fist, 5), None);
        assert_eq!(latch.tick(Pose::Fist, 17), None);
    }

    #[test]
    fn holding_inside_the_band_never_fires() {
        let mut latch = synced_latch();
        // Start bucket 5: the open band is (5/1.2, 5*1.2) = (4.16, 6.0),
        // so bucket 5 itself is the only integer that never fires.
        for _ in 0..10 {
            assert_eq!(latch.tick(Pose::Fist, 5), None);
        }
    }

    #[test]
    fn clockwise_fires_exactly_once() {
        let mut latch = synced_latch();
        assert_eq!(latch.tick(Pose::Fist, 5), None);
        assert_eq!(latch.tick(Pose::Fist, 7), Some(LockCommand::Clockwise));
        // Held past the threshold: the latch holds.
        assert_eq!(latch.tick(Pose::Fist, 7), None);
        assert_eq!(latch.tick(Pose::Fist, 9), None);
    }

    #[test]
    fn counter_clockwise_fires_exactly_once() {
        let mut latch = synced_latch();
        assert_eq!(latch.tick(Pose::Fist, 5), None);
        assert_eq!(
            latch.tick(Pose::Fist, 4),
            Some(LockCommand::CounterClockwise)
        );
        assert_eq!(latch.tick(Pose::Fist, 2), None);
    }

    #[test]
    fn threshold_is_inclusive() {
        // 5 * 1.2 = 6.0 exactly; bucket 6 completes the turn.
        let mut latch = synced_latch();
        assert_eq!(latch.tick(Pose::Fist, 5), None);
        assert_eq!(latch.tick(Pose::Fist, 6), Some(LockCommand::Clockwise));
    }

    #[test]
    fn leaving_the_pose_rearms_with_a_fresh_start() {
        let mut latch = synced_latch();
        assert_eq!(latch.tick(Pose::Fist, 5), None);
        assert_eq!(latch.tick(Pose::Fist, 7), Some(LockCommand::Clockwise));

        // Relax, then make a new fist at a different angle.
        assert_eq!(latch.tick(Pose::Rest, 7), None);
        assert_eq!(latch.tick(Pose::Fist, 9), None);
        // 9 would have been past the old start's threshold; only the new
        // start matters.
        assert_eq!(latch.tick(Pose::Fist, 10), None);
        assert_eq!(latch.tick(Pose::Fist, 11), Some(LockCommand::Clockwise));
    }

    #[test]
    fn arm_unsync_forces_idle_and_suppresses_emission() {
        let mut latch = synced_latch();
        assert_eq!(latch.tick(Pose::Fist, 5), None);
        latch.on_arm_unsync();
        // Way past the old threshold, but desynced: nothing.
        assert_eq!(latch.tick(Pose::Fist, 12), None);

        // Re-sync: the next fist tick captures a fresh start bucket.
        latch.on_arm_sync();
        assert_eq!(latch.tick(Pose::Fist, 12), None);
        assert_eq!(latch.tick(Pose::Fist, 15), Some(LockCommand::Clockwise));
    }

    #[test]
    fn start_bucket_zero_is_a_dead_zone() {
        let mut latch = synced_latch();
        assert_eq!(latch.tick(Pose::Fist, 0), None);
        // The scaled thresholds never move off zero, so no roll value
        // completes this gesture instance.
        for bucket in [0, 1, 5, 17] {
            assert_eq!(latch.tick(Pose::Fist, bucket), None);
        }
        // A new instance starting off zero behaves normally again.
        assert_eq!(latch.tick(Pose::Rest, 0), None);
        assert_eq!(latch.tick(Pose::Fist, 5), None);
        assert_eq!(latch.tick(Pose::Fist, 7), Some(LockCommand::Clockwise));
    }

    #[test]
    fn unpair_resets_everything() {
        let mut latch = synced_latch();
        latch.on_unlock();
        assert_eq!(latch.tick(Pose::Fist, 5), None);
        latch.on_unpair();
        assert!(!latch.is_arm_synced());
        assert!(!latch.is_unlocked());
        assert_eq!(latch.tick(Pose::Fist, 12), None);
    }

    #[test]
    fn device_lock_events_do_not_rearm_the_latch() {
        let mut latch = synced_latch();
        assert_eq!(latch.tick(Pose::Fist, 5), None);
        assert_eq!(latch.tick(Pose::Fist, 7), Some(LockCommand::Clockwise));

        // An unlock notification mid-fist must not produce a second command.
        latch.on_unlock();
        assert!(latch.is_unlocked());
        assert_eq!(latch.tick(Pose::Fist, 9), None);
    }

    #[test]
    fn end_to_end_turn_sequence() {
        let mut latch = synced_latch();
        let ticks = [
            (Pose::Rest, 5, None),
            (Pose::Fist, 5, None),
            (Pose::Fist, 5, None),
            // 7 >= 5 * 1.2; one clockwise command.
            (Pose::Fist, 7, Some(LockCommand::Clockwise)),
            (Pose::Fist, 7, None),
            (Pose::Rest, 7, None),
        ];
        for (pose, bucket, expected) in ticks {
            assert_eq!(latch.tick(pose, bucket), expected, "pose {:?}", pose);
        }
    }

    #[test]
    fn command_wire_forms() {
        assert_eq!(LockCommand::Clockwise.as_str(), "1");
        assert_eq!(LockCommand::CounterClockwise.as_str(), "0");
    }
}
