use glam::Quat;

/// Which arm the band reported syncing onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arm {
    Left,
    Right,
    Unknown,
}

impl Arm {
    /// Map the hub's wire code to an arm.
    pub fn from_wire(code: u8) -> Self {
        match code {
            0x01 => Self::Left,
            0x02 => Self::Right,
            _ => Self::Unknown,
        }
    }
}

/// Discrete hand-shape label from the armband's onboard classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pose {
    #[default]
    Unknown,
    Rest,
    Fist,
    WaveIn,
    WaveOut,
    FingersSpread,
    DoubleTap,
}

impl Pose {
    /// Map the hub's wire code to a pose. Unrecognized codes collapse to
    /// `Unknown`, matching the classifier's own fallback label.
    pub fn from_wire(code: u8) -> Self {
        match code {
            0x00 => Self::Rest,
            0x01 => Self::Fist,
            0x02 => Self::WaveIn,
            0x03 => Self::WaveOut,
            0x04 => Self::FingersSpread,
            0x05 => Self::DoubleTap,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Rest => "rest",
            Self::Fist => "fist",
            Self::WaveIn => "wave-in",
            Self::WaveOut => "wave-out",
            Self::FingersSpread => "fingers-spread",
            Self::DoubleTap => "double-tap",
        }
    }

    /// Whether the classifier produced a deliberate hand shape. Actionable
    /// poses keep the band unlocked; rest hands it back to the timed lock.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Self::Rest | Self::Unknown)
    }
}

/// Events delivered by the armband hub, normalized into one tagged stream
/// so the gesture core never sees an SDK callback interface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArmbandEvent {
    /// New orientation sample (unit quaternion).
    Orientation(Quat),
    /// The pose classifier changed its label.
    Pose(Pose),
    /// The band locked onto an arm.
    ArmSync(Arm),
    /// The band lost its arm fit.
    ArmUnsync,
    /// The band disconnected entirely.
    Unpair,
    /// The band's own gesture lock released.
    Unlocked,
    /// The band's own gesture lock engaged.
    Locked,
}
