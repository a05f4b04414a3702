use std::fmt;

/// Opaque capability naming an open sensor session.
///
/// The raw value is the platform port name. A handle is only meaningful
/// between a successful `create_sensor` and the matching `destroy_sensor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SensorHandle(u32);

impl SensorHandle {
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SensorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sensor:{:#x}", self.0)
    }
}

/// Opaque capability naming an open shared-memory buffer session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(u32);

impl BufferHandle {
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for BufferHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buffer:{:#x}", self.0)
    }
}

/// Sensor status as reported by the broker.
///
/// The platform enum is open, so unrecognised values are preserved in
/// `Unknown` rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorStatus {
    Allowed,
    Denied,
    Control,
    Unknown(u32),
}

impl SensorStatus {
    pub const RAW_ALLOWED: u32 = 1;
    pub const RAW_DENIED: u32 = 2;
    pub const RAW_CONTROL: u32 = 3;

    pub fn from_raw(raw: u32) -> Self {
        match raw {
            Self::RAW_ALLOWED => Self::Allowed,
            Self::RAW_DENIED => Self::Denied,
            Self::RAW_CONTROL => Self::Control,
            other => Self::Unknown(other),
        }
    }

    pub fn raw(self) -> u32 {
        match self {
            Self::Allowed => Self::RAW_ALLOWED,
            Self::Denied => Self::RAW_DENIED,
            Self::Control => Self::RAW_CONTROL,
            Self::Unknown(raw) => raw,
        }
    }

    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }
}

impl fmt::Display for SensorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allowed => f.write_str("allowed"),
            Self::Denied => f.write_str("denied"),
            Self::Control => f.write_str("control"),
            Self::Unknown(raw) => write!(f, "unknown({:#x})", raw),
        }
    }
}

/// One contiguous region of the shared buffer to copy out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CopyRegion {
    pub size: u64,
    pub offset: u64,
}

impl CopyRegion {
    pub const EMPTY: CopyRegion = CopyRegion { size: 0, offset: 0 };

    pub fn whole(size: usize) -> Self {
        Self {
            size: size as u64,
            offset: 0,
        }
    }
}
