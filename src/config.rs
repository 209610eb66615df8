//! Settings for the serial link and the reply timing

use std::time::Duration;

/// How to open the serial port
#[derive(Debug, Clone)]
pub struct PortConfig {
    /// Platform device name, e.g. `/dev/ttyACM0` or `COM26`
    pub path: String,

    /// Ignored by the Tympan's USB serial, but the driver still wants one
    pub baud_rate: u32,

    /// Longest wait for a single line before it is returned incomplete
    pub read_timeout: Duration,
}

impl PortConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            baud_rate: 115_200,
            read_timeout: Duration::from_millis(500),
        }
    }
}

/// Timing of one command/reply cycle
#[derive(Debug, Clone, Copy)]
pub struct ReplyTiming {
    /// A reply is considered finished once nothing new arrived for this long
    pub quiet_period: Duration,

    /// Pause between sending a command and starting to read
    pub settle: Duration,

    /// Print each line of the reply as it arrives
    pub echo: bool,
}

impl ReplyTiming {
    pub fn with_quiet_period(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            ..Default::default()
        }
    }

    pub fn silent(self) -> Self {
        Self {
            echo: false,
            ..self
        }
    }
}

impl Default for ReplyTiming {
    fn default() -> Self {
        Self {
            quiet_period: Duration::from_millis(500),
            settle: Duration::from_millis(50),
            echo: true,
        }
    }
}

/// Step duration of the calibration sweep
///
/// The Tympan never reports how long its steps take, so each speed carries the tuning command that
/// selects it together with the quiet period that matches. They must be changed together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SweepSpeed {
    /// The firmware default of 0.5 s per step
    #[default]
    Standard,
    /// Three "shorten step" commands, 0.2 s per step
    Fast,
}

impl SweepSpeed {
    /// Command to send before starting the sweep, if any
    pub fn tuning_command(self) -> Option<&'static str> {
        match self {
            Self::Standard => None,
            Self::Fast => Some("DDD"),
        }
    }

    /// Quiet period to use while the sweep is running
    pub fn quiet_period(self) -> Duration {
        match self {
            Self::Standard => Duration::from_millis(1100),
            Self::Fast => Duration::from_millis(250),
        }
    }
}
