//! SDP timing (`t=` line).

use std::fmt;

use crate::errors::SdpError;

/// Start and stop times; `0 0` is an unbounded session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timing {
    pub start_time: u64,
    pub stop_time: u64,
}

impl Timing {
    pub fn validate(&self) -> Result<(), SdpError> {
        if self.start_time != 0 && self.stop_time != 0 && self.stop_time < self.start_time {
            return Err(SdpError::InvalidTiming);
        }
        Ok(())
    }

    pub fn parse(value: &str) -> Result<Self, SdpError> {
        let parts: Vec<&str> = value.split_whitespace().collect();
        let [start, stop] = parts[..] else {
            return Err(SdpError::InvalidTimingFormat);
        };

        Ok(Timing {
            start_time: start.parse().map_err(|_| SdpError::InvalidTimingFormat)?,
            stop_time: stop.parse().map_err(|_| SdpError::InvalidTimingFormat)?,
        })
    }
}

impl fmt::Display for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={} {}\r\n", self.start_time, self.stop_time)
    }
}
