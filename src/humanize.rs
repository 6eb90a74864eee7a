//! Human-readable size formatting

use std::fmt;

/// Byte count that prints as `512B`, `1.5KB`, `20MB`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ByteSize(pub u64);

impl ByteSize {
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Largest binary unit that keeps the whole part non-zero, truncated
    /// to one decimal and without a trailing `.0`
    pub fn to_human_readable(&self) -> String {
        const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

        let mut unit = 0;
        let mut scale = 1u64;
        while unit + 1 < UNITS.len() && self.0 >= scale * 1024 {
            scale *= 1024;
            unit += 1;
        }

        let whole = self.0 / scale;
        let tenths = (self.0 % scale) * 10 / scale;

        match tenths {
            0 => format!("{}{}", whole, UNITS[unit]),
            _ => format!("{}.{}{}", whole, tenths, UNITS[unit]),
        }
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_human_readable())
    }
}
