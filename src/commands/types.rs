/// One step of the stepped-tone calibration sweep
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationRow {
    /// Step number as reported by the device
    pub test_id: u32,

    /// Frequency of the test tone
    pub freq_hz: f64,

    /// Measured input level, one entry per channel (left, right, ...)
    pub levels_dbfs: Vec<f64>,
}

/// The decoded results of a sweep, in the order the device printed them
///
/// Never empty, and every row has the same number of channels.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationTable {
    rows: Vec<CalibrationRow>,
}

impl CalibrationTable {
    pub(crate) fn new(rows: Vec<CalibrationRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[CalibrationRow] {
        &self.rows
    }

    pub fn test_ids(&self) -> Vec<u32> {
        self.rows.iter().map(|r| r.test_id).collect()
    }

    pub fn freqs_hz(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.freq_hz).collect()
    }

    /// Level matrix, one row per step and one column per channel
    pub fn levels(&self) -> Vec<Vec<f64>> {
        self.rows.iter().map(|r| r.levels_dbfs.clone()).collect()
    }

    pub fn channel_count(&self) -> usize {
        self.rows.first().map_or(0, |r| r.levels_dbfs.len())
    }

    /// Levels of one channel across all steps
    pub fn channel(&self, channel: usize) -> Option<Vec<f64>> {
        if channel < self.channel_count() {
            Some(self.rows.iter().map(|r| r.levels_dbfs[channel]).collect())
        } else {
            None
        }
    }
}
