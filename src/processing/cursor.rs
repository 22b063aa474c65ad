/// Offset of a 1-based step: `(step - 1) * batch_size`.
pub fn offset(step: u32, batch_size: u32) -> u64 {
    u64::from(step.saturating_sub(1)) * u64::from(batch_size)
}

/// Completion percentage after processing `step` pages of `batch_size` rows.
///
/// `step * batch_size / total * 100`, rounded to two decimals, capped at 100
/// and truncated. An unknown or zero total reports 100.
pub fn percentage(step: u32, batch_size: u32, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let raw = f64::from(step) * f64::from(batch_size) / total as f64 * 100.0;
    let rounded = (raw * 100.0).round() / 100.0;
    rounded.min(100.0) as u8
}

/// Position of one page in a paginated source query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchCursor {
    pub step: u32,
    pub batch_size: u32,
}

impl BatchCursor {
    /// Cursor on the first page
    pub fn first(batch_size: u32) -> Self {
        Self {
            step: 1,
            batch_size,
        }
    }

    pub fn offset(&self) -> u64 {
        offset(self.step, self.batch_size)
    }

    pub fn limit(&self) -> u32 {
        self.batch_size
    }

    pub fn next(&self) -> Self {
        Self {
            step: self.step + 1,
            batch_size: self.batch_size,
        }
    }

    pub fn percentage(&self, total: u64) -> u8 {
        percentage(self.step, self.batch_size, total)
    }

    /// MySQL `LIMIT offset, count` clause
    pub fn to_sql(&self) -> String {
        format!(" LIMIT {}, {}", self.offset(), self.limit())
    }
}

/// Progress of one steppable run. Owned by a single driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingState {
    pub step: u32,
    /// Cached after the first lookup
    pub total: Option<u64>,
    pub percentage: u8,
}

impl Default for ProcessingState {
    fn default() -> Self {
        Self {
            step: 1,
            total: None,
            percentage: 0,
        }
    }
}

impl ProcessingState {
    pub fn cursor(&self, batch_size: u32) -> BatchCursor {
        BatchCursor {
            step: self.step,
            batch_size,
        }
    }

    pub fn advance(&mut self) {
        self.step += 1;
    }

    /// Steps fully processed so far.
    pub fn steps_completed(&self) -> u32 {
        self.step - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets() {
        assert_eq!(offset(1, 5000), 0);
        assert_eq!(offset(2, 5000), 5000);
        assert_eq!(offset(3, 10), 20);
        assert_eq!(BatchCursor::first(5000).next().to_sql(), " LIMIT 5000, 5000");
    }

    #[test]
    fn test_percentage_example() {
        assert_eq!(percentage(1, 5000, 12000), 41);
        assert_eq!(percentage(2, 5000, 12000), 83);
        assert_eq!(percentage(3, 5000, 12000), 100);
    }

    #[test]
    fn test_percentage_with_zero_total() {
        assert_eq!(percentage(1, 5000, 0), 100);
        assert_eq!(percentage(7, 1, 0), 100);
    }

    #[test]
    fn test_percentage_rounds_before_truncating() {
        // 2/3 * 100 = 66.666.. -> 66.67 -> 66
        assert_eq!(percentage(2, 1, 3), 66);
        // 99.996 rounds to 100.0
        assert_eq!(percentage(99996, 1, 100000), 100);
    }

    #[test]
    fn test_processing_state() {
        let mut state = ProcessingState::default();
        assert_eq!(state.cursor(10).offset(), 0);
        state.advance();
        state.advance();
        assert_eq!(state.steps_completed(), 2);
        assert_eq!(state.cursor(10).offset(), 20);
    }
}
