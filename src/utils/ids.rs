use thiserror::Error;

pub const MIN_ID: u32 = 1_000_000;
pub const MAX_ID: u32 = 9_999_999;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("start id {0} is not a 7-digit number (1000000-9999999)")]
    InvalidRange(u32),
    #[error("maximum 7-digit id (9999999) reached")]
    Overflow,
}

/// Hands out 7-digit ids, one per record, for a single payload pass.
///
/// Create a fresh assigner for every pass; nothing is shared or persisted.
#[derive(Debug, Clone)]
pub struct SequentialIdAssigner {
    current: u32,
}

impl SequentialIdAssigner {
    pub fn new(start: u32) -> Result<Self, IdError> {
        if !(MIN_ID..=MAX_ID).contains(&start) {
            return Err(IdError::InvalidRange(start));
        }
        Ok(Self {
            current: start - 1,
        })
    }

    /// Next id in the sequence. The counter is left alone on overflow.
    pub fn next_id(&mut self) -> Result<u32, IdError> {
        if self.current >= MAX_ID {
            return Err(IdError::Overflow);
        }
        self.current += 1;
        Ok(self.current)
    }

    /// Last issued id, or `start - 1` before the first call
    pub fn current(&self) -> u32 {
        self.current
    }
}
