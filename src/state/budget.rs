/// Counter of heavy (fetch/OCR) task starts for one crawl
#[derive(Debug, Clone)]
pub struct WorkBudget {
    ceiling: u32,
    started: u32,
}

impl WorkBudget {
    pub fn new(ceiling: u32) -> Self {
        Self {
            ceiling,
            started: 0,
        }
    }

    /// Claims one unit of work; returns false once the ceiling is reached
    pub fn try_start(&mut self) -> bool {
        if self.is_exhausted() {
            return false;
        }
        self.started += 1;
        true
    }

    /// Returns true once the number of started tasks has reached the ceiling
    pub fn is_exhausted(&self) -> bool {
        self.started >= self.ceiling
    }

    pub fn started(&self) -> u32 {
        self.started
    }

    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    pub fn remaining(&self) -> u32 {
        self.ceiling.saturating_sub(self.started)
    }
}
