use std::num::NonZeroU32;

use chrono::NaiveDate;
use serde::Serialize;

use crate::workflows::correction::domain::UsageRecord;

/// Daily allowance rules. Every method is a pure function of its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaPolicy {
    daily_limit: NonZeroU32,
}

impl QuotaPolicy {
    pub fn new(daily_limit: NonZeroU32) -> Self {
        Self { daily_limit }
    }

    pub fn daily_limit(&self) -> u32 {
        self.daily_limit.get()
    }

    /// Usage that counts against `today`; records from any other day are stale.
    pub fn effective_count(&self, stored: Option<&UsageRecord>, today: NaiveDate) -> u32 {
        match stored {
            Some(record) if record.date == today => record.count,
            _ => 0,
        }
    }

    pub fn remaining(&self, effective_count: u32) -> u32 {
        self.daily_limit().saturating_sub(effective_count)
    }

    pub fn can_consume(&self, effective_count: u32) -> bool {
        self.remaining(effective_count) > 0
    }

    /// Next count after one evaluation. Gating is the caller's job.
    pub fn consume(&self, effective_count: u32) -> u32 {
        effective_count.saturating_add(1)
    }

    /// Restores the allowance to exactly one evaluation, whatever the current usage.
    pub fn grant_bonus(&self, _effective_count: u32) -> u32 {
        self.daily_limit().saturating_sub(1)
    }

    pub fn snapshot(&self, stored: Option<&UsageRecord>, today: NaiveDate) -> QuotaSnapshot {
        let used = self.effective_count(stored, today);
        QuotaSnapshot {
            date: today,
            used,
            remaining: self.remaining(used),
            daily_limit: self.daily_limit(),
        }
    }
}

/// Point-in-time view of today's allowance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotaSnapshot {
    pub date: NaiveDate,
    pub used: u32,
    pub remaining: u32,
    pub daily_limit: u32,
}

impl QuotaSnapshot {
    pub fn can_consume(&self) -> bool {
        self.remaining > 0
    }

    pub fn badge_label(&self) -> String {
        if self.can_consume() {
            format!("{} correções grátis hoje", self.remaining)
        } else {
            "Limite grátis de hoje usado".to_string()
        }
    }
}
