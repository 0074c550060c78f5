// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Feeding The Furballs

//! Monthly donation goal repository.
//!
//! One record per calendar month at `donation_goals/{Month}`. Amounts are
//! kept exactly as entered; they are only parsed when computing progress.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::{Field, RepositoryError, RepositoryResult, ValidationErrors};
use crate::storage::document::DocumentStore;
use crate::storage::paths;

/// Calendar month, stored and displayed by its English name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    /// Month for a 1-based month number.
    pub fn from_number(number: u32) -> Option<Month> {
        let index = usize::try_from(number).ok()?.checked_sub(1)?;
        Month::ALL.get(index).copied()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a month name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown month: {0:?}")]
pub struct UnknownMonth(pub String);

impl FromStr for Month {
    type Err = UnknownMonth;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Month::ALL
            .into_iter()
            .find(|month| month.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownMonth(s.to_string()))
    }
}

/// Source of the current time for "current month" defaults.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Wall clock at a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Clock for an offset in minutes east of UTC; out-of-range offsets fall back to UTC.
    pub fn from_offset_minutes(minutes: i32) -> Self {
        let offset = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix());
        Self::new(offset)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }
}

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// A month's goal record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DonationGoal {
    pub month: Month,
    /// Total donated so far, as entered
    pub monthly_donations: String,
    /// Target amount, as entered
    pub monthly_goal: String,
}

/// Parsed amounts and pie-chart proportions for a goal.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct GoalProgress {
    pub donations: i64,
    pub goal: i64,
    /// Amount still needed, never below zero
    pub remaining: i64,
    /// Amount donated beyond the goal
    pub surplus: i64,
    /// Donations slice as a percentage of the chart
    pub donations_share: f64,
    /// Remaining slice as a percentage of the chart
    pub remaining_share: f64,
}

/// Parse an entered amount; anything that is not a non-negative integer counts as zero.
fn parse_amount(text: &str) -> i64 {
    text.trim().parse::<i64>().map(|n| n.max(0)).unwrap_or(0)
}

impl GoalProgress {
    pub fn from_goal(goal: &DonationGoal) -> Self {
        let donations = parse_amount(&goal.monthly_donations);
        let target = parse_amount(&goal.monthly_goal);
        let remaining = target.saturating_sub(donations).max(0);
        let surplus = donations.saturating_sub(target).max(0);

        let total = donations.saturating_add(remaining);
        let (donations_share, remaining_share) = if total == 0 {
            (0.0, 0.0)
        } else {
            let total = total as f64;
            (
                donations as f64 * 100.0 / total,
                remaining as f64 * 100.0 / total,
            )
        };

        Self {
            donations,
            goal: target,
            remaining,
            surplus,
            donations_share,
            remaining_share,
        }
    }
}

/// Month a clock currently falls in.
pub fn current_month(clock: &dyn Clock) -> Month {
    // month() is always 1..=12
    Month::from_number(clock.now().month()).unwrap_or(Month::January)
}

/// Repository for monthly donation goals.
pub struct DonationGoalRepository<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: DocumentStore + ?Sized> DonationGoalRepository<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Store the goal for `month`, replacing any earlier record.
    ///
    /// Both amounts must be non-blank; their format is not checked.
    pub async fn save(
        &self,
        month: Month,
        monthly_donations: &str,
        monthly_goal: &str,
    ) -> RepositoryResult<DonationGoal> {
        let monthly_donations = monthly_donations.trim();
        let monthly_goal = monthly_goal.trim();

        let mut errors = ValidationErrors::new();
        if monthly_donations.is_empty() {
            errors.push(Field::MonthlyDonations, "Please enter the total monthly donations!");
        }
        if monthly_goal.is_empty() {
            errors.push(Field::MonthlyGoal, "Please enter the monthly goal!");
        }
        errors.into_result()?;

        let goal = DonationGoal {
            month,
            monthly_donations: monthly_donations.to_string(),
            monthly_goal: monthly_goal.to_string(),
        };
        let record = serde_json::to_value(&goal).map_err(|e| RepositoryError::Save(e.into()))?;
        self.store
            .write(&paths::donation_goal(month.name()), &record)
            .await
            .map_err(RepositoryError::Save)?;

        tracing::info!(month = %month, "donation goal saved");
        Ok(goal)
    }

    /// The goal for `month`, or `None` when none has been saved.
    pub async fn load(&self, month: Month) -> RepositoryResult<Option<DonationGoal>> {
        let record = self
            .store
            .read(&paths::donation_goal(month.name()))
            .await
            .map_err(RepositoryError::Fetch)?;

        match record {
            Some(record) => {
                let goal = serde_json::from_value(record)
                    .map_err(|e| RepositoryError::Fetch(e.into()))?;
                Ok(Some(goal))
            }
            None => Ok(None),
        }
    }
}
