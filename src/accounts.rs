//! Receiving GCash accounts and the day-of-month rotation between them.
//!
//! Up to three accounts can be configured. Each carries an optional active-days
//! pattern such as `"1-10, 15"`. Matching uses the calendar day of month only,
//! so a pattern of `"31"` never matches in a 30-day month and `"29-31"` never matches in
//! February of a common year.

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// A receiving account as shown to the payer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivingAccount {
    /// Configured position, 1 to 3
    pub slot: u8,
    pub number: String,
    pub name: String,
    pub qr_code: String,
    #[serde(skip)]
    pub active_days: String,
}

impl ReceivingAccount {
    /// Both the number and the display name are filled in.
    pub fn is_configured(&self) -> bool {
        !self.number.trim().is_empty() && !self.name.trim().is_empty()
    }

    pub fn is_active_on(&self, day: u32) -> bool {
        ActiveDays::parse(&self.active_days).contains(day)
    }
}

/// Parsed active-days pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveDays {
    /// Empty pattern: active every day
    Always,
    Days(BTreeSet<u32>),
}

fn range_separator() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*-\s*").expect("valid range separator pattern"))
}

fn token_separator() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[,\s]+").expect("valid token separator pattern"))
}

impl ActiveDays {
    /// Parse a comma/space separated list of days and inclusive ranges.
    ///
    /// Tokens that are not a day in 1..=31 or a range of such days are skipped. A
    /// reversed range like `"20-10"` covers the same days as `"10-20"`. A pattern that
    /// is non-empty but yields no valid days matches nothing.
    pub fn parse(pattern: &str) -> Self {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return ActiveDays::Always;
        }

        let normalized = range_separator().replace_all(pattern, "-");
        let mut days = BTreeSet::new();

        for token in token_separator().split(&normalized).filter(|t| !t.is_empty()) {
            match parse_token(token) {
                Some((start, end)) => days.extend(start..=end),
                None => warn!("Ignoring invalid active-days token '{}' in '{}'", token, pattern),
            }
        }

        ActiveDays::Days(days)
    }

    pub fn contains(&self, day: u32) -> bool {
        match self {
            ActiveDays::Always => true,
            ActiveDays::Days(days) => days.contains(&day),
        }
    }
}

fn parse_day(raw: &str) -> Option<u32> {
    raw.parse::<u32>().ok().filter(|day| (1..=31).contains(day))
}

fn parse_token(token: &str) -> Option<(u32, u32)> {
    match token.split_once('-') {
        Some((start, end)) => {
            let (start, end) = (parse_day(start)?, parse_day(end)?);
            Some((start.min(end), start.max(end)))
        }
        None => parse_day(token).map(|day| (day, day)),
    }
}

/// Pick the account to show on `day` (1–31).
///
/// The first configured account, in slot order, whose active days include `day`
/// wins. When none match, slot 1 is returned even if its own pattern excludes today.
/// Returns `None` only when no accounts are given at all.
pub fn select_active_account(accounts: &[ReceivingAccount], day: u32) -> Option<ReceivingAccount> {
    let mut ordered: Vec<&ReceivingAccount> = accounts.iter().collect();
    ordered.sort_by_key(|account| account.slot);

    if let Some(account) = ordered
        .iter()
        .find(|account| account.is_configured() && account.is_active_on(day))
    {
        debug!("Account slot {} is active on day {}", account.slot, day);
        return Some((*account).clone());
    }

    debug!("No account active on day {}, falling back to slot 1", day);
    ordered
        .iter()
        .find(|account| account.slot == 1)
        .or_else(|| ordered.first())
        .map(|account| (*account).clone())
}
