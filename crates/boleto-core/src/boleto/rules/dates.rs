//! Due date extraction.

use chrono::NaiveDate;
use regex::{Match, Regex};
use tracing::warn;

use super::patterns::{DATE_DMY, DUE_DATE_KEYWORDS};
use super::FieldExtractor;
use crate::models::fields::{Confidence, FieldMatch};

/// Ways a due date is selected, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueDateMatcher {
    /// Nearest date to a due-date keyword, within the configured window.
    NearKeyword,
    /// Nearest date to a due-date keyword, further than the window.
    DistantKeyword,
    /// Earliest date in the text when no keyword is present.
    FirstDate,
}

impl DueDateMatcher {
    pub fn name(&self) -> &'static str {
        match self {
            DueDateMatcher::NearKeyword => "near_keyword",
            DueDateMatcher::DistantKeyword => "distant_keyword",
            DueDateMatcher::FirstDate => "first_date",
        }
    }

    pub fn confidence(&self) -> Confidence {
        match self {
            DueDateMatcher::NearKeyword => Confidence::High,
            DueDateMatcher::DistantKeyword => Confidence::Medium,
            DueDateMatcher::FirstDate => Confidence::Low,
        }
    }
}

/// A day/month/year token.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DateToken {
    start: usize,
    end: usize,
    raw: String,
    date: Option<NaiveDate>,
}

impl DateToken {
    /// ISO date, or the raw token when it is not a calendar date.
    fn value(&self) -> String {
        match self.date {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => self.raw.clone(),
        }
    }
}

/// Expand a two-digit year: 00-49 is 2000-2049, 50-99 is 1950-1999.
pub fn expand_year(year: &str) -> Option<i32> {
    let value: i32 = year.parse().ok()?;
    match year.len() {
        4 => Some(value),
        2 if value < 50 => Some(2000 + value),
        2 => Some(1900 + value),
        _ => None,
    }
}

fn date_tokens(text: &str) -> Vec<DateToken> {
    DATE_DMY
        .captures_iter(text)
        .filter_map(|caps| {
            let full = caps.get(0)?;
            let day: u32 = caps[1].parse().ok()?;
            let month: u32 = caps[2].parse().ok()?;
            let date = expand_year(&caps[3]).and_then(|year| NaiveDate::from_ymd_opt(year, month, day));
            Some(DateToken {
                start: full.start(),
                end: full.end(),
                raw: full.as_str().to_string(),
                date,
            })
        })
        .collect()
}

/// Characters between a date token and a keyword match.
fn char_distance(text: &str, token: &DateToken, keyword: &Match) -> usize {
    if token.start >= keyword.end() {
        text[keyword.end()..token.start].chars().count()
    } else if keyword.start() >= token.end {
        text[token.end..keyword.start()].chars().count()
    } else {
        0
    }
}

/// Build a case-insensitive alternation of `keywords`, longest first.
fn keyword_pattern(keywords: &[String]) -> Option<Regex> {
    let mut keywords: Vec<&str> = keywords.iter().map(|k| k.trim()).filter(|k| !k.is_empty()).collect();
    if keywords.is_empty() {
        return None;
    }
    keywords.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
    let alternation = keywords
        .iter()
        .map(|k| {
            k.split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .collect::<Vec<_>>()
        .join("|");

    match Regex::new(&format!(r"(?i)\b(?:{})", alternation)) {
        Ok(regex) => Some(regex),
        Err(e) => {
            warn!("Invalid due-date keyword list, using built-in keywords: {}", e);
            None
        }
    }
}

/// Due date extractor.
pub struct DueDateExtractor {
    keywords: Option<Regex>,
    keyword_window: usize,
}

impl DueDateExtractor {
    /// Extractor with the built-in keyword list.
    pub fn new() -> Self {
        Self {
            keywords: None,
            keyword_window: 60,
        }
    }

    /// Use a custom keyword list. Falls back to the built-in list when the
    /// custom one is empty.
    pub fn with_keywords(mut self, keywords: &[String]) -> Self {
        self.keywords = keyword_pattern(keywords);
        self
    }

    pub fn with_keyword_window(mut self, window: usize) -> Self {
        self.keyword_window = window;
        self
    }

    fn keyword_regex(&self) -> &Regex {
        self.keywords.as_ref().unwrap_or(&*DUE_DATE_KEYWORDS)
    }

    /// Best date together with the tier that selected it.
    pub fn extract_with_tier(&self, text: &str) -> Option<(DueDateMatcher, FieldMatch)> {
        let tokens = date_tokens(text);
        if tokens.is_empty() {
            return None;
        }
        let keywords: Vec<Match> = self.keyword_regex().find_iter(text).collect();

        if keywords.is_empty() {
            let first = &tokens[0];
            return Some((DueDateMatcher::FirstDate, self.matched(first, DueDateMatcher::FirstDate)));
        }

        // min_by_key keeps the earliest token on equal distance
        let (token, distance) = tokens
            .iter()
            .map(|t| {
                let d = keywords.iter().map(|k| char_distance(text, t, k)).min().unwrap_or(usize::MAX);
                (t, d)
            })
            .min_by_key(|(_, d)| *d)?;

        let tier = if distance <= self.keyword_window {
            DueDateMatcher::NearKeyword
        } else {
            DueDateMatcher::DistantKeyword
        };
        Some((tier, self.matched(token, tier)))
    }

    fn matched(&self, token: &DateToken, tier: DueDateMatcher) -> FieldMatch {
        FieldMatch::new(token.value(), tier.confidence(), token.raw.clone()).with_position(token.start, token.end)
    }
}

impl Default for DueDateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DueDateExtractor {
    type Output = FieldMatch;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_with_tier(text).map(|(_, m)| m)
    }

    /// Every date token in reading order, rated low.
    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        date_tokens(text)
            .iter()
            .map(|t| self.matched(t, DueDateMatcher::FirstDate))
            .collect()
    }
}
