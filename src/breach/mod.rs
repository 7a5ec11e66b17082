//! Breach checks: which published breaches affect an entry, whether a
//! password appears in the pwned-password corpus, and whether it contains a
//! well known common password.
//!
//! Network access stays outside the crate behind [`BreachLookup`].

mod common;
mod scanner;

use data_encoding::HEXUPPER;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use thiserror::Error;
use time::{Date, Month, OffsetDateTime};

pub use common::{is_common_password, CommonPasswords};
pub use scanner::{
    BreachScanner, ScanEvent, ScanFinding, ScanItem, ScanTask, DEFAULT_THROTTLE,
};

#[derive(Debug, Error)]
pub enum BreachError {
    #[error("breach lookup failed: {0}")]
    Lookup(String),
    #[error("invalid breach data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// External breach service, e.g. an HTTP client for Have I Been Pwned.
pub trait BreachLookup {
    /// All breaches containing the account.
    fn breaches_for_account(&self, account: &str) -> Result<Vec<Breach>, BreachError>;

    /// Body of the pwned-password range query for a 5 character SHA-1
    /// prefix, or `None` when the service has no data for it.
    fn password_range(&self, prefix: &str) -> Result<Option<String>, BreachError>;
}

/// One breach as published by the breach service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Breach {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub domain: String,
    /// `yyyy-MM-dd`
    #[serde(default)]
    pub breach_date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub is_fabricated: bool,
}

impl Breach {
    pub fn breach_date(&self) -> Option<Date> {
        let mut parts = self.breach_date.splitn(3, '-');
        let year = parts.next()?.parse().ok()?;
        let month = Month::try_from(parts.next()?.parse::<u8>().ok()?).ok()?;
        let day = parts.next()?.parse().ok()?;
        Date::from_calendar_date(year, month, day).ok()
    }

    /// Whether the breach happened after the password was last changed on a
    /// site matching the entry.
    ///
    /// Only verified, non-fabricated breaches with a known domain and date are
    /// considered. The entry matches when its URL contains the domain, or when
    /// its title contains the domain's main label (`example` of
    /// `www.example.com`).
    pub fn is_applicable(&self, url: &str, password_modified: OffsetDateTime, title: &str) -> bool {
        if !self.is_verified || self.is_fabricated || self.domain.is_empty() {
            return false;
        }
        let Some(date) = self.breach_date() else {
            return false;
        };
        let after_change = date.midnight().assume_utc() > password_modified;

        if contains_ignore_case(url, &self.domain) {
            return after_change;
        }
        let labels: Vec<&str> = self.domain.split('.').collect();
        match labels.len().checked_sub(2).map(|i| labels[i]) {
            Some(main) if !main.is_empty() && contains_ignore_case(title, main) => after_change,
            _ => false,
        }
    }
}

pub fn parse_breaches(json: &str) -> Result<Vec<Breach>, BreachError> {
    Ok(serde_json::from_str(json)?)
}

/// Upper-case hex SHA-1 of the password split into the 5 character prefix
/// sent to the service and the suffix searched in its answer.
pub fn password_hash_range(password: &str) -> (String, String) {
    let hash = HEXUPPER.encode(&Sha1::digest(password.as_bytes()));
    let (prefix, suffix) = hash.split_at(5);
    (prefix.to_string(), suffix.to_string())
}

/// Lines of a range answer have the form `SUFFIX:COUNT`.
pub fn range_contains(range: &str, suffix: &str) -> bool {
    range
        .lines()
        .filter_map(|line| line.split(':').next())
        .any(|s| s.trim().eq_ignore_ascii_case(suffix))
}

pub fn is_password_pwned<L: BreachLookup + ?Sized>(lookup: &L, password: &str) -> Result<bool, BreachError> {
    let (prefix, suffix) = password_hash_range(password);
    Ok(lookup.password_range(&prefix)?.is_some_and(|range| range_contains(&range, &suffix)))
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod breach_tests {
    use test_case::test_case;
    use time::{Date, Month, OffsetDateTime};

    use super::{parse_breaches, password_hash_range, range_contains, Breach};

    const JSON: &str = r#"[{
        "Name": "Adobe",
        "Title": "Adobe",
        "Domain": "adobe.com",
        "BreachDate": "2013-10-04",
        "AddedDate": "2013-12-04T00:00:00Z",
        "PwnCount": 152445165,
        "Description": "In October 2013, 153 million Adobe accounts were breached.",
        "IsVerified": true,
        "IsFabricated": false,
        "IsSensitive": false
    }]"#;

    fn adobe() -> Breach {
        parse_breaches(JSON).unwrap().remove(0)
    }

    fn on(year: i32, month: Month, day: u8) -> OffsetDateTime {
        Date::from_calendar_date(year, month, day).unwrap().midnight().assume_utc()
    }

    #[test]
    fn test_parse() {
        let breach = adobe();
        assert_eq!(breach.name, "Adobe");
        assert_eq!(breach.domain, "adobe.com");
        assert!(breach.is_verified && !breach.is_fabricated);
        assert_eq!(breach.breach_date(), Some(Date::from_calendar_date(2013, Month::October, 4).unwrap()));
    }

    #[test]
    fn test_parse_error() {
        assert!(parse_breaches("{not json").is_err());
    }

    #[test_case("https://www.ADOBE.com/login", "", 2012, true)]
    #[test_case("https://www.adobe.com/login", "", 2014, false)]
    #[test_case("", "My Adobe account", 2012, true)]
    #[test_case("", "My Adobe account", 2014, false)]
    #[test_case("https://example.com", "Example", 2012, false)]
    fn test_is_applicable(url: &str, title: &str, year: i32, exp: bool) {
        assert_eq!(adobe().is_applicable(url, on(year, Month::January, 1), title), exp);
    }

    #[test]
    fn test_not_applicable_when_unverified_or_undated() {
        let at = on(2000, Month::January, 1);
        let url = "adobe.com";
        let unverified = Breach { is_verified: false, ..adobe() };
        let fabricated = Breach { is_fabricated: true, ..adobe() };
        let no_domain = Breach { domain: String::new(), ..adobe() };
        let bad_date = Breach { breach_date: "2013-13-01".to_string(), ..adobe() };
        for breach in [unverified, fabricated, no_domain, bad_date] {
            assert!(!breach.is_applicable(url, at, "Adobe"));
        }
    }

    #[test]
    fn test_single_label_domain_checks_url_only() {
        let breach = Breach { domain: "localhost".to_string(), ..adobe() };
        let at = on(2000, Month::January, 1);
        assert!(!breach.is_applicable("", at, "localhost"));
        assert!(breach.is_applicable("http://localhost/", at, ""));
    }

    #[test]
    fn test_password_hash_range() {
        let (prefix, suffix) = password_hash_range("password");
        assert_eq!(prefix, "5BAA6");
        assert_eq!(suffix, "1E4C9B93F3F0682250B6CF8331B7EE68FD8");
    }

    #[test]
    fn test_range_contains() {
        let range = "0018A45C4D1DEF81644B54AB7F969B88D65:1\r\n1E4C9B93F3F0682250B6CF8331B7EE68FD8:9545824\r\n";
        assert!(range_contains(range, "1E4C9B93F3F0682250B6CF8331B7EE68FD8"));
        assert!(!range_contains(range, "1E4C9B93F3F0682250B6CF8331B7EE68FD9"));
    }
}
