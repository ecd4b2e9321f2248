//! Email address format validation.
//!
//! This is a practical format check, not an RFC 5321/5322 parser. The rules are
//! applied in a fixed order and the first failing rule decides the verdict:
//!
//! 1. length between 5 and 255 bytes
//! 2. no whitespace
//! 3. exactly one '@', neither first nor last
//! 4. local part: no leading/trailing/consecutive '.', only `[A-Za-z0-9._+-]`
//! 5. domain part: no leading/trailing '.' or '-', at least one '.', a final
//!    label of two or more characters, no consecutive '.', only `[A-Za-z0-9.-]`
//!
//! Character classes are ASCII only ("C" locale). Non-ASCII bytes are never
//! alphanumeric, so any multi-byte UTF-8 sequence makes an address invalid.

use std::fmt;

/// Shortest accepted address length (`a@b.c` passes this rule but not the TLD rule).
pub const MIN_EMAIL_LENGTH: usize = 5;
/// Longest accepted address.
pub const MAX_EMAIL_LENGTH: usize = 255;

/// The first rule an address failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    Length,
    Whitespace,
    AtCount,
    AtPosition,
    LocalDotEdge,
    LocalConsecutiveDots,
    LocalChar,
    DomainEdge,
    DomainMissingDot,
    TopLevelTooShort,
    DomainConsecutiveDots,
    DomainChar,
}

impl Violation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Length => "length",
            Self::Whitespace => "whitespace",
            Self::AtCount => "at_count",
            Self::AtPosition => "at_position",
            Self::LocalDotEdge => "local_dot_edge",
            Self::LocalConsecutiveDots => "local_consecutive_dots",
            Self::LocalChar => "local_char",
            Self::DomainEdge => "domain_edge",
            Self::DomainMissingDot => "domain_missing_dot",
            Self::TopLevelTooShort => "top_level_too_short",
            Self::DomainConsecutiveDots => "domain_consecutive_dots",
            Self::DomainChar => "domain_char",
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length => write!(
                f,
                "length must be between {} and {} characters",
                MIN_EMAIL_LENGTH, MAX_EMAIL_LENGTH
            ),
            Self::Whitespace => write!(f, "contains whitespace"),
            Self::AtCount => write!(f, "must contain exactly one '@'"),
            Self::AtPosition => write!(f, "'@' cannot be the first or last character"),
            Self::LocalDotEdge => write!(f, "local part cannot start or end with '.'"),
            Self::LocalConsecutiveDots => write!(f, "local part cannot contain '..'"),
            Self::LocalChar => write!(
                f,
                "local part may only contain letters, digits, '.', '-', '_' and '+'"
            ),
            Self::DomainEdge => write!(f, "domain cannot start or end with '.' or '-'"),
            Self::DomainMissingDot => write!(f, "domain must contain at least one '.'"),
            Self::TopLevelTooShort => {
                write!(f, "domain extension must be at least 2 characters")
            }
            Self::DomainConsecutiveDots => write!(f, "domain cannot contain '..'"),
            Self::DomainChar => write!(
                f,
                "domain may only contain letters, digits, '.' and '-'"
            ),
        }
    }
}

/// Check an optional address. A missing address is invalid.
pub fn validate(candidate: Option<&str>) -> bool {
    candidate.is_some_and(is_valid_email)
}

pub fn is_valid_email(email: &str) -> bool {
    check_email(email).is_ok()
}

pub fn is_valid_email_bytes(email: &[u8]) -> bool {
    check_email_bytes(email).is_ok()
}

/// Run every rule in order and report the first one that fails.
pub fn check_email(email: &str) -> Result<(), Violation> {
    check_email_bytes(email.as_bytes())
}

pub fn check_email_bytes(email: &[u8]) -> Result<(), Violation> {
    if !(MIN_EMAIL_LENGTH..=MAX_EMAIL_LENGTH).contains(&email.len()) {
        return Err(Violation::Length);
    }

    if email.iter().copied().any(is_c_space) {
        return Err(Violation::Whitespace);
    }

    let mut ats = email.iter().enumerate().filter(|&(_, &b)| b == b'@');
    let at = match (ats.next(), ats.next()) {
        (Some((i, _)), None) => i,
        _ => return Err(Violation::AtCount),
    };

    if at == 0 || at == email.len() - 1 {
        return Err(Violation::AtPosition);
    }

    let local = &email[..at];
    let domain = &email[at + 1..];

    check_local_part(local)?;
    check_domain(domain)
}

// Both slices are non-empty here: '@' is neither first nor last.
fn check_local_part(local: &[u8]) -> Result<(), Violation> {
    if local.first() == Some(&b'.') || local.last() == Some(&b'.') {
        return Err(Violation::LocalDotEdge);
    }

    if has_consecutive_dots(local) {
        return Err(Violation::LocalConsecutiveDots);
    }

    if !local.iter().copied().all(is_local_char) {
        return Err(Violation::LocalChar);
    }

    Ok(())
}

fn check_domain(domain: &[u8]) -> Result<(), Violation> {
    let edge = |b: Option<&u8>| matches!(b, Some(&b'.') | Some(&b'-'));
    if edge(domain.first()) || edge(domain.last()) {
        return Err(Violation::DomainEdge);
    }

    let Some(last_dot) = domain.iter().rposition(|&b| b == b'.') else {
        return Err(Violation::DomainMissingDot);
    };

    if domain.len() - last_dot - 1 < 2 {
        return Err(Violation::TopLevelTooShort);
    }

    if has_consecutive_dots(domain) {
        return Err(Violation::DomainConsecutiveDots);
    }

    if !domain.iter().copied().all(is_domain_char) {
        return Err(Violation::DomainChar);
    }

    Ok(())
}

fn has_consecutive_dots(part: &[u8]) -> bool {
    part.windows(2).any(|w| w == b"..")
}

/// `isspace` in the "C" locale. Unlike `u8::is_ascii_whitespace`, this
/// includes vertical tab.
fn is_c_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

fn is_local_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-' | b'_' | b'+')
}

fn is_domain_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_addresses() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last+tag@mail.example.org"));
        assert!(is_valid_email("under_score-dash@sub-domain.example.io"));
        assert!(is_valid_email("12345@678.90"));
    }

    #[test]
    fn test_rejects_listed_scenarios() {
        assert!(!is_valid_email("user@@example.com"));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email(".user@example.com"));
        assert!(!is_valid_email("user@-example.com"));
        assert!(!is_valid_email("user@example.c"));
        assert!(!is_valid_email("us er@example.com"));
        assert!(!is_valid_email("user..name@example.com"));
    }

    #[test]
    fn test_absent_and_empty() {
        assert!(!validate(None));
        assert!(!validate(Some("")));
        assert!(validate(Some("user@example.com")));
        assert_eq!(check_email(""), Err(Violation::Length));
    }

    #[test]
    fn test_length_bounds() {
        // 4 bytes is one short of the minimum.
        assert_eq!(check_email("a@bc"), Err(Violation::Length));
        assert_eq!(check_email("a@b.c"), Err(Violation::TopLevelTooShort));

        let domain = ".com";
        let local_len = MAX_EMAIL_LENGTH - 1 - 1 - domain.len();
        let longest = format!("{}@a{}", "x".repeat(local_len), domain);
        assert_eq!(longest.len(), MAX_EMAIL_LENGTH);
        assert!(is_valid_email(&longest));

        let too_long = format!("x{}", longest);
        assert_eq!(too_long.len(), MAX_EMAIL_LENGTH + 1);
        assert_eq!(check_email(&too_long), Err(Violation::Length));
        assert!(!is_valid_email(&"a".repeat(1000)));
    }

    #[test]
    fn test_whitespace_is_ascii_c_locale() {
        for ws in [" ", "\t", "\n", "\r", "\x0b", "\x0c"] {
            let s = format!("user{}@example.com", ws);
            assert_eq!(check_email(&s), Err(Violation::Whitespace), "{:?}", ws);
        }
        // Non-breaking space is not C whitespace, but is not alphanumeric either.
        assert_eq!(
            check_email("user\u{a0}@example.com"),
            Err(Violation::LocalChar)
        );
    }

    #[test]
    fn test_at_count() {
        assert_eq!(check_email("userexample.com"), Err(Violation::AtCount));
        assert_eq!(check_email("a@b@example.com"), Err(Violation::AtCount));
        assert_eq!(check_email("@@@@@"), Err(Violation::AtCount));
    }

    #[test]
    fn test_at_position() {
        assert_eq!(check_email("@example.com"), Err(Violation::AtPosition));
        assert_eq!(check_email("user.name@"), Err(Violation::AtPosition));
    }

    #[test]
    fn test_local_part_rules() {
        assert_eq!(check_email("user.@example.com"), Err(Violation::LocalDotEdge));
        assert_eq!(
            check_email("a..b@example.com"),
            Err(Violation::LocalConsecutiveDots)
        );
        assert_eq!(check_email("us#er@example.com"), Err(Violation::LocalChar));
        assert_eq!(check_email("\"q\"@example.com"), Err(Violation::LocalChar));
        assert!(is_valid_email("-_+@example.com"));
    }

    #[test]
    fn test_domain_rules() {
        assert_eq!(check_email("user@.example.com"), Err(Violation::DomainEdge));
        assert_eq!(check_email("user@example.com."), Err(Violation::DomainEdge));
        assert_eq!(check_email("user@example.com-"), Err(Violation::DomainEdge));
        assert_eq!(check_email("user@localhost"), Err(Violation::DomainMissingDot));
        assert_eq!(
            check_email("user@example..com"),
            Err(Violation::DomainConsecutiveDots)
        );
        assert_eq!(check_email("user@exa_mple.com"), Err(Violation::DomainChar));
        assert_eq!(check_email("user@[127.0.0.1]"), Err(Violation::DomainChar));
        // Hyphens are allowed inside labels, including next to a dot.
        assert!(is_valid_email("user@ex-.-ample.com"));
    }

    #[test]
    fn test_top_level_uses_last_dot() {
        assert!(is_valid_email("user@a.b.cd"));
        assert_eq!(
            check_email("user@example.co.u"),
            Err(Violation::TopLevelTooShort)
        );
    }

    #[test]
    fn test_rule_order() {
        // Whitespace is reported before the '@' count.
        assert_eq!(check_email("no at sign"), Err(Violation::Whitespace));
        // Local part is checked before the domain.
        assert_eq!(check_email(".user@example"), Err(Violation::LocalDotEdge));
    }

    #[test]
    fn test_non_ascii_is_invalid() {
        assert!(!is_valid_email("josé@example.com"));
        assert!(!is_valid_email("user@exämple.com"));
        assert!(!is_valid_email_bytes(b"user@ex\xffmple.com"));
        assert!(is_valid_email_bytes(b"user@example.com"));
    }

    #[test]
    fn test_deterministic() {
        let inputs = ["user@example.com", "bad@", "a@b.co", ""];
        let first: Vec<_> = inputs.iter().map(|s| check_email(s)).collect();
        let second: Vec<_> = inputs.iter().map(|s| check_email(s)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_violation_display() {
        assert_eq!(
            Violation::Length.to_string(),
            "length must be between 5 and 255 characters"
        );
        assert_eq!(Violation::DomainChar.as_str(), "domain_char");
    }
}
