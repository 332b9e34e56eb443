//! Domain name normalization.
//!
//! Turns whatever arrives in a `Host` header or query parameter into the
//! registrable root domain that gets printed on the banner. None of these
//! functions fail: malformed input degrades to `localhost` / `X`.

/// Host used when the input is empty or cannot be split into labels.
pub const FALLBACK_HOST: &str = "localhost";

/// Letter used when the second-level label has no alphanumeric character.
pub const FALLBACK_LETTER: char = 'X';

/// Second-level labels that sit under a country TLD (`example.co.uk`,
/// `shop.com.vn`). Approximates the public suffix list without shipping it.
const COUNTRY_SECOND_LEVEL: &[&str] = &[
    "co", "com", "net", "org", "gov", "edu", "ac", "mil", "go", "ne", "or",
];

/// Trailing labels that get split off and painted with the brand gradient.
const GRADIENT_SUFFIXES: &[&str] = &[
    "io", "net", "com", "ai", "app", "dev", "co", "me", "gg", "org", "vn",
];

/// A domain split for two-tone rendering.
///
/// `main` keeps the trailing dot (`"netproxy."`) so the two runs can be drawn
/// back to back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainParts {
    pub main: String,
    pub suffix: String,
}

impl DomainParts {
    /// The full text as it appears on the banner.
    pub fn joined(&self) -> String {
        format!("{}{}", self.main, self.suffix)
    }

    pub fn has_suffix(&self) -> bool {
        !self.suffix.is_empty()
    }
}

/// Strips scheme, `www.`, path, query, fragment and port, then lower-cases.
pub fn normalize_host(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return FALLBACK_HOST.to_string();
    }

    let no_scheme = strip_prefix_ignore_case(trimmed, "https://")
        .or_else(|| strip_prefix_ignore_case(trimmed, "http://"))
        .unwrap_or(trimmed);
    let no_www = strip_prefix_ignore_case(no_scheme, "www.").unwrap_or(no_scheme);

    let host = no_www
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let host = host.split(':').next().unwrap_or_default();

    host.trim().to_lowercase()
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

/// Reduces a host to its registrable domain.
///
/// `www.shop.example.co.uk` becomes `example.co.uk`, `a.b.example.com`
/// becomes `example.com`.
pub fn root_domain(input: &str) -> String {
    let host = normalize_host(input);
    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();

    match labels.as_slice() {
        [] => FALLBACK_HOST.to_string(),
        [_] | [_, _] => labels.join("."),
        [.., third, second, last] if COUNTRY_SECOND_LEVEL.contains(second) => {
            format!("{third}.{second}.{last}")
        }
        [.., second, last] => format!("{second}.{last}"),
    }
}

/// The first label of the root domain (`example` for `www.example.co.uk`).
pub fn sld_label(input: &str) -> String {
    let root = root_domain(input);
    root.split('.').next().unwrap_or(FALLBACK_HOST).to_string()
}

/// First alphanumeric character of the second-level label, upper-cased.
pub fn first_letter_of_domain(input: &str) -> char {
    sld_label(input)
        .chars()
        .find(char::is_ascii_alphanumeric)
        .map_or(FALLBACK_LETTER, |c| c.to_ascii_uppercase())
}

/// Splits a recognised trailing label off the domain.
pub fn split_domain_for_gradient(domain: &str) -> DomainParts {
    let whole = || DomainParts {
        main: domain.to_string(),
        suffix: String::new(),
    };

    let Some(dot) = domain.rfind('.') else {
        return whole();
    };
    if dot == 0 || dot == domain.len() - 1 {
        return whole();
    }

    let suffix = &domain[dot + 1..];
    let known = GRADIENT_SUFFIXES
        .iter()
        .any(|s| s.eq_ignore_ascii_case(suffix));
    if !known {
        return whole();
    }

    DomainParts {
        main: domain[..=dot].to_string(),
        suffix: suffix.to_string(),
    }
}
