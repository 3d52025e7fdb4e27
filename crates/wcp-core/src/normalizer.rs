//! Normalizer: reduces free-text run identifiers to a canonical run key.
//!
//! Drivers type run numbers by hand, so the same run reaches Detrack as
//! `WCPNORTH - 8:00AM`, `WCPNORTH-8AM 01/05/26`, `NORTH 8AM` or `8am north`.
//! [`RunNormalizer::normalize`] maps every shape that names both a route and a
//! time to `WCP<ROUTE> - <TIME>`. Anything else comes back date-stripped and
//! trimmed but otherwise untouched, so the run stays recognisable in the
//! report even when it cannot be grouped.
//!
//! Processing order: strip date tokens → trim → `WCP` prefix or bare path →
//! extract route and time → canonicalise each through the alias tables.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

const WCP_PREFIX: &str = "WCP";

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

/// Accidental `DD/MM/YY` suffixes, plus whatever whitespace follows them.
///
/// Digit classes here and below are ASCII; `\d` matches any Unicode digit.
static DATE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{2}/[0-9]{2}/[0-9]{2}\s*").expect("date token pattern is valid"));

/// `8AM`, `8 am`, `10:30AM`, `12:00 pm`.
static TIME_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[0-9]{1,2}(?::[0-9]{2})?\s*(?:AM|PM)").expect("time token pattern is valid")
});

/// A compacted time with no minutes, e.g. `8AM`.
static BARE_HOUR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{1,2})(AM|PM)$").expect("bare hour pattern is valid"));

// ---------------------------------------------------------------------------
// Built-in alias tables
// ---------------------------------------------------------------------------

static BUILTIN_ROUTES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "NORTH" => "NORTH",
    "SOUTH" => "SOUTH",
    "GC" => "GC",
};

static BUILTIN_TIMES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "8:00AM" => "8:00AM",
    "8AM" => "8:00AM",
    "10:30AM" => "10:30AM",
    "12PM" => "12:00PM",
    "12:00PM" => "12:00PM",
    "1PM" => "1:00PM",
    "1:00PM" => "1:00PM",
};

// ---------------------------------------------------------------------------
// RunAliases
// ---------------------------------------------------------------------------

/// Route and time spelling variants, keyed by their compacted uppercase form.
///
/// The key set of the route table doubles as the route vocabulary: a variant
/// added here is also recognised during extraction. Every canonical value is
/// registered as an alias of itself so normalised keys stay stable when they
/// are normalised again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunAliases {
    routes: HashMap<String, String>,
    times: HashMap<String, String>,
}

impl RunAliases {
    /// The tables the report has always shipped with: `NORTH`, `SOUTH`, `GC`
    /// and the common morning/midday slots.
    pub fn builtin() -> Self {
        let aliases = Self::empty();
        let aliases = BUILTIN_ROUTES
            .entries()
            .fold(aliases, |a, (variant, canonical)| a.with_route(*variant, *canonical));
        BUILTIN_TIMES
            .entries()
            .fold(aliases, |a, (variant, canonical)| a.with_time(*variant, *canonical))
    }

    /// No routes and no time aliases. A normalizer built on this recognises no
    /// route, so every identifier falls back to its cleaned form.
    pub fn empty() -> Self {
        Self {
            routes: HashMap::new(),
            times: HashMap::new(),
        }
    }

    pub fn with_route(mut self, variant: &str, canonical: &str) -> Self {
        let canonical = route_key(canonical);
        self.routes.insert(canonical.clone(), canonical.clone());
        self.routes.insert(route_key(variant), canonical);
        self
    }

    pub fn with_time(mut self, variant: &str, canonical: &str) -> Self {
        let canonical = time_key(canonical);
        self.times.insert(canonical.clone(), canonical.clone());
        self.times.insert(time_key(variant), canonical);
        self
    }

    pub fn extend_routes<'a>(self, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        pairs
            .into_iter()
            .fold(self, |a, (variant, canonical)| a.with_route(variant, canonical))
    }

    pub fn extend_times<'a>(self, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        pairs
            .into_iter()
            .fold(self, |a, (variant, canonical)| a.with_time(variant, canonical))
    }

    pub fn route(&self, variant: &str) -> Option<&str> {
        self.routes.get(&route_key(variant)).map(String::as_str)
    }

    pub fn time(&self, variant: &str) -> Option<&str> {
        self.times.get(&time_key(variant)).map(String::as_str)
    }

    /// Every route spelling recognised during extraction.
    pub fn route_vocabulary(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }
}

impl Default for RunAliases {
    fn default() -> Self {
        Self::builtin()
    }
}

fn route_key(route: &str) -> String {
    route.trim().to_uppercase()
}

fn time_key(time: &str) -> String {
    time.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

// ---------------------------------------------------------------------------
// RunNormalizer
// ---------------------------------------------------------------------------

/// Canonicalises run identifiers using an injected [`RunAliases`] table.
#[derive(Debug, Clone)]
pub struct RunNormalizer {
    aliases: RunAliases,
    /// Whole-word, case-insensitive alternation over the route vocabulary.
    /// `None` when the vocabulary is empty.
    route_token: Option<Regex>,
}

impl RunNormalizer {
    pub fn new(aliases: RunAliases) -> Result<Self, regex::Error> {
        let route_token = route_pattern(&aliases)
            .map(|pattern| Regex::new(&pattern))
            .transpose()?;
        Ok(Self {
            aliases,
            route_token,
        })
    }

    pub fn aliases(&self) -> &RunAliases {
        &self.aliases
    }

    /// Map a raw run identifier to its canonical run key. Never fails.
    pub fn normalize(&self, raw: &str) -> String {
        let cleaned = DATE_TOKEN.replace_all(raw, "");
        let cleaned = cleaned.trim();

        match cleaned.strip_prefix(WCP_PREFIX) {
            Some(rest) => self.normalize_prefixed(rest),
            None => self.normalize_bare(cleaned),
        }
    }

    /// `WCPNORTH-8:00AM` and `WCP NORTH - 8:00AM` both land here with the
    /// prefix already removed.
    fn normalize_prefixed(&self, rest: &str) -> String {
        let rest = rest.replace('-', " ");
        self.canonical_key(&rest)
            .unwrap_or_else(|| format!("{WCP_PREFIX}{rest}"))
    }

    /// `NORTH 8AM`, `8am south`.
    fn normalize_bare(&self, cleaned: &str) -> String {
        self.canonical_key(cleaned)
            .unwrap_or_else(|| cleaned.to_string())
    }

    fn canonical_key(&self, s: &str) -> Option<String> {
        let route = self.extract_route(s)?;
        let time = extract_time(s)?;
        Some(format!(
            "{WCP_PREFIX}{} - {}",
            self.normalize_route(route),
            self.normalize_time(time)
        ))
    }

    /// First whole-word route token in `s`, as typed.
    pub fn extract_route<'a>(&self, s: &'a str) -> Option<&'a str> {
        self.route_token.as_ref()?.find(s).map(|m| m.as_str())
    }

    pub fn normalize_route(&self, route: &str) -> String {
        self.aliases
            .route(route)
            .map(str::to_string)
            .unwrap_or_else(|| route_key(route))
    }

    /// Compact and uppercase, then alias lookup, then `8AM` → `8:00AM`.
    pub fn normalize_time(&self, time: &str) -> String {
        if let Some(canonical) = self.aliases.time(time) {
            return canonical.to_string();
        }

        let compact = time_key(time);
        match BARE_HOUR.captures(&compact) {
            Some(caps) => format!("{}:00{}", &caps[1], &caps[2]),
            None => compact,
        }
    }
}

impl Default for RunNormalizer {
    fn default() -> Self {
        Self::new(RunAliases::builtin()).expect("built-in route vocabulary must compile")
    }
}

/// First time token in `s`, e.g. `8:00AM` or `12 pm`.
pub fn extract_time(s: &str) -> Option<&str> {
    TIME_TOKEN
        .find(s)
        .map(|m| m.as_str().trim())
        .filter(|t| !t.is_empty())
}

fn route_pattern(aliases: &RunAliases) -> Option<String> {
    let mut vocabulary: Vec<&str> = aliases
        .route_vocabulary()
        .filter(|route| !route.is_empty())
        .collect();
    if vocabulary.is_empty() {
        return None;
    }

    // Longest first so a variant never loses to one of its own prefixes;
    // alphabetical after that keeps the pattern stable across runs.
    vocabulary.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    let alternation = vocabulary
        .iter()
        .map(|route| regex::escape(route))
        .collect::<Vec<_>>()
        .join("|");
    // ASCII word boundaries, so a route glued to a non-ASCII letter still
    // stands alone.
    Some(format!(r"(?i)(?-u:\b)(?:{alternation})(?-u:\b)"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
