/// Title classifier for sequel and franchise detection
///
/// A tagged list of literal patterns matched against the lower-cased title.
/// Kept apart from the scoring arithmetic so the lists can be configured and
/// tested on their own.
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// Sequel, remake or reboot marker ("2", "part", "reboot")
    Sequel,
    /// Known famous title or franchise fragment ("years later")
    Franchise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Anywhere in the title
    Substring,
    /// As a whole whitespace/punctuation-delimited word
    Word,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitlePattern {
    pub kind: PatternKind,
    pub mode: MatchMode,
    literal: String,
}

impl TitlePattern {
    pub fn new(kind: PatternKind, mode: MatchMode, literal: &str) -> Self {
        Self {
            kind,
            mode,
            literal: literal.trim().to_lowercase(),
        }
    }

    /// Parses a configured token; a `=` prefix requests whole-word matching
    pub fn parse(kind: PatternKind, token: &str) -> Option<Self> {
        let token = token.trim();
        let (mode, literal) = match token.strip_prefix('=') {
            Some(rest) => (MatchMode::Word, rest),
            None => (MatchMode::Substring, token),
        };
        if literal.trim().is_empty() {
            return None;
        }
        Some(Self::new(kind, mode, literal))
    }

    pub fn literal(&self) -> &str {
        &self.literal
    }

    /// `title` must already be lower-cased
    fn matches(&self, title: &str) -> bool {
        match self.mode {
            MatchMode::Substring => title.contains(&self.literal),
            MatchMode::Word => title
                .split(|c: char| !c.is_alphanumeric())
                .any(|word| word == self.literal),
        }
    }
}

/// What the classifier found in a title
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TitleTraits {
    pub sequel: bool,
    pub franchise: bool,
    pub has_digit: bool,
}

#[derive(Debug, Clone)]
pub struct TitleClassifier {
    patterns: Vec<TitlePattern>,
}

pub const DEFAULT_SEQUEL_TOKENS: &[&str] = &[
    "2", "3", "4", "5", "6", "7", "8", "9", "10", "part", "sequel", "remake", "reboot", "=ii",
    "=iii", "=iv",
];

pub const DEFAULT_FRANCHISE_PATTERNS: &[&str] =
    &["years later", "happy", "gilmore", "sitaare", "zameen", "par"];

impl Default for TitleClassifier {
    fn default() -> Self {
        Self::from_tokens(DEFAULT_SEQUEL_TOKENS, DEFAULT_FRANCHISE_PATTERNS)
    }
}

impl TitleClassifier {
    pub fn new(patterns: Vec<TitlePattern>) -> Self {
        Self { patterns }
    }

    /// Builds a classifier from configured token lists
    pub fn from_tokens<S: AsRef<str>>(sequel_tokens: &[S], franchise_patterns: &[S]) -> Self {
        let sequels = sequel_tokens
            .iter()
            .filter_map(|t| TitlePattern::parse(PatternKind::Sequel, t.as_ref()));
        let franchises = franchise_patterns
            .iter()
            .filter_map(|t| TitlePattern::parse(PatternKind::Franchise, t.as_ref()));

        Self::new(sequels.chain(franchises).collect())
    }

    pub fn patterns(&self) -> &[TitlePattern] {
        &self.patterns
    }

    pub fn push(&mut self, pattern: TitlePattern) {
        self.patterns.push(pattern);
    }

    pub fn classify(&self, title: &str) -> TitleTraits {
        let lowered = title.to_lowercase();
        let mut traits = TitleTraits {
            has_digit: lowered.chars().any(|c| c.is_ascii_digit()),
            ..TitleTraits::default()
        };

        for pattern in self.patterns.iter().filter(|p| p.matches(&lowered)) {
            match pattern.kind {
                PatternKind::Sequel => traits.sequel = true,
                PatternKind::Franchise => traits.franchise = true,
            }
        }

        traits
    }
}
