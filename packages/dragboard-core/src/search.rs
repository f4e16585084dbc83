use regex::{Regex, RegexBuilder};
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub case_sensitive: bool,
    pub use_regex: bool,
}

/// Compiled search box query, matched against task content.
///
/// In plain mode the whole trimmed query is a single substring needle.
/// An empty query matches everything.
#[derive(Debug)]
pub struct SearchEngine {
    needle: Option<String>,
    regex_mode: Option<Regex>,
    regex_invalid: bool,
    case_sensitive: bool,
}

impl SearchEngine {
    pub fn compile(raw_query: &str, options: SearchOptions) -> Self {
        let query = raw_query.trim();

        if query.is_empty() {
            return Self {
                needle: None,
                regex_mode: None,
                regex_invalid: false,
                case_sensitive: options.case_sensitive,
            };
        }

        if options.use_regex {
            let (regex_mode, regex_invalid) = match RegexBuilder::new(query)
                .case_insensitive(!options.case_sensitive)
                .build()
            {
                Ok(regex) => (Some(regex), false),
                Err(e) => {
                    log::debug!("[dragboard.search] Invalid regex {:?}: {}", query, e);
                    (None, true)
                }
            };
            return Self {
                needle: None,
                regex_mode,
                regex_invalid,
                case_sensitive: options.case_sensitive,
            };
        }

        Self {
            needle: Some(normalize_case(query, options.case_sensitive)),
            regex_mode: None,
            regex_invalid: false,
            case_sensitive: options.case_sensitive,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_none() && self.regex_mode.is_none() && !self.regex_invalid
    }

    pub fn matches(&self, content: &str) -> bool {
        if self.regex_invalid {
            return false;
        }
        if let Some(regex) = &self.regex_mode {
            return regex.is_match(content);
        }
        match &self.needle {
            Some(needle) => normalize_case(content, self.case_sensitive).contains(needle.as_str()),
            None => true,
        }
    }
}

/// Unicode-aware normalization for search: lowercases, NFD-decomposes, and
/// strips combining marks (accents).
pub fn normalize_for_search(value: &str) -> String {
    value
        .to_lowercase()
        .nfd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .collect()
}

fn normalize_case(value: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        value.to_string()
    } else {
        normalize_for_search(value)
    }
}
