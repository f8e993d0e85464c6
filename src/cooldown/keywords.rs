//! Keyword list used to flag closed pull requests from reviewer comments.

/// Lower-cased, non-blank keywords matched case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keywords(Vec<String>);

impl Keywords {
    /// Normalises the supplied keywords, dropping blank entries.
    #[must_use]
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            keywords
                .into_iter()
                .map(|keyword| keyword.as_ref().trim().to_lowercase())
                .filter(|keyword| !keyword.is_empty())
                .collect(),
        )
    }

    /// True when no keywords are configured.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if `body` contains any keyword, ignoring case.
    #[must_use]
    pub fn matches(&self, body: &str) -> bool {
        let haystack = body.to_lowercase();
        self.0.iter().any(|keyword| haystack.contains(keyword.as_str()))
    }

    #[cfg(test)]
    fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}
