use serde::{Deserialize, Serialize};

/// Case-insensitive substring matcher over ingredient names.
///
/// An ingredient matches when it contains any keyword and none of the exception phrases
/// (e.g. "oat milk" is exempt from a dairy "milk" keyword).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordMatcher {
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exceptions: Vec<String>,
}

impl KeywordMatcher {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
            exceptions: Vec::new(),
        }
    }

    pub fn except<I, S>(mut self, exceptions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exceptions = exceptions.into_iter().map(Into::into).collect();
        self
    }

    /// `ingredient` must already be lowercase.
    pub fn matches(&self, ingredient: &str) -> bool {
        if self
            .exceptions
            .iter()
            .any(|phrase| ingredient.contains(phrase.as_str()))
        {
            return false;
        }
        self.keywords
            .iter()
            .any(|keyword| ingredient.contains(keyword.as_str()))
    }

    /// Returns the display names of every ingredient that matches, in input order.
    pub fn matching<'a>(&self, ingredients: &'a [IngredientName]) -> Vec<&'a str> {
        ingredients
            .iter()
            .filter(|ingredient| self.matches(&ingredient.lower))
            .map(|ingredient| ingredient.display.as_str())
            .collect()
    }

    pub(crate) fn is_blank(&self) -> bool {
        self.keywords.iter().all(|keyword| keyword.trim().is_empty())
    }

    pub(crate) fn normalize(&mut self) {
        for keyword in self.keywords.iter_mut().chain(self.exceptions.iter_mut()) {
            *keyword = keyword.trim().to_lowercase();
        }
        self.keywords.retain(|keyword| !keyword.is_empty());
        self.exceptions.retain(|phrase| !phrase.is_empty());
    }
}

/// Keyword table entry that adds a fixed increment per matching ingredient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    #[serde(flatten)]
    pub matcher: KeywordMatcher,
    pub points_per_match: i16,
}

impl KeywordRule {
    pub fn new<I, S>(keywords: I, points_per_match: i16) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            matcher: KeywordMatcher::new(keywords),
            points_per_match,
        }
    }
}

/// Exclusion rule for one dietary restriction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestrictionRule {
    #[serde(flatten)]
    pub matcher: KeywordMatcher,
    pub penalty: i16,
    pub reward: i16,
    #[serde(default)]
    pub allergen_severity: bool,
}

/// Ingredient name paired with its lowercase form for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientName {
    pub display: String,
    pub lower: String,
}

impl IngredientName {
    pub fn new(display: &str) -> Self {
        let display = display.trim().to_string();
        let lower = display.to_lowercase();
        Self { display, lower }
    }

    pub fn list(names: &[String]) -> Vec<Self> {
        let mut seen = std::collections::BTreeSet::new();
        names
            .iter()
            .map(|name| Self::new(name))
            .filter(|name| !name.lower.is_empty() && seen.insert(name.lower.clone()))
            .collect()
    }
}

/// Joins names as "a", "a and b", or "a, b and c".
pub fn join_names(names: &[&str]) -> String {
    match names {
        [] => String::new(),
        [only] => (*only).to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exceptions_override_keywords() {
        let dairy = KeywordMatcher::new(["milk", "yogurt"]).except(["oat milk", "coconut"]);

        assert!(dairy.matches("whole milk"));
        assert!(dairy.matches("greek yogurt"));
        assert!(!dairy.matches("oat milk"));
        assert!(!dairy.matches("coconut yogurt"));
        assert!(!dairy.matches("banana"));
    }

    #[test]
    fn matching_reports_display_names_once() {
        let names = IngredientName::list(&[
            "Almond Butter".to_string(),
            "almond butter".to_string(),
            "Banana".to_string(),
        ]);
        let nuts = KeywordMatcher::new(["almond"]);

        assert_eq!(nuts.matching(&names), vec!["Almond Butter"]);
    }

    #[test]
    fn join_names_reads_naturally() {
        assert_eq!(join_names(&[]), "");
        assert_eq!(join_names(&["kale"]), "kale");
        assert_eq!(join_names(&["kale", "spinach"]), "kale and spinach");
        assert_eq!(
            join_names(&["kale", "spinach", "mango"]),
            "kale, spinach and mango"
        );
    }
}
