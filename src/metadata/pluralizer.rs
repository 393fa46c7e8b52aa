//! Name equality tolerant to case, separators and plurality.

/// Singular/plural conversion strategy used when comparing names
pub trait Pluralizer: Send + Sync {
    /// Return the plural form of a word
    fn pluralize(&self, word: &str) -> String;

    /// Return the singular form of a word
    fn singularize(&self, word: &str) -> String;
}

const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("foot", "feet"),
    ("tooth", "teeth"),
];

const UNCOUNTABLE: &[&str] = &["equipment", "information", "series", "species", "news", "data"];

/// Rule-based English pluralizer
#[derive(Debug, Default, Clone, Copy)]
pub struct EnglishPluralizer;

impl EnglishPluralizer {
    pub fn new() -> Self {
        EnglishPluralizer
    }
}

/// Re-apply the casing of `template` to a lower-case replacement of it
fn match_case(template: &str, replacement: &str) -> String {
    let mut result = String::with_capacity(replacement.len());
    let mut template_chars = template.chars();
    for c in replacement.chars() {
        match template_chars.next() {
            Some(t) if t.is_uppercase() => result.extend(c.to_uppercase()),
            _ => result.push(c),
        }
    }
    result
}

fn is_vowel(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u')
}

/// Split a PascalCase identifier so only its last word is inflected
fn split_last_word(word: &str) -> (&str, &str) {
    let idx = word
        .char_indices()
        .skip(1)
        .filter(|(_, c)| c.is_uppercase())
        .map(|(i, _)| i)
        .last()
        .unwrap_or(0);
    word.split_at(idx)
}

impl Pluralizer for EnglishPluralizer {
    fn pluralize(&self, word: &str) -> String {
        let (head, last) = split_last_word(word);
        let lower = last.to_lowercase();

        if lower.is_empty() || UNCOUNTABLE.contains(&lower.as_str()) {
            return word.to_string();
        }
        if let Some((_, plural)) = IRREGULAR.iter().find(|(s, p)| *s == lower || *p == lower) {
            return format!("{}{}", head, match_case(last, plural));
        }

        let plural = if lower.ends_with('s')
            || lower.ends_with('x')
            || lower.ends_with('z')
            || lower.ends_with("ch")
            || lower.ends_with("sh")
        {
            format!("{}es", last)
        } else if lower.ends_with('y') && !lower[..lower.len() - 1].ends_with(is_vowel) {
            format!("{}ies", &last[..last.len() - 1])
        } else {
            format!("{}s", last)
        };
        format!("{}{}", head, plural)
    }

    fn singularize(&self, word: &str) -> String {
        let (head, last) = split_last_word(word);
        let lower = last.to_lowercase();

        if lower.is_empty() || UNCOUNTABLE.contains(&lower.as_str()) {
            return word.to_string();
        }
        if let Some((singular, _)) = IRREGULAR.iter().find(|(s, p)| *p == lower || *s == lower) {
            return format!("{}{}", head, match_case(last, singular));
        }

        let singular = if lower.ends_with("ies") && lower.len() > 3 {
            format!("{}y", &last[..last.len() - 3])
        } else if lower.ends_with("sses")
            || lower.ends_with("xes")
            || lower.ends_with("zes")
            || lower.ends_with("ches")
            || lower.ends_with("shes")
        {
            last[..last.len() - 2].to_string()
        } else if lower.ends_with('s') && !lower.ends_with("ss") && lower.len() > 1 {
            last[..last.len() - 1].to_string()
        } else {
            last.to_string()
        };
        format!("{}{}", head, singular)
    }
}

/// Normalize a name for format-insensitive comparison
pub fn homogenize(name: &str, ignore_case: bool) -> String {
    let stripped = name.chars().filter(|c| *c != '_' && *c != '-');
    if ignore_case {
        stripped.flat_map(char::to_lowercase).collect()
    } else {
        stripped.collect()
    }
}

/// Name-equality policy shared by every resolver lookup
#[derive(Clone, Copy)]
pub struct NameMatcher<'a> {
    pluralizer: Option<&'a dyn Pluralizer>,
    ignore_case: bool,
}

impl<'a> NameMatcher<'a> {
    pub fn new(pluralizer: Option<&'a dyn Pluralizer>, ignore_case: bool) -> Self {
        NameMatcher {
            pluralizer,
            ignore_case,
        }
    }

    /// Exact homogenized comparison, no plurality tolerance
    pub fn strict() -> Self {
        NameMatcher::new(None, true)
    }

    /// Check whether a schema name matches a requested name
    pub fn names_are_equal(&self, actual: &str, requested: &str) -> bool {
        let actual = homogenize(actual, self.ignore_case);
        if actual == homogenize(requested, self.ignore_case) {
            return true;
        }

        let Some(p) = self.pluralizer else {
            return false;
        };

        // PascalCase input inflects its last word; all-caps input only
        // inflects once folded
        let folded = self.ignore_case.then(|| requested.to_lowercase());
        std::iter::once(requested)
            .chain(folded.as_deref())
            .any(|word| {
                actual == homogenize(&p.singularize(word), self.ignore_case)
                    || actual == homogenize(&p.pluralize(word), self.ignore_case)
            })
    }
}

impl std::fmt::Debug for NameMatcher<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NameMatcher")
            .field("pluralizer", &self.pluralizer.is_some())
            .field("ignore_case", &self.ignore_case)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pluralize() {
        let p = EnglishPluralizer::new();
        assert_eq!(p.pluralize("Product"), "Products");
        assert_eq!(p.pluralize("Category"), "Categories");
        assert_eq!(p.pluralize("Box"), "Boxes");
        assert_eq!(p.pluralize("Day"), "Days");
        assert_eq!(p.pluralize("Person"), "People");
        assert_eq!(p.pluralize("OrderDetail"), "OrderDetails");
        assert_eq!(p.pluralize("SalesPerson"), "SalesPeople");
    }

    #[test]
    fn test_singularize() {
        let p = EnglishPluralizer::new();
        assert_eq!(p.singularize("Products"), "Product");
        assert_eq!(p.singularize("Categories"), "Category");
        assert_eq!(p.singularize("Boxes"), "Box");
        assert_eq!(p.singularize("People"), "Person");
        assert_eq!(p.singularize("Address"), "Address");
        assert_eq!(p.singularize("Product"), "Product");
    }

    #[test]
    fn test_homogenize() {
        assert_eq!(homogenize("Order_Details", true), "orderdetails");
        assert_eq!(homogenize("Order-Details", false), "OrderDetails");
    }

    #[test]
    fn test_names_are_equal() {
        let p = EnglishPluralizer::new();
        let matcher = NameMatcher::new(Some(&p), true);
        assert!(matcher.names_are_equal("Products", "product"));
        assert!(matcher.names_are_equal("Product", "PRODUCTS"));
        assert!(matcher.names_are_equal("Categories", "category"));
        assert!(matcher.names_are_equal("Order_Details", "OrderDetail"));
        assert!(!matcher.names_are_equal("Products", "Orders"));
        assert!(matcher.names_are_equal("People", "PERSON"));
        assert!(matcher.names_are_equal("Person", "PEOPLE"));
        assert!(matcher.names_are_equal("SalesPeople", "SalesPerson"));

        let strict = NameMatcher::strict();
        assert!(strict.names_are_equal("Products", "products"));
        assert!(!strict.names_are_equal("Products", "Product"));

        let case_sensitive = NameMatcher::new(None, false);
        assert!(!case_sensitive.names_are_equal("Products", "products"));
    }
}
