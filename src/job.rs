// Job identity and display-name normalization

use regex::Regex;
use std::sync::LazyLock;

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\-]+").expect("valid separator pattern"));
static CAMEL_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("valid camel pattern"));
static ACRONYM_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z]+)([A-Z][a-z])").expect("valid acronym pattern"));

/// Normalizes an engine display/application name into a stable snake_case
/// job name.
///
/// `MyXMLBasedApplication` becomes `my_xml_based_application`,
/// `A Test Application` becomes `a_test_application`. The conversion is
/// pure, so the same host application always maps to the same job name.
pub fn normalize_name(display_name: &str) -> String {
    let joined = SEPARATORS.replace_all(display_name.trim(), "_");
    let camel = CAMEL_BOUNDARY.replace_all(&joined, "${1}_${2}");
    let split = ACRONYM_BOUNDARY.replace_all(&camel, "${1}_${2}");
    split.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        let cases = [
            ("A Test Application", "a_test_application"),
            ("MyTestApplication", "my_test_application"),
            ("MyXMLBasedApplication", "my_xml_based_application"),
            ("JDBCRelationApplication", "jdbc_relation_application"),
            (
                "Test With a Single LetterBetweenWords",
                "test_with_a_single_letter_between_words",
            ),
        ];
        for (input, expected) in cases {
            assert_eq!(normalize_name(input), expected, "input: {}", input);
        }
    }

    #[test]
    fn test_normalize_is_stable() {
        assert_eq!(
            normalize_name("StreamingDeduplication"),
            normalize_name("StreamingDeduplication")
        );
        // Already-normalized names pass through unchanged
        assert_eq!(normalize_name("daily_orders_load"), "daily_orders_load");
    }
}
