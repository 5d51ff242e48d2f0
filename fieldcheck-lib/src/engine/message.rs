//! Message composition

use crate::error::ConfigurationError;
use crate::translate::{Translator, fill_placeholders};

/// Resolves the message of one failed validator.
///
/// Alternate text wins over the default key. It is first tried as a
/// translation key of its own and otherwise used verbatim, placeholders
/// filled either way.
pub(crate) async fn resolve(
    translator: &dyn Translator,
    key: &str,
    params: &[String],
    alt_text: Option<&str>,
) -> Result<String, ConfigurationError> {
    if let Some(alt) = alt_text {
        return Ok(match translator.resolve(alt, params).await {
            Ok(text) => text,
            Err(_) => fill_placeholders(alt, params),
        });
    }
    translator
        .resolve(key, params)
        .await
        .map_err(|source| ConfigurationError::Translation {
            key: key.to_string(),
            source,
        })
}

/// Joins messages with `separator`, or keeps only the last one.
pub(crate) fn compose(messages: &[String], separator: &str, only_last: bool) -> String {
    if only_last {
        return messages.last().cloned().unwrap_or_default();
    }
    messages.join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::MessageTable;

    #[tokio::test]
    async fn test_alt_text_verbatim() {
        let table = MessageTable::english();
        let text = resolve(&table, "INVALID_MIN_CHAR", &["3".into()], Some("At least :param please"))
            .await
            .unwrap();
        assert_eq!(text, "At least 3 please");
    }

    #[tokio::test]
    async fn test_alt_text_as_key() {
        let table = MessageTable::new().with_message("MY_KEY", "Mine: :param");
        let text = resolve(&table, "INVALID_MIN_CHAR", &["3".into()], Some("MY_KEY")).await.unwrap();
        assert_eq!(text, "Mine: 3");
    }

    #[tokio::test]
    async fn test_missing_translation_is_fatal() {
        let err = resolve(&MessageTable::new(), "INVALID_EMAIL", &[], None).await.unwrap_err();
        assert!(matches!(err, ConfigurationError::Translation { .. }));
    }

    #[test]
    fn test_compose() {
        let messages = vec!["a".to_string(), "b".to_string()];
        assert_eq!(compose(&messages, " ", false), "a b");
        assert_eq!(compose(&messages, " ", true), "b");
        assert_eq!(compose(&[], " ", true), "");
    }
}
