use serde::{Deserialize, Serialize};

/// Source rows paired with the provider's translations.
///
/// `source_text` and `translation_text` are the comma-joined display forms
/// the host shows in its log.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationUnit {
    pub source: Vec<String>,
    pub translation: Vec<String>,
    pub source_text: String,
    pub translation_text: String,
}

impl TranslationUnit {
    pub fn new(source: Vec<String>, translation: Vec<String>) -> Self {
        let source_text = source.join(",");
        let translation_text = translation.join(",");
        Self {
            source,
            translation,
            source_text,
            translation_text,
        }
    }

    /// Concatenate units from consecutive batches, in order.
    pub fn merge(units: impl IntoIterator<Item = TranslationUnit>) -> Self {
        let mut source = Vec::new();
        let mut translation = Vec::new();
        for unit in units {
            source.extend(unit.source);
            translation.extend(unit.translation);
        }
        Self::new(source, translation)
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }
}
