//! Image record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::{ImageMetadata, RecordUpdate};
use crate::classify::{Classification, PageType};
use crate::numbering::{NumberType, PageNumber};

/// One scanned image and everything decided about it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Assigned at ingestion
    pub id: Uuid,
    /// Sole sort key for every sequence operation
    pub original_filename: String,
    #[serde(rename = "type")]
    pub page_type: PageType,
    /// Set by automatic classification only
    pub confidence: f32,
    pub validated: bool,
    pub page_number: Option<PageNumber>,
    pub number_type: NumberType,
    pub number_exception: Option<String>,
    /// Number is sequential but not printed on the page
    pub phantom_number: bool,
    #[serde(default)]
    pub metadata: ImageMetadata,
    pub created_at: DateTime<Utc>,
}

impl ImageRecord {
    /// Create an unvalidated, unnumbered record from a classification
    pub fn new(original_filename: impl Into<String>, classification: Classification) -> Self {
        Self {
            id: Uuid::new_v4(),
            original_filename: original_filename.into(),
            page_type: classification.page_type,
            confidence: classification.confidence,
            validated: false,
            page_number: None,
            number_type: NumberType::Arabic,
            number_exception: None,
            phantom_number: false,
            metadata: ImageMetadata::default(),
            created_at: Utc::now(),
        }
    }

    /// Attach ingestion metadata
    #[must_use]
    pub fn with_metadata(mut self, metadata: ImageMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Current type and confidence
    pub fn classification(&self) -> Classification {
        Classification::new(self.page_type, self.confidence)
    }

    /// Replace type and confidence with a new automatic classification
    pub fn reclassify(&mut self, classification: Classification) {
        self.page_type = classification.page_type;
        self.confidence = classification.confidence;
    }

    /// Apply a manual edit; confidence is never touched
    pub fn apply(&mut self, update: &RecordUpdate) {
        if let Some(page_type) = update.page_type {
            self.page_type = page_type;
        }
        if let Some(number) = &update.page_number {
            if let Some(value) = number {
                self.number_type = value.number_type();
            }
            self.page_number = number.clone();
        }
        if let Some(number_type) = update.number_type {
            self.number_type = number_type;
        }
        if let Some(exception) = &update.number_exception {
            self.number_exception = exception
                .as_deref()
                .map(str::trim)
                .filter(|suffix| !suffix.is_empty())
                .map(str::to_string);
        }
        if let Some(phantom) = update.phantom_number {
            self.phantom_number = phantom;
        }
        if let Some(validated) = update.validated {
            self.validated = validated;
        }
    }

    /// Page number as rendered: bracketed when phantom, with any exception suffix
    pub fn display_number(&self) -> Option<String> {
        let number = self.page_number.as_ref()?;
        let mut rendered = if self.phantom_number {
            format!("[{}]", number)
        } else {
            number.to_string()
        };
        if let Some(exception) = &self.number_exception {
            rendered.push(' ');
            rendered.push_str(exception);
        }
        Some(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ImageRecord {
        ImageRecord::new("IMG_0042.jpg", Classification::new(PageType::Text, 0.7))
    }

    #[test]
    fn test_new_record_defaults() {
        let record = record();
        assert_eq!(record.original_filename, "IMG_0042.jpg");
        assert_eq!(record.page_type, PageType::Text);
        assert!(!record.validated);
        assert_eq!(record.page_number, None);
        assert_eq!(record.number_type, NumberType::Arabic);
        assert!(!record.phantom_number);
        assert!(record.number_exception.is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(record().id, record().id);
    }

    #[test]
    fn test_apply_keeps_confidence() {
        let mut record = record();
        record.apply(
            &RecordUpdate::new()
                .page_type(PageType::Cover)
                .validated(true),
        );
        assert_eq!(record.page_type, PageType::Cover);
        assert!(record.validated);
        assert!((record.confidence - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_apply_number_sets_type() {
        let mut record = record();
        record.apply(&RecordUpdate::new().page_number(PageNumber::Roman("IV".into())));
        assert_eq!(record.number_type, NumberType::Roman);

        // An explicit number type wins
        record.apply(
            &RecordUpdate::new()
                .page_number(PageNumber::Arabic(4))
                .number_type(NumberType::Roman),
        );
        assert_eq!(record.page_number, Some(PageNumber::Arabic(4)));
        assert_eq!(record.number_type, NumberType::Roman);

        record.apply(&RecordUpdate::new().clear_page_number());
        assert_eq!(record.page_number, None);
    }

    #[test]
    fn test_apply_blank_exception_is_none() {
        let mut record = record();
        record.number_exception = Some("bis".into());

        let update = RecordUpdate {
            number_exception: Some(Some("  ".into())),
            ..Default::default()
        };
        record.apply(&update);

        assert_eq!(record.number_exception, None);
    }

    #[test]
    fn test_display_number() {
        let mut record = record();
        assert_eq!(record.display_number(), None);

        record.page_number = Some(PageNumber::Arabic(23));
        assert_eq!(record.display_number().as_deref(), Some("23"));

        record.number_exception = Some("bis".into());
        assert_eq!(record.display_number().as_deref(), Some("23 bis"));

        record.phantom_number = true;
        assert_eq!(record.display_number().as_deref(), Some("[23] bis"));
    }

    #[test]
    fn test_serialized_field_names() {
        let mut record = record();
        record.page_number = Some(PageNumber::Roman("II".into()));
        record.number_type = NumberType::Roman;
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "texto");
        assert_eq!(json["page_number"], "II");
        assert_eq!(json["number_type"], "roman");
        assert_eq!(json["phantom_number"], false);

        let back: ImageRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
