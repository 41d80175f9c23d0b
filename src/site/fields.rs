//! Bindings between editable text on the page and the site document.
//!
//! Known paths map to a typed [`Field`]; anything else lands in
//! `SiteDocument::custom`, creating intermediate objects as needed.

use serde_json::{Map, Value};

use super::model::SiteDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    PersonalName,
    PersonalEmail,
    PersonalPhone,
    PersonalLocation,
    PersonalLinkedin,
    HeroHeadline,
    HeroSubtitle,
    AboutTitle,
    AboutIntro,
    AboutJourney,
    AboutVision,
}

impl Field {
    pub const ALL: [Field; 11] = [
        Field::PersonalName,
        Field::PersonalEmail,
        Field::PersonalPhone,
        Field::PersonalLocation,
        Field::PersonalLinkedin,
        Field::HeroHeadline,
        Field::HeroSubtitle,
        Field::AboutTitle,
        Field::AboutIntro,
        Field::AboutJourney,
        Field::AboutVision,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Field::PersonalName => "personal.name",
            Field::PersonalEmail => "personal.email",
            Field::PersonalPhone => "personal.phone",
            Field::PersonalLocation => "personal.location",
            Field::PersonalLinkedin => "personal.linkedin",
            Field::HeroHeadline => "hero.headline",
            Field::HeroSubtitle => "hero.subtitle",
            Field::AboutTitle => "about.title",
            Field::AboutIntro => "about.intro",
            Field::AboutJourney => "about.journey",
            Field::AboutVision => "about.vision",
        }
    }

    pub fn from_path(path: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.path() == path)
    }

    pub fn get(self, doc: &SiteDocument) -> &str {
        match self {
            Field::PersonalName => &doc.personal.name,
            Field::PersonalEmail => &doc.personal.email,
            Field::PersonalPhone => &doc.personal.phone,
            Field::PersonalLocation => &doc.personal.location,
            Field::PersonalLinkedin => &doc.personal.linkedin,
            Field::HeroHeadline => &doc.hero.headline,
            Field::HeroSubtitle => &doc.hero.subtitle,
            Field::AboutTitle => &doc.about.title,
            Field::AboutIntro => &doc.about.intro,
            Field::AboutJourney => &doc.about.journey,
            Field::AboutVision => &doc.about.vision,
        }
    }

    pub fn set(self, doc: &mut SiteDocument, value: String) {
        let slot = match self {
            Field::PersonalName => &mut doc.personal.name,
            Field::PersonalEmail => &mut doc.personal.email,
            Field::PersonalPhone => &mut doc.personal.phone,
            Field::PersonalLocation => &mut doc.personal.location,
            Field::PersonalLinkedin => &mut doc.personal.linkedin,
            Field::HeroHeadline => &mut doc.hero.headline,
            Field::HeroSubtitle => &mut doc.hero.subtitle,
            Field::AboutTitle => &mut doc.about.title,
            Field::AboutIntro => &mut doc.about.intro,
            Field::AboutJourney => &mut doc.about.journey,
            Field::AboutVision => &mut doc.about.vision,
        };
        *slot = value;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldPathError {
    #[error("Field path is empty")]
    Empty,

    #[error("Field path `{0}` has an empty segment")]
    EmptySegment(String),
}

/// A parsed dotted path such as `personal.name` or `footer.credits.year`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPath {
    Typed(Field),
    Custom(Vec<String>),
}

impl FieldPath {
    pub fn parse(path: &str) -> Result<Self, FieldPathError> {
        let path = path.trim();
        if path.is_empty() {
            return Err(FieldPathError::Empty);
        }
        if let Some(field) = Field::from_path(path) {
            return Ok(FieldPath::Typed(field));
        }
        let segments: Vec<String> = path.split('.').map(|s| s.trim().to_string()).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(FieldPathError::EmptySegment(path.to_string()));
        }
        Ok(FieldPath::Custom(segments))
    }

    pub fn as_string(&self) -> String {
        match self {
            FieldPath::Typed(field) => field.path().to_string(),
            FieldPath::Custom(segments) => segments.join("."),
        }
    }

    pub fn read(&self, doc: &SiteDocument) -> Option<String> {
        match self {
            FieldPath::Typed(field) => Some(field.get(doc).to_string()),
            FieldPath::Custom(segments) => {
                let (last, parents) = segments.split_last()?;
                let mut map = &doc.custom;
                for segment in parents {
                    map = map.get(segment)?.as_object()?;
                }
                map.get(last)?.as_str().map(str::to_string)
            }
        }
    }

    pub fn write(&self, doc: &mut SiteDocument, value: String) {
        match self {
            FieldPath::Typed(field) => field.set(doc, value),
            FieldPath::Custom(segments) => write_nested(&mut doc.custom, segments, value),
        }
    }
}

/// Walk `segments`, replacing any missing or non-object level with an empty object.
fn write_nested(root: &mut Map<String, Value>, segments: &[String], value: String) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };
    let mut map = root;
    for segment in parents {
        let entry = map
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        let Value::Object(inner) = entry else {
            return;
        };
        map = inner;
    }
    map.insert(last.clone(), Value::String(value));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::model::Personal;
    use serde_json::json;

    #[test]
    fn known_paths_parse_to_typed_fields() {
        assert_eq!(
            FieldPath::parse("personal.name").unwrap(),
            FieldPath::Typed(Field::PersonalName)
        );
        assert_eq!(
            FieldPath::parse(" about.vision ").unwrap(),
            FieldPath::Typed(Field::AboutVision)
        );
    }

    #[test]
    fn every_field_path_round_trips() {
        for field in Field::ALL {
            assert_eq!(Field::from_path(field.path()), Some(field));
        }
    }

    #[test]
    fn typed_write_then_read() {
        let mut doc = SiteDocument::default();
        let path = FieldPath::parse("personal.name").unwrap();
        path.write(&mut doc, "Jane Doe".into());
        assert_eq!(doc.personal.name, "Jane Doe");
        assert_eq!(path.read(&doc).as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn custom_paths_create_intermediate_levels() {
        let mut doc = SiteDocument::default();
        let path = FieldPath::parse("footer.credits.year").unwrap();
        path.write(&mut doc, "2026".into());
        assert_eq!(
            Value::Object(doc.custom.clone()),
            json!({ "footer": { "credits": { "year": "2026" } } })
        );
        assert_eq!(path.read(&doc).as_deref(), Some("2026"));
    }

    #[test]
    fn custom_write_replaces_scalar_parent() {
        let mut doc = SiteDocument::default();
        FieldPath::parse("footer")
            .unwrap()
            .write(&mut doc, "plain".into());
        FieldPath::parse("footer.note")
            .unwrap()
            .write(&mut doc, "nested".into());
        assert_eq!(doc.custom["footer"], json!({ "note": "nested" }));
    }

    #[test]
    fn unknown_leaf_under_known_section_is_custom() {
        let path = FieldPath::parse("personal.twitter").unwrap();
        assert_eq!(
            path,
            FieldPath::Custom(vec!["personal".into(), "twitter".into()])
        );
        let mut doc = SiteDocument::default();
        path.write(&mut doc, "@ada".into());
        assert_eq!(doc.personal, Personal::default());
        assert_eq!(path.read(&doc).as_deref(), Some("@ada"));
    }

    #[test]
    fn malformed_paths_are_rejected() {
        assert_eq!(FieldPath::parse("  "), Err(FieldPathError::Empty));
        assert!(matches!(
            FieldPath::parse("a..b"),
            Err(FieldPathError::EmptySegment(_))
        ));
        assert!(matches!(
            FieldPath::parse(".a"),
            Err(FieldPathError::EmptySegment(_))
        ));
    }

    #[test]
    fn missing_custom_path_reads_none() {
        let doc = SiteDocument::default();
        assert_eq!(FieldPath::parse("x.y").unwrap().read(&doc), None);
    }
}
