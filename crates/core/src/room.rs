use std::cmp::Ordering;
use std::fmt;

use crate::error::ValidationError;
use crate::field_value::{Document, FieldValue};
use crate::ids::RoomId;

/// Field names of a `rooms` document.
pub mod fields {
    pub const NAME: &str = "name";
    pub const GENDER: &str = "gender";
    pub const ROOM_NO: &str = "roomNo";
    pub const DATE: &str = "date";
    pub const IS_LOCKED: &str = "isLocked";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
    Lgbtq,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Lgbtq];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "MALE",
            Self::Female => "FEMALE",
            Self::Lgbtq => "LGBTQ",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "MALE" => Some(Self::Male),
            "FEMALE" => Some(Self::Female),
            "LGBTQ" => Some(Self::Lgbtq),
            _ => None,
        }
    }
}

/// Largest magnitude stored as an integer field.
const MAX_WHOLE: f64 = 9_007_199_254_740_991.0;

/// A room number as the store holds it: any finite number, fractions
/// included. Whole values are written as integer fields.
#[derive(Debug, Clone, Copy)]
pub struct RoomNo(f64);

impl RoomNo {
    /// Reads numeric text. Empty, non-numeric and non-finite input is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        s.parse::<f64>().ok().and_then(Self::from_f64)
    }

    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        // -0 and 0 are the same room.
        Some(Self(if value == 0.0 { 0.0 } else { value }))
    }

    pub fn as_f64(&self) -> f64 {
        self.0
    }

    pub fn as_integer(&self) -> Option<i64> {
        (self.0.fract() == 0.0 && self.0.abs() <= MAX_WHOLE).then_some(self.0 as i64)
    }

    pub fn to_field_value(&self) -> FieldValue {
        match self.as_integer() {
            Some(n) => FieldValue::Integer(n),
            None => FieldValue::Float(self.0),
        }
    }
}

impl From<i64> for RoomNo {
    fn from(n: i64) -> Self {
        Self(n as f64)
    }
}

impl PartialEq for RoomNo {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RoomNo {}

impl PartialOrd for RoomNo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RoomNo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for RoomNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_integer() {
            Some(n) => write!(f, "{n}"),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Raw add/edit form input, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomFields {
    pub name: String,
    pub gender: String,
    pub room_no: String,
}

impl RoomFields {
    pub fn new(name: impl Into<String>, gender: impl Into<String>, room_no: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            gender: gender.into(),
            room_no: room_no.into(),
        }
    }

    /// Prefill for the edit form. Falls back to the id when the record has
    /// no readable room number.
    pub fn from_record(record: &RoomRecord) -> Self {
        let room_no = match record.room_no {
            Some(n) => n.to_string(),
            None => record.id.to_string(),
        };
        Self {
            name: record.name.clone(),
            gender: record.gender.clone(),
            room_no,
        }
    }

    pub fn validate(&self) -> Result<ValidRoom, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingField(fields::NAME));
        }
        if self.gender.is_empty() {
            return Err(ValidationError::MissingField(fields::GENDER));
        }
        let gender = Gender::parse(&self.gender)
            .ok_or_else(|| ValidationError::UnknownGender(self.gender.clone()))?;
        let raw_room_no = self.room_no.trim();
        if raw_room_no.is_empty() {
            return Err(ValidationError::MissingField(fields::ROOM_NO));
        }
        let room_no = RoomNo::parse(raw_room_no)
            .ok_or_else(|| ValidationError::InvalidRoomNo(self.room_no.clone()))?;
        Ok(ValidRoom {
            name: name.to_string(),
            gender,
            id: RoomId::new(raw_room_no),
            room_no,
        })
    }
}

/// Form input that passed validation. `name` is trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRoom {
    pub name: String,
    pub gender: Gender,
    /// The room number text as typed, trimmed.
    pub id: RoomId,
    pub room_no: RoomNo,
}

impl ValidRoom {
    /// The id a new room is stored under: the typed room number, not its
    /// numeric reading, so "007" stays "007".
    pub fn derived_id(&self) -> RoomId {
        self.id.clone()
    }

    /// Full document written by create. Always unlocked.
    pub fn create_document(&self, date: &str) -> Document {
        let mut doc = self.update_fields(date);
        doc.insert(fields::IS_LOCKED.into(), FieldValue::Boolean(false));
        doc
    }

    /// Fields written by update. Leaves `isLocked` alone.
    pub fn update_fields(&self, date: &str) -> Document {
        let mut doc = Document::new();
        doc.insert(fields::NAME.into(), FieldValue::Text(self.name.clone()));
        doc.insert(fields::GENDER.into(), FieldValue::Text(self.gender.as_str().into()));
        doc.insert(fields::ROOM_NO.into(), self.room_no.to_field_value());
        doc.insert(fields::DATE.into(), FieldValue::Text(date.to_string()));
        doc
    }
}

pub fn lock_fields(is_locked: bool) -> Document {
    let mut doc = Document::new();
    doc.insert(fields::IS_LOCKED.into(), FieldValue::Boolean(is_locked));
    doc
}

/// A cached room row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomRecord {
    pub id: RoomId,
    pub name: String,
    pub gender: String,
    /// `None` when neither the stored `roomNo` nor the id reads as a number.
    pub room_no: Option<RoomNo>,
    pub date: String,
    pub is_locked: bool,
}

impl RoomRecord {
    /// Reads a stored document, substituting defaults for missing fields.
    pub fn from_document(id: RoomId, doc: &Document) -> Self {
        let text = |key: &str| {
            doc.get(key)
                .and_then(FieldValue::as_text)
                .unwrap_or_default()
                .to_string()
        };
        let room_no = match doc.get(fields::ROOM_NO) {
            Some(v) if !v.is_null() => v.as_number().and_then(RoomNo::from_f64),
            _ => id.as_room_no(),
        };
        let is_locked = doc
            .get(fields::IS_LOCKED)
            .and_then(FieldValue::as_boolean)
            .unwrap_or(false);
        Self {
            name: text(fields::NAME),
            gender: text(fields::GENDER),
            date: text(fields::DATE),
            room_no,
            is_locked,
            id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_trims_name() {
        let valid = RoomFields::new("  Asha ", "FEMALE", "12").validate().unwrap();
        assert_eq!(valid.name, "Asha");
        assert_eq!(valid.gender, Gender::Female);
        assert_eq!(valid.room_no, RoomNo::from(12));
        assert_eq!(valid.derived_id(), RoomId::new("12"));
    }

    #[test]
    fn derived_id_keeps_typed_text() {
        let valid = RoomFields::new("Asha", "FEMALE", " 007 ").validate().unwrap();
        assert_eq!(valid.derived_id(), RoomId::new("007"));
        assert_eq!(valid.room_no, RoomNo::from(7));
        let doc = valid.create_document("2025-01-01T00:00:00.000Z");
        assert_eq!(doc.get("roomNo"), Some(&FieldValue::Integer(7)));
    }

    #[test]
    fn fractional_room_no_is_kept() {
        let valid = RoomFields::new("Asha", "FEMALE", "12.5").validate().unwrap();
        assert_eq!(valid.derived_id(), RoomId::new("12.5"));
        let doc = valid.update_fields("2025-01-01T00:00:00.000Z");
        assert_eq!(doc.get("roomNo"), Some(&FieldValue::Float(12.5)));

        let record = RoomRecord::from_document(RoomId::new("12.5"), &doc);
        assert_eq!(record.room_no.map(|n| n.as_f64()), Some(12.5));
        assert_eq!(RoomFields::from_record(&record).room_no, "12.5");
    }

    #[test]
    fn room_no_ordering_and_text() {
        let a = RoomNo::parse("5").unwrap();
        let b = RoomNo::parse("12.5").unwrap();
        let c = RoomNo::parse("100").unwrap();
        assert!(a < b && b < c);
        assert_eq!(RoomNo::parse("-0"), RoomNo::parse("0"));
        assert_eq!(RoomNo::parse("inf"), None);
        assert_eq!(RoomNo::parse("   "), None);
        assert_eq!(c.to_string(), "100");
        assert_eq!(b.to_string(), "12.5");
    }

    #[test]
    fn validate_reports_first_missing_field() {
        assert_eq!(
            RoomFields::new("   ", "MALE", "3").validate(),
            Err(ValidationError::MissingField("name"))
        );
        assert_eq!(
            RoomFields::new("Ravi", "", "3").validate(),
            Err(ValidationError::MissingField("gender"))
        );
        assert_eq!(
            RoomFields::new("Ravi", "MALE", "").validate(),
            Err(ValidationError::MissingField("roomNo"))
        );
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert_eq!(
            RoomFields::new("Ravi", "OTHER", "3").validate(),
            Err(ValidationError::UnknownGender("OTHER".into()))
        );
        assert_eq!(
            RoomFields::new("Ravi", "MALE", "3b").validate(),
            Err(ValidationError::InvalidRoomNo("3b".into()))
        );
    }

    #[test]
    fn create_document_is_unlocked() {
        let valid = RoomFields::new("Asha", "FEMALE", "12").validate().unwrap();
        let doc = valid.create_document("2025-01-01T00:00:00.000Z");
        assert_eq!(doc.get("isLocked"), Some(&FieldValue::Boolean(false)));
        assert_eq!(doc.get("roomNo"), Some(&FieldValue::Integer(12)));
        assert_eq!(doc.get("gender"), Some(&FieldValue::Text("FEMALE".into())));
        assert_eq!(doc.len(), 5);

        let update = valid.update_fields("2025-01-01T00:00:00.000Z");
        assert!(!update.contains_key("isLocked"));
    }

    #[test]
    fn from_document_applies_defaults() {
        let record = RoomRecord::from_document(RoomId::new("7"), &Document::new());
        assert_eq!(record.name, "");
        assert_eq!(record.gender, "");
        assert_eq!(record.date, "");
        assert_eq!(record.room_no, Some(RoomNo::from(7)));
        assert!(!record.is_locked);
    }

    #[test]
    fn stored_room_no_wins_over_id() {
        let mut doc = Document::new();
        doc.insert("roomNo".into(), FieldValue::Integer(40));
        let record = RoomRecord::from_document(RoomId::new("4"), &doc);
        assert_eq!(record.id, RoomId::new("4"));
        assert_eq!(record.room_no, Some(RoomNo::from(40)));
    }

    #[test]
    fn edit_prefill_falls_back_to_id() {
        let record = RoomRecord {
            id: RoomId::new("annex"),
            name: "Kiran".into(),
            gender: "LGBTQ".into(),
            room_no: None,
            date: String::new(),
            is_locked: false,
        };
        let fields = RoomFields::from_record(&record);
        assert_eq!(fields.room_no, "annex");
        assert_eq!(fields.gender, "LGBTQ");
    }

    #[test]
    fn gender_names_round_trip() {
        for g in Gender::ALL {
            assert_eq!(Gender::parse(g.as_str()), Some(g));
        }
    }
}
