//! Library card model

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::services::cards::CardError;

/// Borrowing-rights category of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum CardType {
    #[serde(rename = "T")]
    Teacher,
    #[serde(rename = "S")]
    Student,
}

impl CardType {
    /// Accept either the localized display label or the short code
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "教师" | "T" => Some(CardType::Teacher),
            "学生" | "S" => Some(CardType::Student),
            _ => None,
        }
    }

    /// Parse a stored short code
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "T" => Some(CardType::Teacher),
            "S" => Some(CardType::Student),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            CardType::Teacher => "T",
            CardType::Student => "S",
        }
    }
}

impl std::fmt::Display for CardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Card record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Card {
    /// Assigned by the store on creation
    pub id: i32,
    pub name: String,
    pub department: String,
    #[serde(rename = "type")]
    pub card_type: CardType,
}

/// Registration candidate, not yet persisted
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct NewCard {
    #[validate(length(min = 1, message = "The card holder's name must not be empty."))]
    pub name: String,
    #[validate(length(min = 1, message = "The department must not be empty."))]
    pub department: String,
    pub card_type: CardType,
}

impl NewCard {
    pub fn new(name: &str, department: &str, card_type: CardType) -> Self {
        Self {
            name: name.trim().to_string(),
            department: department.trim().to_string(),
            card_type,
        }
    }

    /// Check the candidate, folding validator output into a single message
    pub fn check(&self) -> Result<(), CardError> {
        self.validate()
            .map_err(|errors| CardError::Invalid(describe(&errors)))
    }

    pub fn into_card(self, id: i32) -> Card {
        Card {
            id,
            name: self.name,
            department: self.department,
            card_type: self.card_type,
        }
    }
}

fn describe(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("Invalid value for {}.", field),
            })
        })
        .collect();
    messages.sort();
    messages.join(" ")
}

/// Body of `POST /card`
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CardRequest {
    /// Target card for `remove`
    pub id: Option<i32>,
    pub name: Option<String>,
    pub department: Option<String>,
    /// `教师`, `学生`, `T` or `S`
    #[serde(rename = "type")]
    pub card_type: Option<String>,
    /// `new` or `remove`
    pub op: String,
}

/// Decoded card operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardCommand {
    New(NewCard),
    Remove { id: i32 },
    Unsupported(String),
}

impl CardRequest {
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    pub fn into_command(self) -> Result<CardCommand, CardError> {
        match self.op.as_str() {
            "new" => {
                let label = self.card_type.unwrap_or_default();
                let card_type = CardType::from_label(&label).ok_or_else(|| {
                    CardError::Invalid(format!(
                        "Unknown card type \"{}\", expected 教师, 学生, T or S.",
                        label
                    ))
                })?;
                Ok(CardCommand::New(NewCard::new(
                    self.name.as_deref().unwrap_or_default(),
                    self.department.as_deref().unwrap_or_default(),
                    card_type,
                )))
            }
            "remove" => {
                let id = self.id.ok_or_else(|| {
                    CardError::Invalid("A card id is required to remove a card.".to_string())
                })?;
                Ok(CardCommand::Remove { id })
            }
            _ => Ok(CardCommand::Unsupported(self.op)),
        }
    }
}
