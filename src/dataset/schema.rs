//! Typed record shapes for both schema modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

crate::class_label! {
    /// Cabin class of a knowledge-base flight
    pub enum FlightClass {
        Economy => "economy",
        Business => "business",
    }
}

crate::class_label! {
    /// Number of connections, used both for flights and for intent limits
    pub enum Connections {
        Zero => "0",
        One => "1",
        Many => "many",
    }
}

crate::class_label! {
    /// Outcome of a dialogue
    pub enum ActionStatus {
        Book => "book",
        NoFlight => "no_flight",
        Change => "change",
        NoReservation => "no_reservation",
        Cancel => "cancel",
    }
}

crate::class_label! {
    /// What the customer is trying to do
    pub enum Goal {
        Book => "book",
        Change => "change",
        Cancel => "cancel",
    }
}

impl Default for ActionStatus {
    fn default() -> Self {
        ActionStatus::Book
    }
}

/// Which record shape a split file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaMode {
    /// Dialogues with intents and actions
    #[default]
    Data,
    /// Flight knowledge base entries
    Kb,
}

impl SchemaMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaMode::Data => "data",
            SchemaMode::Kb => "kb",
        }
    }
}

impl fmt::Display for SchemaMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "data" => Ok(SchemaMode::Data),
            "kb" => Ok(SchemaMode::Kb),
            other => Err(anyhow::anyhow!(
                "Unknown schema mode '{}', expected 'data' or 'kb'",
                other
            )),
        }
    }
}

/// An intent slot that may have been absent in the source.
///
/// Absent slots serialize as the empty string whatever the slot's type, so
/// an integer slot like `max_price` is either a number or `""`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot<T> {
    Value(T),
    Empty,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Slot::Empty
    }
}

impl<T> Slot<T> {
    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Slot::Value(v) => Some(v),
            Slot::Empty => None,
        }
    }
}

impl<T: Serialize> Serialize for Slot<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Slot::Value(v) => v.serialize(serializer),
            Slot::Empty => serializer.serialize_str(""),
        }
    }
}

/// One flight in the knowledge base
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KbEntry {
    pub return_airport: String,
    pub airline: String,
    pub departure_day: String,
    pub departure_airport: String,
    pub flight_number: i64,
    pub departure_month: String,
    pub departure_time_num: i64,
    pub class: FlightClass,
    pub return_time_num: i64,
    pub return_month: String,
    pub return_day: String,
    pub num_connections: Connections,
    pub price: i64,
}

/// Knowledge base for one dialogue
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KbRecord {
    pub kb: Vec<KbEntry>,
    pub reservation: i64,
}

/// A search interaction performed by the agent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchEvent {
    pub timestamp: i64,
    pub button_name: String,
    pub field_name: String,
    pub field_value: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Action {
    pub status: ActionStatus,
    pub name: String,
    pub flight: Vec<i64>,
}

/// The customer's travel goal
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Intent {
    pub return_month: Slot<String>,
    pub return_day: Slot<i64>,
    pub max_price: Slot<i64>,
    pub departure_airport: Slot<String>,
    pub departure_time: Slot<String>,
    pub max_connections: Slot<Connections>,
    pub departure_day: Slot<String>,
    pub goal: Slot<Goal>,
    pub departure_month: Slot<String>,
    pub name: Slot<String>,
    pub return_airport: Slot<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DialogueRecord {
    pub search_info: Vec<SearchEvent>,
    pub action: Action,
    pub intent: Intent,
    pub timestamps: Vec<i64>,
    pub dialogue: Vec<String>,
    pub expected_action: Action,
    pub correct_sample: bool,
}

/// A record produced by the adapter, shaped by the schema mode
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Kb(KbRecord),
    Dialogue(DialogueRecord),
}

impl Record {
    pub fn mode(&self) -> SchemaMode {
        match self {
            Record::Kb(_) => SchemaMode::Kb,
            Record::Dialogue(_) => SchemaMode::Data,
        }
    }

    pub fn as_kb(&self) -> Option<&KbRecord> {
        match self {
            Record::Kb(kb) => Some(kb),
            Record::Dialogue(_) => None,
        }
    }

    pub fn as_dialogue(&self) -> Option<&DialogueRecord> {
        match self {
            Record::Dialogue(d) => Some(d),
            Record::Kb(_) => None,
        }
    }

    pub fn into_kb(self) -> Option<KbRecord> {
        match self {
            Record::Kb(kb) => Some(kb),
            Record::Dialogue(_) => None,
        }
    }

    pub fn into_dialogue(self) -> Option<DialogueRecord> {
        match self {
            Record::Dialogue(d) => Some(d),
            Record::Kb(_) => None,
        }
    }
}
