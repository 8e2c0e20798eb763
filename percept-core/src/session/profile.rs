//! Participant profile captured on the setup form

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;

pub const MIN_AGE: u32 = 1;
pub const MAX_AGE: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gender::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SessionError::InvalidProfile(format!("unknown gender {:?}", s)))
    }
}

/// Who is taking the quiz. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantProfile {
    name: String,
    age: u32,
    gender: Gender,
    participant_id: String,
}

impl ParticipantProfile {
    /// Validate the form fields and derive the participant id from the name
    /// and the start time.
    pub fn new(
        name: &str,
        age: u32,
        gender: Gender,
        now: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::InvalidProfile("name is required".to_string()));
        }
        if !(MIN_AGE..=MAX_AGE).contains(&age) {
            return Err(SessionError::InvalidProfile(format!(
                "age must be between {} and {}",
                MIN_AGE, MAX_AGE
            )));
        }

        Ok(Self {
            participant_id: format!("{}_{}", name, now.timestamp_millis()),
            name: name.to_string(),
            age,
            gender,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn participant_id(&self) -> &str {
        &self.participant_id
    }
}
