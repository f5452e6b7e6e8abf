//! # Client Profile
//!
//! The structured extraction target. The extraction backend fills these
//! fields progressively as the conversation goes on; the client only
//! stores and merges them.
//!
//! Enumerated values owned by the backend vocabulary (`marital_status`,
//! `asset_type`, `goal_type`, all in Portuguese) are carried as plain
//! strings so a new backend value never breaks deserialization.
//!
//! ## Merge Rule
//!
//! [`ClientProfile::merge_from`] accumulates: a field is replaced only by
//! new non-null (or non-empty) data. A response that omits a section never
//! wipes what the client already knows. The completion score is the one
//! exception: it is server-computed and always taken as reported.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::documents::DocumentRecommendation;

/// Personal data of the prospective client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    /// `solteiro`, `casado`, `divorciado`, `viúvo`, `união estável`, `outro`.
    #[serde(default)]
    pub marital_status: Option<String>,
    #[serde(default)]
    pub profession: Option<String>,
}

impl PersonalInfo {
    fn merge_from(&mut self, incoming: PersonalInfo) {
        if incoming.name.is_some() {
            self.name = incoming.name;
        }
        if incoming.age.is_some() {
            self.age = incoming.age;
        }
        if incoming.marital_status.is_some() {
            self.marital_status = incoming.marital_status;
        }
        if incoming.profession.is_some() {
            self.profession = incoming.profession;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyMember {
    pub relation: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub is_dependent: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// `imóvel`, `empresa`, `investimento financeiro`, `propriedade rural`, `outro`.
    pub asset_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub estimated_value: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub ownership: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// `sucessão familiar`, `otimização fiscal`, `proteção patrimonial`, ...
    pub goal_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concern {
    pub description: String,
    #[serde(default)]
    pub priority: Option<i32>,
}

/// Server-computed completeness per profile section, each in `[0, 1]`.
///
/// `overall` is an aggregate the server computes. The client never derives
/// it from the section scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionScore {
    #[serde(default)]
    pub personal: f64,
    #[serde(default)]
    pub family: f64,
    #[serde(default)]
    pub assets: f64,
    #[serde(default)]
    pub goals: f64,
    #[serde(default)]
    pub overall: f64,
}

/// The structured profile extracted from the conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientProfile {
    #[serde(default)]
    pub profile_id: Option<String>,
    #[serde(default, with = "crate::temporal::lenient_option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::temporal::lenient_option")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub family_members: Vec<FamilyMember>,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub concerns: Vec<Concern>,
    #[serde(default)]
    pub completion_score: CompletionScore,
    /// Populated only after a successful recommendation fetch.
    #[serde(default)]
    pub document_recommendations: Vec<DocumentRecommendation>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ClientProfile {
    /// Merge a server-provided profile into this one.
    ///
    /// Scalars are replaced when the incoming value is present, collections
    /// when the incoming collection is non-empty. The completion score is
    /// always replaced.
    pub fn merge_from(&mut self, incoming: ClientProfile) {
        if incoming.profile_id.is_some() {
            self.profile_id = incoming.profile_id;
        }
        if incoming.created_at.is_some() {
            self.created_at = incoming.created_at;
        }
        if incoming.updated_at.is_some() {
            self.updated_at = incoming.updated_at;
        }
        self.personal_info.merge_from(incoming.personal_info);
        replace_if_non_empty(&mut self.family_members, incoming.family_members);
        replace_if_non_empty(&mut self.assets, incoming.assets);
        replace_if_non_empty(&mut self.goals, incoming.goals);
        replace_if_non_empty(&mut self.concerns, incoming.concerns);
        replace_if_non_empty(
            &mut self.document_recommendations,
            incoming.document_recommendations,
        );
        if incoming.notes.is_some() {
            self.notes = incoming.notes;
        }
        self.completion_score = incoming.completion_score;
    }
}

fn replace_if_non_empty<T>(current: &mut Vec<T>, incoming: Vec<T>) {
    if !incoming.is_empty() {
        *current = incoming;
    }
}
