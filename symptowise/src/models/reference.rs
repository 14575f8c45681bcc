//! Static reference content and assistant responses

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Likelihood {
    Low,
    Medium,
    High,
}

/// Conditions the assistant considers likely for a reported symptom
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiseasePrediction {
    pub possible_conditions: Vec<String>,
    pub likelihood: Likelihood,
    pub when_to_see_doctor: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeGroup {
    Kids,
    Teens,
    Adults,
    Seniors,
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AgeGroup::Kids => "Kids",
            AgeGroup::Teens => "Teens",
            AgeGroup::Adults => "Adults",
            AgeGroup::Seniors => "Seniors",
        };
        f.write_str(label)
    }
}

/// Daily nutrition targets for one age group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietPlan {
    pub calories: String,
    pub protein: String,
    pub carbs: String,
    pub fats: String,
    pub fiber: String,
    #[serde(default)]
    pub foods_to_eat: Vec<String>,
    #[serde(default)]
    pub foods_to_avoid: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub title: String,
    pub category: String,
    pub duration: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub animation_url: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub safety_tips: Vec<String>,
    #[serde(default)]
    pub recommendation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub specialization: String,
    pub location: String,
    pub experience: String,
    pub contact: String,
    pub available: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub hospital: Option<String>,
    #[serde(default, rename = "hospital_link")]
    pub hospital_link: Option<String>,
    #[serde(default, rename = "google_maps")]
    pub google_maps: Option<String>,
    #[serde(default)]
    pub qualification: Option<String>,
    #[serde(default)]
    pub rating: Option<f32>,
}

/// Criteria for the doctor directory; empty fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorFilter {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
}
