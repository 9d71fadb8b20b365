//! Health Scoring

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::SensorReading;

/// Dashboard status band derived from the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

impl HealthStatus {
    /// Status band for a score: healthy >= 80, warning >= 60, else critical
    pub fn from_score(score: u8) -> Self {
        if score >= 80 {
            HealthStatus::Healthy
        } else if score >= 60 {
            HealthStatus::Warning
        } else {
            HealthStatus::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Warning => "warning",
            HealthStatus::Critical => "critical",
        }
    }
}

/// Result of scoring one reading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthAssessment {
    /// Score in [0, 100]
    pub score: u8,
    /// Band derived from `score`
    pub status: HealthStatus,
    /// One entry per triggered rule, in evaluation order
    pub issues: Vec<String>,
    /// One entry per triggered rule that defines a recommendation
    pub recommendations: Vec<String>,
}

impl HealthAssessment {
    /// Human-readable summary of issues and recommendations.
    ///
    /// Empty when nothing triggered; each clause is left out when its
    /// list is empty.
    pub fn notes(&self) -> String {
        let mut clauses = Vec::with_capacity(2);
        if !self.issues.is_empty() {
            clauses.push(format!("Issues: {}.", self.issues.join(", ")));
        }
        if !self.recommendations.is_empty() {
            clauses.push(format!(
                "Recommendations: {}.",
                self.recommendations.join(", ")
            ));
        }
        clauses.join(" ")
    }
}

impl Serialize for HealthAssessment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("HealthAssessment", 5)?;
        state.serialize_field("score", &self.score)?;
        state.serialize_field("status", &self.status)?;
        state.serialize_field("issues", &self.issues)?;
        state.serialize_field("recommendations", &self.recommendations)?;
        state.serialize_field("notes", &self.notes())?;
        state.end()
    }
}

/// Accumulates penalties while the rules run
struct Scorecard {
    score: i32,
    issues: Vec<String>,
    recommendations: Vec<String>,
}

impl Scorecard {
    fn new() -> Self {
        Self {
            score: 100,
            issues: Vec::new(),
            recommendations: Vec::new(),
        }
    }

    fn penalize(&mut self, penalty: i32, issue: &str, recommendation: Option<&str>) {
        self.score -= penalty;
        self.issues.push(issue.to_string());
        if let Some(rec) = recommendation {
            self.recommendations.push(rec.to_string());
        }
    }

    fn finish(self) -> HealthAssessment {
        let score = self.score.clamp(0, 100) as u8;
        HealthAssessment {
            score,
            status: HealthStatus::from_score(score),
            issues: self.issues,
            recommendations: self.recommendations,
        }
    }
}

/// Score a reading.
///
/// Starts at 100 and applies each rule in a fixed order. Never fails:
/// absent fields skip their rules and values are compared as given.
pub fn assess_health(reading: &SensorReading) -> HealthAssessment {
    let mut card = Scorecard::new();

    if let Some(t) = reading.temperature {
        if t < 15.0 {
            card.penalize(30, "Temperature too low...", Some("Check insulation/feeding"));
        } else if t > 40.0 {
            card.penalize(25, "Temperature too high...", Some("Ensure ventilation/shade"));
        } else if t < 20.0 || t > 35.0 {
            card.penalize(10, "Temperature outside optimal range", None);
        }
    }

    if let Some(h) = reading.humidity {
        if h < 30.0 {
            card.penalize(20, "Humidity too low...", Some("Add water source"));
        }
        if h > 80.0 {
            card.penalize(25, "Humidity too high...", Some("Improve ventilation"));
        }
    }

    if let Some(g) = reading.gas_level {
        if g > 200.0 {
            card.penalize(35, "High gas levels...", Some("Check ventilation immediately"));
        } else if g > 100.0 {
            card.penalize(15, "Elevated gas levels", Some("Monitor ventilation"));
        }
    }

    if let Some(w) = reading.hive_weight {
        if w < 20.0 {
            card.penalize(20, "Low hive weight...", Some("Check food stores"));
        }
    }

    if let Some(b) = reading.battery_level {
        if b < 20.0 {
            card.penalize(10, "Low sensor battery", Some("Replace battery soon"));
        }
    }

    if let Some(s) = reading.signal_strength {
        if s < 30.0 {
            card.penalize(5, "Weak sensor signal", Some("Check connectivity"));
        }
    }

    card.finish()
}
