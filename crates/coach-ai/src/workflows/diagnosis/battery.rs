use super::axis::{self, Axis};
use serde::{Deserialize, Serialize};
use std::io::Read;

/// How a question is answered, which also selects the scoring policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnswerKind {
    SingleChoice,
    ScalarSlider,
    MultiSelect,
}

/// One entry of the diagnosis battery. Static configuration, never persisted
/// per client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub prompt: String,
    #[serde(with = "axis::battery_label", rename = "category")]
    pub axis: Axis,
    #[serde(rename = "type")]
    pub kind: AnswerKind,
    #[serde(default)]
    pub choices: Vec<String>,
    pub order: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum BatteryError {
    #[error("battery artifact is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("battery artifact contains no questions")]
    Empty,
    #[error("battery artifact repeats question id '{0}'")]
    DuplicateId(String),
}

/// The fixed survey battery. Shipped with a built-in standard edition, but
/// replaceable by an externally supplied JSON artifact so question wording can
/// change without redeploying the engine.
#[derive(Debug, Clone)]
pub struct DiagnosisBattery {
    questions: Vec<Question>,
}

impl DiagnosisBattery {
    pub fn standard() -> Self {
        Self {
            questions: standard_questions(),
        }
    }

    /// Load a battery from a JSON array of questions.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, BatteryError> {
        let questions: Vec<Question> = serde_json::from_reader(reader)?;
        if questions.is_empty() {
            return Err(BatteryError::Empty);
        }

        let mut seen = std::collections::HashSet::new();
        for question in &questions {
            if !seen.insert(question.id.clone()) {
                return Err(BatteryError::DuplicateId(question.id.clone()));
            }
        }

        let mut questions = questions;
        questions.sort_by_key(|question| question.order);
        Ok(Self { questions })
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|question| question.id == id)
    }
}

fn choice_question(
    id: &str,
    axis: Axis,
    order: u32,
    prompt: &str,
    choices: [&str; 4],
) -> Question {
    Question {
        id: id.to_string(),
        prompt: prompt.to_string(),
        axis,
        kind: AnswerKind::SingleChoice,
        choices: choices.iter().map(|choice| choice.to_string()).collect(),
        order,
    }
}

fn slider_question(id: &str, axis: Axis, order: u32, prompt: &str) -> Question {
    Question {
        id: id.to_string(),
        prompt: prompt.to_string(),
        axis,
        kind: AnswerKind::ScalarSlider,
        choices: Vec::new(),
        order,
    }
}

fn standard_questions() -> Vec<Question> {
    use Axis::*;

    vec![
        // Asset Stability
        choice_question(
            "asset_1",
            AssetStability,
            1,
            "What is your current monthly net profit (income minus fixed expenses)?",
            ["In the red or zero", "Up to $500", "$500 to $2,000", "Over $2,000"],
        ),
        choice_question(
            "asset_2",
            AssetStability,
            2,
            "Do you hold an emergency fund that could cover six months or more of living costs?",
            ["None", "1 to 3 months", "3 to 6 months", "6 months or more"],
        ),
        choice_question(
            "asset_3",
            AssetStability,
            3,
            "How does your debt (loans, card balances) compare to your assets?",
            [
                "Debt exceeds assets",
                "Debt is 50% or more of assets",
                "Debt is under 30% of assets",
                "No debt",
            ],
        ),
        // Time Independence
        choice_question(
            "time_1",
            TimeIndependence,
            4,
            "How much of each day is truly yours to spend on what you choose?",
            ["Under 1 hour", "1 to 3 hours", "3 to 6 hours", "6 hours or more"],
        ),
        choice_question(
            "time_2",
            TimeIndependence,
            5,
            "Could your business keep running for a full day without you?",
            [
                "Not at all, it stops without me",
                "A few hours at most",
                "A day or two",
                "A week or more",
            ],
        ),
        choice_question(
            "time_3",
            TimeIndependence,
            6,
            "What share of your recurring work is automated?",
            ["Under 10%", "10 to 30%", "30 to 60%", "60% or more"],
        ),
        // Physical Condition
        choice_question(
            "body_1",
            PhysicalCondition,
            7,
            "Over the past month, have you exercised regularly (twice a week or more)?",
            [
                "Not at all",
                "1 to 3 times a month",
                "Once a week",
                "Twice a week or more",
            ],
        ),
        choice_question(
            "body_2",
            PhysicalCondition,
            8,
            "How would you describe your sleep quality and average hours?",
            [
                "Under 5 hours, always tired",
                "5 to 6 hours, often tired",
                "6 to 7 hours, okay",
                "7 to 8 hours, refreshed",
            ],
        ),
        slider_question(
            "body_3",
            PhysicalCondition,
            9,
            "Rate your current energy level from 1 to 10.",
        ),
        // Emotional Balance
        slider_question(
            "emotion_1",
            EmotionalBalance,
            10,
            "How satisfied are you with your business and life overall, from 1 to 10?",
        ),
        choice_question(
            "emotion_2",
            EmotionalBalance,
            11,
            "Have you felt burned out (deep exhaustion or apathy) recently?",
            [
                "Almost every day",
                "2 to 3 times a week",
                "1 to 2 times a month",
                "Hardly ever",
            ],
        ),
        choice_question(
            "emotion_3",
            EmotionalBalance,
            12,
            "How long does it usually take you to recover from a stressful episode?",
            ["More than a week", "3 to 7 days", "1 to 2 days", "Within a day"],
        ),
        Question {
            id: "emotion_4".to_string(),
            prompt: "Which worries weigh on you most right now? (select all that apply)"
                .to_string(),
            axis: EmotionalBalance,
            kind: AnswerKind::MultiSelect,
            choices: vec![
                "Income or financial insecurity".to_string(),
                "Relationships".to_string(),
                "Health".to_string(),
                "Uncertainty about the future".to_string(),
                super::scoring::NO_CONCERN_SENTINEL.to_string(),
            ],
            order: 13,
        },
        // Network Power
        choice_question(
            "network_1",
            NetworkPower,
            14,
            "How many contacts could you actively reach out to on business or career matters?",
            ["Fewer than 5", "5 to 20", "20 to 50", "More than 50"],
        ),
        choice_question(
            "network_2",
            NetworkPower,
            15,
            "In the last six months, has a new business partner or collaboration opportunity appeared?",
            [
                "None",
                "Expressions of interest only",
                "Meetings held",
                "Actively collaborating",
            ],
        ),
        choice_question(
            "network_3",
            NetworkPower,
            16,
            "How many people would introduce you to others on your behalf?",
            ["1 to 2", "3 to 5", "6 to 10", "11 or more"],
        ),
        choice_question(
            "network_4",
            NetworkPower,
            17,
            "Are you active in online or offline communities or networks?",
            [
                "Not at all",
                "Occasionally attend",
                "Attend regularly",
                "Run one myself",
            ],
        ),
        // System Leverage
        choice_question(
            "system_1",
            SystemLeverage,
            18,
            "What share of your revenue arrives without consuming your own time (automated or passive income)?",
            ["0%", "1 to 10%", "10 to 30%", "30% or more"],
        ),
        choice_question(
            "system_2",
            SystemLeverage,
            19,
            "Does your business have standard operating procedures or manuals?",
            [
                "None",
                "Some exist",
                "Core tasks covered",
                "Documented across the board",
            ],
        ),
        choice_question(
            "system_3",
            SystemLeverage,
            20,
            "How far could your business scale as it stands today?",
            [
                "I am the limit, it is just me",
                "Could add 1 or 2 people",
                "Could grow into a team",
                "Structured to scale without limit",
            ],
        ),
    ]
}
