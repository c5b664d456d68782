use super::axis::Axis;
use super::battery::DiagnosisBattery;
use super::scoring::{score, AnswerValue, NEUTRAL_SCORE};
use crate::workflows::health::HealthSnapshot;
use std::collections::{BTreeMap, HashMap};

/// Fold a full answer set into the six-axis snapshot. Deterministic and
/// side-effect free; persistence belongs to the caller.
///
/// Each axis score is the rounded mean of its questions' scores; questions
/// without an answer contribute the neutral midpoint through the scoring
/// policy. An axis with no questions at all (possible only with a truncated
/// external battery) also lands on the midpoint.
pub fn aggregate(
    battery: &DiagnosisBattery,
    answers: &HashMap<String, AnswerValue>,
) -> HealthSnapshot {
    let mut grouped: BTreeMap<Axis, Vec<f64>> = BTreeMap::new();
    for question in battery.questions() {
        grouped
            .entry(question.axis)
            .or_default()
            .push(score(question, answers.get(&question.id)));
    }

    let axes = Axis::ALL
        .iter()
        .map(|axis| {
            let value = match grouped.get(axis) {
                Some(scores) if !scores.is_empty() => {
                    (scores.iter().sum::<f64>() / scores.len() as f64).round() as i32
                }
                _ => NEUTRAL_SCORE as i32,
            };
            (*axis, value)
        })
        .collect();

    HealthSnapshot::from_axes(axes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(pairs: &[(&str, AnswerValue)]) -> HashMap<String, AnswerValue> {
        pairs
            .iter()
            .map(|(id, value)| (id.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn unanswered_battery_lands_on_the_midpoint_everywhere() {
        let snapshot = aggregate(&DiagnosisBattery::standard(), &HashMap::new());
        for axis in Axis::ALL {
            assert_eq!(snapshot.score(axis), 50);
        }
        assert_eq!(snapshot.overall, 50);
    }

    #[test]
    fn top_tier_answers_max_out_an_axis() {
        let battery = DiagnosisBattery::standard();
        let top: HashMap<String, AnswerValue> = battery
            .questions()
            .iter()
            .filter(|question| question.axis == Axis::AssetStability)
            .map(|question| {
                let last = question.choices.last().expect("radio question").clone();
                (question.id.clone(), AnswerValue::Choice(last))
            })
            .collect();

        let snapshot = aggregate(&battery, &top);
        assert_eq!(snapshot.score(Axis::AssetStability), 100);
        assert_eq!(snapshot.score(Axis::TimeIndependence), 50);
    }

    #[test]
    fn axis_score_is_the_rounded_mean_of_its_questions() {
        let battery = DiagnosisBattery::standard();
        // asset_1 first tier (15), asset_2 and asset_3 unanswered (50 each):
        // mean(15, 50, 50) = 38.33 -> 38
        let snapshot = aggregate(
            &battery,
            &answers(&[(
                "asset_1",
                AnswerValue::Choice("In the red or zero".to_string()),
            )]),
        );
        assert_eq!(snapshot.score(Axis::AssetStability), 38);
    }

    #[test]
    fn overall_is_the_rounded_mean_of_the_axes() {
        let battery = DiagnosisBattery::standard();
        let snapshot = aggregate(
            &battery,
            &answers(&[
                ("body_3", AnswerValue::Scale(10.0)),
                ("emotion_1", AnswerValue::Scale(10.0)),
            ]),
        );
        // body: (50 + 50 + 100) / 3 = 66.67 -> 67
        // emotion: (100 + 50 + 50 + 50) / 4 = 62.5 -> 63
        assert_eq!(snapshot.score(Axis::PhysicalCondition), 67);
        assert_eq!(snapshot.score(Axis::EmotionalBalance), 63);
        // overall: (50 + 50 + 67 + 63 + 50 + 50) / 6 = 55
        assert_eq!(snapshot.overall, 55);
    }
}
