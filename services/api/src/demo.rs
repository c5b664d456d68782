use crate::infra::{build_service_stack, demo_choice_for, ScriptedOracle};
use clap::Args;
use coach_ai::error::AppError;
use coach_ai::workflows::clients::{AgentId, ClientId, ClientProfile};
use coach_ai::workflows::diagnosis::{AnswerKind, AnswerValue, Axis};
use coach_ai::workflows::quest::{Quest, SequenceOutcome};
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Display name for the demo client
    #[arg(long)]
    pub(crate) client_name: Option<String>,
    /// Stop after the diagnosis portion of the demo
    #[arg(long)]
    pub(crate) skip_quests: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let stack = build_service_stack(Arc::new(ScriptedOracle), Duration::from_secs(1800));

    let client = ClientId("vip-demo-001".to_string());
    let name = args.client_name.unwrap_or_else(|| "Alex Morgan".to_string());
    stack.directory.register(ClientProfile {
        id: client.clone(),
        name: name.clone(),
        agent_id: AgentId("agent-demo-001".to_string()),
    });

    println!("Coaching platform demo for {name}");

    println!("\nDiagnosis survey");
    let diagnosis_id = match stack.diagnosis.start(&client) {
        Ok(id) => id,
        Err(err) => {
            println!("  Could not start the diagnosis: {err}");
            return Ok(());
        }
    };

    let questions = stack.diagnosis.battery().questions().to_vec();
    let mut answered = 0;
    for question in &questions {
        let value = match question.kind {
            AnswerKind::SingleChoice => {
                demo_choice_for(question.axis, &question.choices).map(AnswerValue::Choice)
            }
            AnswerKind::ScalarSlider => Some(AnswerValue::Scale(6.0)),
            AnswerKind::MultiSelect => Some(AnswerValue::Selections(vec![
                "Uncertainty about the future".to_string(),
            ])),
        };
        if let Some(value) = value {
            stack
                .diagnosis
                .record_answer(&diagnosis_id, question.id.clone(), value);
            answered += 1;
        }
    }
    println!("  Answered {answered}/{} questions", questions.len());

    let snapshot = match stack.diagnosis.complete(&client) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            println!("  Diagnosis could not be completed: {err}");
            return Ok(());
        }
    };
    println!("  Health index:");
    for axis in Axis::ALL {
        println!("    - {}: {}", axis.label(), snapshot.score(axis));
    }
    println!("  Overall: {}", snapshot.overall);

    if args.skip_quests {
        return Ok(());
    }

    println!("\nQuest progression");
    match stack.quests.initialize(&client) {
        Ok(SequenceOutcome::Created(count)) => println!("  Seeded {count} quests, weakest axis first"),
        Ok(SequenceOutcome::AlreadyInitialized) => println!("  Quests already initialized"),
        Err(err) => {
            println!("  Quest initialization failed: {err}");
            return Ok(());
        }
    }

    let render_sequence = |quests: &[Quest]| {
        for quest in quests {
            let gate = if quest.locked { "locked" } else { "open" };
            println!(
                "    {}. {} [{}] ({})",
                quest.order,
                quest.title,
                quest.status.label(),
                gate
            );
        }
    };

    match stack.quests.list(&client, None) {
        Ok(quests) => render_sequence(&quests),
        Err(err) => println!("  Could not list quests: {err}"),
    }

    let current = match stack.quests.current(&client) {
        Ok(Some(quest)) => quest,
        Ok(None) => {
            println!("  No current quest to work on");
            return Ok(());
        }
        Err(err) => {
            println!("  Could not resolve the current quest: {err}");
            return Ok(());
        }
    };
    println!("\n  Current quest: {} ({})", current.title, current.axis.label());

    let checklist = match stack.quests.generate_checklist(&current.id) {
        Ok(checklist) => checklist,
        Err(err) => {
            println!("  Checklist generation failed: {err}");
            return Ok(());
        }
    };
    println!("  {} - {}", checklist.intro, checklist.subtitle);
    for (index, item) in checklist.items.iter().enumerate() {
        println!("    [{index}] {item}");
    }

    let checked = vec![0, 1, 2];
    println!("\n  Submitting checks {checked:?}");
    match stack.quests.evaluate(&current.id, checked) {
        Ok(evaluation) => {
            let verdict = if evaluation.passed { "passed" } else { "not yet" };
            println!(
                "  Evaluation: {verdict} ({}/{})",
                evaluation.score, evaluation.total
            );
            println!("  {}", evaluation.message);
            if !evaluation.next_step.is_empty() {
                println!("  Next step: {}", evaluation.next_step);
            }
        }
        Err(err) => {
            println!("  Evaluation failed: {err}");
            return Ok(());
        }
    }

    println!("\n  Sequence after evaluation:");
    match stack.quests.list(&client, None) {
        Ok(quests) => render_sequence(&quests),
        Err(err) => println!("  Could not list quests: {err}"),
    }

    let events = stack.notifications.events();
    if events.is_empty() {
        println!("\n  Notifications: none dispatched");
    } else {
        println!("\n  Notifications:");
        for event in events {
            println!("    - [{}] {}", event.audience.label(), event.title);
        }
    }

    Ok(())
}
