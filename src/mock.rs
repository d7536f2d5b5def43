//! Locally built artifacts for running without a model.
//!
//! Mock artifacts are randomized (case number, botched element, position of
//! the correct option) but always satisfy the same invariants as parsed
//! model output, so the cache and the UI behave exactly as in live mode.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::prompts::random_element;
use crate::types::{
    AuditBug, AuditCaseData, CaseData, CoStarElement, ElementFeedback, ElementScores,
    FeedbackStatus, KeyPoint, MentorFeedback, OPTION_IDS, PlayerPrompt, RectificationOption,
    VerdictData,
};

struct CaseTemplate {
    title: &'static str,
    backstory: &'static str,
    faulty_prompt: &'static str,
    faulty_output: &'static str,
    explanation: &'static str,
    ideal_prompt: &'static str,
}

fn case_template(element: CoStarElement) -> CaseTemplate {
    match element {
        CoStarElement::Context => CaseTemplate {
            title: "The Case of the Wrong Garden",
            backstory: "Priya wanted tips for the tiny balcony garden in her flat. The AI planned a farm.",
            faulty_prompt: "Give me three tips for growing tomatoes.",
            faulty_output: "First, plough your forty acres with a tractor.",
            explanation: "The prompt said 'growing tomatoes' but never mentioned the balcony, so the AI suggested 'plough your forty acres'.",
            ideal_prompt: "I grow vegetables in pots on a small city balcony. Give me three tips for growing tomatoes there.",
        },
        CoStarElement::Objective => CaseTemplate {
            title: "The Case of the Endless Story",
            backstory: "Sam needed a title for a class project about volcanoes. The AI wrote a novel instead.",
            faulty_prompt: "Volcanoes, for my class project.",
            faulty_output: "Chapter One: The mountain rumbled as Captain Lava awoke...",
            explanation: "The prompt only said 'Volcanoes, for my class project' without asking for a title, so the AI started 'Chapter One'.",
            ideal_prompt: "Suggest five catchy titles for my class project about volcanoes.",
        },
        CoStarElement::Style => CaseTemplate {
            title: "The Case of the Poetic Shopping List",
            backstory: "Leo asked for a shopping list and got a sonnet. The shop assistant was confused.",
            faulty_prompt: "Write what I need to buy for pancakes.",
            faulty_output: "O flour, thou powdery cloud of dawn, and milk, so pale and true...",
            explanation: "The prompt said 'write what I need' but gave no format, so the AI wrote 'O flour, thou powdery cloud'.",
            ideal_prompt: "Write a bullet-point shopping list of what I need to buy for pancakes.",
        },
        CoStarElement::Tone => CaseTemplate {
            title: "The Case of the Mixed-Up Message",
            backstory: "Alex wanted a quick note for the neighbours, but the AI replied like a courtroom announcement.",
            faulty_prompt: "Write a short note inviting my neighbours over for dinner tonight.",
            faulty_output: "By order of the household, all residents are hereby summoned to dinner at 7 PM.",
            explanation: "The prompt said 'write a short note' but didn't set a tone, so the AI wrote 'By order of the household'.",
            ideal_prompt: "Write a short, friendly note inviting my neighbours over for dinner tonight at 7 PM.",
        },
        CoStarElement::Audience => CaseTemplate {
            title: "The Case of the Baffled Little Brother",
            backstory: "Mia asked for an explanation of rain for her five-year-old brother. He did not understand a word.",
            faulty_prompt: "Explain why it rains.",
            faulty_output: "Precipitation occurs when adiabatic cooling causes condensation nuclei to coalesce.",
            explanation: "The prompt said 'explain why it rains' without naming the listener, so the AI used 'adiabatic cooling'.",
            ideal_prompt: "Explain why it rains in a way a five-year-old can understand.",
        },
        CoStarElement::Response => CaseTemplate {
            title: "The Case of the Giant Birthday Card",
            backstory: "Noor needed one line for a birthday card. The AI wrote three pages.",
            faulty_prompt: "Write a birthday message for my grandpa.",
            faulty_output: "Part 1 of 6: A Life in Review. Grandpa was born on a stormy night...",
            explanation: "The prompt said 'write a birthday message' with no length, so the AI started 'Part 1 of 6'.",
            ideal_prompt: "Write a one-sentence birthday message for my grandpa's card.",
        },
    }
}

/// A detective case with a random number and botched element.
pub fn case<R: Rng + ?Sized>(rng: &mut R) -> CaseData {
    let element = random_element(rng);
    let template = case_template(element);
    CaseData {
        id: rng.gen_range(100..=999u16).to_string(),
        title: template.title.to_string(),
        backstory: template.backstory.to_string(),
        faulty_prompt: template.faulty_prompt.to_string(),
        faulty_output: template.faulty_output.to_string(),
        botched_element: element,
        botched_explanation: template.explanation.to_string(),
        ideal_prompt: template.ideal_prompt.to_string(),
    }
}

/// An audit case with a random number. Sentences are derived from the output.
pub fn audit_case<R: Rng + ?Sized>(rng: &mut R) -> AuditCaseData {
    let ai_output = [
        "We will visit the Eiffel Tower on Saturday morning.",
        "Bring warm jackets because it always snows in July.",
        "For lunch, try local seafood by the pier.",
        "On Sunday, ride bikes along the waterfront trail.",
    ]
    .join(" ");

    AuditCaseData {
        id: rng.gen_range(100..=999u16).to_string(),
        title: "The Mixed-Up Trip".to_string(),
        original_prompt: "Plan a kid-friendly weekend itinerary for a family trip to Seattle."
            .to_string(),
        key_points: vec![
            key_point("📋", "Task", "Weekend itinerary"),
            key_point("📍", "About", "Seattle family trip"),
            key_point("⚠️", "Rule", "Kid-friendly activities"),
        ],
        ai_output,
        sentences: Vec::new(),
        bugs: vec![
            AuditBug {
                id: "bug-1".to_string(),
                text: "We will visit the Eiffel Tower on Saturday morning.".to_string(),
                explanation: "The Eiffel Tower is in Paris, not Seattle.".to_string(),
            },
            AuditBug {
                id: "bug-2".to_string(),
                text: "Bring warm jackets because it always snows in July.".to_string(),
                explanation: "Seattle does not get snow in July.".to_string(),
            },
        ],
    }
    .with_sentences()
}

fn key_point(emoji: &str, label: &str, value: &str) -> KeyPoint {
    KeyPoint {
        emoji: emoji.to_string(),
        label: label.to_string(),
        value: value.to_string(),
    }
}

/// Four options for `case`: its ideal prompt plus three distractors, with
/// the correct letter chosen at random.
pub fn options<R: Rng + ?Sized>(case: &CaseData, rng: &mut R) -> Vec<RectificationOption> {
    let label = case.botched_element.label();
    let mut choices = vec![
        (
            case.ideal_prompt.clone(),
            true,
            format!("This fixes the missing {label} without changing the request."),
        ),
        (
            case.faulty_prompt.clone(),
            false,
            format!("This is the original prompt, so {label} is still missing."),
        ),
        (
            format!("{} Make it as long and detailed as possible.", case.faulty_prompt),
            false,
            format!("This changes the response length but leaves {label} unaddressed."),
        ),
        (
            "Write something about a completely different topic.".to_string(),
            false,
            "This changes the objective entirely.".to_string(),
        ),
    ];
    choices.shuffle(rng);

    OPTION_IDS
        .iter()
        .zip(choices)
        .map(|(id, (prompt_text, is_correct, explanation))| RectificationOption {
            id: (*id).to_string(),
            prompt_text,
            is_correct,
            explanation,
        })
        .collect()
}

const ELEMENT_CUES: [(CoStarElement, &[&str]); 6] = [
    (CoStarElement::Context, &["i am", "i'm", "as a", "background", "because"]),
    (CoStarElement::Objective, &["write", "create", "explain", "list", "summar", "give"]),
    (CoStarElement::Style, &["bullet", "formal", "casual", "format", "style", "paragraph"]),
    (CoStarElement::Tone, &["friendly", "serious", "funny", "tone", "warm", "professional"]),
    (CoStarElement::Audience, &["for my", "for kids", "audience", "reader", "students", "aged"]),
    (CoStarElement::Response, &["words", "sentence", "short", "length", "json", "table"]),
];

/// Keyword-based review: an element is complete when the prompt mentions one
/// of its cues.
pub fn mentor_feedback(prompt_text: &str) -> MentorFeedback {
    let lower = prompt_text.to_lowercase();
    let feedback: Vec<ElementFeedback> = ELEMENT_CUES
        .iter()
        .map(|(element, cues)| {
            let hits = cues.iter().filter(|cue| lower.contains(*cue)).count();
            let (status, comment) = match hits {
                0 => (
                    FeedbackStatus::Missing,
                    format!("Nothing here sets the {}.", element.label().to_lowercase()),
                ),
                1 => (
                    FeedbackStatus::Partial,
                    format!(
                        "There is a hint of {}; make it explicit.",
                        element.label().to_lowercase()
                    ),
                ),
                _ => (
                    FeedbackStatus::Complete,
                    format!("{} is clearly covered.", element.label()),
                ),
            };
            ElementFeedback {
                element: element.label().to_string(),
                status,
                comment,
            }
        })
        .collect();

    let missing = feedback
        .iter()
        .filter(|f| f.status == FeedbackStatus::Missing)
        .count();
    let is_ready = missing == 0;
    let overall_assessment = if is_ready {
        "Every element is there. Try it out!".to_string()
    } else {
        format!("{missing} element(s) still missing. Add them before sending.")
    };

    MentorFeedback {
        feedback,
        overall_assessment,
        is_ready,
        improved_prompt: (!is_ready).then(|| {
            format!(
                "As a curious beginner, {} Keep it friendly, clear and under 150 words for a general reader.",
                prompt_text.trim()
            )
        }),
    }
}

/// Length-based scoring: each filled field earns points, and the case is
/// solved when the botched element's field is filled in.
pub fn verdict(case: &CaseData, player: &PlayerPrompt) -> VerdictData {
    let score = |element: CoStarElement| -> u32 {
        let len = player.field(element).trim().chars().count() as u32;
        if len == 0 { 0 } else { (40 + len * 2).min(100) }
    };
    let element_scores = ElementScores {
        context: score(CoStarElement::Context),
        objective: score(CoStarElement::Objective),
        style: score(CoStarElement::Style),
        tone: score(CoStarElement::Tone),
        audience: score(CoStarElement::Audience),
        response: score(CoStarElement::Response),
    };
    let overall_score = CoStarElement::ALL.iter().map(|e| score(*e)).sum::<u32>() / 6;
    let success = score(case.botched_element) > 0;
    let label = case.botched_element.label();

    VerdictData {
        success,
        overall_score,
        element_scores,
        new_output: if success {
            case.ideal_prompt.clone()
        } else {
            case.faulty_output.clone()
        },
        case_summary: if success {
            format!("Case closed! The missing {label} was found and fixed.")
        } else {
            format!("Case still open. The {label} clue was left blank.")
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::normalize_options;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn options_are_valid_and_correct_one_is_ideal_prompt() {
        let mut rng = StdRng::seed_from_u64(42);
        let case = case(&mut rng);
        for _ in 0..20 {
            let options = normalize_options(options(&case, &mut rng)).unwrap();
            let correct: Vec<_> = options.iter().filter(|o| o.is_correct).collect();
            assert_eq!(correct.len(), 1);
            assert_eq!(correct[0].prompt_text, case.ideal_prompt);
        }
    }

    #[test]
    fn audit_case_bugs_are_sentences() {
        let mut rng = StdRng::seed_from_u64(1);
        let audit = audit_case(&mut rng);
        assert_eq!(audit.sentences.len(), 4);
        for bug in &audit.bugs {
            assert!(audit.sentences.contains(&bug.text));
        }
    }

    #[test]
    fn case_numbers_are_three_digits() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..100 {
            let id: u16 = case(&mut rng).id.parse().unwrap();
            assert!((100..=999).contains(&id));
        }
    }

    #[test]
    fn mentor_flags_missing_elements() {
        let feedback = mentor_feedback("tomatoes");
        assert_eq!(feedback.feedback.len(), 6);
        assert!(!feedback.is_ready);
        assert!(feedback.improved_prompt.is_some());
    }

    #[test]
    fn verdict_requires_botched_field() {
        let mut rng = StdRng::seed_from_u64(5);
        let case = case(&mut rng);
        let blank = verdict(&case, &PlayerPrompt::default());
        assert!(!blank.success);
        assert_eq!(blank.overall_score, 0);

        let filled = PlayerPrompt {
            context: "a".into(),
            objective: "b".into(),
            style: "c".into(),
            tone: "d".into(),
            audience: "e".into(),
            response: "f".into(),
        };
        let verdict = verdict(&case, &filled);
        assert!(verdict.success);
        assert_eq!(verdict.overall_score, 42);
    }
}
