//! Instruction text sent to the generator.
//!
//! Each builder asks for one JSON object in the camelCase shape the
//! [`convert`](crate::convert) parsers expect. Randomness (scenario, domain,
//! botched element, case number) is drawn from the caller's RNG so tests can
//! seed it.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::types::{CaseData, CoStarElement, PlayerPrompt};

/// Everyday situations a detective case can be set in.
pub const SCENARIOS: [&str; 36] = [
    "a birthday party invitation for a ten-year-old",
    "a thank-you note to a school bus driver",
    "a lost-cat poster for the neighbourhood",
    "a recipe card for grandma's pancakes",
    "a packing list for a first sleepover",
    "a morning announcement for the school assembly",
    "a flyer for a community bake sale",
    "an apology text to a friend for missing a game",
    "a short speech for a sports team dinner",
    "a welcome message for a new classmate",
    "a review of a local ice-cream shop",
    "instructions for feeding a neighbour's goldfish",
    "a poem for Mother's Day",
    "a summary of a science-fair project",
    "a plan for a rainy-day indoor picnic",
    "a note asking the library to extend a loan",
    "a description of a lemonade stand menu",
    "a weekly chore chart for siblings",
    "a reminder email about a piano recital",
    "a postcard from a beach holiday",
    "a guide to building a backyard bird feeder",
    "a newsletter blurb about a garden club",
    "a pitch for a class field trip to the zoo",
    "a rule sheet for a family board-game night",
    "a get-well-soon card for a teacher",
    "a job ad for a weekend dog walker",
    "a campfire story for younger cousins",
    "a grocery list for a camping trip",
    "a caption for a photo of a new puppy",
    "a message inviting neighbours to a street clean-up",
    "a tip sheet for a first day at a new school",
    "a product description for homemade candles",
    "a script for a school play audition",
    "an explanation of how rainbows form for a little brother",
    "a schedule for a family movie marathon",
    "a letter to a pen pal in another country",
];

/// Topics an audit case's original request can be about.
pub const AUDIT_DOMAINS: [&str; 15] = [
    "a weekend itinerary for a family city trip",
    "a plot summary of a well-known children's novel",
    "a weeknight dinner recipe for four people",
    "a review comparing two blenders",
    "a short overview of the first moon landing",
    "a comparison of neighbourhood coffee shops",
    "a guide to easy hiking trails near a lake",
    "a movie recommendation with a spoiler-free summary",
    "an adoption profile for a shelter dog",
    "a write-up of a town summer festival",
    "a plan for a backyard birthday celebration",
    "a checklist for a two-night camping trip",
    "menu descriptions for a small pizza restaurant",
    "a recap of a popular science podcast episode",
    "an introduction to beginner board games",
];

/// A generation prompt plus the random choices baked into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseRequest {
    pub prompt: String,
    /// Botched element, for detective cases.
    pub element: Option<CoStarElement>,
    /// Chosen scenario or audit domain.
    pub scenario: &'static str,
    /// Three-digit case number, 100–999.
    pub case_number: u16,
}

fn case_number<R: Rng + ?Sized>(rng: &mut R) -> u16 {
    rng.gen_range(100..=999)
}

/// Pick a botched element uniformly.
pub fn random_element<R: Rng + ?Sized>(rng: &mut R) -> CoStarElement {
    *CoStarElement::ALL
        .choose(rng)
        .unwrap_or(&CoStarElement::Context)
}

/// Build the detective-case request.
pub fn case_request<R: Rng + ?Sized>(rng: &mut R) -> CaseRequest {
    let scenario = *SCENARIOS.choose(rng).unwrap_or(&SCENARIOS[0]);
    let element = random_element(rng);
    let case_number = case_number(rng);
    let seed: u32 = rng.gen_range(0..100_000);

    let prompt = format!(
        r#"You are writing puzzles for a game that teaches the CO-STAR prompt framework
(Context, Objective, Style, Tone, Audience, Response). Variation seed: {seed}.

Invent a short, funny "case" about {scenario}. Someone wrote a prompt for an AI
but left out or botched exactly one CO-STAR element: {label}. The AI's answer
went wrong in a way that is clearly caused by that gap.

Requirements:
- Keep the language simple enough for a young reader.
- faultyPrompt is one or two sentences and must NOT cover {label}.
- faultyOutput shows the funny mistake.
- botchedExplanation quotes words from both faultyPrompt and faultyOutput.
- idealPrompt fixes only the {label} problem.

Reply with one JSON object and nothing else:
{{
  "id": "{case_number}",
  "title": "The Case of ...",
  "backstory": "...",
  "faultyPrompt": "...",
  "faultyOutput": "...",
  "botchedElement": "{tag}",
  "botchedExplanation": "...",
  "idealPrompt": "..."
}}"#,
        label = element.label(),
        tag = element.as_str(),
    );

    CaseRequest {
        prompt,
        element: Some(element),
        scenario,
        case_number,
    }
}

/// Build the audit-case request.
pub fn audit_request<R: Rng + ?Sized>(rng: &mut R) -> CaseRequest {
    let domain = *AUDIT_DOMAINS.choose(rng).unwrap_or(&AUDIT_DOMAINS[0]);
    let case_number = case_number(rng);

    let prompt = format!(
        r#"You are writing puzzles for beginners learning to spot mistakes in AI answers.

Someone asked an AI for {domain}. Write their request, then write the AI's
answer with two or three clear mistakes that contradict the request or
common knowledge.

Requirements:
- originalPrompt is one or two simple sentences.
- aiOutput is four to six short sentences, each a complete thought ending in
  a full stop, exclamation mark or question mark.
- Every bug's "text" is copied exactly from one sentence of aiOutput.
- Explanations are short enough for a ten-year-old.
- keyPoints summarise the request with an emoji each.

Reply with one JSON object and nothing else:
{{
  "id": "{case_number}",
  "title": "...",
  "originalPrompt": "...",
  "keyPoints": [
    {{"emoji": "📋", "label": "Task", "value": "..."}},
    {{"emoji": "📍", "label": "About", "value": "..."}},
    {{"emoji": "⚠️", "label": "Rule", "value": "..."}}
  ],
  "aiOutput": "...",
  "bugs": [
    {{"id": "bug-1", "text": "...", "explanation": "..."}}
  ]
}}"#
    );

    CaseRequest {
        prompt,
        element: None,
        scenario: domain,
        case_number,
    }
}

/// Ask for four candidate fixes to a case, exactly one of them right.
pub fn options_prompt(case: &CaseData) -> String {
    format!(
        r#"A CO-STAR prompt game shows the player a broken prompt and asks them to
pick the best fix from four choices.

Broken prompt: "{faulty}"
What went wrong: {explanation}
Missing element: {label}
Reference fix: "{ideal}"

Write four complete prompts labelled A to D. Exactly one fixes the {label}
problem without changing the request. The other three must be plausible but
wrong: one leaves {label} unaddressed, one changes the objective, and one
makes the problem worse. Shuffle which letter is correct. Each explanation
says in one sentence why the choice is right or wrong.

Reply with one JSON object and nothing else:
{{
  "options": [
    {{"id": "A", "promptText": "...", "isCorrect": false, "explanation": "..."}},
    {{"id": "B", "promptText": "...", "isCorrect": true, "explanation": "..."}},
    {{"id": "C", "promptText": "...", "isCorrect": false, "explanation": "..."}},
    {{"id": "D", "promptText": "...", "isCorrect": false, "explanation": "..."}}
  ]
}}"#,
        faulty = case.faulty_prompt,
        explanation = case.botched_explanation,
        label = case.botched_element.label(),
        ideal = case.ideal_prompt,
    )
}

/// Ask the mentor to review a free-form sandbox prompt.
pub fn mentor_prompt(prompt_text: &str) -> String {
    format!(
        r#"You coach beginners on the CO-STAR prompt framework
(Context, Objective, Style, Tone, Audience, Response).

Here is the prompt they wrote:
"""
{prompt_text}
"""

For each of the six elements say whether it is missing, partial or complete,
with a one-sentence comment. Then give one sentence of overall direction and
decide whether the prompt is ready to use.

Also write improvedPrompt: a rewrite that covers all six elements as natural
flowing prose. Do not use labels such as "Context:" or "Tone:".

Reply with one JSON object and nothing else:
{{
  "feedback": [
    {{"element": "Context", "status": "missing", "comment": "..."}}
  ],
  "overallAssessment": "...",
  "isReady": false,
  "improvedPrompt": "..."
}}"#
    )
}

/// Ask the evaluator to score a player's CO-STAR fix for a case.
pub fn evaluation_prompt(case: &CaseData, player: &PlayerPrompt) -> String {
    let breakdown: String = CoStarElement::ALL
        .iter()
        .map(|e| format!("- {}: \"{}\"\n", e.label(), player.field(*e)))
        .collect();

    format!(
        r#"You judge a CO-STAR prompt game. The player tried to repair a broken prompt.

Case background: {backstory}
Botched element: {label}
Reference fix: "{ideal}"

The player's breakdown:
{breakdown}
Score every element from 0 to 100 for how well it addresses the original
flaw. The case is solved when the {label} problem is properly fixed. Then
write what an AI would answer to the player's prompt, and a short
detective-style summary of the case.

Reply with one JSON object and nothing else:
{{
  "success": true,
  "overallScore": 0,
  "elementScores": {{"context": 0, "objective": 0, "style": 0, "tone": 0, "audience": 0, "response": 0}},
  "newOutput": "...",
  "caseSummary": "..."
}}"#,
        backstory = case.backstory,
        label = case.botched_element.label(),
        ideal = case.ideal_prompt,
    )
}
