//! Prompt Builders
//!
//! Every LLM call in the coding and behavioral workflows is built here as a
//! [`PromptPair`]. Builders are pure: they only format their inputs, so the
//! services that use them can be tested with a scripted completion client.

use crate::models::{
    BehavioralStory, LeadershipPrinciple, OptimalImplementation, ProblemExample, ProblemInfo,
};

/// User prompt plus system prompt for one completion call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub prompt: String,
    pub system_prompt: String,
}

impl PromptPair {
    fn new(prompt: String, system_prompt: impl Into<String>) -> Self {
        Self {
            prompt,
            system_prompt: system_prompt.into(),
        }
    }
}

fn examples_json(examples: &[ProblemExample]) -> String {
    serde_json::to_string_pretty(examples).unwrap_or_else(|_| "[]".to_string())
}

/// Fields shared by the markdown prompts, each with its own missing-value text
fn problem_block(info: &ProblemInfo, language: &str) -> String {
    format!(
        "PROBLEM STATEMENT:\n{}\n\n\
         CONSTRAINTS:\n{}\n\n\
         EXAMPLE INPUT:\n{}\n\n\
         EXAMPLE OUTPUT:\n{}\n\n\
         LANGUAGE: {}",
        info.statement_or("Problem statement not provided."),
        info.constraints_or("No specific constraints provided."),
        info.example_input_or("No example input provided."),
        info.example_output_or("No example output provided."),
        language
    )
}

// ============================================================================
// Extraction and understanding
// ============================================================================

/// Vision prompt that reads the problem out of the screenshots
pub fn extraction_prompt(language: &str) -> PromptPair {
    PromptPair::new(
        format!(
            "Extract the coding problem details from these screenshots in JSON. Language: {}",
            language
        ),
        "You are a coding challenge interpreter. Extract problem details from screenshots in JSON \
         with fields: problem_statement, constraints, example_input, example_output.",
    )
}

/// Either `{"examplesPresent": true}` or a full `ProblemUnderstandingData`
pub fn understanding_prompt(info: &ProblemInfo) -> PromptPair {
    let prompt = format!(
        r#"Task: Analyze the coding problem below. First decide whether it already contains sufficient input/output examples.

Problem Information:
```json
{}
```

1. If clear examples ARE present in example_input and example_output, respond only with:
   {{ "examplesPresent": true }}
2. Otherwise respond with a ProblemUnderstandingData object:
   - "understandingStatement": the problem's objective restated in your own words
   - "generatedExamples": 1-2 examples, each with "input", "output" and an optional "explanation"
   - "clarifyingQuestions": 1-2 questions, only when a critical ambiguity remains; otherwise []

Example:
{{
  "understandingStatement": "Find the minimum path sum from the top to the bottom of a triangle, moving to adjacent numbers on the row below.",
  "generatedExamples": [
    {{ "input": "triangle = [[2],[3,4],[6,5,7],[4,1,8,3]]", "output": "11", "explanation": "2 -> 3 -> 5 -> 1 = 11" }},
    {{ "input": "triangle = [[-10]]", "output": "-10" }}
  ],
  "clarifyingQuestions": []
}}

Respond ONLY with a single valid JSON object. No text outside the JSON and no code fences."#,
        info.to_prompt_json()
    );

    PromptPair::new(
        prompt,
        "You are an AI assistant analyzing coding problems. If the problem info already contains \
         sufficient examples, respond with { \"examplesPresent\": true }. Otherwise restate the \
         problem, create 1-2 illustrative examples and ask clarifying questions only if essential. \
         Respond strictly with the specified JSON.",
    )
}

/// Regenerate the understanding after user feedback
pub fn refined_understanding_prompt(
    info: &ProblemInfo,
    previous_understanding: &str,
    previous_examples: &[ProblemExample],
    previous_questions: &[String],
    clarification: &str,
) -> PromptPair {
    let questions = if previous_questions.is_empty() {
        "None".to_string()
    } else {
        previous_questions.join("\n")
    };

    let prompt = format!(
        r#"Task: Refine the understanding and examples for this coding problem based on the user's clarification.

Original Problem Information:
```json
{}
```

Previous AI Understanding:
{}

Previously Generated Examples:
{}

Previously Asked Questions:
{}

User Clarification/Feedback:
{}

Produce an updated ProblemUnderstandingData object:
- "understandingStatement": the revised statement
- "generatedExamples": 1-2 revised or new examples that reflect the clarification
- "clarifyingQuestions": only if the clarification introduced new ambiguity; usually []

Respond ONLY with a single valid JSON object. No text outside the JSON and no code fences."#,
        info.to_prompt_json(),
        previous_understanding,
        examples_json(previous_examples),
        questions,
        clarification
    );

    PromptPair::new(
        prompt,
        "You are an AI assistant refining your understanding of a coding problem based on user \
         feedback. Respond strictly with the ProblemUnderstandingData JSON structure.",
    )
}

// ============================================================================
// Solutions
// ============================================================================

/// Primary path: one JSON object with four sections
pub fn narrative_prompt(
    language: &str,
    info: &ProblemInfo,
    understanding: &str,
    examples: &[ProblemExample],
) -> PromptPair {
    let prompt = format!(
        r#"Task: Using the confirmed understanding and examples, produce the problem analysis, brute force approach, optimization strategy and optimal implementation.

Confirmed Understanding:
{understanding}

Confirmed Examples:
{examples}

Original Problem Information (for reference):
```json
{info}
```

Structure your response as a single JSON object with exactly these keys:
- "problemAnalysis": the confirmed understanding, restated
- "bruteForce": {{ "explanation", "codeOrPseudocode" (in {language}), "timeComplexity", "spaceComplexity", "inefficiencyReason" }}
- "optimizationStrategy": {{ "explanation", "pseudocode", "timeComplexity", "spaceComplexity" }}
- "optimalImplementation": {{ "code": complete, heavily commented {language} code, "dryRun": a step-by-step dry run on one confirmed example }}

The whole output must be one valid JSON object starting with {{ and ending with }}.

LANGUAGE: {language}"#,
        understanding = understanding,
        examples = examples_json(examples),
        info = info.to_prompt_json(),
        language = language
    );

    PromptPair::new(
        prompt,
        "You are an expert coding interview coach. The user has confirmed their understanding of \
         the problem. Generate the brute force analysis, optimization strategy and optimal \
         implementation as a JSON object with keys 'problemAnalysis', 'bruteForce', \
         'optimizationStrategy' and 'optimalImplementation'. Use a conversational tone.",
    )
}

/// First call of the detailed path
pub fn brute_force_prompt(language: &str, info: &ProblemInfo) -> PromptPair {
    let prompt = format!(
        "I need a straightforward brute force solution for this coding problem:\n\n\
         {}\n\n\
         Please provide:\n\
         1. A simple, non-optimized, but CORRECT brute force solution in {}.\n\
         2. Time complexity analysis with explanation.\n\
         3. Space complexity analysis with explanation.\n\
         4. A dry run of the solution on the example input.\n\n\
         Format your response with these headers:\n\
         - Brute Force Solution (with code block)\n\
         - Dry Run\n\
         - Time complexity\n\
         - Space complexity",
        problem_block(info, language),
        language
    );

    PromptPair::new(
        prompt,
        "You are an expert coding interview assistant. Your task is to create a correct but \
         straightforward brute force solution for a coding problem.",
    )
}

/// Second call of the detailed path, seeded with the parsed brute force
pub fn optimized_prompt(
    language: &str,
    info: &ProblemInfo,
    brute_force_code: &str,
    brute_force_time: &str,
    brute_force_space: &str,
) -> PromptPair {
    let prompt = format!(
        "Now optimize the brute force solution for this problem:\n\n\
         PROBLEM STATEMENT:\n{}\n\n\
         BRUTE FORCE SOLUTION:\n```{}\n{}\n```\n\n\
         BRUTE FORCE TIME COMPLEXITY: {}\n\
         BRUTE FORCE SPACE COMPLEXITY: {}\n\n\
         Use these headers: \"Optimization Analysis\" (a bullet list of the inefficiencies and \
         how you remove them), \"Optimized Code\" (a complete solution in {}), \"Dry Run\", \
         \"Time Complexity\" and \"Space Complexity\" (each with an explanation).",
        info.statement_or("Problem statement not provided."),
        language,
        brute_force_code,
        brute_force_time,
        brute_force_space,
        language
    );

    PromptPair::new(
        prompt,
        "You are an expert coding interview assistant. Your task is to analyze a brute force \
         solution and create an optimized version with clear explanations.",
    )
}

/// Single JSON call with four independently rendered sections
pub fn four_quadrant_prompt(
    language: &str,
    info: &ProblemInfo,
    understanding: &str,
    examples: &[ProblemExample],
) -> PromptPair {
    let prompt = format!(
        r#"Task: Produce a comprehensive four-part analysis of this coding problem.

Confirmed Understanding:
{understanding}

Confirmed Examples:
{examples}

Problem Information:
```json
{info}
```

Respond with a single JSON object:
{{
  "problemUnderstanding": "(markdown) the problem restated, inputs, outputs and edge cases",
  "bruteForceApproach": "(markdown) the direct approach and why it is slow",
  "optimalSolutionPseudocode": "(markdown) pseudocode of the optimal approach",
  "optimalSolutionImplementation": {{
    "code": "complete {language} code",
    "timeComplexity": "Big O with reasoning",
    "spaceComplexity": "Big O with reasoning",
    "thinkingProcess": "(markdown) how to arrive at the solution in an interview"
  }}
}}

No text outside the JSON.

LANGUAGE: {language}"#,
        understanding = understanding,
        examples = examples_json(examples),
        info = info.to_prompt_json(),
        language = language
    );

    PromptPair::new(
        prompt,
        "You are an expert coding interview coach. Respond strictly with the requested \
         four-section JSON object.",
    )
}

/// One-shot markdown answer used whenever a primary path fails
pub fn standard_solution_prompt(language: &str, info: &ProblemInfo) -> PromptPair {
    let prompt = format!(
        "Generate a detailed solution for the following coding problem:\n\n\
         {}\n\n\
         Use this structure:\n\
         ### Thoughts\n\
         - key insights and reasoning, one per bullet\n\n\
         ### Code\n\
         ```{}\n\
         // complete, commented solution\n\
         ```\n\n\
         ### Time Complexity\n\
         O(X) with at least two sentences of explanation\n\n\
         ### Space Complexity\n\
         O(X) with at least two sentences of explanation",
        problem_block(info, language),
        language
    );

    PromptPair::new(
        prompt,
        "You are a helpful coding assistant providing direct solutions.",
    )
}

/// Vision prompt over the debug screenshots
pub fn debug_prompt(language: &str, info: &ProblemInfo, current_code: Option<&str>) -> PromptPair {
    let code_section = current_code
        .filter(|code| !code.trim().is_empty())
        .map(|code| format!("\n\nMy current solution:\n```{}\n{}\n```", language, code))
        .unwrap_or_default();

    let prompt = format!(
        "I'm solving this coding problem: \"{}\" in {}. I need help with debugging or improving \
         my solution. The screenshots show my code, the errors or the test cases.{}\n\n\
         Please provide:\n\
         1. What issues you found in my code\n\
         2. Specific improvements and corrections\n\
         3. Any optimizations that would make the solution better\n\
         4. A clear explanation of the changes needed",
        info.statement_or("Not specified"),
        language,
        code_section
    );

    let system_prompt = r#"You are a coding interview assistant helping debug and improve solutions. Analyze these screenshots which include either error messages, incorrect outputs, or test cases, and provide detailed debugging help.

Your response MUST follow this structure (use ### for headers):
### Issues Identified
- each issue as a bullet point

### Specific Improvements and Corrections
- specific code changes as bullet points

### Optimizations
- performance optimizations, if any

### Explanation of Changes Needed
why the changes are needed

### Key Points
- the most important takeaways

Put code examples in markdown code blocks with a language tag."#;

    PromptPair::new(prompt, system_prompt)
}

/// Revise (or explain) the latest implementation
pub fn follow_up_prompt(
    language: &str,
    problem_analysis: &str,
    previous: &OptimalImplementation,
    question: &str,
) -> PromptPair {
    let prompt = format!(
        r#"Problem Analysis:
{analysis}

Previous Optimal Code ({language}):
```{language}
{code}
```

Previous Dry Run:
{dry_run}

User Follow-up Question: {question}

Respond with a single JSON object containing only "optimalImplementation" with nested "code" and "dryRun":
- if the question asks for a change, give the complete updated code with comments and a new dry run
- if it asks about the existing code, keep "code" identical and put the explanation in "dryRun", prefixed with "Explanation:"
- if it cannot be answered by changing the code, say so briefly in "dryRun" and keep "code" the same

{{ "optimalImplementation": {{ "code": "...", "dryRun": "..." }} }}

No text outside the JSON."#,
        analysis = problem_analysis,
        language = language,
        code = previous.code,
        dry_run = previous.dry_run,
        question = question
    );

    PromptPair::new(
        prompt,
        "You are an expert coding interview assistant answering a follow-up question about a \
         previously provided optimal solution. Respond strictly with a JSON object containing \
         only 'optimalImplementation' with 'code' and 'dryRun'.",
    )
}

// ============================================================================
// Behavioral
// ============================================================================

/// Which leadership principles a question targets, as a JSON array of names
pub fn principle_extraction_prompt(question: &str, principles: &[LeadershipPrinciple]) -> PromptPair {
    let list = principles
        .iter()
        .map(|lp| format!("- {}: {}", lp.name, lp.description))
        .collect::<Vec<_>>()
        .join("\n");

    let prompt = format!(
        "User Behavioral Question: \"{}\"\n\n\
         Available Leadership Principles:\n{}\n\n\
         Identify the principle(s) the question targets. Respond ONLY with a JSON array of the \
         exact principle names, or [] if none apply.\n\n\
         Example Output:\n[\"Customer Obsession\", \"Deliver Results\"]",
        question, list
    );

    PromptPair::new(
        prompt,
        "You are an AI assistant specializing in behavioral interviews and Amazon's Leadership \
         Principles. Respond strictly with a JSON array of LP names.",
    )
}

/// Pick the single best pre-written story
pub fn story_selection_prompt(
    question: &str,
    principles: &[String],
    stories: &[BehavioralStory],
) -> PromptPair {
    let formatted = stories
        .iter()
        .map(BehavioralStory::star_context)
        .collect::<Vec<_>>()
        .join("\n\n---\n\n");

    let prompt = format!(
        r#"Task: Select the single best behavioral story below for the user's question, considering the relevant Leadership Principles.

User Question: {question}

Extracted Relevant LPs: {principles}

Available Stories:
{stories}

Respond ONLY with a JSON object:
- "selectedStoryId": the id of the chosen story, or null if none fits
- "reasoning": why the story answers the question, a short STAR summary, the quantitative (or qualitative) impact and the key lessons learned, in a confident active voice

Example:
{{ "selectedStoryId": "story_003", "reasoning": "This story directly addresses ..." }}"#,
        question = question,
        principles = principles.join(", "),
        stories = formatted
    );

    PromptPair::new(
        prompt,
        "You are an AI assistant helping users prepare for behavioral interviews. Select the \
         single best pre-written STAR story for the question and explain the choice, all within \
         the specified JSON format.",
    )
}

/// Context assumed when no story fits and one has to be generated
pub const GENERATED_STORY_CONTEXT: &str = "User is a software engineer with experience in web \
     development and cloud services. Key achievement: Led a project migration.";

/// Write a new STAR story when the library has no fit
pub fn story_generation_prompt(question: &str, principles: &[String]) -> PromptPair {
    let prompt = format!(
        "User Behavioral Question: \"{}\"\n\n\
         Target Leadership Principles: {}\n\n\
         User Context: {}\n\n\
         Write a plausible, compelling STAR story (Situation, Task, Action, Result) that answers \
         the question and demonstrates the target principles.\n\n\
         Respond ONLY with a JSON object with a single key \"generatedStoryText\" whose value is \
         the full story with **Situation:**, **Task:**, **Action:** and **Result:** headings.",
        question,
        principles.join(", "),
        GENERATED_STORY_CONTEXT
    );

    PromptPair::new(
        prompt,
        "You are an AI assistant skilled at crafting STAR-formatted behavioral stories. Respond \
         strictly with a JSON object containing the key 'generatedStoryText'.",
    )
}

/// Likely interviewer probes for a chosen story, with answers
pub fn anticipated_follow_ups_prompt(question: &str, story: &BehavioralStory) -> PromptPair {
    let prompt = format!(
        "Original Behavioral Question: \"{}\"\n\n\
         Selected STAR Story:\n{}\n\n\
         Based only on this story, anticipate 3-5 follow-up questions an interviewer might ask \
         about technical details, challenges, results, alternatives considered and lessons \
         learned. Answer each concisely and confidently from the story's details.\n\n\
         Respond ONLY with a JSON array of objects with keys \"question\" and \"answer\".",
        question,
        story.star_context()
    );

    PromptPair::new(
        prompt,
        "You are an AI assistant simulating a behavioral interview. Respond strictly with a JSON \
         array of {question, answer} objects drawn only from the story.",
    )
}

/// Answer a follow-up about the selected story
pub fn behavioral_follow_up_prompt(
    original_question: &str,
    story: &BehavioralStory,
    follow_up: &str,
) -> PromptPair {
    let prompt = format!(
        "Original Behavioral Question: \"{}\"\n\n\
         Previously Selected Story:\n\
         Title: {}\nSituation: {}\nTask: {}\nAction: {}\nResult: {}\n\n\
         User Follow-up Question: \"{}\"\n\n\
         Answer the follow-up directly in relation to the story. Respond ONLY with a JSON object \
         with a single key \"explanation\".",
        original_question,
        story.title,
        story.situation,
        story.task,
        story.action,
        story.result,
        follow_up
    );

    PromptPair::new(
        prompt,
        "You are an AI assistant helping a user elaborate on their pre-written behavioral \
         stories. Answer from the provided STAR context only. Respond strictly with a JSON object \
         containing the key 'explanation'.",
    )
}

/// First-person markdown expansion of a story. Sent without a system prompt.
pub fn story_detail_prompt(story: &BehavioralStory) -> PromptPair {
    let outline = serde_json::to_string_pretty(story).unwrap_or_default();
    let prompt = format!(
        r#"Act as an expert career coach preparing a candidate for behavioral interviews focused on Amazon's Leadership Principles.

Expand this STAR outline into a rich narrative written entirely in the first person ("I"):
```json
{outline}
```

Cover:
1. Situation: the broader context, why it mattered and the constraints I faced
2. Task: my specific responsibilities and objective
3. Action: the steps I took, my decisions and why, tools used, obstacles and how I collaborated
4. Result: how the results were measured, or the qualitative impact, and why it mattered
5. Lessons Learned: 2-3 takeaways tied to {principles}

Use the markdown sections ### Situation, ### Task, ### Action, ### Result and ### Lessons Learned."#,
        outline = outline,
        principles = story.principles.join(", ")
    );

    PromptPair::new(prompt, String::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_sum() -> ProblemInfo {
        ProblemInfo {
            problem_statement: Some("Two Sum".to_string()),
            constraints: None,
            example_input: Some("[2,7,11,15], 9".to_string()),
            example_output: Some("[0,1]".to_string()),
        }
    }

    fn story() -> BehavioralStory {
        BehavioralStory {
            id: "story_001".to_string(),
            title: "Migration".to_string(),
            principles: vec!["Ownership".to_string()],
            situation: "Legacy stack".to_string(),
            task: "Move it".to_string(),
            action: "Phased rollout".to_string(),
            result: "Zero downtime".to_string(),
        }
    }

    #[test]
    fn test_markdown_prompts_substitute_defaults() {
        let pair = standard_solution_prompt("rust", &two_sum());
        assert!(pair.prompt.contains("PROBLEM STATEMENT:\nTwo Sum"));
        assert!(pair.prompt.contains("No specific constraints provided."));
        assert!(pair.prompt.contains("```rust"));
        assert_eq!(
            pair.system_prompt,
            "You are a helpful coding assistant providing direct solutions."
        );

        let pair = brute_force_prompt("java", &ProblemInfo::default());
        assert!(pair.prompt.contains("Problem statement not provided."));
        assert!(pair.prompt.contains("LANGUAGE: java"));
    }

    #[test]
    fn test_understanding_prompt_embeds_problem_json() {
        let pair = understanding_prompt(&two_sum());
        assert!(pair.prompt.contains("\"problem_statement\": \"Two Sum\""));
        assert!(pair.prompt.contains("{ \"examplesPresent\": true }"));
        assert!(pair.system_prompt.contains("examplesPresent"));
    }

    #[test]
    fn test_refined_prompt_lists_previous_state() {
        let examples = vec![ProblemExample {
            input: "[1,2]".to_string(),
            output: "3".to_string(),
            explanation: None,
        }];
        let pair = refined_understanding_prompt(
            &two_sum(),
            "Sum two numbers",
            &examples,
            &[],
            "Indices are 1-based",
        );
        assert!(pair.prompt.contains("Previous AI Understanding:\nSum two numbers"));
        assert!(pair.prompt.contains("\"input\": \"[1,2]\""));
        assert!(pair.prompt.contains("Previously Asked Questions:\nNone"));
        assert!(pair.prompt.ends_with("no code fences."));
        assert!(pair.prompt.contains("Indices are 1-based"));
    }

    #[test]
    fn test_narrative_prompt_names_all_sections() {
        let pair = narrative_prompt("python", &two_sum(), "Find two indices", &[]);
        for key in [
            "problemAnalysis",
            "bruteForce",
            "optimizationStrategy",
            "optimalImplementation",
            "inefficiencyReason",
        ] {
            assert!(pair.prompt.contains(key), "missing {}", key);
        }
        assert!(pair.prompt.ends_with("LANGUAGE: python"));
    }

    #[test]
    fn test_debug_prompt_includes_current_code() {
        let pair = debug_prompt("python", &two_sum(), Some("return []"));
        assert!(pair.prompt.starts_with("I'm solving this coding problem: \"Two Sum\" in python."));
        assert!(pair.prompt.contains("```python\nreturn []\n```"));
        assert!(pair.system_prompt.contains("### Issues Identified"));

        let pair = debug_prompt("python", &two_sum(), Some("  "));
        assert!(!pair.prompt.contains("My current solution"));
    }

    #[test]
    fn test_follow_up_prompt_carries_latest_revision() {
        let previous = OptimalImplementation {
            code: "def f(): pass".to_string(),
            dry_run: "f() -> None".to_string(),
        };
        let pair = follow_up_prompt("python", "analysis", &previous, "Use less memory?");
        assert!(pair.prompt.contains("```python\ndef f(): pass\n```"));
        assert!(pair.prompt.contains("User Follow-up Question: Use less memory?"));
    }

    #[test]
    fn test_behavioral_prompts() {
        let lps = vec![LeadershipPrinciple {
            name: "Ownership".to_string(),
            description: "Leaders are owners".to_string(),
        }];
        let pair = principle_extraction_prompt("Tell me about a time", &lps);
        assert!(pair.prompt.contains("- Ownership: Leaders are owners"));

        let pair = story_selection_prompt("Q", &["Ownership".to_string()], &[story(), story()]);
        assert!(pair.prompt.contains("Story ID: story_001"));
        assert_eq!(pair.prompt.matches("\n\n---\n\n").count(), 1);

        let pair = story_generation_prompt("Q", &["Bias for Action".to_string()]);
        assert!(pair.prompt.contains(GENERATED_STORY_CONTEXT));

        let pair = story_detail_prompt(&story());
        assert!(pair.system_prompt.is_empty());
        assert!(pair.prompt.contains("### Lessons Learned"));
        assert!(pair.prompt.contains("tied to Ownership"));
    }
}
