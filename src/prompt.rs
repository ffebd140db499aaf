//! Prompt assembly.
//!
//! Turns loaded samples into the single prompt sent to the model. The prompt
//! is a fixed instructional template wrapped around the labeled samples. It
//! tells the model to ignore subject matter, lists the style dimensions to
//! analyze, and asks for a prescriptive markdown guide.
//!
//! Assembly is a pure function of its inputs: the same samples, kind and
//! language always produce a byte-identical prompt.

use sha2::{Digest, Sha256};

use crate::models::{CorpusKind, Sample};

/// Placeholder replaced by the source language name in the code template.
const LANGUAGE_SLOT: &str = "{language}";
/// Placeholder replaced by the combined samples in both templates.
const SAMPLES_SLOT: &str = "{combined}";

const CODE_TEMPLATE: &str = r#"I want you to analyze these {language} files from a coding samples repository and create a comprehensive coding style guide.

IMPORTANT: These files are SAMPLES of my personal coding style. The specific application context is NOT part of my coding style. Focus ONLY on the coding patterns, conventions, and formatting choices that are consistent across all samples, regardless of what the code does.

Your task is to:

1. **Identify patterns and conventions** that appear consistently across all files
2. **Create a detailed markdown style guide** that captures my personal and distinctive coding style patterns
3. **Include specific snippet examples** from my actual code showing the STYLE, not the application logic
4. **Make it prescriptive** so another AI could replicate my style exactly when writing ANY type of {language} code

Analyze these aspects:

**Documentation:**
- Docstring format (Google/NumPy/Sphinx style?)
- What sections do I include? (Args, Returns, etc.)
- Level of detail in docstrings
- Module-level documentation patterns
- How I describe parameters and return values

**Type Hints:**
- Where and when do I use type annotations?
- Always on function signatures? Sometimes on variables?
- Complex types (Union, Optional, List, Dict patterns)

**Naming Conventions:**
- Variable naming (length, descriptiveness, patterns)
- Function naming (verbs, patterns)
- Class naming
- Constants (if any)
- Private/protected members (underscore usage)

**Code Organization:**
- Import ordering and grouping
- Class structure (method ordering, organization)
- File structure patterns
- Global variables and constants placement

**Comments:**
- When do I add comments?
- Inline vs block comments
- Comment style and detail level
- What do I explain vs what do I leave uncommented?

**Code Style:**
- Line length preferences
- Indentation patterns
- Blank line usage
- String quotes (single vs double)

**{language} Idioms:**
- List/dict comprehensions usage
- Use of decorators
- Context managers
- Generators and iterators
- Exception handling patterns

**Distinctive Patterns:**
- Any unique or characteristic patterns you notice
- Preferred libraries or approaches
- Code complexity preferences
- How I structure error handling
- Logging patterns

REMEMBER: Extract only the STYLE patterns that are consistent across samples. Do NOT include application-specific conventions. Focus on HOW I write code, not WHAT the code does.

Here are my {language} code samples:

{combined}

Create a markdown document with clear sections, snippet examples showing STYLE patterns, and actionable rules.
Format it as a professional style guide that could be given to a coding agent for writing ANY {language} code in my style."#;

const WRITING_TEMPLATE: &str = r#"I want you to analyze these writing samples and create a comprehensive writing style guide.

IMPORTANT: These texts are SAMPLES of my personal writing style. The specific subject matter is NOT part of my writing style. Focus ONLY on the writing patterns, conventions, and stylistic choices that are consistent across all samples, regardless of what the content is about.

Your task is to:

1. **Identify patterns and conventions** that appear consistently across all writing samples
2. **Create a detailed markdown style guide** that captures my personal and distinctive writing style
3. **Include specific examples** from my actual writing showing the STYLE, not the subject matter
4. **Make it prescriptive** so another AI could replicate my style exactly when writing about ANY topic

Analyze these aspects:

**Sentence Structure:**
- Sentence length patterns (short, medium, long, varied)
- Complexity (simple, compound, complex sentences)
- Use of subordinate clauses
- Parallel structure usage

**Paragraph Organization:**
- Paragraph length preferences
- Topic sentence patterns
- How ideas are developed within paragraphs
- Transition patterns between paragraphs

**Vocabulary and Word Choice:**
- Formality level (academic, professional, casual)
- Technical vs. accessible language balance
- Specific vs. general terminology
- Active vs. passive voice preference

**Tone and Voice:**
- Academic, professional, conversational, authoritative
- First person, third person usage
- Objectivity vs. subjectivity
- Hedging language patterns (may, might, could, possibly)

**Punctuation Patterns:**
- Comma usage patterns
- Semicolon and colon usage
- Em dash, parentheses usage
- List formatting (numbered, bulleted)

**Rhetorical Devices:**
- Use of questions
- Use of examples and analogies
- Enumeration patterns (firstly, secondly, etc.)
- Emphasis techniques (italics, bold, quotation marks)

**Academic/Technical Writing Patterns:**
- Citation style (if present)
- How definitions are introduced
- How concepts are explained
- Use of technical jargon
- Abbreviation patterns

**Text Organization:**
- How sections are structured
- Use of headers and subheaders
- Introduction and conclusion patterns
- How arguments are built

**Distinctive Patterns:**
- Any unique or characteristic phrases
- Preferred sentence openers
- Preferred ways to introduce new concepts
- Preferred ways to conclude ideas
- Use of specific connectors (however, therefore, furthermore)

REMEMBER: Extract only the WRITING STYLE patterns that are consistent across samples. Do NOT include subject-specific conventions. Focus on HOW I write, not WHAT I write about.

Here are my writing samples:

{combined}

Create a markdown document with clear sections, examples showing STYLE patterns, and actionable rules.
Format it as a professional writing style guide that could be given to a writing assistant for producing ANY type of text in my style."#;

/// Label every sample and join the blocks with a blank line.
///
/// Code samples are fenced with the lowercase language tag; writing samples
/// are left as plain text under their heading.
pub fn combine_samples(samples: &[Sample], kind: CorpusKind, language: &str) -> String {
    let fence = language.to_lowercase();
    samples
        .iter()
        .map(|sample| match kind {
            CorpusKind::Code => format!(
                "### File: {}\n```{}\n{}\n```",
                sample.relative_path, fence, sample.content
            ),
            CorpusKind::Writing => {
                format!("### Sample: {}\n\n{}", sample.relative_path, sample.content)
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the full extraction prompt for `samples`.
///
/// `language` names the source language of a code corpus (e.g. `"Python"`)
/// and is ignored for writing corpora.
pub fn assemble_prompt(samples: &[Sample], kind: CorpusKind, language: &str) -> String {
    let template = match kind {
        CorpusKind::Code => CODE_TEMPLATE.replace(LANGUAGE_SLOT, language),
        CorpusKind::Writing => WRITING_TEMPLATE.to_string(),
    };
    let combined = combine_samples(samples, kind, language);

    // Samples go in last so their content is never scanned for placeholders.
    match template.split_once(SAMPLES_SLOT) {
        Some((before, after)) => {
            let mut prompt = String::with_capacity(template.len() + combined.len());
            prompt.push_str(before);
            prompt.push_str(&combined);
            prompt.push_str(after);
            prompt
        }
        None => template,
    }
}

/// SHA-256 hex digest of an assembled prompt.
pub fn prompt_digest(prompt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prompt.as_bytes());
    hex::encode(hasher.finalize())
}
