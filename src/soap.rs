//! Line-oriented parser for SOAP clinical notes.
//!
//! Generated reports look roughly like:
//!
//! ```text
//! ## S (Subjetivo): dolor en la articulación temporomandibular
//! **O:** apertura bucal limitada
//! A - clase II esquelética
//! Plan: control en 3 meses
//! ```
//!
//! A header line is an optional markdown prefix (`#`, `*`, spaces), a section
//! letter or section name, and then end of line or a delimiter (`:`, `-`,
//! `*`, or a parenthetical). Anything on the header line after the delimiter
//! is the first content line. A word that merely starts with a section letter
//! (`Paciente refiere...`) is not a header.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The four SOAP sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoapSection {
    Subjective,
    Objective,
    Assessment,
    Plan,
}

impl SoapSection {
    pub fn all() -> &'static [SoapSection] {
        &[
            SoapSection::Subjective,
            SoapSection::Objective,
            SoapSection::Assessment,
            SoapSection::Plan,
        ]
    }

    pub fn letter(&self) -> char {
        match self {
            SoapSection::Subjective => 'S',
            SoapSection::Objective => 'O',
            SoapSection::Assessment => 'A',
            SoapSection::Plan => 'P',
        }
    }

    /// Display title used by the dashboards.
    pub fn title(&self) -> &'static str {
        match self {
            SoapSection::Subjective => "Subjetivo",
            SoapSection::Objective => "Objetivo",
            SoapSection::Assessment => "Análisis",
            SoapSection::Plan => "Plan",
        }
    }

    /// Accepted header words besides the letter, Spanish and English.
    fn names(&self) -> &'static [&'static str] {
        match self {
            SoapSection::Subjective => &["subjetivo", "subjective"],
            SoapSection::Objective => &["objetivo", "objective"],
            SoapSection::Assessment => &[
                "análisis",
                "analisis",
                "evaluación",
                "evaluacion",
                "assessment",
            ],
            SoapSection::Plan => &["plan"],
        }
    }

    pub fn from_letter(c: char) -> Option<SoapSection> {
        match c.to_ascii_uppercase() {
            'S' => Some(SoapSection::Subjective),
            'O' => Some(SoapSection::Objective),
            'A' => Some(SoapSection::Assessment),
            'P' => Some(SoapSection::Plan),
            _ => None,
        }
    }
}

impl fmt::Display for SoapSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.letter(), self.title())
    }
}

/// Errors from strict parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SoapError {
    #[error("Note is empty")]
    Empty,

    #[error("Missing SOAP sections: {}", letters(.0))]
    MissingSections(Vec<SoapSection>),
}

fn letters(sections: &[SoapSection]) -> String {
    sections
        .iter()
        .map(|s| s.letter().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A parsed note. A section is `None` when its header never appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoapNote {
    /// Text before the first header
    pub preamble: Option<String>,
    pub subjective: Option<String>,
    pub objective: Option<String>,
    pub assessment: Option<String>,
    pub plan: Option<String>,
}

impl SoapNote {
    pub fn get(&self, section: SoapSection) -> Option<&str> {
        self.slot(section).as_deref()
    }

    fn slot(&self, section: SoapSection) -> &Option<String> {
        match section {
            SoapSection::Subjective => &self.subjective,
            SoapSection::Objective => &self.objective,
            SoapSection::Assessment => &self.assessment,
            SoapSection::Plan => &self.plan,
        }
    }

    fn slot_mut(&mut self, section: SoapSection) -> &mut Option<String> {
        match section {
            SoapSection::Subjective => &mut self.subjective,
            SoapSection::Objective => &mut self.objective,
            SoapSection::Assessment => &mut self.assessment,
            SoapSection::Plan => &mut self.plan,
        }
    }

    /// Sections whose header never appeared, in S, O, A, P order.
    pub fn missing(&self) -> Vec<SoapSection> {
        SoapSection::all()
            .iter()
            .copied()
            .filter(|s| self.get(*s).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}

/// Parse a note, leaving absent sections as `None`.
///
/// A header repeated later in the note continues the same section.
pub fn parse(text: &str) -> SoapNote {
    let mut preamble: Vec<&str> = Vec::new();
    let mut bodies: [Option<Vec<&str>>; 4] = Default::default();
    let mut current: Option<usize> = None;

    for line in text.lines() {
        if let Some((section, rest)) = parse_header(line) {
            let idx = section_index(section);
            let body = bodies[idx].get_or_insert_with(Vec::new);
            if !rest.is_empty() {
                body.push(rest);
            }
            current = Some(idx);
        } else if let Some(idx) = current {
            bodies[idx].get_or_insert_with(Vec::new).push(line);
        } else {
            preamble.push(line);
        }
    }

    let mut note = SoapNote {
        preamble: join_lines(&preamble).filter(|s| !s.is_empty()),
        ..SoapNote::default()
    };
    for (section, body) in SoapSection::all().iter().zip(bodies.iter()) {
        *note.slot_mut(*section) = body.as_deref().and_then(join_lines);
    }
    note
}

/// Parse a note and fail if any of the four sections is absent.
pub fn parse_strict(text: &str) -> Result<SoapNote, SoapError> {
    if text.trim().is_empty() {
        return Err(SoapError::Empty);
    }
    let note = parse(text);
    let missing = note.missing();
    if missing.is_empty() {
        Ok(note)
    } else {
        log::warn!("SOAP note is missing sections: {}", letters(&missing));
        Err(SoapError::MissingSections(missing))
    }
}

fn section_index(section: SoapSection) -> usize {
    match section {
        SoapSection::Subjective => 0,
        SoapSection::Objective => 1,
        SoapSection::Assessment => 2,
        SoapSection::Plan => 3,
    }
}

fn join_lines(lines: &[&str]) -> Option<String> {
    Some(lines.join("\n").trim().to_string())
}

/// Recognize a header line; returns the section and the trimmed remainder.
fn parse_header(line: &str) -> Option<(SoapSection, &str)> {
    let s = line.trim_start_matches(|c: char| c == '#' || c == '*' || c.is_whitespace());
    let (section, after) = match_section_token(s)?;
    let rest = match_delimiter(after)?;
    Some((section, rest.trim()))
}

fn match_section_token(s: &str) -> Option<(SoapSection, &str)> {
    // Full names first so "Plan" is not read as the letter P
    for section in SoapSection::all() {
        for name in section.names() {
            if let Some(after) = strip_prefix_ci(s, name) {
                if !after.starts_with(char::is_alphanumeric) {
                    return Some((*section, after));
                }
            }
        }
    }
    let mut chars = s.chars();
    let section = SoapSection::from_letter(chars.next()?)?;
    let after = chars.as_str();
    if after.starts_with(char::is_alphanumeric) {
        return None;
    }
    Some((section, after))
}

/// After the section token: end of line, a parenthetical, or a delimiter.
fn match_delimiter(after: &str) -> Option<&str> {
    let mut rest = after.trim_start();
    if rest.is_empty() {
        return Some(rest);
    }

    let mut delimited = false;
    if let Some(inner) = rest.strip_prefix('(') {
        let close = inner.find(')')?;
        rest = &inner[close + 1..];
        delimited = true;
    }

    let trimmed = rest.trim_start_matches(|c: char| matches!(c, ':' | '-' | '*') || c.is_whitespace());
    let had_marker = rest
        .trim_start()
        .starts_with(|c: char| matches!(c, ':' | '-' | '*'));
    if delimited || had_marker || trimmed.is_empty() {
        Some(trimmed)
    } else {
        None
    }
}

/// Case-insensitive `strip_prefix`.
fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let mut chars = s.chars();
    for p in prefix.chars() {
        let c = chars.next()?;
        if !c.to_lowercase().eq(p.to_lowercase()) {
            return None;
        }
    }
    Some(chars.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_NOTE: &str = "\
Consulta de control.
## S (Subjetivo): dolor al masticar
desde hace dos semanas
**O:** apertura limitada
A - clase II esquelética
Plan: control en 3 meses
";

    #[test]
    fn test_full_note() {
        let note = parse_strict(FULL_NOTE).unwrap();

        assert_eq!(note.preamble.as_deref(), Some("Consulta de control."));
        assert_eq!(
            note.get(SoapSection::Subjective),
            Some("dolor al masticar\ndesde hace dos semanas")
        );
        assert_eq!(note.get(SoapSection::Objective), Some("apertura limitada"));
        assert_eq!(note.get(SoapSection::Assessment), Some("clase II esquelética"));
        assert_eq!(note.get(SoapSection::Plan), Some("control en 3 meses"));
    }

    #[test]
    fn test_words_starting_with_section_letters_are_content() {
        let note = parse("S:\nPaciente refiere dolor\nOclusión normal\nAsimetría leve");

        assert_eq!(
            note.get(SoapSection::Subjective),
            Some("Paciente refiere dolor\nOclusión normal\nAsimetría leve")
        );
        assert_eq!(note.missing().len(), 3);
    }

    #[test]
    fn test_letter_followed_by_plain_text_is_not_a_header() {
        assert!(parse_header("A la exploración se observa").is_none());
        assert!(parse_header("S el paciente").is_none());
        assert!(parse_header("Planificación quirúrgica").is_none());
    }

    #[test]
    fn test_header_forms() {
        let cases = [
            ("S", SoapSection::Subjective, ""),
            ("s: texto", SoapSection::Subjective, "texto"),
            ("### O - texto", SoapSection::Objective, "texto"),
            ("**A (Análisis)** texto", SoapSection::Assessment, "texto"),
            ("ANÁLISIS: texto", SoapSection::Assessment, "texto"),
            ("Assessment:", SoapSection::Assessment, ""),
            ("P* texto", SoapSection::Plan, "texto"),
            ("  Objective", SoapSection::Objective, ""),
        ];
        for (line, section, rest) in cases {
            assert_eq!(parse_header(line), Some((section, rest)), "line {line:?}");
        }
    }

    #[test]
    fn test_missing_sections_are_reported() {
        let err = parse_strict("S: dolor\nP: control").unwrap_err();
        assert_eq!(
            err,
            SoapError::MissingSections(vec![SoapSection::Objective, SoapSection::Assessment])
        );
        assert_eq!(err.to_string(), "Missing SOAP sections: O, A");
    }

    #[test]
    fn test_empty_note() {
        assert_eq!(parse_strict("  \n "), Err(SoapError::Empty));
        let note = parse("");
        assert_eq!(note, SoapNote::default());
        assert_eq!(note.missing().len(), 4);
    }

    #[test]
    fn test_header_without_body_is_present() {
        let note = parse("S:\nO:\nA:\nP:");
        assert!(note.is_complete());
        assert_eq!(note.get(SoapSection::Objective), Some(""));
    }

    #[test]
    fn test_repeated_header_appends() {
        let note = parse("S: uno\nO: dos\nS: tres");
        assert_eq!(note.get(SoapSection::Subjective), Some("uno\ntres"));
    }
}
