//! Reduces a regular expression to literal substrings every match contains.
//!
//! Query languages cannot run regexes, so a pattern filter is approximated by
//! "contains" tests on the literal runs the pattern requires. The result is a
//! necessary condition only; anything the walker does not understand breaks
//! the current run instead of guessing.

use regex::Regex;
use regex_syntax::hir::{Class, Hir, HirKind, Literal};

/// Upper bound on expanded alternatives before a group is treated as opaque.
const MAX_ALTERNATIVES: usize = 64;

/// Largest class still read as one letter under case folding (`k`, `K` and
/// the Kelvin sign fold together).
const MAX_FOLDED_CLASS: usize = 4;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Char(char),
    Break,
}

type Stream = Vec<Token>;

pub struct RegexpDisassembler {
    alternatives: Vec<Hir>,
    ignore_case: bool,
}

impl RegexpDisassembler {
    pub fn new(regex: &Regex) -> Self {
        Self::from_source(regex.as_str())
    }

    /// A source that does not parse requires nothing.
    pub fn from_source(source: &str) -> Self {
        let hir = match regex_syntax::parse(source) {
            Ok(hir) => hir,
            Err(err) => {
                tracing::debug!(%source, error = %err, "pattern not disassembled");
                return Self {
                    alternatives: Vec::new(),
                    ignore_case: false,
                };
            }
        };
        let ignore_case = has_folded_class(&hir);
        let alternatives = match hir.kind() {
            HirKind::Alternation(subs) => subs.clone(),
            _ => vec![hir],
        };
        Self {
            alternatives,
            ignore_case,
        }
    }

    pub fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    /// Substrings every match must contain. Empty when the pattern alternates
    /// at the top level.
    pub fn substrings(&self) -> Vec<String> {
        let [only] = self.alternatives.as_slice() else {
            return Vec::new();
        };
        expand(only, false)
            .first()
            .map(|s| self.strings_of(s))
            .unwrap_or_default()
    }

    /// Alternatives of substring sets: a match contains every string of at
    /// least one set. Empty when some alternative requires nothing.
    pub fn alternated_substrings(&self) -> Vec<Vec<String>> {
        let mut sets = Vec::new();
        for alternative in &self.alternatives {
            for stream in expand(alternative, true) {
                let strings = self.strings_of(&stream);
                if strings.is_empty() {
                    return Vec::new();
                }
                sets.push(strings);
            }
        }
        remove_or_covered(sets)
    }

    fn strings_of(&self, stream: &[Token]) -> Vec<String> {
        let mut strings = Vec::new();
        let mut run = String::new();
        for token in stream {
            match token {
                Token::Char(c) => run.push(*c),
                Token::Break => {
                    if !run.is_empty() {
                        strings.push(std::mem::take(&mut run));
                    }
                }
            }
        }
        if !run.is_empty() {
            strings.push(run);
        }
        if self.ignore_case {
            strings = strings.into_iter().map(|s| s.to_uppercase()).collect();
        }
        remove_and_covered(strings)
    }
}

/// Drop strings implied by a longer string in the same set.
fn remove_and_covered(strings: Vec<String>) -> Vec<String> {
    let mut kept: Vec<String> = Vec::new();
    for (i, s) in strings.iter().enumerate() {
        let covered = strings
            .iter()
            .enumerate()
            .any(|(j, other)| j != i && other.contains(s.as_str()) && (other != s || j < i));
        if !covered {
            kept.push(s.clone());
        }
    }
    kept
}

/// Drop alternatives that are stricter than another alternative.
fn remove_or_covered(sets: Vec<Vec<String>>) -> Vec<Vec<String>> {
    let implies = |strict: &Vec<String>, loose: &Vec<String>| {
        loose
            .iter()
            .all(|l| strict.iter().any(|s| s.contains(l.as_str())))
    };
    let mut kept: Vec<Vec<String>> = Vec::new();
    for (i, set) in sets.iter().enumerate() {
        let covered = sets.iter().enumerate().any(|(j, other)| {
            j != i && implies(set, other) && (!implies(other, set) || j < i)
        });
        if !covered {
            kept.push(set.clone());
        }
    }
    kept
}

fn expand(hir: &Hir, alternation: bool) -> Vec<Stream> {
    match hir.kind() {
        HirKind::Empty | HirKind::Look(_) => vec![Vec::new()],
        HirKind::Literal(Literal(bytes)) => match std::str::from_utf8(bytes) {
            Ok(text) => vec![text.chars().map(Token::Char).collect()],
            Err(_) => vec![vec![Token::Break]],
        },
        HirKind::Class(class) => match class_letter(class) {
            Some((c, _)) => vec![vec![Token::Char(c)]],
            None => vec![vec![Token::Break]],
        },
        HirKind::Capture(capture) => expand(&capture.sub, alternation),
        HirKind::Concat(subs) => {
            let mut streams: Vec<Stream> = vec![Vec::new()];
            for sub in subs {
                let mut parts = expand(sub, alternation);
                if streams.len() * parts.len() > MAX_ALTERNATIVES {
                    parts = vec![vec![Token::Break]];
                }
                streams = product(&streams, &parts);
            }
            streams
        }
        HirKind::Alternation(subs) if alternation => {
            let streams: Vec<Stream> = subs.iter().flat_map(|s| expand(s, alternation)).collect();
            if streams.len() > MAX_ALTERNATIVES {
                vec![vec![Token::Break]]
            } else {
                streams
            }
        }
        HirKind::Alternation(_) => vec![vec![Token::Break]],
        HirKind::Repetition(repetition) => {
            let (min, max) = (repetition.min, repetition.max);
            if min == 0 {
                return vec![vec![Token::Break]];
            }
            let inner = expand(&repetition.sub, alternation);
            let mut required: Vec<Stream> = vec![Vec::new()];
            for _ in 0..min {
                if required.len() * inner.len() > MAX_ALTERNATIVES {
                    return vec![vec![Token::Break]];
                }
                required = product(&required, &inner);
            }
            if max == Some(min) {
                return required;
            }
            // The first `min` copies follow the prefix and the last `min`
            // copies precede the suffix; anything between is unknown.
            required
                .iter()
                .map(|stream| {
                    let mut out = stream.clone();
                    out.push(Token::Break);
                    out.extend(stream.iter().cloned());
                    out
                })
                .collect()
        }
    }
}

fn product(left: &[Stream], right: &[Stream]) -> Vec<Stream> {
    let mut out = Vec::with_capacity(left.len() * right.len());
    for l in left {
        for r in right {
            let mut joined = l.clone();
            joined.extend(r.iter().cloned());
            out.push(joined);
        }
    }
    out
}

/// The single letter a class stands for, uppercased when the class is the
/// case-folded set of that letter. The flag reports folding.
fn class_letter(class: &Class) -> Option<(char, bool)> {
    let Class::Unicode(class) = class else {
        return None;
    };
    let mut chars = Vec::new();
    for range in class.ranges() {
        for c in range.start()..=range.end() {
            chars.push(c);
            if chars.len() > MAX_FOLDED_CLASS {
                return None;
            }
        }
    }
    let (&first, rest) = chars.split_first()?;
    if rest.is_empty() {
        return Some((first, false));
    }
    let same_letter = |c: char| {
        c.to_uppercase().eq(first.to_uppercase()) || c.to_lowercase().eq(first.to_lowercase())
    };
    if !rest.iter().all(|&c| same_letter(c)) {
        return None;
    }
    let mut upper = first.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(c), None) => Some((c, true)),
        _ => None,
    }
}

fn has_folded_class(hir: &Hir) -> bool {
    match hir.kind() {
        HirKind::Class(class) => class_letter(class).is_some_and(|(_, folded)| folded),
        HirKind::Capture(capture) => has_folded_class(&capture.sub),
        HirKind::Repetition(repetition) => has_folded_class(&repetition.sub),
        HirKind::Concat(subs) | HirKind::Alternation(subs) => subs.iter().any(has_folded_class),
        HirKind::Empty | HirKind::Literal(_) | HirKind::Look(_) => false,
    }
}
