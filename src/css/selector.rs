//! Selectors: compound steps joined by descendant / direct-child combinators,
//! stored rightmost-first so matching can walk up the ancestor chain.

use std::fmt;

/// Relationship between a step and the step to its right
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace: any ancestor
    Descendant,
    /// `>`: the immediate parent
    Child,
}

/// Interaction state named by a `:pseudo` segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoState {
    Hover,
    Active,
    Focus,
    Disabled,
    Selected,
    /// Unrecognised name; never matches
    Unknown(String),
}

impl PseudoState {
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "hover" => PseudoState::Hover,
            "active" => PseudoState::Active,
            "focus" => PseudoState::Focus,
            "disabled" => PseudoState::Disabled,
            "selected" => PseudoState::Selected,
            _ => PseudoState::Unknown(name.to_string()),
        }
    }
}

/// One compound: `Button#Submit.primary:hover`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectorCompound {
    pub element: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub pseudo: Option<PseudoState>,
}

impl SelectorCompound {
    pub fn specificity(&self) -> u32 {
        let ids = self.id.is_some() as u32;
        let classes = self.classes.len() as u32;
        let pseudo = self.pseudo.is_some() as u32;
        let elements = self.element.is_some() as u32;
        100 * ids + 10 * classes + 10 * pseudo + elements
    }

    fn is_empty(&self) -> bool {
        self.element.is_none() && self.id.is_none() && self.classes.is_empty() && self.pseudo.is_none()
    }
}

/// A compound plus the combinator linking it to the step on its right.
/// The rightmost step has no combinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorStep {
    pub compound: SelectorCompound,
    pub combinator: Option<Combinator>,
}

/// Complex selector, steps ordered rightmost-first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub steps: Vec<SelectorStep>,
}

impl Selector {
    /// 100 per id, 10 per class or pseudo-state, 1 per element kind.
    pub fn specificity(&self) -> u32 {
        self.steps.iter().map(|s| s.compound.specificity()).sum()
    }

    /// The compound that must match the panel itself
    pub fn subject(&self) -> Option<&SelectorCompound> {
        self.steps.first().map(|s| &s.compound)
    }

    /// Parse one comma-free selector clause. Returns `None` when the clause
    /// contains characters outside the supported grammar.
    pub fn parse(text: &str) -> Option<Selector> {
        // Compounds collected left to right, each with the combinator that
        // precedes it.
        let mut compounds: Vec<(Option<Combinator>, SelectorCompound)> = Vec::new();
        let mut pending: Option<Combinator> = None;
        let mut current = SelectorCompound::default();
        let mut in_compound = false;
        let mut chars = text.trim().chars().peekable();

        fn finish(
            compounds: &mut Vec<(Option<Combinator>, SelectorCompound)>,
            pending: &mut Option<Combinator>,
            current: &mut SelectorCompound,
        ) {
            let combinator = if compounds.is_empty() {
                None
            } else {
                Some(pending.take().unwrap_or(Combinator::Descendant))
            };
            compounds.push((combinator, std::mem::take(current)));
        }

        while let Some(c) = chars.next() {
            match c {
                ' ' | '\t' | '\n' | '\r' => {
                    if in_compound {
                        finish(&mut compounds, &mut pending, &mut current);
                        in_compound = false;
                    }
                }
                '>' => {
                    if in_compound {
                        finish(&mut compounds, &mut pending, &mut current);
                        in_compound = false;
                    }
                    if compounds.is_empty() || pending == Some(Combinator::Child) {
                        return None;
                    }
                    pending = Some(Combinator::Child);
                }
                '*' => {
                    if in_compound {
                        return None;
                    }
                    // Universal: an empty compound matches every panel.
                    in_compound = true;
                }
                '#' | '.' | ':' => {
                    let name = take_name(&mut chars);
                    if name.is_empty() {
                        return None;
                    }
                    match c {
                        '#' => {
                            if current.id.is_some() {
                                return None;
                            }
                            current.id = Some(name);
                        }
                        '.' => {
                            if !current.classes.contains(&name) {
                                current.classes.push(name);
                            }
                        }
                        _ => {
                            if current.pseudo.is_some() {
                                return None;
                            }
                            current.pseudo = Some(PseudoState::from_name(&name));
                        }
                    }
                    in_compound = true;
                }
                c if is_name_char(c) => {
                    if in_compound {
                        // An element name must lead its compound.
                        return None;
                    }
                    let mut name = String::from(c);
                    name.push_str(&take_name(&mut chars));
                    current.element = Some(name);
                    in_compound = true;
                }
                _ => return None,
            }
        }

        if in_compound {
            finish(&mut compounds, &mut pending, &mut current);
        }
        if compounds.is_empty() || pending.is_some() {
            return None;
        }

        // Reverse into rightmost-first order; each step keeps the combinator
        // linking it to the step on its right.
        let mut steps = Vec::with_capacity(compounds.len());
        let mut link_right: Option<Combinator> = None;
        for (combinator_left, compound) in compounds.into_iter().rev() {
            steps.push(SelectorStep {
                compound,
                combinator: link_right,
            });
            link_right = combinator_left;
        }
        Some(Selector { steps })
    }

    /// Parse a comma-separated selector list, dropping unparseable clauses.
    pub fn parse_list(text: &str) -> Vec<Selector> {
        text.split(',')
            .filter(|clause| !clause.trim().is_empty())
            .filter_map(|clause| {
                let parsed = Selector::parse(clause);
                if parsed.is_none() {
                    log::warn!("ignoring unsupported selector `{}`", clause.trim());
                }
                parsed
            })
            .collect()
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn take_name(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        if !is_name_char(c) {
            break;
        }
        name.push(c);
        chars.next();
    }
    name
}

impl fmt::Display for SelectorCompound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "*");
        }
        if let Some(element) = &self.element {
            write!(f, "{}", element)?;
        }
        if let Some(id) = &self.id {
            write!(f, "#{}", id)?;
        }
        for class in &self.classes {
            write!(f, ".{}", class)?;
        }
        match &self.pseudo {
            Some(PseudoState::Hover) => write!(f, ":hover"),
            Some(PseudoState::Active) => write!(f, ":active"),
            Some(PseudoState::Focus) => write!(f, ":focus"),
            Some(PseudoState::Disabled) => write!(f, ":disabled"),
            Some(PseudoState::Selected) => write!(f, ":selected"),
            Some(PseudoState::Unknown(name)) => write!(f, ":{}", name),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate().rev() {
            write!(f, "{}", step.compound)?;
            if i > 0 {
                match step.combinator {
                    Some(Combinator::Child) => write!(f, " > ")?,
                    _ => write!(f, " ")?,
                }
            }
        }
        Ok(())
    }
}
