//! Domain models: selector categories, the per-category teaching table,
//! and the immutable challenge definition.

use serde::{Deserialize, Serialize};

/// Closed set of selector categories the tutorial teaches.
/// Dispatch always goes through [`Category::info`] or an exhaustive match,
/// never through string inspection of the category name.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
  Id,
  Class,
  Descendant,
  Child,
  AdjacentSibling,
  GeneralSibling,
  AttributeExact,
  AttributeSubstring,
  StructuralPseudo,
  NegationPseudo,
  UiStatePseudo,
}

/// Broad syntax family a category belongs to; surfaced by mid-tier hints.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyntaxFamily {
  Simple,
  Combinator,
  AttributeSelector,
  PseudoClass,
}

impl SyntaxFamily {
  pub fn display_name(self) -> &'static str {
    match self {
      SyntaxFamily::Simple => "simple selector",
      SyntaxFamily::Combinator => "combinator",
      SyntaxFamily::AttributeSelector => "attribute selector",
      SyntaxFamily::PseudoClass => "pseudo-class",
    }
  }
}

/// Static teaching data for one category: display name, syntax family,
/// the exact token the category drills, and the hint/guardrail copy.
pub struct CategoryInfo {
  pub display_name: &'static str,
  pub family: SyntaxFamily,
  /// Named in the tier-4 hint ("use the `~` symbol").
  pub token_hint: &'static str,
  /// Structural nudge for the tier-3 hint.
  pub structural_hint: &'static str,
  /// Shown when the precondition gate rejects an input.
  pub technique_hint: &'static str,
}

impl Category {
  pub fn info(self) -> &'static CategoryInfo {
    match self {
      Category::Id => &CategoryInfo {
        display_name: "ID Selector",
        family: SyntaxFamily::Simple,
        token_hint: "the `#` prefix followed by the element's id",
        structural_hint: "One element carries a unique identifier; a single token addresses it directly.",
        technique_hint: "This task practices the ID selector — the answer needs a `#`.",
      },
      Category::Class => &CategoryInfo {
        display_name: "Class Selector",
        family: SyntaxFamily::Simple,
        token_hint: "the `.` prefix followed by a class name",
        structural_hint: "The target is marked with a class the other elements lack.",
        technique_hint: "This task practices the class selector — the answer needs a `.`.",
      },
      Category::Descendant => &CategoryInfo {
        display_name: "Descendant Combinator",
        family: SyntaxFamily::Combinator,
        token_hint: "a plain space between the ancestor and the descendant",
        structural_hint: "Look for a parent that only the target is nested inside, at any depth.",
        technique_hint: "This task practices the descendant combinator — write two selectors separated by a space, without `>`, `+` or `~`.",
      },
      Category::Child => &CategoryInfo {
        display_name: "Child Combinator",
        family: SyntaxFamily::Combinator,
        token_hint: "the `>` combinator",
        structural_hint: "The target is a direct child of its parent; anything nested a level deeper must not match.",
        technique_hint: "This task practices the child combinator — the answer needs a `>`.",
      },
      Category::AdjacentSibling => &CategoryInfo {
        display_name: "Adjacent Sibling Combinator",
        family: SyntaxFamily::Combinator,
        token_hint: "the `+` symbol",
        structural_hint: "The target sits immediately after one of its siblings.",
        technique_hint: "This task practices the adjacent sibling combinator — the answer needs a `+`.",
      },
      Category::GeneralSibling => &CategoryInfo {
        display_name: "General Sibling Combinator",
        family: SyntaxFamily::Combinator,
        token_hint: "the `~` symbol",
        structural_hint: "The target follows one of its siblings, though not necessarily immediately.",
        technique_hint: "This task practices the general sibling combinator — the answer needs a `~`.",
      },
      Category::AttributeExact => &CategoryInfo {
        display_name: "Attribute Selector (exact match)",
        family: SyntaxFamily::AttributeSelector,
        token_hint: "the `[name='value']` form with the full, exact value",
        structural_hint: "The distinguishing feature is an attribute value, written inside square brackets.",
        technique_hint: "This task practices exact attribute matching — use `[name='value']` with a plain `=`, not a partial-match operator.",
      },
      Category::AttributeSubstring => &CategoryInfo {
        display_name: "Attribute Selector (substring match)",
        family: SyntaxFamily::AttributeSelector,
        token_hint: "the `*=` operator inside the square brackets",
        structural_hint: "Only a piece of the attribute value is known; square brackets still apply.",
        technique_hint: "This task practices substring attribute matching — the answer needs square brackets and an `=`.",
      },
      Category::StructuralPseudo => &CategoryInfo {
        display_name: "Structural Pseudo-class",
        family: SyntaxFamily::PseudoClass,
        token_hint: "a positional pseudo-class such as `:nth-child(n)`",
        structural_hint: "The target is distinguished by its position among its siblings, not by any marking of its own.",
        technique_hint: "This task practices structural pseudo-classes — the answer needs a `:`.",
      },
      Category::NegationPseudo => &CategoryInfo {
        display_name: "Negation Pseudo-class",
        family: SyntaxFamily::PseudoClass,
        token_hint: "the `:not(...)` pseudo-class",
        structural_hint: "The target is the element that lacks what its siblings have.",
        technique_hint: "This task practices the negation pseudo-class — the answer needs `:not(`.",
      },
      Category::UiStatePseudo => &CategoryInfo {
        display_name: "UI State Pseudo-class",
        family: SyntaxFamily::PseudoClass,
        token_hint: "a state pseudo-class such as `:checked` or `:disabled`",
        structural_hint: "The target is distinguished by its interactive state.",
        technique_hint: "This task practices UI state pseudo-classes — the answer needs a `:`.",
      },
    }
  }

  /// Lexical guardrail: does the input plausibly use the technique this
  /// category teaches? A pass here says nothing about validity; a failure
  /// means the learner is solving the wrong lesson. The attribute checks use
  /// the stricter reading: both require brackets and `=`, and exact-match
  /// additionally rejects partial-match operators.
  pub fn precondition_holds(self, input: &str) -> bool {
    match self {
      Category::Id => input.contains('#'),
      Category::Class => input.contains('.'),
      Category::Descendant => {
        input.split_whitespace().count() >= 2 && !input.contains(['>', '+', '~'])
      }
      Category::Child => input.contains('>'),
      Category::AdjacentSibling => input.contains('+'),
      Category::GeneralSibling => input.contains('~'),
      Category::AttributeExact => {
        input.contains('[')
          && input.contains('=')
          && !["*=", "^=", "$=", "~=", "|="]
            .iter()
            .any(|op| input.contains(op))
      }
      Category::AttributeSubstring => input.contains('[') && input.contains('='),
      Category::StructuralPseudo => input.contains(':'),
      Category::NegationPseudo => input.contains(":not("),
      Category::UiStatePseudo => input.contains(':'),
    }
  }
}

/// An alternative selector for the same target, with a one-line explanation.
/// Enrichment only: alternatives never participate in validation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Alternative {
  pub selector: String,
  pub explanation: String,
}

/// Immutable challenge definition, one per catalog entry.
///
/// Invariant (established at authoring time, checked by the catalog tests and
/// at TOML-bank load): `answer_selector` matches exactly one element in
/// `seed_markup`, and every accepted alternative resolves to that same element.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChallengeDefinition {
  pub id: u32,
  pub category: Category,
  pub prompt: String,
  pub seed_markup: String,
  pub answer_selector: String,
  #[serde(default)]
  pub accepted_alternatives: Vec<Alternative>,
  #[serde(default)]
  pub trivia: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn id_precondition_requires_hash() {
    assert!(Category::Id.precondition_holds("#login-primary"));
    assert!(!Category::Id.precondition_holds(".btn-primary"));
    assert!(!Category::Id.precondition_holds("[id='login-primary']"));
  }

  #[test]
  fn descendant_precondition_rejects_other_combinators() {
    assert!(Category::Descendant.precondition_holds("header a"));
    assert!(!Category::Descendant.precondition_holds("header > a"));
    assert!(!Category::Descendant.precondition_holds("a"));
  }

  #[test]
  fn exact_attribute_precondition_rejects_partial_operators() {
    assert!(Category::AttributeExact.precondition_holds("input[type='email']"));
    assert!(!Category::AttributeExact.precondition_holds("input[type*='mail']"));
    assert!(!Category::AttributeExact.precondition_holds("input[type]"));
  }

  #[test]
  fn substring_attribute_precondition_requires_brackets_and_equals() {
    assert!(Category::AttributeSubstring.precondition_holds("input[name*='user']"));
    // The stricter gate still lets exact-equals through; the engine's
    // post-match override is responsible for the missing `*=`.
    assert!(Category::AttributeSubstring.precondition_holds("input[name='data-username']"));
    assert!(!Category::AttributeSubstring.precondition_holds("input:checked"));
  }
}
