//! Hint escalation policy.
//!
//! Pure function from (category, post-increment attempt count, match outcome)
//! to a hint tier. The policy never mutates attempt state; callers increment
//! before querying. Tiers:
//!   1  situational nudge (three templates, keyed on the match outcome)
//!   2  category name
//!   3  syntax family + structural hint
//!   4  exact operator/token
//!   5+ offer reveal (sticky until success or reveal)

use serde::Serialize;

use crate::domain::Category;

/// Failures needed before the reveal offer unlocks.
pub const REVEAL_OFFER_AT: u32 = 5;

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Hint {
  pub tier: u8,
  pub text: String,
  pub offer_reveal: bool,
}

/// How a failed selector related to the target, for the tier-1 nudge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchOutcome {
  /// Nothing in the fragment matched.
  NoMatch,
  /// The target matched, along with extra elements.
  TargetPlusExtras,
  /// Something matched, but never the target.
  MissedTarget,
}

impl MatchOutcome {
  /// Derive the outcome from a failed classification. Only meaningful for
  /// submissions already known not to be correct.
  pub fn classify(matched: &[ego_tree::NodeId], target: ego_tree::NodeId) -> Self {
    if matched.is_empty() {
      MatchOutcome::NoMatch
    } else if matched.contains(&target) {
      MatchOutcome::TargetPlusExtras
    } else {
      MatchOutcome::MissedTarget
    }
  }
}

pub fn hint(category: Category, attempts: u32, outcome: MatchOutcome) -> Hint {
  let info = category.info();
  match attempts {
    // Attempt 0 cannot be reached through the engine (it increments first),
    // but the policy stays total.
    0 | 1 => Hint {
      tier: 1,
      text: situational_nudge(outcome).to_string(),
      offer_reveal: false,
    },
    2 => Hint {
      tier: 2,
      text: format!("This one is solved with the {}.", info.display_name),
      offer_reveal: false,
    },
    3 => Hint {
      tier: 3,
      text: format!(
        "You need a {}. {}",
        info.family.display_name(),
        info.structural_hint
      ),
      offer_reveal: false,
    },
    4 => Hint {
      tier: 4,
      text: format!("Use {}.", info.token_hint),
      offer_reveal: false,
    },
    _ => Hint {
      tier: 5,
      text: "Still stuck? You can reveal the answer — afterwards the challenge regenerates so you can prove the technique on a fresh fragment.".to_string(),
      offer_reveal: true,
    },
  }
}

fn situational_nudge(outcome: MatchOutcome) -> &'static str {
  match outcome {
    MatchOutcome::NoMatch => {
      "Your selector matched nothing in the fragment. Check the spelling and that every part of it actually exists."
    }
    MatchOutcome::TargetPlusExtras => {
      "You caught the target — but other elements too. Tighten the selector until exactly one element matches."
    }
    MatchOutcome::MissedTarget => {
      "Your selector matches real elements, just not the one the task asks for. Re-read the prompt and aim again."
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tiers_escalate_deterministically() {
    let tiers: Vec<u8> = (1..=7)
      .map(|n| hint(Category::GeneralSibling, n, MatchOutcome::NoMatch).tier)
      .collect();
    assert_eq!(tiers, vec![1, 2, 3, 4, 5, 5, 5], "tier 5 is sticky");
  }

  #[test]
  fn tier_two_names_the_category_without_syntax() {
    let h = hint(Category::GeneralSibling, 2, MatchOutcome::MissedTarget);
    assert!(h.text.contains("General Sibling Combinator"));
    assert!(!h.text.contains('~'));
    assert!(!h.offer_reveal);
  }

  #[test]
  fn tier_four_names_the_exact_token() {
    let h = hint(Category::GeneralSibling, 4, MatchOutcome::MissedTarget);
    assert!(h.text.contains('~'));
  }

  #[test]
  fn reveal_is_offered_from_the_fifth_failure() {
    assert!(!hint(Category::Id, 4, MatchOutcome::NoMatch).offer_reveal);
    assert!(hint(Category::Id, REVEAL_OFFER_AT, MatchOutcome::NoMatch).offer_reveal);
  }

  #[test]
  fn first_tier_is_situational() {
    let no = hint(Category::Class, 1, MatchOutcome::NoMatch);
    let extra = hint(Category::Class, 1, MatchOutcome::TargetPlusExtras);
    let miss = hint(Category::Class, 1, MatchOutcome::MissedTarget);
    assert_ne!(no.text, extra.text);
    assert_ne!(extra.text, miss.text);
    assert_ne!(no.text, miss.text);
  }
}
