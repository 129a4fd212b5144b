//! Validation engine: the decision procedure turning a raw submission into a
//! verdict plus a state transition.
//!
//! Gates run in order — empty input, category precondition, target
//! resolution, selector evaluation, classification — and only the success and
//! failure transitions touch state. Classification itself is pure given
//! (fragment, correct selector, raw input).

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, instrument};
use uuid::Uuid;

use crate::domain::{Alternative, Category, ChallengeDefinition};
use crate::hints::{hint, Hint, MatchOutcome, REVEAL_OFFER_AT};
use crate::matcher::{Fragment, MatchError};
use crate::regen;
use crate::state::ChallengeState;
use crate::util::normalize_selector;

#[derive(Debug, Error)]
pub enum EngineError {
  #[error("unknown session {0}")]
  UnknownSession(Uuid),
  #[error("unknown challenge id {0}")]
  UnknownChallenge(u32),
  #[error("reveal is still locked after {attempts} failed attempt(s); it unlocks at {needed}")]
  RevealLocked { attempts: u32, needed: u32 },
  /// The catalog's (or regenerator's) declared answer fails to resolve
  /// against the current fragment. A data-integrity defect, fatal to this
  /// challenge instance; never retried silently.
  #[error("challenge {id}: answer selector `{selector}` does not resolve to a unique element")]
  AnswerUnresolvable { id: u32, selector: String },
}

/// Discriminated result of one submission, rendered as `{kind, ...}` on the
/// wire. Only `Incorrect` costs an attempt; everything is recoverable by
/// resubmitting.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Verdict {
  EmptyInput,
  WrongTechnique {
    message: String,
  },
  SyntaxError {
    input: String,
    message: String,
  },
  /// Functionally correct but bypasses the taught operator
  /// (Attribute-Substring only). Neither success nor failure.
  RightResultWrongLesson {
    message: String,
  },
  Correct {
    selector: String,
    category: String,
    message: String,
    trivia: String,
    alternatives: Vec<Alternative>,
  },
  Incorrect {
    matched_count: usize,
    hit_target: bool,
    attempts: u32,
    hint: Hint,
  },
}

/// Outcome of a reveal. Idempotent: revealing twice returns the same answer.
#[derive(Clone, Debug, Serialize)]
pub struct Revealed {
  pub selector: String,
  pub already_revealed: bool,
}

/// `validate(challenge, state, raw_input) -> Verdict`.
#[instrument(level = "debug", skip(def, st, raw_input), fields(id = def.id, input_len = raw_input.len()))]
pub fn validate(
  def: &ChallengeDefinition,
  st: &mut ChallengeState,
  raw_input: &str,
) -> Result<Verdict, EngineError> {
  let input = raw_input.trim();
  if input.is_empty() {
    return Ok(Verdict::EmptyInput);
  }

  if !def.category.precondition_holds(input) {
    debug!(target: "challenge", id = def.id, %input, "Precondition gate rejected input");
    return Ok(Verdict::WrongTechnique {
      message: def.category.info().technique_hint.to_string(),
    });
  }

  let fragment = Fragment::parse(&st.fragment_markup);
  let target = match fragment.select_unique(&st.correct_selector) {
    Ok(Some(node)) => node,
    _ => {
      error!(target: "challenge", id = def.id, selector = %st.correct_selector, "Declared answer does not resolve; challenge instance is broken");
      return Err(EngineError::AnswerUnresolvable {
        id: def.id,
        selector: st.correct_selector.clone(),
      });
    }
  };

  let matched = match fragment.select(input) {
    Ok(matched) => matched,
    Err(MatchError::Syntax { input, detail }) => {
      let message = syntax_message(&input, &detail);
      return Ok(Verdict::SyntaxError { input, message });
    }
  };

  let is_correct = matched.len() == 1 && matched[0] == target;

  // Category-specific override: a substring-match task solved without `*=`
  // hits the right element but skips the lesson.
  if is_correct && def.category == Category::AttributeSubstring && !input.contains("*=") {
    return Ok(Verdict::RightResultWrongLesson {
      message: "That selector does find the target — but this task is about substring matching. Solve it once more with the `*=` operator.".to_string(),
    });
  }

  if is_correct {
    Ok(success_transition(def, st, input))
  } else {
    Ok(failure_transition(def, st, &matched, target))
  }
}

/// Success: record the distinct selector, mark solved, reset attempts, and
/// assemble the enrichment payload (accepted alternatives plus other paths
/// the learner found earlier, minus the just-submitted selector).
fn success_transition(def: &ChallengeDefinition, st: &mut ChallengeState, input: &str) -> Verdict {
  let normalized = normalize_selector(input);
  let newly_found = st.distinct_correct.insert(normalized.clone());
  st.is_solved = true;
  st.attempts = 0;

  // The just-submitted selector is the headline answer, never an alternative.
  let mut alternatives: Vec<Alternative> = def
    .accepted_alternatives
    .iter()
    .filter(|alt| normalize_selector(&alt.selector) != normalized)
    .cloned()
    .collect();
  for found in &st.distinct_correct {
    if *found == normalized {
      continue;
    }
    let already_listed = alternatives
      .iter()
      .any(|alt| normalize_selector(&alt.selector) == *found);
    if !already_listed {
      alternatives.push(Alternative {
        selector: found.clone(),
        explanation: "Another path you already discovered for this target.".to_string(),
      });
    }
  }

  let message = if newly_found && st.distinct_correct.len() > 1 {
    "Correct — and that's another way to reach the target!".to_string()
  } else {
    "Correct!".to_string()
  };

  Verdict::Correct {
    selector: input.to_string(),
    category: def.category.info().display_name.to_string(),
    message,
    trivia: def.trivia.clone(),
    alternatives,
  }
}

/// Failure: spend one attempt, then ask the hint policy where we are.
fn failure_transition(
  def: &ChallengeDefinition,
  st: &mut ChallengeState,
  matched: &[ego_tree::NodeId],
  target: ego_tree::NodeId,
) -> Verdict {
  st.attempts += 1;
  let outcome = MatchOutcome::classify(matched, target);
  let hint = hint(def.category, st.attempts, outcome);
  Verdict::Incorrect {
    matched_count: matched.len(),
    hit_target: matched.contains(&target),
    attempts: st.attempts,
    hint,
  }
}

/// Reveal the answer once the offer has been unlocked (tier 5, i.e. five
/// failed attempts) — or at any time once solved or already revealed.
/// Re-revealing is a no-op returning the identical answer.
#[instrument(level = "debug", skip(def, st), fields(id = def.id))]
pub fn reveal(def: &ChallengeDefinition, st: &mut ChallengeState) -> Result<Revealed, EngineError> {
  if st.is_revealed {
    return Ok(Revealed {
      selector: st.correct_selector.clone(),
      already_revealed: true,
    });
  }
  if !st.is_solved && st.attempts < REVEAL_OFFER_AT {
    return Err(EngineError::RevealLocked {
      attempts: st.attempts,
      needed: REVEAL_OFFER_AT,
    });
  }
  st.is_revealed = true;
  Ok(Revealed {
    selector: st.correct_selector.clone(),
    already_revealed: false,
  })
}

/// Regenerate the challenge: install the alternate fragment/answer/prompt for
/// the category and clear every episode flag.
#[instrument(level = "debug", skip(def, st), fields(id = def.id))]
pub fn reset(def: &ChallengeDefinition, st: &mut ChallengeState) {
  st.reset_with(regen::regenerate(def));
}

/// Syntax-error copy, with a dedicated message for the classic confusion of
/// exact attribute matching with class/substring intent (e.g.
/// `[class=btn primary]` or `[class=.btn]`).
fn syntax_message(input: &str, detail: &str) -> String {
  if looks_like_exact_vs_substring_confusion(input) {
    return "`[attr='value']` compares the whole attribute value, exactly. To match a piece of it use `[attr*='part']`, and quote exact values that contain spaces or dots.".to_string();
  }
  format!("That isn't a parseable selector ({detail}). Fix the syntax and try again — this attempt wasn't counted.")
}

fn looks_like_exact_vs_substring_confusion(input: &str) -> bool {
  if input.contains("[class=") {
    return true;
  }
  let Some(open) = input.find('[') else {
    return false;
  };
  let body = &input[open + 1..];
  let body = body.split(']').next().unwrap_or(body);
  let Some(eq) = body.find('=') else {
    return false;
  };
  if body[..eq].ends_with(['*', '^', '$', '~', '|']) {
    return false;
  }
  let value = body[eq + 1..].trim_matches(['\'', '"']);
  value.contains(' ') || value.contains('.')
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::seed_challenges;

  fn setup(id: u32) -> (ChallengeDefinition, ChallengeState) {
    let def = seed_challenges()
      .into_iter()
      .find(|d| d.id == id)
      .expect("seed id");
    let st = ChallengeState::new(&def);
    (def, st)
  }

  #[test]
  fn empty_input_costs_nothing() {
    let (def, mut st) = setup(1);
    let v = validate(&def, &mut st, "   ").unwrap();
    assert!(matches!(v, Verdict::EmptyInput));
    assert_eq!(st.attempts, 0);
  }

  #[test]
  fn right_element_wrong_technique_is_rejected_without_attempt_cost() {
    // `.btn-primary` matches the one target element, but an ID task
    // without a `#` teaches the wrong lesson.
    let (def, mut st) = setup(1);
    let v = validate(&def, &mut st, ".btn-primary").unwrap();
    assert!(matches!(v, Verdict::WrongTechnique { .. }));
    assert_eq!(st.attempts, 0);
    assert!(!st.is_solved);
  }

  #[test]
  fn correct_answer_solves_and_resets_attempts() {
    let (def, mut st) = setup(1);
    let _ = validate(&def, &mut st, "#wrong-id").unwrap();
    assert_eq!(st.attempts, 1);
    let v = validate(&def, &mut st, "#login-primary").unwrap();
    match v {
      Verdict::Correct { category, .. } => assert_eq!(category, "ID Selector"),
      other => panic!("expected Correct, got {other:?}"),
    }
    assert!(st.is_solved);
    assert_eq!(st.attempts, 0);
  }

  #[test]
  fn substring_task_with_exact_match_is_right_result_wrong_lesson() {
    let (def, mut st) = setup(8);
    let v = validate(&def, &mut st, "input[name='data-username']").unwrap();
    assert!(matches!(v, Verdict::RightResultWrongLesson { .. }));
    assert_eq!(st.attempts, 0);
    assert!(!st.is_solved);

    let v = validate(&def, &mut st, "input[name*='user']").unwrap();
    assert!(matches!(v, Verdict::Correct { .. }));
    assert!(st.is_solved);
  }

  #[test]
  fn unbalanced_brackets_are_a_free_syntax_error() {
    let (def, mut st) = setup(7);
    let v = validate(&def, &mut st, "input[type='email'").unwrap();
    assert!(matches!(v, Verdict::SyntaxError { .. }));
    assert_eq!(st.attempts, 0);
  }

  #[test]
  fn exact_vs_substring_confusion_gets_the_dedicated_message() {
    let (def, mut st) = setup(7);
    let v = validate(&def, &mut st, "input[type=e mail]").unwrap();
    match v {
      Verdict::SyntaxError { message, .. } => assert!(message.contains("*=")),
      other => panic!("expected SyntaxError, got {other:?}"),
    }
  }

  #[test]
  fn five_failures_unlock_reveal_and_reset_regenerates() {
    let (def, mut st) = setup(1);
    for n in 1..=5 {
      let v = validate(&def, &mut st, "#nope").unwrap();
      match v {
        Verdict::Incorrect { attempts, hint, .. } => {
          assert_eq!(attempts, n);
          assert_eq!(hint.offer_reveal, n >= 5);
        }
        other => panic!("expected Incorrect, got {other:?}"),
      }
    }
    assert_eq!(st.attempts, 5);

    let revealed = reveal(&def, &mut st).unwrap();
    assert_eq!(revealed.selector, "#login-primary");
    assert!(!revealed.already_revealed);
    assert!(st.is_revealed);

    // Idempotent: same answer, nothing else moves.
    let again = reveal(&def, &mut st).unwrap();
    assert_eq!(again.selector, revealed.selector);
    assert!(again.already_revealed);
    assert_eq!(st.attempts, 5);

    reset(&def, &mut st);
    assert_eq!(st.attempts, 0);
    assert!(!st.is_revealed);
    assert!(!st.is_solved);
    assert!(st.distinct_correct.is_empty());
    assert_ne!(st.correct_selector, def.answer_selector);

    // The regenerated answer resolves uniquely in the regenerated fragment.
    let frag = Fragment::parse(&st.fragment_markup);
    assert!(frag.select_unique(&st.correct_selector).unwrap().is_some());
  }

  #[test]
  fn reveal_stays_locked_before_the_offer() {
    let (def, mut st) = setup(2);
    let _ = validate(&def, &mut st, ".nope").unwrap();
    assert!(matches!(
      reveal(&def, &mut st),
      Err(EngineError::RevealLocked { attempts: 1, needed: 5 })
    ));
    assert!(!st.is_revealed);
  }

  #[test]
  fn second_distinct_solution_is_reported_and_listed_on_later_success() {
    let (def, mut st) = setup(2);
    let v = validate(&def, &mut st, ".active").unwrap();
    match v {
      Verdict::Correct { message, alternatives, .. } => {
        assert_eq!(message, "Correct!");
        // The submitted selector never appears in its own alternatives.
        assert!(alternatives.iter().all(|a| a.selector != ".active"));
      }
      other => panic!("expected Correct, got {other:?}"),
    }

    let v = validate(&def, &mut st, "li.active").unwrap();
    match v {
      Verdict::Correct { message, alternatives, .. } => {
        assert!(message.contains("another way"));
        // The earlier find shows up; the accepted alternative equal to the
        // just-submitted selector is excluded.
        assert!(alternatives.iter().any(|a| a.selector == ".active"));
        assert!(alternatives
          .iter()
          .all(|a| normalize_selector(&a.selector) != "li.active"));
      }
      other => panic!("expected Correct, got {other:?}"),
    }
  }

  #[test]
  fn broken_answer_selector_is_an_internal_error() {
    let (def, mut st) = setup(1);
    st.correct_selector = "#does-not-exist".into();
    assert!(matches!(
      validate(&def, &mut st, "#login-primary"),
      Err(EngineError::AnswerUnresolvable { id: 1, .. })
    ));
  }

  #[test]
  fn attempts_only_grow_within_an_episode() {
    let (def, mut st) = setup(3);
    for expected in 1..=3 {
      let _ = validate(&def, &mut st, "footer a").unwrap();
      assert_eq!(st.attempts, expected);
    }
    // Non-counting verdicts leave the counter alone.
    let _ = validate(&def, &mut st, "a").unwrap(); // WrongTechnique (no space)
    let _ = validate(&def, &mut st, "header a[").unwrap(); // SyntaxError
    assert_eq!(st.attempts, 3);
  }
}
