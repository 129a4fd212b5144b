//! Challenge regeneration after a reveal.
//!
//! Primary mechanism: a fixed category→alternate-shape table. Each entry is a
//! structurally different fragment for the same category, with a prompt and a
//! correct selector that exercise the same combinator/operator family, so the
//! learner must re-demonstrate the technique instead of retyping the revealed
//! answer.
//!
//! Fallback (explicitly second-rate, for categories without a bespoke shape,
//! e.g. bank-supplied UI-state challenges): rewrite the distinguishing token
//! of the original answer — quoted attribute value, `#id` or `.class` — to a
//! fixed marker, in markup, prompt and selector alike.

use tracing::warn;

use crate::domain::{Category, ChallengeDefinition};

/// Marker token the generic fallback substitutes for the original
/// distinguishing token.
pub const MARKER_TOKEN: &str = "drill-alt";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Regenerated {
  pub prompt: String,
  pub fragment_markup: String,
  pub correct_selector: String,
}

struct AltShape {
  prompt: &'static str,
  markup: &'static str,
  selector: &'static str,
}

pub fn regenerate(def: &ChallengeDefinition) -> Regenerated {
  match alternate_shape(def.category) {
    Some(shape) => Regenerated {
      prompt: shape.prompt.to_string(),
      fragment_markup: shape.markup.to_string(),
      correct_selector: shape.selector.to_string(),
    },
    None => generic_rewrite(def),
  }
}

/// One alternate shape per category. `None` routes to the generic fallback.
fn alternate_shape(category: Category) -> Option<AltShape> {
  match category {
    Category::Id => Some(AltShape {
      prompt: "Select the help link by its id.",
      markup: r#"
        <nav class="toolbar">
          <a class="nav-link" href="/home">Home</a>
          <a class="nav-link" id="nav-help" href="/help">Help</a>
          <a class="nav-link" href="/about">About</a>
        </nav>"#,
      selector: "#nav-help",
    }),
    Category::Class => Some(AltShape {
      prompt: "Select the unread message in the inbox.",
      markup: r#"
        <div class="inbox">
          <p class="mail">Welcome aboard</p>
          <p class="mail unread">Invoice attached</p>
          <p class="mail">Weekly digest</p>
        </div>"#,
      selector: ".unread",
    }),
    Category::Descendant => Some(AltShape {
      prompt: "Select the emphasized text inside the sidebar — the inline note in the main column must stay unmatched.",
      markup: r#"
        <aside class="sidebar">
          <ul><li><em>pinned</em></li></ul>
        </aside>
        <main>
          <em>inline note</em>
        </main>"#,
      selector: "aside em",
    }),
    Category::Child => Some(AltShape {
      prompt: "Select the root item of the tree — a direct child of the outer list, not the nested leaf.",
      markup: r#"
        <ul class="tree">
          <li>root
            <ul><li>leaf</li></ul>
          </li>
        </ul>"#,
      selector: ".tree > li",
    }),
    Category::AdjacentSibling => Some(AltShape {
      prompt: "Select the definition immediately following the term.",
      markup: r#"
        <dl>
          <dt>Term</dt>
          <dd>First definition</dd>
          <dd>Second definition</dd>
        </dl>"#,
      selector: "dt + dd",
    }),
    Category::GeneralSibling => Some(AltShape {
      prompt: "Select the quoted answer that comes after the divider — the quote above it must stay unmatched.",
      markup: r#"
        <section class="faq">
          <blockquote>quote up top</blockquote>
          <hr>
          <p>filler</p>
          <blockquote>quoted answer</blockquote>
        </section>"#,
      selector: "hr ~ blockquote",
    }),
    Category::AttributeExact => Some(AltShape {
      prompt: "Select the link that opens in a new tab, by the exact value of its target attribute.",
      markup: r#"
        <nav class="links">
          <a href="https://example.org" target="_blank">External</a>
          <a href="/internal">Internal</a>
        </nav>"#,
      selector: "a[target='_blank']",
    }),
    Category::AttributeSubstring => Some(AltShape {
      prompt: "Select the PDF download — you only know its href contains \"pdf\".",
      markup: r#"
        <ul class="downloads">
          <li><a href="/files/report.pdf">Report</a></li>
          <li><a href="/files/logo.svg">Logo</a></li>
          <li><a href="/files/data.csv">Data</a></li>
        </ul>"#,
      selector: "a[href*='pdf']",
    }),
    Category::StructuralPseudo => Some(AltShape {
      prompt: "Select the third entry of the queue by its position alone.",
      markup: r#"
        <ul class="queue">
          <li>alpha</li>
          <li>beta</li>
          <li>gamma</li>
          <li>delta</li>
        </ul>"#,
      selector: "li:nth-child(3)",
    }),
    Category::NegationPseudo => Some(AltShape {
      prompt: "Select the ship that is not done.",
      markup: r#"
        <ul class="fleet">
          <li class="ship done">loaded</li>
          <li class="ship">waiting</li>
          <li class="ship done">sailed</li>
        </ul>"#,
      selector: ".ship:not(.done)",
    }),
    Category::UiStatePseudo => None,
  }
}

/// Token-rewrite fallback. Finds the distinguishing token of the original
/// answer and renames it to [`MARKER_TOKEN`] everywhere. When the answer
/// carries no rewritable token the original triple is kept as-is (logged:
/// that combination is a content-authoring gap, not an engine concern).
fn generic_rewrite(def: &ChallengeDefinition) -> Regenerated {
  match distinguishing_token(&def.answer_selector) {
    Some(token) => Regenerated {
      prompt: def.prompt.replace(&token, MARKER_TOKEN),
      fragment_markup: def.seed_markup.replace(&token, MARKER_TOKEN),
      correct_selector: def.answer_selector.replace(&token, MARKER_TOKEN),
    },
    None => {
      warn!(target: "challenge", id = def.id, selector = %def.answer_selector, "No bespoke alternate and no rewritable token; regenerating to the original shape");
      Regenerated {
        prompt: def.prompt.clone(),
        fragment_markup: def.seed_markup.clone(),
        correct_selector: def.answer_selector.clone(),
      }
    }
  }
}

/// The token that makes the answer selector specific: a quoted attribute
/// value, an `#id`, or a `.class`, probed in that order.
fn distinguishing_token(selector: &str) -> Option<String> {
  for quote in ['\'', '"'] {
    if let Some(start) = selector.find(quote) {
      if let Some(len) = selector[start + 1..].find(quote) {
        if len > 0 {
          return Some(selector[start + 1..start + 1 + len].to_string());
        }
      }
    }
  }
  for prefix in ['#', '.'] {
    if let Some(start) = selector.find(prefix) {
      let rest = &selector[start + 1..];
      let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(rest.len());
      if end > 0 {
        return Some(rest[..end].to_string());
      }
    }
  }
  None
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::seed_challenges;
  use crate::matcher::Fragment;

  /// Regeneration law, structural half: for every seed, the regenerated
  /// selector matches exactly one element of the regenerated fragment, and
  /// its literal text differs from the revealed answer.
  #[test]
  fn regenerated_seeds_have_a_fresh_unique_answer() {
    for def in seed_challenges() {
      let regen = regenerate(&def);
      assert_ne!(regen.correct_selector, def.answer_selector, "challenge {}", def.id);
      let frag = Fragment::parse(&regen.fragment_markup);
      let hits = frag
        .select(&regen.correct_selector)
        .unwrap_or_else(|e| panic!("challenge {}: {}", def.id, e));
      assert_eq!(hits.len(), 1, "challenge {}: regenerated selector `{}`", def.id, regen.correct_selector);
    }
  }

  #[test]
  fn fallback_rewrites_the_quoted_token() {
    let def = ChallengeDefinition {
      id: 90,
      category: Category::UiStatePseudo,
      prompt: "Select the checked consent box (name contains 'consent').".into(),
      seed_markup: r#"
        <form>
          <input type="checkbox" name="consent" checked>
          <input type="checkbox" name="optional">
        </form>"#
        .into(),
      answer_selector: "input[name='consent']:checked".into(),
      accepted_alternatives: vec![],
      trivia: String::new(),
    };
    let regen = regenerate(&def);
    assert_eq!(regen.correct_selector, format!("input[name='{}']:checked", MARKER_TOKEN));
    assert!(regen.fragment_markup.contains(MARKER_TOKEN));
    assert!(regen.prompt.contains(MARKER_TOKEN));
  }

  #[test]
  fn token_probing_prefers_quotes_then_id_then_class() {
    assert_eq!(distinguishing_token("a[href*='pdf']").as_deref(), Some("pdf"));
    assert_eq!(distinguishing_token("#login-primary").as_deref(), Some("login-primary"));
    assert_eq!(distinguishing_token("li.active:not(.muted)").as_deref(), Some("active"));
    assert_eq!(distinguishing_token("li:nth-child(2)"), None);
  }
}
