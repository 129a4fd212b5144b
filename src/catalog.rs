//! The challenge catalog: ten built-in seed challenges plus optional
//! TOML-bank entries, behind an id-keyed immutable store.
//!
//! Seed markup is authored so that every `answer_selector` and every accepted
//! alternative resolves to exactly one element; the tests at the bottom sweep
//! that invariant. Bank entries get the same check at load time and are
//! skipped with an error log when they violate it — a bad bank entry is a
//! content bug, never a runtime condition the engine recovers from.

use std::collections::HashMap;

use tracing::{error, info};

use crate::config::TrainerConfig;
use crate::domain::{Alternative, Category, ChallengeDefinition};
use crate::matcher::Fragment;

/// Immutable, id-keyed challenge store with a stable listing order.
pub struct Catalog {
  by_id: HashMap<u32, ChallengeDefinition>,
  order: Vec<u32>,
}

impl Catalog {
  /// Seeds plus verified bank entries. Bank ids may not collide with seeds;
  /// colliding or invalid entries are dropped (with an error log), never
  /// allowed to shadow built-ins.
  pub fn build(bank: Option<&TrainerConfig>) -> Self {
    let mut by_id = HashMap::new();
    let mut order = Vec::new();

    for def in seed_challenges() {
      order.push(def.id);
      by_id.insert(def.id, def);
    }

    if let Some(cfg) = bank {
      let mut next_free = order.iter().copied().max().unwrap_or(0) + 1;
      for cc in &cfg.challenges {
        let id = cc.id.unwrap_or_else(|| {
          let id = next_free;
          next_free += 1;
          id
        });
        if by_id.contains_key(&id) {
          error!(target: "challenge", %id, "Skipping bank item: id already taken");
          continue;
        }
        match verified_bank_definition(id, cc) {
          Some(def) => {
            order.push(id);
            by_id.insert(id, def);
          }
          None => {
            error!(target: "challenge", %id, category = ?cc.category, "Skipping bank item: answer does not resolve to a unique element");
          }
        }
      }
    }

    info!(target: "challenge", total = order.len(), "Challenge catalog ready");
    Self { by_id, order }
  }

  pub fn get(&self, id: u32) -> Option<&ChallengeDefinition> {
    self.by_id.get(&id)
  }

  /// Definitions in listing order.
  pub fn iter(&self) -> impl Iterator<Item = &ChallengeDefinition> {
    self.order.iter().filter_map(|id| self.by_id.get(id))
  }

  pub fn len(&self) -> usize {
    self.order.len()
  }
}

/// Check a bank entry against the matcher before admitting it: the answer
/// must hit exactly one element, and each alternative must hit that same
/// element (invalid alternatives are dropped individually).
fn verified_bank_definition(id: u32, cc: &crate::config::ChallengeCfg) -> Option<ChallengeDefinition> {
  let frag = Fragment::parse(&cc.markup);
  let target = frag.select_unique(&cc.answer).ok().flatten()?;

  let mut alternatives = Vec::new();
  for alt in &cc.alternatives {
    match frag.select_unique(&alt.selector) {
      Ok(Some(node)) if node == target => alternatives.push(Alternative {
        selector: alt.selector.clone(),
        explanation: alt.explanation.clone(),
      }),
      _ => {
        error!(target: "challenge", %id, selector = %alt.selector, "Dropping bank alternative: does not resolve to the answer's target");
      }
    }
  }

  Some(ChallengeDefinition {
    id,
    category: cc.category,
    prompt: cc.prompt.clone(),
    seed_markup: cc.markup.clone(),
    answer_selector: cc.answer.clone(),
    accepted_alternatives: alternatives,
    trivia: cc.trivia.clone(),
  })
}

fn alt(selector: &str, explanation: &str) -> Alternative {
  Alternative {
    selector: selector.into(),
    explanation: explanation.into(),
  }
}

/// The ten built-in challenges. One per category; UI-state pseudo-classes are
/// fully supported by the category tables but only appear via the TOML bank,
/// since the built-in fragments carry no interactive state.
pub fn seed_challenges() -> Vec<ChallengeDefinition> {
  vec![
    ChallengeDefinition {
      id: 1,
      category: Category::Id,
      prompt: "Select the primary login button by its id.".into(),
      seed_markup: r#"
        <form class="login">
          <button class="btn">Cancel</button>
          <button class="btn btn-primary" id="login-primary">Log in</button>
        </form>"#
        .into(),
      answer_selector: "#login-primary".into(),
      accepted_alternatives: vec![alt(
        "button#login-primary",
        "Prefixing the tag narrows the match to buttons carrying that id.",
      )],
      trivia: "An id must be unique within a document, so `#id` can never legitimately match more than one element.".into(),
    },
    ChallengeDefinition {
      id: 2,
      category: Category::Class,
      prompt: "Select the menu item that is currently active.".into(),
      seed_markup: r#"
        <ul class="menu">
          <li>Home</li>
          <li class="active">Docs</li>
          <li>About</li>
        </ul>"#
        .into(),
      answer_selector: ".active".into(),
      accepted_alternatives: vec![alt(
        "li.active",
        "Tag plus class only matches list items with that class.",
      )],
      trivia: "Unlike ids, a class may appear on many elements — here it happens to mark just one.".into(),
    },
    ChallengeDefinition {
      id: 3,
      category: Category::Descendant,
      prompt: "Select the link inside the page header, without touching the footer link.".into(),
      seed_markup: r#"
        <header>
          <nav><a href="/start">Start</a></nav>
        </header>
        <footer>
          <a href="/legal">Legal</a>
        </footer>"#
        .into(),
      answer_selector: "header a".into(),
      accepted_alternatives: vec![
        alt("nav a", "The nav only exists inside the header, so anchoring on it works too."),
        alt("header nav a", "Spelling out the whole path is more specific but reaches the same element."),
      ],
      trivia: "The descendant combinator matches at any nesting depth — the link does not need to be a direct child of the header.".into(),
    },
    ChallengeDefinition {
      id: 4,
      category: Category::Child,
      prompt: "Select the paragraph that is a direct child of the panel — not the one nested in the section.".into(),
      seed_markup: r#"
        <div class="panel">
          <p>Intro</p>
          <section>
            <p>Nested note</p>
          </section>
        </div>"#
        .into(),
      answer_selector: ".panel > p".into(),
      accepted_alternatives: vec![alt(
        "div > p",
        "The only div in the fragment is the panel, so the tag works as the parent side.",
      )],
      trivia: "`A > B` requires B to sit exactly one level below A; a plain space would also catch the nested paragraph.".into(),
    },
    ChallengeDefinition {
      id: 5,
      category: Category::AdjacentSibling,
      prompt: "Select the paragraph immediately following the heading.".into(),
      seed_markup: r#"
        <article>
          <h2>Release notes</h2>
          <p>Shipped this week.</p>
          <p>Minor fixes.</p>
        </article>"#
        .into(),
      answer_selector: "h2 + p".into(),
      accepted_alternatives: vec![alt(
        "h2 + *",
        "The universal selector on the right side still only matches the element directly after the heading.",
      )],
      trivia: "`+` reaches exactly one position to the right among siblings; the second paragraph is out of reach.".into(),
    },
    ChallengeDefinition {
      id: 6,
      category: Category::GeneralSibling,
      prompt: "Select the closing paragraph that comes after the heading — the teaser above it must stay unmatched.".into(),
      seed_markup: r#"
        <section>
          <p>Teaser</p>
          <h3>Details</h3>
          <div>chart</div>
          <p>Closing summary</p>
        </section>"#
        .into(),
      answer_selector: "h3 ~ p".into(),
      accepted_alternatives: vec![alt(
        "div ~ p",
        "Any earlier sibling works as the anchor, as long as the teaser stays on its left.",
      )],
      trivia: "`~` matches every following sibling, not just the next one — it only hits once here because a single paragraph follows the heading.".into(),
    },
    ChallengeDefinition {
      id: 7,
      category: Category::AttributeExact,
      prompt: "Select the email field by the exact value of its type attribute.".into(),
      seed_markup: r#"
        <form class="signup">
          <input type="text" name="nickname">
          <input type="email" name="contact-email">
          <input type="checkbox" name="updates">
        </form>"#
        .into(),
      answer_selector: "input[type='email']".into(),
      accepted_alternatives: vec![alt(
        "[name='contact-email']",
        "Any attribute with a unique exact value identifies the element; the tag prefix is optional.",
      )],
      trivia: "`[attr='value']` compares the whole attribute value — `[type='mail']` would match nothing here.".into(),
    },
    ChallengeDefinition {
      id: 8,
      category: Category::AttributeSubstring,
      prompt: "Select the username field — you only know its name attribute contains \"user\".".into(),
      seed_markup: r#"
        <form class="profile">
          <input type="text" name="data-username">
          <input type="text" name="display-name">
          <input type="hidden" name="csrf-token">
        </form>"#
        .into(),
      answer_selector: "input[name*='user']".into(),
      accepted_alternatives: vec![alt(
        "[name*='user']",
        "The substring operator works without a tag prefix as well.",
      )],
      trivia: "`*=` matches anywhere inside the value; `^=` and `$=` pin the match to the start or the end instead.".into(),
    },
    ChallengeDefinition {
      id: 9,
      category: Category::StructuralPseudo,
      prompt: "Select the second step of the list by its position alone — no step carries a class or id.".into(),
      seed_markup: r#"
        <ol class="steps">
          <li>Install</li>
          <li>Configure</li>
          <li>Deploy</li>
        </ol>"#
        .into(),
      answer_selector: "li:nth-child(2)".into(),
      accepted_alternatives: vec![alt(
        "ol li:nth-child(2)",
        "Anchoring on the list first changes nothing here, but scopes the position check explicitly.",
      )],
      trivia: "`:nth-child(n)` counts among all siblings, starting at 1 — not only among elements of the same tag.".into(),
    },
    ChallengeDefinition {
      id: 10,
      category: Category::NegationPseudo,
      prompt: "Select the published tag — the one that is not muted.".into(),
      seed_markup: r#"
        <div class="tags">
          <span class="tag muted">draft</span>
          <span class="tag muted">internal</span>
          <span class="tag">published</span>
        </div>"#
        .into(),
      answer_selector: ".tag:not(.muted)".into(),
      accepted_alternatives: vec![alt(
        "span:not(.muted)",
        "Negating on the tag instead of the class reaches the same single element in this fragment.",
      )],
      trivia: "`:not()` inverts a simple selector; chaining several `:not()` clauses narrows further.".into(),
    },
  ]
}

#[cfg(test)]
mod tests {
  use super::*;

  /// Catalog invariant: every answer resolves to exactly one element, and
  /// every accepted alternative resolves to that same element.
  #[test]
  fn every_seed_answer_is_unique_and_alternatives_agree() {
    for def in seed_challenges() {
      let frag = Fragment::parse(&def.seed_markup);
      let hits = frag
        .select(&def.answer_selector)
        .unwrap_or_else(|e| panic!("challenge {}: {}", def.id, e));
      assert_eq!(hits.len(), 1, "challenge {}: answer `{}` must match exactly one element", def.id, def.answer_selector);
      let target = hits[0];
      for alt in &def.accepted_alternatives {
        let node = frag
          .select_unique(&alt.selector)
          .unwrap_or_else(|e| panic!("challenge {}: {}", def.id, e));
        assert_eq!(node, Some(target), "challenge {}: alternative `{}` must hit the same target", def.id, alt.selector);
      }
    }
  }

  #[test]
  fn seed_ids_are_distinct_and_catalog_lists_ten() {
    let catalog = Catalog::build(None);
    assert_eq!(catalog.len(), 10);
    assert_eq!(catalog.iter().count(), 10);
    assert!(catalog.get(1).is_some());
    assert!(catalog.get(99).is_none());
  }

  #[test]
  fn invalid_bank_entries_are_skipped() {
    use crate::config::{ChallengeCfg, TrainerConfig};
    let cfg = TrainerConfig {
      challenges: vec![
        ChallengeCfg {
          id: None,
          category: Category::UiStatePseudo,
          prompt: "Select the checked option.".into(),
          markup: r#"
            <form>
              <input type="checkbox" name="a">
              <input type="checkbox" name="b" checked>
            </form>"#
            .into(),
          // Over-broad on purpose: matches both checkboxes.
          answer: "input".into(),
          alternatives: vec![],
          trivia: String::new(),
        },
        ChallengeCfg {
          id: Some(42),
          category: Category::Class,
          prompt: "Select the starred row.".into(),
          markup: r#"<ul><li class="row">a</li><li class="row starred">b</li></ul>"#.into(),
          answer: ".starred".into(),
          alternatives: vec![],
          trivia: String::new(),
        },
      ],
    };
    let catalog = Catalog::build(Some(&cfg));
    assert_eq!(catalog.len(), 11, "only the valid bank entry is admitted");
    assert!(catalog.get(42).is_some());
  }
}
