//! Selector Matcher: thin wrapper over `scraper` (html5ever + selectors).
//!
//! The engine never parses CSS itself; it hands selector strings to this
//! module and gets back matched node identities or a syntax error. Element
//! identity is the `ego_tree::NodeId` within one parsed fragment, so two
//! selectors run against the same [`Fragment`] can be compared for hitting
//! the same element.

use ego_tree::NodeId;
use scraper::{Html, Selector};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MatchError {
  #[error("`{input}` is not a valid selector: {detail}")]
  Syntax { input: String, detail: String },
}

/// One parsed HTML fragment. Parsing is cheap for the small markup the
/// catalog carries, so a fresh `Fragment` is built per validation call.
pub struct Fragment {
  dom: Html,
}

impl Fragment {
  pub fn parse(markup: &str) -> Self {
    Self {
      dom: Html::parse_fragment(markup),
    }
  }

  /// Run a selector, returning matched element ids in document order.
  pub fn select(&self, selector: &str) -> Result<Vec<NodeId>, MatchError> {
    let compiled = Selector::parse(selector).map_err(|e| MatchError::Syntax {
      input: selector.to_string(),
      detail: e.to_string(),
    })?;
    Ok(self.dom.select(&compiled).map(|el| el.id()).collect())
  }

  /// Run a selector expected to hit exactly one element.
  /// `Ok(None)` means zero-or-many; the caller decides how bad that is.
  pub fn select_unique(&self, selector: &str) -> Result<Option<NodeId>, MatchError> {
    let matched = self.select(selector)?;
    Ok(match matched.as_slice() {
      [only] => Some(*only),
      _ => None,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const MARKUP: &str = r#"
    <ul class="menu">
      <li>Home</li>
      <li class="active">Docs</li>
      <li>About</li>
    </ul>"#;

  #[test]
  fn selecting_by_class_finds_one_element() {
    let frag = Fragment::parse(MARKUP);
    let hits = frag.select(".active").unwrap();
    assert_eq!(hits.len(), 1);
  }

  #[test]
  fn equivalent_selectors_resolve_to_the_same_node() {
    let frag = Fragment::parse(MARKUP);
    let a = frag.select_unique(".active").unwrap().unwrap();
    let b = frag.select_unique("li.active").unwrap().unwrap();
    let c = frag.select_unique("li:nth-child(2)").unwrap().unwrap();
    assert_eq!(a, b);
    assert_eq!(a, c);
  }

  #[test]
  fn unbalanced_brackets_are_a_syntax_error() {
    let frag = Fragment::parse(MARKUP);
    assert!(matches!(frag.select("li["), Err(MatchError::Syntax { .. })));
  }

  #[test]
  fn over_broad_selection_is_not_unique() {
    let frag = Fragment::parse(MARKUP);
    assert_eq!(frag.select("li").unwrap().len(), 3);
    assert!(frag.select_unique("li").unwrap().is_none());
  }
}
