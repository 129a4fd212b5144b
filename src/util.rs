//! Small utility helpers used across modules.

/// Canonical form of a selector for dedup/set membership:
/// ASCII case-fold plus collapsing any run of whitespace to a single space.
/// `"UL  >  LI"` and `"ul > li"` normalize to the same string.
pub fn normalize_selector(s: &str) -> String {
  s.split_whitespace()
    .collect::<Vec<_>>()
    .join(" ")
    .to_ascii_lowercase()
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge markup payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    s.to_string()
  } else {
    let cut = s
      .char_indices()
      .take_while(|(i, _)| *i < max)
      .last()
      .map(|(i, c)| i + c.len_utf8())
      .unwrap_or(0);
    format!("{}… ({} bytes total)", &s[..cut], s.len())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalization_folds_case_and_whitespace() {
    assert_eq!(normalize_selector("  UL  >   LI.Item "), "ul > li.item");
    assert_eq!(normalize_selector("#login-primary"), "#login-primary");
  }

  #[test]
  fn truncation_keeps_short_strings_intact() {
    assert_eq!(trunc_for_log("abc", 10), "abc");
    assert!(trunc_for_log("abcdefghij", 4).starts_with("abcd"));
  }
}
