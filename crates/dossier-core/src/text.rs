//! Text helpers shared by search, deduplication and display.

use unicode_normalization::UnicodeNormalization;

/// Fold `text` for comparison: lower-case, decompose (NFD) and drop the
/// combining diacritical marks in U+0300..=U+036F.
///
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
  text
    .to_lowercase()
    .nfd()
    .filter(|c| !is_combining_diacritic(*c))
    .collect()
}

/// [`normalize`] for optional input; `None` folds to the empty string.
pub fn normalize_opt(text: Option<&str>) -> String {
  text.map(normalize).unwrap_or_default()
}

fn is_combining_diacritic(c: char) -> bool {
  ('\u{0300}'..='\u{036f}').contains(&c)
}

// ─── Phones ──────────────────────────────────────────────────────────────────

/// Strip separators and rewrite Romanian international prefixes to the
/// national `0…` form, so `+40 721-967-846` and `0721967846` compare equal.
pub fn normalize_phone(phone: &str) -> String {
  let digits: String = phone
    .chars()
    .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
    .collect();

  if let Some(rest) = digits.strip_prefix("+40") {
    return format!("0{rest}");
  }
  if let Some(rest) = digits.strip_prefix("0040") {
    return format!("0{rest}");
  }
  // 40 followed by nine national digits.
  if digits.chars().count() == 11
    && let Some(rest) = digits.strip_prefix("40")
  {
    return format!("0{rest}");
  }
  digits
}

/// Whether two phone numbers name the same line: equal once normalized, or
/// sharing their last nine digits when both have that many.
pub fn phones_match(a: &str, b: &str) -> bool {
  let (a, b) = (normalize_phone(a), normalize_phone(b));
  if a.is_empty() || b.is_empty() {
    return false;
  }
  if a == b {
    return true;
  }
  let tail = |s: &str| -> Option<String> {
    let chars: Vec<char> = s.chars().collect();
    (chars.len() >= 9).then(|| chars[chars.len() - 9..].iter().collect())
  };
  matches!((tail(&a), tail(&b)), (Some(x), Some(y)) if x == y)
}

/// Whether `name` is really a phone number typed into a name field.
pub fn looks_like_phone(name: &str) -> bool {
  let digits: String = name
    .chars()
    .filter(|c| !matches!(c, '-' | ' ' | '+'))
    .collect();
  !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

// ─── Display ─────────────────────────────────────────────────────────────────

/// Shorten a service identifier or URL for display: scheme, `www.` and
/// trailing slashes go, doubled slashes collapse. Absent input renders `-`.
pub fn normalize_service_identifier(service_id: Option<&str>) -> String {
  let Some(id) = service_id.filter(|s| !s.is_empty()) else {
    return "-".to_owned();
  };
  let id = id
    .strip_prefix("https://")
    .or_else(|| id.strip_prefix("http://"))
    .unwrap_or(id);
  let id = id.strip_prefix("www.").unwrap_or(id);
  id.trim_end_matches('/').replace("//", "/")
}

/// Remove a phone number prefixed to a display name
/// (`"0765457608 John Doe"` → `"John Doe"`). The stored name is untouched;
/// if nothing would remain, the original is returned.
pub fn clean_display_name(name: &str) -> String {
  let body = name.strip_prefix('+').unwrap_or(name);
  let run_end = body
    .char_indices()
    .find(|(_, c)| !is_phone_prefix_char(*c))
    .map_or(body.len(), |(i, _)| i);
  let run = &body[..run_end];

  // The prefix must end in whitespace that follows at least one phone char.
  let cut = run
    .char_indices()
    .rev()
    .find(|(i, c)| *i > 0 && c.is_whitespace())
    .map(|(i, c)| i + c.len_utf8());

  match cut {
    Some(cut) => {
      let cleaned = body[cut..].trim();
      if cleaned.is_empty() { name.to_owned() } else { cleaned.to_owned() }
    }
    None => name.to_owned(),
  }
}

fn is_phone_prefix_char(c: char) -> bool {
  c.is_ascii_digit() || c.is_whitespace() || matches!(c, '-' | '(' | ')' | '.')
}

/// Lower-cased domain of an email-looking string.
pub fn email_domain(text: &str) -> Option<String> {
  let domain = text.split('@').nth(1)?.trim().to_lowercase();
  (!domain.is_empty()).then_some(domain)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalize_strips_diacritics_and_case() {
    assert_eq!(normalize("Ștefan Müller"), "stefan muller");
    assert_eq!(normalize("ĂÂÎȘȚ"), "aaist");
  }

  #[test]
  fn normalize_is_idempotent() {
    for s in ["Ștefan Müller", "Crème Brûlée", "ÀÉÎÕÜ", "plain", ""] {
      let once = normalize(s);
      assert_eq!(normalize(&once), once, "input {s:?}");
    }
  }

  #[test]
  fn normalize_opt_none_is_empty() {
    assert_eq!(normalize_opt(None), "");
    assert_eq!(normalize_opt(Some("Ana")), "ana");
  }

  #[test]
  fn phone_prefixes_collapse_to_national_form() {
    assert_eq!(normalize_phone("+40 721-967-846"), "0721967846");
    assert_eq!(normalize_phone("0040721967846"), "0721967846");
    assert_eq!(normalize_phone("40759019895"), "0759019895");
    assert_eq!(normalize_phone("(0765) 457.608"), "0765457608");
    assert_eq!(normalize_phone("+4412345"), "+4412345");
    assert_eq!(normalize_phone(""), "");
  }

  #[test]
  fn phones_match_on_the_national_tail() {
    assert!(phones_match("+40 721 967 846", "0721967846"));
    // Foreign prefix, same subscriber number.
    assert!(phones_match("+33721967846", "0721967846"));
    assert!(phones_match("112", "112"));
    assert!(!phones_match("0721967846", "0721967847"));
    assert!(!phones_match("", ""));
  }

  #[test]
  fn phone_like_names() {
    assert!(looks_like_phone("+40 721-967"));
    assert!(!looks_like_phone("Ion 0721"));
    assert!(!looks_like_phone("- -"));
  }

  #[test]
  fn service_identifier_display() {
    assert_eq!(
      normalize_service_identifier(Some("https://www.facebook.com//login/")),
      "facebook.com/login"
    );
    assert_eq!(normalize_service_identifier(Some("com.whatsapp")), "com.whatsapp");
    assert_eq!(normalize_service_identifier(None), "-");
  }

  #[test]
  fn display_name_drops_leading_phone() {
    assert_eq!(clean_display_name("+40721967846 Magda Joy"), "Magda Joy");
    assert_eq!(clean_display_name("0765457608 John Doe"), "John Doe");
    assert_eq!(clean_display_name("Regular Name"), "Regular Name");
    assert_eq!(clean_display_name("0765457608"), "0765457608");
  }

  #[test]
  fn email_domains() {
    assert_eq!(email_domain("Ion@Gmail.com").as_deref(), Some("gmail.com"));
    assert_eq!(email_domain("no-at-sign"), None);
    assert_eq!(email_domain("trailing@"), None);
  }
}
