//! HTML rendering: the client tree, per-request view and small helpers.

pub mod client;
pub mod clients;
pub mod pagination;
pub mod view;

/// Escape text for HTML element content.
pub fn escape_html(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      _ => out.push(c),
    }
  }
  out
}

/// Escape a value for a double-quoted HTML attribute.
pub fn escape_attr(s: &str) -> String {
  escape_html(s).replace('"', "&quot;")
}

/// Hidden anti-forgery input, the request-bound part of cached fragments.
pub fn csrf_input(token: &str) -> String {
  format!(
    "<input type=\"hidden\" name=\"_token\" value=\"{}\">",
    escape_attr(token)
  )
}

/// Format a minor-unit price for display, e.g. `1995` -> "19.95 EUR".
pub fn format_price(minor: i64, currency: &str) -> String {
  format!("{}.{:02} {}", minor / 100, (minor % 100).abs(), currency)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_escape_html() {
    assert_eq!(escape_html("a < b & c > d"), "a &lt; b &amp; c &gt; d");
    assert_eq!(escape_html("plain"), "plain");
  }

  #[test]
  fn test_escape_attr_quotes() {
    assert_eq!(escape_attr("say \"hi\""), "say &quot;hi&quot;");
  }

  #[test]
  fn test_csrf_input_escapes_token() {
    assert_eq!(
      csrf_input("ab\"cd"),
      "<input type=\"hidden\" name=\"_token\" value=\"ab&quot;cd\">"
    );
  }

  #[test]
  fn test_format_price() {
    assert_eq!(format_price(1995, "EUR"), "19.95 EUR");
    assert_eq!(format_price(500, "USD"), "5.00 USD");
    assert_eq!(format_price(7, "EUR"), "0.07 EUR");
  }
}
