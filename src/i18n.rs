//! Translation of user-facing messages.

use std::collections::HashMap;

/// Translates user-facing message keys into the active locale.
///
/// English source strings double as their own catalog: an unknown key
/// passes through unchanged, so already-formatted messages survive a
/// second translation pass untouched.
#[derive(Debug, Clone)]
pub struct Translator {
  catalog: HashMap<String, String>,
}

impl Translator {
  pub fn new(locale: &str) -> Self {
    Self {
      catalog: builtin_catalog(locale),
    }
  }

  /// Layer config-provided messages over the built-in catalog.
  pub fn with_messages(mut self, messages: &HashMap<String, String>) -> Self {
    for (key, value) in messages {
      self.catalog.insert(key.clone(), value.clone());
    }
    self
  }

  pub fn translate(&self, key: &str) -> String {
    match self.catalog.get(key) {
      Some(msg) => msg.clone(),
      None => key.to_string(),
    }
  }

  /// Translate a message and substitute `%1$s`-style placeholders.
  pub fn translate_with(&self, key: &str, args: &[&str]) -> String {
    let mut msg = self.translate(key);
    for (i, arg) in args.iter().enumerate() {
      msg = msg
        .replace(&format!("%{}$s", i + 1), arg)
        .replace(&format!("%{}$d", i + 1), arg);
    }
    msg
  }
}

impl Default for Translator {
  fn default() -> Self {
    Self::new("en")
  }
}

fn builtin_catalog(locale: &str) -> HashMap<String, String> {
  let pairs: &[(&str, &str)] = match locale {
    "de" => &[
      (
        "A non-recoverable error occurred",
        "Ein nicht behebbarer Fehler ist aufgetreten",
      ),
      (
        "You can only watch up to %1$d products",
        "Sie k\u{f6}nnen maximal %1$d Produkte beobachten",
      ),
      (
        "Only %1$d products can be pinned",
        "Es k\u{f6}nnen nur %1$d Produkte angeheftet werden",
      ),
      (
        "Please log in to manage your watch list",
        "Bitte melden Sie sich an, um Ihre Merkliste zu verwalten",
      ),
    ],
    _ => &[],
  };

  pairs
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}
