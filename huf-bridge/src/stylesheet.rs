use std::collections::BTreeMap;

/// Global style sheets currently installed on the surface, keyed by sheet id.
#[derive(Debug, Default)]
pub struct StyleSheetIndex {
    sheets: BTreeMap<String, String>,
}

impl StyleSheetIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&mut self, id: &str, css: &str) {
        self.sheets.insert(id.to_string(), css.to_string());
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.sheets.remove(id).is_some()
    }

    /// Re-key a sheet. Any sheet already stored under `to` is replaced.
    pub fn rename(&mut self, from: &str, to: &str) -> bool {
        match self.sheets.remove(from) {
            Some(css) => {
                self.sheets.insert(to.to_string(), css);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sheets.contains_key(id)
    }

    #[cfg(test)]
    fn css(&self, id: &str) -> Option<&str> {
        self.sheets.get(id).map(String::as_str)
    }
}
