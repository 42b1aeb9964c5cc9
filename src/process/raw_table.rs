use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// Column names from the header row, made unique.
    pub headers: Vec<String>,
    /// Each data row, padded to `headers.len()` fields.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Make header names unique: a repeated `X` becomes `X.1`, `X.2`, ...
/// A leading byte-order mark is dropped; surrounding spaces are kept, so
/// `" Total page views "` does not name a known column.
pub fn dedup_headers<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for h in raw {
        let base = h.as_ref().trim_start_matches('\u{feff}').to_string();
        let mut name = base.clone();
        let mut n = 1;
        while seen.contains(&name) {
            name = format!("{}.{}", base, n);
            n += 1;
        }
        seen.insert(name.clone());
        out.push(name);
    }
    out
}
