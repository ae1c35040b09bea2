//! In-memory identifier lookup table loaded from a tab-delimited file.
//!
//! Each line of the source is `ID<TAB>V1<TAB>V2...`. The identifier is trimmed and
//! uppercased when loaded; the values are kept as written. Lines with fewer than two
//! fields or an empty identifier are skipped without a diagnostic, and a repeated
//! identifier replaces the values of the earlier line.
//!
//! Lookups compare keys verbatim. `get("gene1")` misses an entry loaded from a `gene1`
//! line because the stored key is `GENE1`; pass keys through [`normalize_key`] first
//! when they come from an untrusted casing.
//!
//! The table is immutable once constructed, so a loaded map can be shared across threads
//! for reading.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::Index;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::diagnostics::{DiagnosticSink, TracingSink, CODE_NOT_LOADED, CODE_NO_MATCH};
use crate::error::IdMapError;

/// Identifier to ordered values.
pub type Entries = HashMap<String, Vec<String>>;

/// Canonical form of an identifier: surrounding whitespace removed, uppercased.
pub fn normalize_key(id: &str) -> String {
    id.trim().to_uppercase()
}

/// Splits one source line into an identifier and its values.
///
/// Returns `None` for blank lines, lines without a tab and lines whose first field is empty.
pub fn parse_line(line: &str) -> Option<(String, Vec<String>)> {
    let mut fields = line.trim().split('\t');
    let key = normalize_key(fields.next()?);
    let values: Vec<String> = fields.map(str::to_string).collect();
    if values.is_empty() || key.is_empty() {
        return None;
    }
    Some((key, values))
}

pub struct IdentifierMap {
    // None until a source or a mapping has been supplied.
    entries: Option<Entries>,
    sink: Arc<dyn DiagnosticSink>,
}

impl IdentifierMap {
    /// Builds a map from a source path or, failing that, a supplied mapping.
    ///
    /// The source wins when both are given. With neither, the map holds no data and
    /// `is_loaded()` reports `false`.
    pub fn new<P: AsRef<Path>>(
        source: Option<P>,
        key_map: Option<Entries>,
    ) -> Result<Self, IdMapError> {
        match (source, key_map) {
            (Some(path), _) => Self::load(path),
            (None, Some(map)) => Ok(Self::from_map(map)),
            (None, None) => Ok(Self::empty()),
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, IdMapError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| IdMapError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        let entries = read_entries(BufReader::new(file), path)?;
        tracing::debug!(path = %path.display(), identifiers = entries.len(), "loaded id map");
        Ok(Self::with_entries(Some(entries)))
    }

    /// Parses an already opened source. Read failures are reported as `SourceUnavailable`
    /// with an empty path.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, IdMapError> {
        let entries = read_entries(reader, Path::new(""))?;
        tracing::debug!(identifiers = entries.len(), "loaded id map from reader");
        Ok(Self::with_entries(Some(entries)))
    }

    /// Wraps a prepared mapping. Keys are taken as given and are not normalized.
    pub fn from_map(key_map: Entries) -> Self {
        Self::with_entries(Some(key_map))
    }

    pub fn empty() -> Self {
        Self::with_entries(None)
    }

    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    fn with_entries(entries: Option<Entries>) -> Self {
        Self {
            entries,
            sink: Arc::new(TracingSink),
        }
    }

    /// Values stored for `id`, in source field order.
    ///
    /// `id` is compared as-is. An unknown identifier and an identifier with no values both
    /// return an empty slice and emit the same warning; a map with no data loaded returns
    /// an empty slice with an info message.
    pub fn get(&self, id: &str) -> &[String] {
        let Some(entries) = &self.entries else {
            self.sink
                .info(CODE_NOT_LOADED, "lookup attempted with no mapping loaded");
            return &[];
        };
        match entries.get(id) {
            Some(values) if !values.is_empty() => values.as_slice(),
            _ => {
                self.sink.warn(CODE_NO_MATCH, &format!("no match for {}", id));
                &[]
            }
        }
    }

    pub fn keys(&self) -> HashSet<&str> {
        self.entries
            .iter()
            .flat_map(|entries| entries.keys().map(String::as_str))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `false` only for a map built without a source or a mapping.
    pub fn is_loaded(&self) -> bool {
        self.entries.is_some()
    }
}

impl Default for IdentifierMap {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for IdentifierMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentifierMap")
            .field("loaded", &self.is_loaded())
            .field("identifiers", &self.len())
            .finish()
    }
}

impl Index<&str> for IdentifierMap {
    type Output = [String];

    fn index(&self, id: &str) -> &[String] {
        self.get(id)
    }
}

fn read_entries<R: BufRead>(reader: R, path: &Path) -> Result<Entries, IdMapError> {
    let mut entries = HashMap::new();
    for line in reader.lines() {
        let line = line.map_err(|source| IdMapError::SourceUnavailable {
            path: PathBuf::from(path),
            source,
        })?;
        if let Some((key, values)) = parse_line(&line) {
            entries.insert(key, values);
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::LogLevel;
    use std::io::Cursor;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<(LogLevel, String, String)>>,
    }

    impl Recorder {
        fn events(&self) -> Vec<(LogLevel, String, String)> {
            self.events.lock().unwrap().clone()
        }
    }

    impl DiagnosticSink for Recorder {
        fn emit(&self, level: LogLevel, code: &str, message: &str) {
            self.events
                .lock()
                .unwrap()
                .push((level, code.to_string(), message.to_string()));
        }
    }

    fn from_text(text: &str) -> IdentifierMap {
        IdentifierMap::from_reader(Cursor::new(text.to_string())).unwrap()
    }

    #[test]
    fn parse_line_splits_identifier_and_values() {
        let (key, values) = parse_line("id\tv1\tv2").unwrap();
        assert_eq!(key, "ID");
        assert_eq!(values, vec!["v1", "v2"]);
    }

    #[test]
    fn parse_line_rejects_short_and_keyless_lines() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("   "), None);
        assert_eq!(parse_line("bad_line_no_tabs"), None);
        assert_eq!(parse_line("# comment"), None);
        // leading tab is trimmed away, leaving a single field
        assert_eq!(parse_line("\tORPHAN"), None);
        assert_eq!(parse_line(" \t\t "), None);
        assert_eq!(parse_line("A\t"), None);
    }

    #[test]
    fn parse_line_keeps_empty_inner_values() {
        let (key, values) = parse_line("a\t\tb").unwrap();
        assert_eq!(key, "A");
        assert_eq!(values, vec!["", "b"]);
    }

    #[test]
    fn key_is_normalized_and_values_keep_case() {
        let map = from_text("  ab\tx  \nk \t Mixed Case \tv\n");
        assert_eq!(map.get("AB"), ["x"]);
        assert_eq!(map.get("K"), [" Mixed Case ", "v"]);
        assert!(map.get("ab").is_empty());
    }

    #[test]
    fn last_line_wins_for_duplicate_identifiers() {
        let map = from_text("A\t1\na\t2\n");
        assert_eq!(map.get("A"), ["2"]);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn malformed_lines_add_no_keys() {
        let map = from_text("one_field\n\n\tORPHAN\n");
        assert!(map.is_loaded());
        assert!(map.keys().is_empty());
    }

    #[test]
    fn header_row_with_two_fields_is_ingested() {
        let map = from_text("id\tsymbol\nGENE1\tSYM\n");
        assert_eq!(map.get("ID"), ["symbol"]);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn missing_identifier_warns_and_returns_empty() {
        let recorder = Arc::new(Recorder::default());
        let map = from_text("GENE1\tA\n").with_sink(recorder.clone());
        assert!(map.get("GENE3").is_empty());
        assert_eq!(
            recorder.events(),
            vec![(LogLevel::Warn, CODE_NO_MATCH.to_string(), "no match for GENE3".to_string())]
        );
    }

    #[test]
    fn present_but_empty_is_reported_like_a_miss() {
        let recorder = Arc::new(Recorder::default());
        let mut key_map = Entries::new();
        key_map.insert("EMPTY".to_string(), Vec::new());
        let map = IdentifierMap::from_map(key_map).with_sink(recorder.clone());

        assert!(map.get("EMPTY").is_empty());
        assert!(map.get("ABSENT").is_empty());
        let events = recorder.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], (LogLevel::Warn, CODE_NO_MATCH.to_string(), "no match for EMPTY".to_string()));
        assert_eq!(events[1], (LogLevel::Warn, CODE_NO_MATCH.to_string(), "no match for ABSENT".to_string()));
        assert!(map.keys().contains("EMPTY"));
    }

    #[test]
    fn unloaded_map_reports_info_only() {
        let recorder = Arc::new(Recorder::default());
        let map = IdentifierMap::empty().with_sink(recorder.clone());
        assert!(!map.is_loaded());
        assert!(map.get("ANY").is_empty());
        assert!(map.keys().is_empty());
        assert_eq!(
            recorder.events(),
            vec![(
                LogLevel::Info,
                CODE_NOT_LOADED.to_string(),
                "lookup attempted with no mapping loaded".to_string()
            )]
        );
    }

    #[test]
    fn supplied_map_keys_are_not_normalized() {
        let mut key_map = Entries::new();
        key_map.insert("lower".to_string(), vec!["v".to_string()]);
        let map = IdentifierMap::from_map(key_map);
        assert_eq!(map.get("lower"), ["v"]);
        assert!(map.get("LOWER").is_empty());
    }

    #[test]
    fn new_without_inputs_is_unloaded() {
        let map = IdentifierMap::new(None::<&Path>, None).unwrap();
        assert!(!map.is_loaded());
        assert_eq!(map.len(), 0);
    }

    #[test]
    fn new_falls_back_to_supplied_map() {
        let mut key_map = Entries::new();
        key_map.insert("X".to_string(), vec!["1".to_string()]);
        let map = IdentifierMap::new(None::<&Path>, Some(key_map)).unwrap();
        assert_eq!(map.get("X"), ["1"]);
    }

    #[test]
    fn index_matches_get() {
        let map = from_text("GENE2\tSYMBOL_B\n");
        assert_eq!(&map["GENE2"], map.get("GENE2"));
        assert!(map["GENE9"].is_empty());
    }

    #[test]
    fn unreadable_reader_is_source_unavailable() {
        let bytes: &[u8] = b"A\t1\n\xff\xfe\tbad\n";
        let err = IdentifierMap::from_reader(bytes).unwrap_err();
        assert!(matches!(err, IdMapError::SourceUnavailable { .. }));
    }
}
