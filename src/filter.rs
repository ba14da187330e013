//! Filter normalization and SQL composition.
//!
//! A raw [`FilterRequest`] (repeated subject, color, and month tokens plus
//! a mode token) is normalized into an [`EpisodeFilter`]. Tokens that cannot
//! be normalized are dropped, so a partly invalid request still filters on
//! its valid values.
//!
//! [`compile`] turns the filter into one SQL statement plus its ordered
//! parameters. Each of the subject and color dimensions becomes a
//! [`PredicateSet`]:
//!
//! - `AND`: one `EXISTS` check per value, all conjoined.
//! - `OR`: a single `EXISTS` check with an `IN (...)` list.
//!
//! The month constraint and the dimensions themselves are always conjoined.

use serde::Serialize;
use std::fmt;
use tracing::debug;

/// How multiple values within one filter dimension combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    #[default]
    And,
    Or,
}

impl Mode {
    /// `OR` (any case) selects [`Mode::Or`]; anything else is the default.
    pub fn from_token(token: Option<&str>) -> Mode {
        match token {
            Some(t) if t.trim().eq_ignore_ascii_case("OR") => Mode::Or,
            _ => Mode::And,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::And => "AND",
            Mode::Or => "OR",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter tokens as they arrive from a caller, before normalization.
#[derive(Debug, Clone, Default)]
pub struct FilterRequest {
    pub subjects: Vec<String>,
    pub colors: Vec<String>,
    pub months: Vec<String>,
    pub mode: Option<String>,
}

impl FilterRequest {
    /// Build a request from query-string pairs. Keys may repeat; `mode` and
    /// `filter_type` both set the mode (last one wins).
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut request = FilterRequest::default();
        for (key, value) in pairs {
            match key.as_ref() {
                "subject" => request.subjects.push(value.into()),
                "color" => request.colors.push(value.into()),
                "month" => request.months.push(value.into()),
                "filter_type" | "mode" => request.mode = Some(value.into()),
                other => debug!(key = other, "ignoring unknown filter parameter"),
            }
        }
        request
    }

    pub fn normalize(&self) -> EpisodeFilter {
        let subjects = dedup(
            self.subjects
                .iter()
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty()),
        );
        let colors = dedup(
            self.colors
                .iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
        );

        let mut months = Vec::new();
        for raw in &self.months {
            match parse_month(raw) {
                Some(m) if !months.contains(&m) => months.push(m),
                Some(_) => {}
                None => debug!(value = raw.as_str(), "discarding invalid month filter"),
            }
        }

        EpisodeFilter {
            subjects,
            colors,
            months,
            mode: Mode::from_token(self.mode.as_deref()),
        }
    }
}

fn dedup(values: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for v in values {
        if !out.contains(&v) {
            out.push(v);
        }
    }
    out
}

/// A month token is kept only if it is all ASCII digits and in 1..=12.
fn parse_month(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<u32>().ok().filter(|m| (1..=12).contains(m))
}

/// The effective, normalized filter. Serialized as the echo returned with
/// every result set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EpisodeFilter {
    pub subjects: Vec<String>,
    pub colors: Vec<String>,
    pub months: Vec<u32>,
    #[serde(rename = "filter_type")]
    pub mode: Mode,
}

/// A bound query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Text(String),
    Int(i64),
}

/// SQL text with `?` placeholders and the parameters to bind, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

/// An association dimension that can be filtered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Subject,
    Color,
}

impl Dimension {
    /// `EXISTS` prefix joining the episode to this dimension, up to the
    /// point where the value comparison starts.
    fn exists_prefix(&self) -> &'static str {
        match self {
            Dimension::Subject => {
                "EXISTS (SELECT 1 FROM episode_subjects es \
                 JOIN subjects s ON s.subject_id = es.subject_id \
                 WHERE es.episode_id = e.episode_id AND "
            }
            Dimension::Color => {
                "EXISTS (SELECT 1 FROM episode_colors ec \
                 JOIN colors c ON c.color_id = ec.color_id \
                 WHERE ec.episode_id = e.episode_id AND "
            }
        }
    }

    /// Expression compared against the filter values. Subject names match
    /// case-insensitively, color names exactly.
    fn match_expr(&self) -> &'static str {
        match self {
            Dimension::Subject => "UPPER(s.name)",
            Dimension::Color => "c.name",
        }
    }
}

/// The values of one dimension and how they combine.
#[derive(Debug, Clone, Copy)]
pub struct PredicateSet<'a> {
    pub dimension: Dimension,
    pub values: &'a [String],
    pub mode: Mode,
}

impl PredicateSet<'_> {
    /// Append this set's conditions and parameters. An empty set adds
    /// nothing: no constraint on the dimension.
    fn compose(&self, conditions: &mut Vec<String>, params: &mut Vec<SqlParam>) {
        if self.values.is_empty() {
            return;
        }

        let prefix = self.dimension.exists_prefix();
        let expr = self.dimension.match_expr();

        match self.mode {
            Mode::And => {
                for value in self.values {
                    conditions.push(format!("{prefix}{expr} = ?)"));
                    params.push(SqlParam::Text(value.clone()));
                }
            }
            Mode::Or => {
                conditions.push(format!(
                    "{prefix}{expr} IN ({}))",
                    placeholders(self.values.len())
                ));
                params.extend(self.values.iter().cloned().map(SqlParam::Text));
            }
        }
    }
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

const SELECT_EPISODES: &str = r#"SELECT e.episode_id, e.title, e.season, e.episode, e.air_date, e.youtube_src,
    (SELECT json_group_array(s.name) FROM episode_subjects es
        JOIN subjects s ON s.subject_id = es.subject_id
        WHERE es.episode_id = e.episode_id) AS subjects,
    (SELECT json_group_array(c.name) FROM episode_colors ec
        JOIN colors c ON c.color_id = ec.color_id
        WHERE ec.episode_id = e.episode_id) AS colors
FROM episodes e"#;

const ORDER_EPISODES: &str = "ORDER BY e.air_date IS NULL, e.air_date, e.episode_id";

pub fn compile(filter: &EpisodeFilter) -> CompiledQuery {
    let mut conditions: Vec<String> = Vec::new();
    let mut params: Vec<SqlParam> = Vec::new();

    if !filter.months.is_empty() {
        conditions.push(format!(
            "CAST(strftime('%m', e.air_date) AS INTEGER) IN ({})",
            placeholders(filter.months.len())
        ));
        params.extend(filter.months.iter().map(|m| SqlParam::Int(i64::from(*m))));
    }

    for set in [
        PredicateSet {
            dimension: Dimension::Subject,
            values: &filter.subjects,
            mode: filter.mode,
        },
        PredicateSet {
            dimension: Dimension::Color,
            values: &filter.colors,
            mode: filter.mode,
        },
    ] {
        set.compose(&mut conditions, &mut params);
    }

    let mut sql = String::from(SELECT_EPISODES);
    if !conditions.is_empty() {
        sql.push_str("\nWHERE ");
        sql.push_str(&conditions.join("\n  AND "));
    }
    sql.push('\n');
    sql.push_str(ORDER_EPISODES);

    CompiledQuery { sql, params }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(subjects: &[&str], colors: &[&str], months: &[&str], mode: Option<&str>) -> FilterRequest {
        FilterRequest {
            subjects: subjects.iter().map(|s| s.to_string()).collect(),
            colors: colors.iter().map(|s| s.to_string()).collect(),
            months: months.iter().map(|s| s.to_string()).collect(),
            mode: mode.map(str::to_string),
        }
    }

    #[test]
    fn test_subjects_upper_cased_and_trimmed() {
        let f = request(&[" tree ", "Mountain", "TREE", ""], &[], &[], None).normalize();
        assert_eq!(f.subjects, vec!["TREE", "MOUNTAIN"]);
    }

    #[test]
    fn test_colors_trimmed_but_case_kept() {
        let f = request(&[], &["  Bright Red ", "bright red"], &[], None).normalize();
        assert_eq!(f.colors, vec!["Bright Red", "bright red"]);
    }

    #[test]
    fn test_invalid_months_discarded() {
        let f = request(&[], &[], &["1", "13", "0", "abc", "-3", " 12 ", "1", "+4"], None)
            .normalize();
        assert_eq!(f.months, vec![1, 12]);
    }

    #[test]
    fn test_mode_token() {
        assert_eq!(Mode::from_token(None), Mode::And);
        assert_eq!(Mode::from_token(Some("OR")), Mode::Or);
        assert_eq!(Mode::from_token(Some(" or ")), Mode::Or);
        assert_eq!(Mode::from_token(Some("AND")), Mode::And);
        assert_eq!(Mode::from_token(Some("XOR")), Mode::And);
    }

    #[test]
    fn test_from_pairs_collects_repeated_keys() {
        let req = FilterRequest::from_pairs(vec![
            ("subject", "TREE"),
            ("subject", "MOUNTAIN"),
            ("color", "Bright Red"),
            ("month", "1"),
            ("filter_type", "OR"),
            ("page", "2"),
        ]);
        assert_eq!(req.subjects, vec!["TREE", "MOUNTAIN"]);
        assert_eq!(req.colors, vec!["Bright Red"]);
        assert_eq!(req.months, vec!["1"]);
        assert_eq!(req.mode.as_deref(), Some("OR"));
    }

    #[test]
    fn test_empty_filter_has_no_where_clause() {
        let q = compile(&EpisodeFilter::default());
        assert!(!q.sql.contains("WHERE"));
        assert!(q.params.is_empty());
        assert!(q.sql.ends_with(ORDER_EPISODES));
    }

    #[test]
    fn test_and_mode_one_exists_per_value() {
        let f = request(&["TREE", "MOUNTAIN"], &["Sap Green"], &[], Some("AND")).normalize();
        let q = compile(&f);
        assert_eq!(q.sql.matches("EXISTS (SELECT 1 FROM episode_subjects").count(), 2);
        assert_eq!(q.sql.matches("EXISTS (SELECT 1 FROM episode_colors").count(), 1);
        assert!(!q.sql.contains(" IN (?"));
        assert_eq!(
            q.params,
            vec![
                SqlParam::Text("TREE".into()),
                SqlParam::Text("MOUNTAIN".into()),
                SqlParam::Text("Sap Green".into()),
            ]
        );
    }

    #[test]
    fn test_or_mode_single_membership_check() {
        let f = request(&["TREE", "MOUNTAIN"], &["Sap Green", "Bright Red"], &[], Some("OR"))
            .normalize();
        let q = compile(&f);
        assert_eq!(q.sql.matches("EXISTS (SELECT 1 FROM episode_subjects").count(), 1);
        assert_eq!(q.sql.matches("EXISTS (SELECT 1 FROM episode_colors").count(), 1);
        assert!(q.sql.contains("UPPER(s.name) IN (?, ?)"));
        assert!(q.sql.contains("c.name IN (?, ?)"));
        assert_eq!(q.params.len(), 4);
    }

    #[test]
    fn test_month_conjoined_regardless_of_mode() {
        let f = request(&["TREE"], &[], &["1", "2"], Some("OR")).normalize();
        let q = compile(&f);
        assert!(q.sql.contains("CAST(strftime('%m', e.air_date) AS INTEGER) IN (?, ?)"));
        assert!(q.sql.contains("\n  AND EXISTS"));
        assert_eq!(q.params[0], SqlParam::Int(1));
        assert_eq!(q.params[1], SqlParam::Int(2));
        assert_eq!(q.params[2], SqlParam::Text("TREE".into()));
    }

    #[test]
    fn test_placeholder_count_matches_params() {
        let f = request(&["A", "B", "C"], &["X", "Y"], &["3", "4", "5"], None).normalize();
        let q = compile(&f);
        assert_eq!(q.sql.matches('?').count(), q.params.len());
    }

    #[test]
    fn test_echo_serialization() {
        let f = request(&["tree"], &[], &["7"], Some("or")).normalize();
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["subjects"][0], "TREE");
        assert_eq!(json["months"][0], 7);
        assert_eq!(json["filter_type"], "OR");
    }
}
