//! Config validation: unknown-key detection with Levenshtein suggestions
//! and range checks on parsed values.
//!
//! Unknown keys are found by parsing the raw TOML into a `toml::Value`,
//! walking the key tree and comparing against the known field paths. They
//! only ever produce warnings. Range problems are hard errors.

use std::collections::HashSet;

use super::DriftConfig;

/// A non-fatal config warning (typo, unknown section).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Every valid dotted key path of [`DriftConfig`].
///
/// Kept by hand in step with the section structs.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [training]
        "training",
        "training.test_fraction",
        "training.seed",
        "training.strategy",
        // [regression]
        "regression",
        // [regression.forest]
        "regression.forest",
        "regression.forest.n_trees",
        "regression.forest.max_depth",
        "regression.forest.min_samples_split",
        "regression.forest.min_samples_leaf",
        "regression.forest.max_features",
        "regression.forest.seed",
        // [regression.svr]
        "regression.svr",
        "regression.svr.c",
        "regression.svr.epsilon",
        "regression.svr.gamma",
        "regression.svr.tolerance",
        "regression.svr.max_passes",
        // [regression.mlp]
        "regression.mlp",
        "regression.mlp.hidden_layers",
        "regression.mlp.learning_rate",
        "regression.mlp.alpha",
        "regression.mlp.batch_size",
        "regression.mlp.max_iter",
        "regression.mlp.tolerance",
        "regression.mlp.n_iter_no_change",
        "regression.mlp.seed",
        // [trajectory]
        "trajectory",
        "trajectory.sample_count",
        // [severity]
        "severity",
        "severity.moderate_deg",
        "severity.high_deg",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively collect dotted key paths from a `toml::Value` tree.
///
/// `{ a = { b = 1, c = 2 } }` yields `["a", "a.b", "a.c"]`.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Closest known key within edit distance 3. Ties go to the
/// lexicographically smaller key so the suggestion is stable.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (levenshtein(unknown, k), k))
        .filter(|(dist, _)| *dist <= 3)
        .min()
        .map(|(_, k)| k.to_string())
}

/// Warnings for every key in `raw_toml` that [`DriftConfig`] does not know.
///
/// Unparseable input yields no warnings; serde reports the parse error.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(),
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Range Validation
// ============================================================================

/// Values the engine cannot run with. Empty when the config is usable.
pub fn range_errors(config: &DriftConfig) -> Vec<String> {
    let mut errors = Vec::new();

    let t = &config.training;
    if !(t.test_fraction > 0.0 && t.test_fraction < 1.0) {
        errors.push(format!(
            "training.test_fraction = {} must be strictly between 0 and 1",
            t.test_fraction
        ));
    }

    let f = &config.regression.forest;
    if f.n_trees == 0 {
        errors.push("regression.forest.n_trees must be at least 1".to_string());
    }
    if f.min_samples_leaf == 0 {
        errors.push("regression.forest.min_samples_leaf must be at least 1".to_string());
    }
    if f.min_samples_split < 2 {
        errors.push(format!(
            "regression.forest.min_samples_split = {} must be at least 2",
            f.min_samples_split
        ));
    }
    if f.max_depth == Some(0) {
        errors.push("regression.forest.max_depth must be at least 1 when set".to_string());
    }

    let s = &config.regression.svr;
    if !(s.c.is_finite() && s.c > 0.0) {
        errors.push(format!("regression.svr.c = {} must be > 0", s.c));
    }
    if !(s.epsilon.is_finite() && s.epsilon >= 0.0) {
        errors.push(format!("regression.svr.epsilon = {} cannot be negative", s.epsilon));
    }
    if let Some(gamma) = s.gamma {
        if !(gamma.is_finite() && gamma > 0.0) {
            errors.push(format!("regression.svr.gamma = {gamma} must be > 0"));
        }
    }
    if !(s.tolerance.is_finite() && s.tolerance > 0.0) {
        errors.push(format!("regression.svr.tolerance = {} must be > 0", s.tolerance));
    }
    if s.max_passes == 0 {
        errors.push("regression.svr.max_passes must be at least 1".to_string());
    }

    let m = &config.regression.mlp;
    if m.hidden_layers.iter().any(|&w| w == 0) {
        errors.push(format!(
            "regression.mlp.hidden_layers = {:?} must be non-zero",
            m.hidden_layers
        ));
    }
    if !(m.learning_rate.is_finite() && m.learning_rate > 0.0) {
        errors.push(format!(
            "regression.mlp.learning_rate = {} must be > 0",
            m.learning_rate
        ));
    }
    if !(m.alpha.is_finite() && m.alpha >= 0.0) {
        errors.push(format!("regression.mlp.alpha = {} cannot be negative", m.alpha));
    }
    if m.batch_size == 0 {
        errors.push("regression.mlp.batch_size must be at least 1".to_string());
    }
    if m.max_iter == 0 {
        errors.push("regression.mlp.max_iter must be at least 1".to_string());
    }
    if !(m.tolerance.is_finite() && m.tolerance >= 0.0) {
        errors.push(format!(
            "regression.mlp.tolerance = {} cannot be negative",
            m.tolerance
        ));
    }

    if config.trajectory.sample_count < 2 {
        errors.push(format!(
            "trajectory.sample_count = {} must be at least 2",
            config.trajectory.sample_count
        ));
    }

    let sev = &config.severity;
    if !(sev.moderate_deg.is_finite() && sev.high_deg.is_finite()) {
        errors.push("severity thresholds must be finite".to_string());
    } else if sev.moderate_deg < 0.0 || sev.moderate_deg >= sev.high_deg {
        errors.push(format!(
            "severity.moderate_deg = {} must be >= 0 and below severity.high_deg = {}",
            sev.moderate_deg, sev.high_deg
        ));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("seed", "seed"), 0);
        assert_eq!(levenshtein("seed", "sed"), 1);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("n_trees", "n_tress"), 2);
    }

    #[test]
    fn test_walk_toml_keys_nested() {
        let value: toml::Value = "[regression.forest]\nn_trees = 5\n".parse().expect("toml");
        let keys = walk_toml_keys(&value, "");
        assert_eq!(
            keys,
            vec!["regression", "regression.forest", "regression.forest.n_trees"]
        );
    }

    #[test]
    fn test_typo_key_produces_warning_with_suggestion() {
        let warnings = validate_unknown_keys("[severity]\nhigh_dge = 20.0\n");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "severity.high_dge");
        assert_eq!(warnings[0].suggestion.as_deref(), Some("severity.high_deg"));
        assert!(warnings[0].to_string().contains("did you mean 'severity.high_deg'"));
    }

    #[test]
    fn test_default_config_keys_are_all_known() {
        let text = DriftConfig::default().to_toml().expect("serialize");
        assert!(validate_unknown_keys(&text).is_empty());
    }

    #[test]
    fn test_garbage_section_has_no_suggestion() {
        let warnings = validate_unknown_keys("[zzzzzzzzzzzz]\nqqqqq = 1\n");
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.suggestion.is_none()));
    }

    #[test]
    fn test_range_errors_are_collected() {
        let mut config = DriftConfig::default();
        config.training.test_fraction = 1.0;
        config.trajectory.sample_count = 1;
        config.severity.moderate_deg = 20.0;
        config.regression.mlp.batch_size = 0;

        let errors = range_errors(&config);
        assert_eq!(errors.len(), 4, "{errors:?}");
        assert!(errors.iter().any(|e| e.starts_with("training.test_fraction")));
        assert!(errors.iter().any(|e| e.starts_with("severity.moderate_deg")));
    }
}
