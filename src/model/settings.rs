use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SolverSettings {
    /// Solve iterations before giving up; 0 disables the cap.
    #[serde(default = "default_max_solve_attempts")]
    pub max_solve_attempts: usize,
}

fn default_max_solve_attempts() -> usize {
    10
}

impl Default for SolverSettings {
    fn default() -> Self {
        SolverSettings {
            max_solve_attempts: default_max_solve_attempts(),
        }
    }
}

impl SolverSettings {
    pub fn with_max_solve_attempts(max_solve_attempts: usize) -> Self {
        Self { max_solve_attempts }
    }

    pub fn is_capped(&self) -> bool {
        self.max_solve_attempts > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let settings: SolverSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, SolverSettings::default());
        assert_eq!(settings.max_solve_attempts, 10);

        let settings: SolverSettings = serde_json::from_str(r#"{"max_solve_attempts": 3}"#).unwrap();
        assert_eq!(settings.max_solve_attempts, 3);
        assert!(!SolverSettings::with_max_solve_attempts(0).is_capped());
    }
}
