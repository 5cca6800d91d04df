use crate::domain::RunStatus;

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const TESTS_FAILED: u8 = 1;
    pub const NOTHING_RAN: u8 = 2;
    pub const ENGINE_UNAVAILABLE: u8 = 3;
    /// Unreadable manifest, bad arguments, missing project directory
    pub const SETUP_ERROR: u8 = 255;
}

/// Pass/fail counts of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub failed: usize,
}

impl Summary {
    pub fn new(statuses: &[RunStatus]) -> Self {
        Self {
            total: statuses.len(),
            failed: statuses.iter().filter(|s| !s.is_success()).count(),
        }
    }

    pub fn passed(&self) -> usize {
        self.total - self.failed
    }

    pub fn exit_code(&self) -> u8 {
        if self.total == 0 {
            ExitCodes::NOTHING_RAN
        } else if self.failed > 0 {
            ExitCodes::TESTS_FAILED
        } else {
            ExitCodes::SUCCESS
        }
    }

    pub fn message(&self) -> String {
        if self.total == 0 {
            "No containers finished".to_string()
        } else if self.failed == 0 {
            format!("{} container(s) passed", self.total)
        } else {
            format!(
                "{} out of {} container(s) passed",
                self.passed(),
                self.total
            )
        }
    }

    /// Prints the final banner and returns the exit code
    pub fn report(&self) -> u8 {
        if self.failed > 0 {
            eprintln!("\n{}\n", self.message());
        } else {
            println!("\n{}\n", self.message());
        }
        self.exit_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_passed() {
        let summary = Summary::new(&[RunStatus::Passed, RunStatus::Passed]);
        assert_eq!(summary.exit_code(), ExitCodes::SUCCESS);
        assert_eq!(summary.message(), "2 container(s) passed");
    }

    #[test]
    fn test_some_failed() {
        let summary = Summary::new(&[RunStatus::Passed, RunStatus::Failed]);
        assert_eq!(summary.exit_code(), ExitCodes::TESTS_FAILED);
        assert_eq!(summary.passed(), 1);
        assert_eq!(summary.message(), "1 out of 2 container(s) passed");
    }

    #[test]
    fn test_nothing_ran() {
        let summary = Summary::new(&[]);
        assert_eq!(summary.exit_code(), ExitCodes::NOTHING_RAN);
        assert_eq!(summary.message(), "No containers finished");
    }

    #[test]
    fn test_codes_are_distinct() {
        let codes = [
            ExitCodes::SUCCESS,
            ExitCodes::TESTS_FAILED,
            ExitCodes::NOTHING_RAN,
            ExitCodes::ENGINE_UNAVAILABLE,
            ExitCodes::SETUP_ERROR,
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
