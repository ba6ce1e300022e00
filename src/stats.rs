/// Running mean of per-attempt success probabilities for the session.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningStatistics {
    attempt_count: u32,
    cumulative_probability: f64,
}

impl RunningStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, probability: f64) {
        self.attempt_count += 1;
        self.cumulative_probability += probability;
    }

    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    pub fn cumulative_probability(&self) -> f64 {
        self.cumulative_probability
    }

    /// `None` until the first attempt has been recorded
    pub fn current_mean(&self) -> Option<f64> {
        match self.attempt_count {
            0 => None,
            n => Some(self.cumulative_probability / n as f64),
        }
    }
}

/// End-of-session overview, printed after the terminal is restored.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub attempts: usize,
    /// attempts with a non-zero chance
    pub landed: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub best: f64,
}

impl SessionSummary {
    pub fn from_probabilities(probabilities: &[f64]) -> Option<Self> {
        if probabilities.is_empty() {
            return None;
        }
        let n = probabilities.len() as f64;
        let mean = probabilities.iter().sum::<f64>() / n;
        let variance = probabilities
            .iter()
            .map(|p| {
                let diff = mean - p;
                diff * diff
            })
            .sum::<f64>()
            / n;

        Some(Self {
            attempts: probabilities.len(),
            landed: probabilities.iter().filter(|p| **p > 0.0).count(),
            mean,
            std_dev: variance.sqrt(),
            best: probabilities.iter().copied().fold(0.0, f64::max),
        })
    }
}

impl std::fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Attempts: {} ({} with a chance to land)", self.attempts, self.landed)?;
        writeln!(f, "Average success chance: {:.2}%", self.mean * 100.0)?;
        writeln!(f, "Best attempt: {:.2}%", self.best * 100.0)?;
        write!(f, "Std dev: {:.2}%", self.std_dev * 100.0)
    }
}
