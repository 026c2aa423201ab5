//! Progress reporting for long sweeps
//!
//! A shared counter rendered as a bar on stderr. The counter sits behind a
//! mutex so parallel workers report through one line.

use std::io::Write;
use tokio::sync::Mutex;

const BAR_WIDTH: usize = 40;

/// Shared progress counter
#[derive(Debug)]
pub struct Progress {
    label: &'static str,
    total: usize,
    completed: Mutex<usize>,
}

impl Progress {
    pub fn new(label: &'static str, total: usize) -> Self {
        Self {
            label,
            total,
            completed: Mutex::new(0),
        }
    }

    /// Mark one unit complete and redraw; returns the completed count
    pub async fn tick(&self) -> usize {
        let mut completed = self.completed.lock().await;
        *completed += 1;
        self.render(*completed);
        *completed
    }

    fn render(&self, completed: usize) {
        if self.total == 0 {
            return;
        }
        let filled = BAR_WIDTH * completed / self.total;
        let bar: String = "█".repeat(filled) + &"-".repeat(BAR_WIDTH - filled);
        let percent = 100.0 * completed as f64 / self.total as f64;
        let mut stderr = std::io::stderr();
        let _ = write!(stderr, "\r{} |{}| {:.1}%", self.label, bar, percent);
        if completed == self.total {
            let _ = writeln!(stderr);
        }
        let _ = stderr.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_tick_counts_up() {
        let progress = Progress::new("Testing", 3);
        assert_eq!(progress.tick().await, 1);
        assert_eq!(progress.tick().await, 2);
        assert_eq!(progress.tick().await, 3);
    }

    #[tokio::test]
    async fn test_concurrent_ticks_never_lose_counts() {
        let progress = Arc::new(Progress::new("Testing", 50));
        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..50 {
            let progress = Arc::clone(&progress);
            tasks.spawn(async move { progress.tick().await });
        }
        let mut seen = Vec::new();
        while let Some(n) = tasks.join_next().await {
            seen.push(n.unwrap());
        }
        seen.sort_unstable();
        assert_eq!(seen, (1..=50).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_zero_total_does_not_panic() {
        let progress = Progress::new("Testing", 0);
        progress.tick().await;
    }
}
