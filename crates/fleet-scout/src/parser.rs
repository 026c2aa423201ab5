//! Benchmark output parsing
//!
//! The all-reduce benchmark scripts print a preamble (timestamps, comments,
//! an mpirun echo) followed by result rows. This parser extracts the busbw
//! figure from the first plausible result row.
//!
//! A line is ignored when it is blank, starts with `#`, contains `UTC`,
//! starts with a weekday name (any case), or contains `mpi`. The first
//! remaining line with at least two whitespace-separated columns whose
//! second-to-last column is an unsigned decimal number is accepted, and
//! that column is the bandwidth in GB/s. Anything else yields `None`.

const WEEKDAYS: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

fn is_ignored(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return true;
    }
    if trimmed.contains("UTC") || trimmed.contains("mpi") {
        return true;
    }
    let lower = trimmed.to_lowercase();
    WEEKDAYS.iter().any(|day| lower.starts_with(day))
}

/// Whether a token is an unsigned decimal number: digits with at most one
/// dot, no sign, no exponent.
fn is_unsigned_decimal(token: &str) -> bool {
    !token.is_empty()
        && token.chars().all(|c| c.is_ascii_digit() || c == '.')
        && token.chars().filter(|c| *c == '.').count() <= 1
        && token.chars().any(|c| c.is_ascii_digit())
}

/// Extract the bandwidth figure from benchmark output
pub fn parse_bandwidth(output: &str) -> Option<f64> {
    for line in output.lines() {
        if is_ignored(line) {
            continue;
        }
        let columns: Vec<&str> = line.split_whitespace().collect();
        if columns.len() < 2 {
            continue;
        }
        let candidate = columns[columns.len() - 2];
        if is_unsigned_decimal(candidate) {
            return candidate.parse().ok();
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_result_row() {
        let output = "\
# nThread 1 nGpus 1 minBytes 8589934592\n\
Mon Mar  4 10:22:01 UTC 2024\n\
+ mpirun --allow-run-as-root -np 16 ...\n\
\n\
  8589934592     2147483648   float   sum    41290   208.0   390.1    0\n";
        assert_eq!(parse_bandwidth(output), Some(390.1));
    }

    #[test]
    fn test_skips_preamble_lines() {
        // Every preamble flavor: blank, comment, timestamp, weekday
        // prefix in mixed case, mpirun echo.
        let output = "\n# comment row 1 2\nTue something 3 4\n2024-03-04 09:00:00 UTC 5 6\nlaunching mpirun 7 8\n";
        assert_eq!(parse_bandwidth(output), None);
    }

    #[test]
    fn test_first_plausible_row_wins() {
        let output = "8589934592 100.5 0\n8589934592 999.9 0\n";
        assert_eq!(parse_bandwidth(output), Some(100.5));
    }

    #[test]
    fn test_rejects_signed_and_malformed_numbers() {
        assert_eq!(parse_bandwidth("a b -3.5 0\n"), None);
        assert_eq!(parse_bandwidth("a b 1.2.3 0\n"), None);
        assert_eq!(parse_bandwidth("a b 1e5 0\n"), None);
        assert_eq!(parse_bandwidth("a b . 0\n"), None);
    }

    #[test]
    fn test_accepts_integer_bandwidth() {
        assert_eq!(parse_bandwidth("size time 210 0\n"), Some(210.0));
    }

    #[test]
    fn test_short_rows_are_skipped() {
        assert_eq!(parse_bandwidth("justone\n"), None);
        assert_eq!(parse_bandwidth(""), None);
    }

    #[test]
    fn test_garbage_output_is_none() {
        let output = "error: NCCL failure on rank 3\nsegfault at 0x0\n";
        assert_eq!(parse_bandwidth(output), None);
    }
}
