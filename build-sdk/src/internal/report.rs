//! Termination footer for a finished output stream.

use std::time::Duration;

/// The final status message. Cancellation wins over elapsed-time reporting.
pub fn termination_message(killed: bool, elapsed: Duration) -> String {
    if killed {
        "Cancelled".to_string()
    } else {
        format!("Finished in {:.1}s", elapsed.as_secs_f64())
    }
}

/// The footer as appended to the output stream, after the last data chunk.
pub fn footer(killed: bool, elapsed: Duration) -> String {
    format!("\n[{}]", termination_message(killed, elapsed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_footer() {
        assert_eq!(footer(true, Duration::from_secs(3)), "\n[Cancelled]");
    }

    #[test]
    fn test_finished_footer_has_one_fractional_digit() {
        assert_eq!(footer(false, Duration::ZERO), "\n[Finished in 0.0s]");
        assert_eq!(
            footer(false, Duration::from_millis(1260)),
            "\n[Finished in 1.3s]"
        );
        assert_eq!(
            footer(false, Duration::from_secs(62)),
            "\n[Finished in 62.0s]"
        );
    }
}
