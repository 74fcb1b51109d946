use core::fmt::Write;

use heapless::{String, Vec};

use crate::orientation::ClassificationConfig;

// Five numbers, each fits in 48 bytes even for extreme f32 values
pub type ConfigMessage = String<256>;

/// Sampling interval, stable sample count and the X/Y/Z thresholds, one per
/// line. The axis maxima are not sent.
pub fn encode_config_message(config: &ClassificationConfig) -> ConfigMessage {
    let mut message = ConfigMessage::new();
    // can't overflow, see the capacity of ConfigMessage
    let written = write!(
        message,
        "{}\n{}\n{}\n{}\n{}\n",
        config.sampling_interval_ms,
        config.stable_sample_count,
        config.threshold_x,
        config.threshold_y,
        config.threshold_z,
    );
    debug_assert!(written.is_ok());
    message
}

/// Collects the five numeric fields of the config message from any number of
/// lines.
///
/// Tokens that aren't numbers are skipped, so stray handshake lines arriving
/// before the config don't break it. Counts are clamped to be non negative and
/// a decimal count is truncated.
#[derive(Debug, Default)]
pub struct ConfigMessageParser {
    sampling_interval_ms: Option<u32>,
    stable_sample_count: Option<u32>,
    thresholds: Vec<f32, 3>,
}

impl ConfigMessageParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the config once all fields have been seen. Extra tokens on the
    /// final line are ignored.
    pub fn feed_line(&mut self, line: &str) -> Option<ClassificationConfig> {
        let tokens = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty());
        for token in tokens {
            if self.thresholds.is_full() {
                break;
            }
            self.feed_token(token);
        }
        self.finish()
    }

    fn feed_token(&mut self, token: &str) {
        let accepted = if self.sampling_interval_ms.is_none() {
            self.sampling_interval_ms = parse_count(token);
            self.sampling_interval_ms.is_some()
        } else if self.stable_sample_count.is_none() {
            self.stable_sample_count = parse_count(token);
            self.stable_sample_count.is_some()
        } else {
            match token.parse::<f32>() {
                Ok(threshold) => self.thresholds.push(threshold).is_ok(),
                Err(_) => false,
            }
        };

        if !accepted {
            log_warn!("skipping non numeric config token");
        }
    }

    fn finish(&self) -> Option<ClassificationConfig> {
        match (
            self.sampling_interval_ms,
            self.stable_sample_count,
            self.thresholds.as_slice(),
        ) {
            (Some(sampling_interval_ms), Some(stable_sample_count), &[x, y, z]) => Some(
                ClassificationConfig::new(sampling_interval_ms, stable_sample_count, x, y, z),
            ),
            _ => None,
        }
    }
}

fn parse_count(token: &str) -> Option<u32> {
    if let Ok(count) = token.parse::<i64>() {
        return Some(count.clamp(0, u32::MAX as i64) as u32);
    }
    token
        .parse::<f32>()
        .ok()
        .filter(|count| count.is_finite())
        // float to int casts saturate, negatives become 0
        .map(|count| count as u32)
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse_lines(lines: &[&str]) -> Option<ClassificationConfig> {
        let mut parser = ConfigMessageParser::new();
        let mut config = None;
        for line in lines {
            config = parser.feed_line(line);
        }
        config
    }

    #[test]
    fn parses_encoded_message() {
        let config = ClassificationConfig::new(35, 4, 0.8, 0.85, 0.7);
        let message = encode_config_message(&config);
        assert_eq!(message.as_str(), "35\n4\n0.8\n0.85\n0.7\n");

        let lines: std::vec::Vec<&str> = message.lines().collect();
        assert_eq!(parse_lines(&lines), Some(config));
    }

    #[test]
    fn longest_values_fit() {
        let tiny = -f32::from_bits(1);
        let config = ClassificationConfig::new(u32::MAX, u32::MAX, tiny, -f32::MAX, tiny);
        let message = encode_config_message(&config);
        assert!(message.ends_with('\n'));

        let lines: std::vec::Vec<&str> = message.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(parse_lines(&lines), Some(config));
    }

    #[test]
    fn completes_only_after_five_fields() {
        let mut parser = ConfigMessageParser::new();
        assert_eq!(parser.feed_line("20"), None);
        assert_eq!(parser.feed_line("10"), None);
        assert_eq!(parser.feed_line("0.9 0.9"), None);
        assert_eq!(
            parser.feed_line("0.75 99"),
            Some(ClassificationConfig::default())
        );
    }

    #[test]
    fn skips_handshake_noise() {
        let config = parse_lines(&[
            "Confirmation",
            "Connected",
            "20,10",
            "0.9",
            "junk",
            "0.9",
            "0.75",
        ]);
        assert_eq!(config, Some(ClassificationConfig::default()));
    }

    #[test]
    fn clamps_and_truncates_counts() {
        let config = parse_lines(&["-5", "2.9", "1", "0.5", "-0.1"]).unwrap();
        assert_eq!(config.sampling_interval_ms, 0);
        assert_eq!(config.stable_sample_count, 2);
        assert_eq!(config.threshold_x, 1.0);
        assert_eq!(config.threshold_z, -0.1);
    }

    #[test]
    fn keeps_default_axis_maxima() {
        let config = parse_lines(&["20 10 0.9 0.9 0.75"]).unwrap();
        assert_eq!(config.axis_max_x, 1.0);
        assert_eq!(config.axis_max_y, 1.0);
        assert_eq!(config.axis_max_z, 1.0);
    }
}
