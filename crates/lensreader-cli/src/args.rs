//! Command-line and environment configuration.

use std::convert::Infallible;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use lensreader_core::constants::DEFAULT_ENDPOINT_URL;
use lensreader_hardware::{LedConfig, Rgb};
use lensreader_network::NotificationConfig;
use lensreader_session::SessionConfig;

/// Lens reader - announces tag taps and drives the LED indicator
#[derive(Parser, Debug)]
#[command(name = "lensreader", author, version, about, long_about = None)]
pub struct Args {
    /// Tap notification endpoint
    #[arg(long, env = "XOS_URL", default_value = DEFAULT_ENDPOINT_URL)]
    pub endpoint_url: String,

    /// API token sent as `Authorization: Token <token>`
    #[arg(long, env = "AUTH_TOKEN", default_value = "", hide_env_values = true)]
    pub auth_token: String,

    /// Label sent with every tap
    #[arg(long, env = "LABEL")]
    pub label: Option<String>,

    /// Seconds without a read before the tag counts as lifted
    #[arg(long, env = "TAP_OFF_TIMEOUT", default_value_t = 0.5)]
    pub tap_off_timeout: f64,

    /// Notification request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT", default_value_t = 10.0)]
    pub request_timeout: f64,

    /// Reader name (defaults to nfc-<last IP octet>)
    #[arg(long, env = "DEVICE_NAME")]
    pub device_name: Option<String>,

    /// Reader model reported with every tap
    #[arg(long, env = "READER_MODEL")]
    pub reader_model: Option<String>,

    /// Interface whose MAC address identifies the reader
    #[arg(long, env = "NETWORK_INTERFACE")]
    pub network_interface: Option<String>,

    /// Resting LED color as r,g,b
    #[arg(long, env = "LEDS_COLOR_DEFAULT", default_value = "130,127,127")]
    pub color_default: Rgb,

    /// Tap-on LED color as r,g,b
    #[arg(long, env = "LEDS_COLOUR_SUCCESS", default_value = "0,255,0")]
    pub color_success: Rgb,

    /// Failure LED color as r,g,b
    #[arg(long, env = "LEDS_COLOUR_FAILED", default_value = "255,0,0")]
    pub color_failed: Rgb,

    /// LED brightness between 0 and 1
    #[arg(long, env = "LEDS_DEFAULT_BRIGHTNESS", default_value_t = 1.0)]
    pub brightness: f32,

    /// Shell command that runs the tag reader; stdin is read when absent
    #[arg(long, env = "READER_CMD")]
    pub reader_cmd: Option<String>,

    /// Working directory for the reader command
    #[arg(long, env = "READER_DIR")]
    pub reader_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Shorthand for --log-level debug; DEBUG is on only when set to "true"
    #[arg(long, env = "DEBUG", value_parser = parse_debug)]
    pub debug: bool,
}

impl Args {
    /// Effective log level.
    pub fn log_level(&self) -> &str {
        if self.debug { "debug" } else { &self.log_level }
    }

    /// LED colors and brightness.
    pub fn led_config(&self) -> Result<LedConfig> {
        let config = LedConfig::default()
            .default_color(self.color_default)
            .success_color(self.color_success)
            .failure_color(self.color_failed)
            .brightness(self.brightness);

        config.validate().context("invalid LED configuration")?;
        Ok(config)
    }

    /// Endpoint, credentials and request timeout.
    pub fn notification_config(&self) -> Result<NotificationConfig> {
        let timeout = seconds(self.request_timeout, "request timeout")?;

        Ok(NotificationConfig::new(&self.endpoint_url)
            .auth_token(&self.auth_token)
            .label(self.label.clone().filter(|label| !label.is_empty()))
            .timeout(timeout))
    }

    /// Debounce timeout.
    pub fn session_config(&self) -> Result<SessionConfig> {
        let timeout = seconds(self.tap_off_timeout, "tap-off timeout")?;
        let config = SessionConfig::default().tap_off_timeout(timeout);

        config.validate().context("invalid session configuration")?;
        Ok(config)
    }
}

/// Any casing of "true" enables debug; every other value disables it.
fn parse_debug(value: &str) -> Result<bool, Infallible> {
    Ok(value.trim().eq_ignore_ascii_case("true"))
}

fn seconds(value: f64, what: &str) -> Result<Duration> {
    Duration::try_from_secs_f64(value).with_context(|| format!("invalid {what}: {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["lensreader"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_colors_parse_from_flags() {
        let args = parse(&[
            "--color-default",
            "1,2,3",
            "--color-success",
            "0, 128, 0",
        ]);
        let config = args.led_config().unwrap();

        assert_eq!(config.default_color, Rgb::new(1, 2, 3));
        assert_eq!(config.success_color, Rgb::new(0, 128, 0));
    }

    #[test]
    fn test_invalid_color_is_rejected() {
        let result = Args::try_parse_from(["lensreader", "--color-default", "300,0,0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_timeouts_in_seconds() {
        let args = parse(&["--tap-off-timeout", "0.25", "--request-timeout", "3"]);

        assert_eq!(
            args.session_config().unwrap().tap_off_timeout,
            Duration::from_millis(250)
        );
        assert_eq!(
            args.notification_config().unwrap().timeout,
            Duration::from_secs(3)
        );
    }

    #[rstest]
    #[case("-1")]
    #[case("0")]
    fn test_bad_tap_off_timeout(#[case] value: &str) {
        let flag = format!("--tap-off-timeout={value}");
        let args = parse(&[flag.as_str()]);
        assert!(args.session_config().is_err());
    }

    #[test]
    fn test_out_of_range_brightness() {
        let args = parse(&["--brightness", "1.5"]);
        assert!(args.led_config().is_err());
    }

    #[test]
    fn test_empty_label_is_omitted() {
        let args = parse(&["--label", ""]);
        assert_eq!(args.notification_config().unwrap().label, None);
    }

    #[rstest]
    #[case("true", true)]
    #[case("True", true)]
    #[case(" TRUE ", true)]
    #[case("1", false)]
    #[case("no", false)]
    #[case("", false)]
    fn test_debug_env_values(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(parse_debug(value), Ok(expected));
    }

    #[test]
    fn test_debug_overrides_log_level() {
        let args = parse(&["--log-level", "warn", "--debug"]);
        assert_eq!(args.log_level(), "debug");
    }
}
