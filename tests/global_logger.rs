//! Installs the appender as the process-wide `log` backend.
//!
//! Lives in its own test binary because a logger can only be set once.

use log::LevelFilter;
use slack_appender::config::SlackConfig;
use slack_appender::SlackAppender;

mod helpers;
use helpers::mock_transport::MockTransport;

#[test]
fn test_log_macros_reach_the_webhook() {
    let mut config = SlackConfig::default();
    config
        .set_endpoint("https://hooks.slack.com/services/T/B/X")
        .unwrap();
    config.set_add_logger_name_to_message(false);
    let transport = MockTransport::new();

    SlackAppender::with_transport(config, transport.clone())
        .with_level(LevelFilter::Info)
        .init()
        .unwrap();

    assert_eq!(log::max_level(), LevelFilter::Info);

    log::debug!(target: "billing", "below the threshold");
    log::info!(target: "billing", "invoice {} paid", 42);
    log::error!(target: "reqwest::connect", "connection reset");
    log::warn!(target: "slack_appender", "internal");

    let posted = transport.get_posted();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0]["text"], "*INFO* _( Logger: *billing* )_: invoice 42 paid");
    assert_eq!(posted[0]["attachments"][0]["author_name"], "Full Info Message");
}
