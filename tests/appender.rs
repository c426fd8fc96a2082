//! Integration tests for the appender: formatting through to the transport.

use reqwest::StatusCode;
use slack_appender::config::SlackConfig;
use slack_appender::notification::DeliveryError;
use slack_appender::{Level, LogEvent, Notifier, SlackAppender};

mod helpers;
use helpers::mock_transport::MockTransport;

const ENDPOINT: &str = "https://hooks.slack.com/services/T0000/B0000/XXXXXXXX";

fn appender_with(
    configure: impl FnOnce(&mut SlackConfig),
) -> (SlackAppender<MockTransport>, MockTransport) {
    let mut config = SlackConfig::default();
    config.set_endpoint(ENDPOINT).unwrap();
    configure(&mut config);
    let transport = MockTransport::new();
    (SlackAppender::with_transport(config, transport.clone()), transport)
}

#[test]
fn test_error_event_with_default_config() {
    let (appender, transport) = appender_with(|_| {});

    let sent = appender
        .notify(&LogEvent::new(Level::Error, "Test", "hello"))
        .unwrap();

    assert!(sent);
    assert_eq!(transport.get_urls(), vec![ENDPOINT.to_string()]);
    let payload = &transport.get_posted()[0];
    assert_eq!(payload["text"], "*ERROR* _( Logger: *Test* )_: hello");
    assert_eq!(payload["icon_emoji"], ":goberserk:");
    assert_eq!(payload["channel"], "#general");
    assert_eq!(payload["username"], "Robot");
    assert_eq!(payload["mrkdwn"], true);

    let attachment = &payload["attachments"][0];
    assert_eq!(attachment["author_name"], "Full Error Message");
    assert_eq!(attachment["author_icon"], ":ghost:");
    assert_eq!(attachment["color"], "#EF6C00");
    assert_eq!(attachment["text"], "hello");
    let footer = attachment["footer"].as_str().unwrap();
    assert!(footer.starts_with("Logger: *Test* | Date: *"));
    assert!(footer.ends_with('*'));
    // "Logger: *Test* | Date: *" + "YYYY-MM-DD HH:MM:SS" + "*"
    assert_eq!(footer.len(), "Logger: *Test* | Date: *".len() + 19 + 1);
}

#[test]
fn test_error_event_without_markdown() {
    let (appender, transport) = appender_with(|c| c.set_allow_markdown(false));

    appender
        .notify(&LogEvent::new(Level::Error, "Test", "hello"))
        .unwrap();

    let payload = &transport.get_posted()[0];
    assert_eq!(payload["text"], "ERROR ( Logger: Test ): hello");
    assert_eq!(payload["mrkdwn"], false);
}

#[test]
fn test_every_level_gets_its_color_and_icon() {
    let (appender, transport) = appender_with(|_| {});
    let expected = [
        (Level::Trace, "#BDBDBD", ":squirrel:"),
        (Level::Debug, "#BDBDBD", ":suspect:"),
        (Level::Info, "#64B5F6", ":suspect:"),
        (Level::Warn, "#FFA726", ":feelsgood:"),
        (Level::Error, "#EF6C00", ":goberserk:"),
        (Level::Fatal, "#D84315", ":rage:"),
    ];

    for (level, _, _) in expected {
        appender.notify(&LogEvent::new(level, "app", "msg")).unwrap();
    }

    let posted = transport.get_posted();
    assert_eq!(posted.len(), expected.len());
    for (payload, (level, color, icon)) in posted.iter().zip(expected) {
        assert_eq!(payload["attachments"][0]["color"], color, "color for {}", level);
        assert_eq!(payload["icon_emoji"], icon, "icon for {}", level);
    }
}

#[test]
fn test_static_icon_url() {
    let (appender, transport) = appender_with(|c| {
        c.set_icon_by_level(false);
        c.set_icon("https://example.com/robot.png").unwrap();
    });

    appender
        .notify(&LogEvent::new(Level::Fatal, "app", "down"))
        .unwrap();

    let payload = &transport.get_posted()[0];
    assert_eq!(payload["icon_url"], "https://example.com/robot.png");
    assert!(payload.get("icon_emoji").is_none());
}

#[test]
fn test_long_message_is_truncated_in_title_only() {
    let (appender, transport) = appender_with(|c| c.set_max_message_length(5));
    let message = "0123456789";

    appender
        .notify(&LogEvent::new(Level::Info, "app", message))
        .unwrap();

    let payload = &transport.get_posted()[0];
    assert_eq!(payload["text"], "*INFO* _( Logger: *app* )_: 01234");
    assert_eq!(payload["attachments"][0]["text"], message);
}

#[test]
fn test_without_attachment() {
    let (appender, transport) = appender_with(|c| c.set_as_attachment(false));

    appender
        .notify(&LogEvent::new(Level::Warn, "app", "careful"))
        .unwrap();

    assert!(transport.get_posted()[0].get("attachments").is_none());
}

#[test]
fn test_link_and_unfurl_flags_are_sent() {
    let (appender, transport) = appender_with(|c| {
        c.set_link_names(true);
        c.set_unfurl_links(true);
        c.set_unfurl_media(false);
    });

    appender
        .notify(&LogEvent::new(Level::Warn, "app", "@channel look"))
        .unwrap();

    let payload = &transport.get_posted()[0];
    assert_eq!(payload["link_names"], true);
    assert_eq!(payload["unfurl_links"], true);
    assert_eq!(payload["unfurl_media"], false);
}

#[test]
fn test_transport_failure_returns_false() {
    let (appender, transport) = appender_with(|_| {});
    transport.fail_next(DeliveryError::Status {
        status: StatusCode::SERVICE_UNAVAILABLE,
        body: "try later".to_string(),
    });

    let result = appender.notify(&LogEvent::new(Level::Error, "app", "boom"));

    assert!(matches!(result, Ok(false)));
    assert!(transport.get_posted().is_empty());
}

#[test]
fn test_other_failures_propagate() {
    let transport = MockTransport::new();
    let appender = SlackAppender::with_transport(SlackConfig::default(), transport.clone());

    let result = appender.notify(&LogEvent::new(Level::Error, "app", "boom"));

    assert!(matches!(result, Err(DeliveryError::MissingEndpoint)));
}
