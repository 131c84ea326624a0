use hindsight_core::{Chain, Protocol, Resolution, SourceInfo};

#[test]
fn resolution_serde_uses_wire_tags() {
    assert_eq!(
        serde_json::to_string(&Resolution::Hour).unwrap(),
        "\"1h\""
    );
    assert_eq!(
        serde_json::from_str::<Resolution>("\"event\"").unwrap(),
        Resolution::Event
    );
}

#[test]
fn cache_key_is_stable_per_identity() {
    let info = SourceInfo::new(Chain::Arbitrum, Protocol::CamelotDex, Resolution::Hour);
    assert_eq!(info.cache_key(), "arbitrum:camelot-dex:1h");
    assert_eq!(info.source_id(), "camelot-dex");

    let named = SourceInfo {
        id: Some("camelot-weth".into()),
        ..info
    };
    assert_eq!(named.cache_key(), "arbitrum:camelot-dex:1h:camelot-weth");
    assert_eq!(named.source_id(), "camelot-weth");
}

#[test]
fn step_seconds_covers_event_series() {
    assert_eq!(Resolution::Minute.step_seconds(), 60);
    assert_eq!(Resolution::Hour.step_seconds(), 3_600);
    assert_eq!(Resolution::Day.step_seconds(), 86_400);
    assert_eq!(Resolution::Event.step_seconds(), 1);
    assert_eq!(Resolution::Event.period_seconds(), None);
}
