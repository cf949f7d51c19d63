//! End-to-end exercises of the Tektronix TBS2000B driver against the
//! stand-in and simulated adapters.

use std::sync::Arc;

use labflow_core::error::Error;
use labflow_core::types::Value;

use labflow_instruments::adapter::{AdapterOptions, SharedAdapter};
use labflow_instruments::adapters::{MockAdapter, SimAdapter};
use labflow_instruments::channel::ChannelId;
use labflow_instruments::drivers::Tbs2000b;
use labflow_instruments::instrument::Instrument;

const BENCH_IDN: &str = "TEKTRONIX,TBS2204B,C012345,CF:91.1CT FV:1.04";

fn bench_adapter() -> Arc<MockAdapter> {
    Arc::new(MockAdapter::with_identification(BENCH_IDN))
}

#[tokio::test]
async fn test_channel_count_follows_the_model_number() {
    let adapter = bench_adapter();
    let scope = Tbs2000b::connect(adapter, None).await.unwrap();

    let channels = scope.channels();
    assert_eq!(channels.len(), 4);
    let ids: Vec<String> = channels.iter().map(|c| c.id().to_string()).collect();
    assert_eq!(ids, vec!["1", "2", "3", "4"]);

    let info = scope.info();
    assert_eq!(info.manufacturer.as_deref(), Some("TEKTRONIX"));
    assert_eq!(info.model.as_deref(), Some("TBS2204B"));
    assert_eq!(info.scpi, Some(true));
}

#[tokio::test]
async fn test_malformed_identification_aborts_connection() {
    let adapter: SharedAdapter = Arc::new(MockAdapter::with_identification("GARBLED"));
    let err = Tbs2000b::connect(adapter, None).await.unwrap_err();
    assert!(matches!(err, Error::Construction(_)));
}

#[tokio::test]
async fn test_reset_and_auto_setup_send_the_expected_commands() {
    let adapter = bench_adapter();
    let scope = Tbs2000b::connect(adapter.clone(), None).await.unwrap();

    scope.reset().await.unwrap();
    scope.auto_setup().await.unwrap();

    let commands = adapter.commands();
    assert!(commands.contains(&"*RST".to_string()));
    assert!(commands.contains(&"AUTOS EXEC;".to_string()));
}

#[tokio::test]
async fn test_channel_scale_write_targets_the_right_channel() {
    let adapter = bench_adapter();
    let scope = Tbs2000b::connect(adapter.clone(), None).await.unwrap();

    let channel = scope.channel(&ChannelId::from(3)).unwrap();
    channel
        .write_property("scale", Value::Integer(2))
        .await
        .unwrap();

    assert!(adapter.commands().contains(&"CH3:SCAle 2".to_string()));
}

#[tokio::test]
async fn test_invalid_coupling_is_rejected_before_anything_is_sent() {
    let adapter = bench_adapter();
    let scope = Tbs2000b::connect(adapter.clone(), None).await.unwrap();
    let sent_before = adapter.commands().len();

    let channel = scope.channel(&ChannelId::from(1)).unwrap();
    let err = channel
        .write_property("coupling", Value::from("XX"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(adapter.commands().len(), sent_before);
}

#[tokio::test]
async fn test_simulated_adapter_round_trip() {
    let options = AdapterOptions::new().with_option("idn", BENCH_IDN);
    let adapter: SharedAdapter = Arc::new(SimAdapter::open("SIM::INSTR", options).unwrap());
    let scope = Tbs2000b::connect(adapter, None).await.unwrap();

    let channel = scope.channel(&ChannelId::from(2)).unwrap();
    channel
        .write_property("coupling", Value::from("AC"))
        .await
        .unwrap();
    assert_eq!(
        channel.read_property("coupling").await.unwrap(),
        Value::from("AC")
    );
}

#[tokio::test]
async fn test_custom_name_reads_back() {
    let adapter = bench_adapter();
    let scope = Tbs2000b::connect(adapter, Some("bench scope".to_string()))
        .await
        .unwrap();
    assert_eq!(scope.name(), "bench scope");
}
