use m2i_telemetry::{metrics, record_message_received, record_write_latency_ms};

#[test]
fn counters_accumulate() {
    let before = metrics().snapshot();
    record_message_received();
    record_write_latency_ms(12);
    let after = metrics().snapshot();
    assert!(after.messages_received > before.messages_received);
    assert!(after.write_latency_ms_total >= before.write_latency_ms_total + 12);
    assert!(after.write_latency_ms_count > before.write_latency_ms_count);
}
