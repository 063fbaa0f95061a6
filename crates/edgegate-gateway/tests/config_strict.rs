#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use edgegate_gateway::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
gateway:
  listen: "0.0.0.0:8080"
flow:
  enabeld: true # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config_uses_defaults() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.gateway.control_addr, "127.0.0.1:10088");
    assert_eq!(cfg.gateway.report_interval_ms, 10_000);
    assert_eq!(cfg.limits.max_frame_bytes, 10_240);
    assert!(!cfg.flow.enabled);
    assert!(!cfg.gateway.tcp_only);
}

#[test]
fn full_config_parses() {
    let ok = r#"
version: 1
gateway:
  listen: "127.0.0.1:9000"
  tcp_listen: "127.0.0.1:9001"
  control_addr: "10.1.0.5:10088"
  local_hostname: "edge-1"
  tcp_only: true
  socket_dir: "/run/edgegate"
  pid_file: "/run/edgegate/pid"
  report_interval_ms: 5000
flow:
  enabled: true
  queue_limit: 8
limits:
  max_frame_bytes: 65536
  outbound_queue: 256
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.gateway.tcp_listen.as_deref(), Some("127.0.0.1:9001"));
    assert_eq!(cfg.gateway.local_hostname, "edge-1");
    assert!(cfg.flow.enabled);
    assert_eq!(cfg.flow.queue_limit, 8);
    assert_eq!(
        cfg.gateway.local_socket_path(77),
        std::path::PathBuf::from("/run/edgegate/adapter_77.sock")
    );
}

#[test]
fn wrong_version_rejected() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.code().as_str(), "BAD_REQUEST");
}

#[test]
fn out_of_range_values_rejected() {
    for bad in [
        "version: 1\ngateway:\n  report_interval_ms: 10\n",
        "version: 1\nflow:\n  queue_limit: 0\n",
        "version: 1\nlimits:\n  max_frame_bytes: 16\n",
        "version: 1\nlimits:\n  outbound_queue: 0\n",
        "version: 1\ngateway:\n  control_addr: \"\"\n",
    ] {
        assert!(config::load_from_str(bad).is_err(), "accepted: {bad}");
    }
}
