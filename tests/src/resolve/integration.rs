use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;
#[cfg(unix)]
use std::time::Instant;

use arping_common::config::Config;
use arping_common::error::ResolveError;
use arping_core::resolver::Resolver;
#[cfg(unix)]
use arping_core::tool::ArpingTool;
use pnet::datalink::MacAddr;

use crate::utils::{
    BrokenInterfaces, DeniedProber, IFF_BROADCAST, IFF_UP, Shared, StaticInterfaces, StubProber,
    StubTool, eth0, ni, v4,
};

const TARGET: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 50);

fn target_mac() -> MacAddr {
    MacAddr::new(0x00, 0x11, 0x22, 0x33, 0x44, 0x55)
}

fn config(retries: u32) -> Config {
    Config {
        retries,
        ..Config::default()
    }
}

#[tokio::test]
async fn succeeds_after_k_failures_without_fallback() {
    let prober = Arc::new(StubProber::failing_times(4, target_mac()));
    let resolver = Resolver::new(
        Shared(prober.clone()),
        StubTool::silent(),
        StaticInterfaces(vec![eth0()]),
        config(10),
    );

    let mac = resolver.resolve(TARGET).await.unwrap();

    assert_eq!(mac, target_mac());
    assert_eq!(prober.calls(), 5);
}

#[tokio::test]
async fn fallback_starts_after_exactly_n_attempts() {
    let prober = Arc::new(StubProber::always_failing());
    let tool = StubTool::answering(target_mac());
    let resolver = Resolver::new(
        Shared(prober.clone()),
        tool,
        StaticInterfaces(vec![eth0()]),
        config(7),
    );

    let mac = resolver.resolve(TARGET).await.unwrap();

    assert_eq!(mac, target_mac());
    assert_eq!(prober.calls(), 7);
}

#[tokio::test]
async fn fallback_uses_interface_owning_the_target_subnet() {
    let interfaces = vec![
        ni("eth1", 3, None, &[v4(192, 168, 1, 20, 24)], IFF_BROADCAST),
        ni("docker0", 4, None, &[v4(172, 17, 0, 1, 16)], IFF_UP | IFF_BROADCAST),
        eth0(),
    ];
    let resolver = Resolver::new(
        StubProber::always_failing(),
        StubTool::answering(target_mac()),
        StaticInterfaces(interfaces),
        Config::default(),
    );

    resolver.resolve(TARGET).await.unwrap();

    let seen = resolver.fallback().seen.lock().unwrap().clone();
    assert_eq!(seen, vec![(TARGET, "eth0".to_string(), Duration::from_secs(3))]);
}

#[tokio::test]
async fn no_usable_interface_skips_the_tool() {
    let resolver = Resolver::new(
        StubProber::always_failing(),
        StubTool::answering(target_mac()),
        StaticInterfaces(vec![ni("eth0", 2, None, &[v4(10, 0, 0, 2, 24)], IFF_UP)]),
        config(2),
    );

    let err = resolver.resolve(TARGET).await.unwrap_err();

    assert!(matches!(err, ResolveError::NoUsableInterface { ip, .. } if ip == TARGET));
    assert!(resolver.fallback().seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn broken_enumeration_is_no_usable_interface() {
    let resolver = Resolver::new(
        StubProber::always_failing(),
        StubTool::answering(target_mac()),
        BrokenInterfaces,
        config(1),
    );

    let err = resolver.resolve(TARGET).await.unwrap_err();

    assert!(matches!(err, ResolveError::NoUsableInterface { .. }));
}

#[tokio::test]
async fn failed_fallback_is_exhausted_with_total_attempts() {
    let resolver = Resolver::new(
        StubProber::always_failing(),
        StubTool::silent(),
        StaticInterfaces(vec![eth0()]),
        config(10),
    );

    let err = resolver.resolve(TARGET).await.unwrap_err();

    match &err {
        ResolveError::ResolutionExhausted { ip, attempts, source } => {
            assert_eq!(*ip, TARGET);
            assert_eq!(*attempts, 11);
            assert!(matches!(**source, ResolveError::ExternalToolParseFailure { .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("after 11 attempts"));
}

#[tokio::test]
async fn permission_denied_short_circuits_when_configured() {
    let resolver = Resolver::new(
        DeniedProber,
        StubTool::answering(target_mac()),
        StaticInterfaces(vec![eth0()]),
        Config {
            skip_retries_on_permission_denied: true,
            ..Config::default()
        },
    );

    let mac = resolver.resolve(TARGET).await.unwrap();

    assert_eq!(mac, target_mac());
}

#[tokio::test]
async fn probe_once_surfaces_the_native_failure() {
    let resolver = Resolver::new(
        DeniedProber,
        StubTool::answering(target_mac()),
        StaticInterfaces(vec![eth0()]),
        Config::default(),
    );

    let err = resolver.probe_once(TARGET).await.unwrap_err();

    match err {
        ResolveError::ProbeFailed { ip, source } => {
            assert_eq!(ip, TARGET);
            assert!(source.is_permission_denied());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

/*************************************************************
         External tool path, with `sh` standing in for arping
**************************************************************/

#[cfg(unix)]
fn fake_arping(script: &str) -> ArpingTool {
    // `sh -c <script> arping -f -I <iface> <ip>` exposes the target as $4.
    ArpingTool::new("sh").with_prefix_args(["-c", script, "arping"])
}

#[cfg(unix)]
#[tokio::test]
async fn end_to_end_resolves_through_external_tool() {
    let tool = fake_arping(
        r#"[ "$3" = eth0 ] && echo "Unicast reply from $4 [00:11:22:33:44:55]  0.791ms""#,
    );
    let resolver = Resolver::new(
        StubProber::always_failing(),
        tool,
        StaticInterfaces(vec![eth0()]),
        Config::default(),
    );

    let mac = resolver.resolve(TARGET).await.unwrap();

    assert_eq!(mac, target_mac());
}

#[cfg(unix)]
#[tokio::test]
async fn output_on_stderr_is_scanned_too() {
    let tool = fake_arping("echo 'reply from aa-bb-cc-dd-ee-ff' >&2");
    let resolver = Resolver::new(
        StubProber::always_failing(),
        tool,
        StaticInterfaces(vec![eth0()]),
        config(1),
    );

    let mac = resolver.resolve(TARGET).await.unwrap();

    assert_eq!(mac, MacAddr::new(0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff));
}

#[cfg(unix)]
#[tokio::test]
async fn tool_output_without_mac_is_a_parse_failure() {
    let tool = fake_arping(
        "echo 'Sent 1 probes (1 broadcast(s))'; echo 'Received 0 response(s)'; exit 1",
    );
    let resolver = Resolver::new(
        StubProber::always_failing(),
        tool,
        StaticInterfaces(vec![eth0()]),
        config(3),
    );

    let err = resolver.resolve(TARGET).await.unwrap_err();

    match err.root_cause() {
        ResolveError::ExternalToolParseFailure { command, .. } => {
            assert!(command.ends_with("-f -I eth0 192.168.1.50"));
        }
        other => panic!("unexpected root cause: {other:?}"),
    }
}

#[cfg(unix)]
#[tokio::test]
async fn hanging_tool_times_out_within_bound() {
    let tool = fake_arping("sleep 30");
    let resolver = Resolver::new(
        StubProber::always_failing(),
        tool,
        StaticInterfaces(vec![eth0()]),
        Config {
            retries: 2,
            tool_timeout: Duration::from_millis(300),
            ..Config::default()
        },
    );

    let start = Instant::now();
    let err = resolver.resolve(TARGET).await.unwrap_err();
    let elapsed = start.elapsed();

    assert!(err.is_timeout(), "expected a timeout, got {err:?}");
    match err.root_cause() {
        ResolveError::ExternalToolTimeout { timeout, .. } => {
            assert_eq!(*timeout, Duration::from_millis(300));
        }
        other => panic!("unexpected root cause: {other:?}"),
    }
    assert!(elapsed < Duration::from_secs(5), "resolve hung for {elapsed:?}");
}
