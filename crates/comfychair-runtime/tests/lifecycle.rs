//! End-to-end lifecycle tests against real worker processes.
//!
//! The worker is a small shell script that prints the readiness marker and
//! then sleeps, so these tests only run on unix.

#![cfg(unix)]

use std::fs;
use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use comfychair_core::ports::MockPortConfirmer;
use comfychair_core::{
    AcceptFallback, EnvironmentConfig, EnvironmentSupervisor, LaunchMode, LivenessProbe,
    PortConfirmer, ProcessState, ProcessTerminator, Readiness, StartOutcome, StopOutcome,
    SupervisorSettings,
};
use comfychair_runtime::liveness::PosixProbe;
use comfychair_runtime::pidfile::read_pid;
use comfychair_runtime::{SignalTerminator, StatusCache, Supervisor};
use tempfile::TempDir;

const WORKER_SCRIPT: &str = "echo \"Starting server on port $2\"\nexec sleep 30\n";

/// Ignored signals survive `exec`, so the sleeping worker shrugs off SIGTERM.
const STUBBORN_WORKER_SCRIPT: &str =
    "trap '' TERM\necho \"Starting server on port $2\"\nexec sleep 30\n";

/// Real probe that counts how often it is consulted.
#[derive(Default)]
struct CountingProbe(AtomicUsize);

impl LivenessProbe for CountingProbe {
    fn is_running(&self, pid: u32) -> bool {
        self.0.fetch_add(1, Ordering::SeqCst);
        PosixProbe.is_running(pid)
    }
}

fn settings() -> SupervisorSettings {
    SupervisorSettings {
        ready_timeout_ms: 10_000,
        poll_interval_ms: 25,
        stop_timeout_ms: 5_000,
        kill_grace_ms: 1_000,
        restart_grace_ms: 50,
        ..SupervisorSettings::default()
    }
}

fn worker_env(dir: &TempDir, port: u16) -> EnvironmentConfig {
    worker_env_with(dir, port, WORKER_SCRIPT)
}

fn worker_env_with(dir: &TempDir, port: u16, body: &str) -> EnvironmentConfig {
    let script = dir.path().join("worker.sh");
    fs::write(&script, body).unwrap();

    // `sh` is run by name with the script as an argument, so the script
    // itself never needs an execute bit.
    let mut env = EnvironmentConfig::new("lounge", PathBuf::from("sh"));
    env.args = vec![script.to_string_lossy().into_owned()];
    env.working_dir = Some(dir.path().to_path_buf());
    env.port = port;
    env
}

fn free_port() -> u16 {
    let listener = TcpListener::bind(("127.0.0.1", 0)).unwrap();
    listener.local_addr().unwrap().port()
}

fn supervisor(
    dir: &TempDir,
    probe: Arc<dyn LivenessProbe>,
    confirmer: Arc<dyn PortConfirmer>,
) -> Supervisor {
    supervisor_with(dir, settings(), probe, confirmer)
}

fn supervisor_with(
    dir: &TempDir,
    settings: SupervisorSettings,
    probe: Arc<dyn LivenessProbe>,
    confirmer: Arc<dyn PortConfirmer>,
) -> Supervisor {
    Supervisor::new(
        settings,
        dir.path(),
        Arc::new(StatusCache::new(probe)),
        confirmer,
    )
}

#[tokio::test]
async fn background_start_status_and_stop() {
    let dir = tempfile::tempdir().unwrap();
    let env = worker_env(&dir, free_port());
    let probe = Arc::new(CountingProbe::default());
    let sup = supervisor(&dir, probe.clone(), Arc::new(AcceptFallback));

    let outcome = sup.start(&env, LaunchMode::Background).await.unwrap();
    let StartOutcome::Background { process, readiness } = outcome else {
        panic!("unexpected outcome: {outcome:?}");
    };
    assert_eq!(readiness, Readiness::Ready);
    assert_eq!(process.port, env.port);

    let pid_path = env.pid_file_path(dir.path());
    assert_eq!(read_pid(&pid_path).unwrap(), Some(process.pid));

    // The launch primed the cache, so status within the TTL never probes
    let report = sup.status(&env).await;
    assert!(report.running);
    assert_eq!(report.state, ProcessState::Running);
    let _ = sup.status(&env).await;
    assert_eq!(probe.0.load(Ordering::SeqCst), 0);

    // A second start is informational
    assert_eq!(
        sup.start(&env, LaunchMode::Background).await.unwrap(),
        StartOutcome::AlreadyRunning { pid: process.pid }
    );

    let stopped = sup.stop(&env).await.unwrap();
    assert_eq!(
        stopped,
        StopOutcome::Stopped {
            pid: process.pid,
            forced: false
        }
    );
    assert!(!pid_path.exists());
    assert!(!PosixProbe.is_running(process.pid));
}

#[tokio::test]
async fn busy_port_falls_back_when_confirmed() {
    let dir = tempfile::tempdir().unwrap();
    let busy = TcpListener::bind(("127.0.0.1", 0)).unwrap();
    let desired = busy.local_addr().unwrap().port();
    if desired == u16::MAX {
        return;
    }
    let env = worker_env(&dir, desired);

    let mut confirmer = MockPortConfirmer::new();
    confirmer
        .expect_confirm_fallback()
        .withf(move |&d, &p| d == desired && p > desired)
        .times(1)
        .return_const(true);
    let sup = supervisor(&dir, Arc::new(PosixProbe), Arc::new(confirmer));

    let outcome = sup.start(&env, LaunchMode::Background).await.unwrap();
    let StartOutcome::Background { process, readiness } = outcome else {
        panic!("unexpected outcome: {outcome:?}");
    };
    assert_eq!(readiness, Readiness::Ready);
    assert!(process.port > desired);

    let log = fs::read_to_string(env.log_file_path(dir.path())).unwrap();
    assert!(log.contains(&format!("Starting server on port {}", process.port)));

    sup.stop(&env).await.unwrap();
}

#[tokio::test]
async fn restart_replaces_the_worker() {
    let dir = tempfile::tempdir().unwrap();
    let env = worker_env(&dir, free_port());
    let sup = supervisor(&dir, Arc::new(PosixProbe), Arc::new(AcceptFallback));

    let StartOutcome::Background { process: first, .. } =
        sup.start(&env, LaunchMode::Background).await.unwrap()
    else {
        panic!("first start did not run in background");
    };

    let restarted = sup.restart(&env).await.unwrap();
    assert!(matches!(
        restarted.stopped,
        StopOutcome::Stopped { pid, .. } if pid == first.pid
    ));
    let StartOutcome::Background { process: second, .. } = restarted.started else {
        panic!("restart did not start in background");
    };
    assert_ne!(second.pid, first.pid);
    assert!(sup.status(&env).await.running);

    sup.stop(&env).await.unwrap();
}

#[tokio::test]
async fn worker_that_exits_early_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut env = worker_env(&dir, free_port());
    env.args = vec!["-c".to_string(), "echo boom; exit 2".to_string()];

    let sup = supervisor(&dir, Arc::new(PosixProbe), Arc::new(AcceptFallback));
    let outcome = sup.start(&env, LaunchMode::Background).await.unwrap();

    let StartOutcome::Background { readiness, .. } = outcome else {
        panic!("unexpected outcome: {outcome:?}");
    };
    assert!(matches!(
        readiness,
        Readiness::ExitedEarly { exit } if exit.code == Some(2)
    ));
    assert!(!env.pid_file_path(dir.path()).exists());
    assert_eq!(sup.stop(&env).await.unwrap(), StopOutcome::NotRunning);
}

#[tokio::test]
async fn stop_kills_worker_that_ignores_termination() {
    let dir = tempfile::tempdir().unwrap();
    let env = worker_env_with(&dir, free_port(), STUBBORN_WORKER_SCRIPT);
    let settings = SupervisorSettings {
        stop_timeout_ms: 300,
        kill_grace_ms: 1_000,
        ..settings()
    };
    let sup = supervisor_with(
        &dir,
        settings,
        Arc::new(PosixProbe),
        Arc::new(AcceptFallback),
    );

    let StartOutcome::Background { process, readiness } =
        sup.start(&env, LaunchMode::Background).await.unwrap()
    else {
        panic!("worker did not start in background");
    };
    assert_eq!(readiness, Readiness::Ready);

    let stopped = sup.stop(&env).await.unwrap();
    assert_eq!(
        stopped,
        StopOutcome::Stopped {
            pid: process.pid,
            forced: true
        }
    );
    assert!(!env.pid_file_path(dir.path()).exists());
    assert!(!PosixProbe.is_running(process.pid));
    assert!(!sup.status(&env).await.running);
}

#[tokio::test]
async fn unwritable_pid_file_does_not_abort_start() {
    let dir = tempfile::tempdir().unwrap();
    let mut env = worker_env(&dir, free_port());
    // The parent of the PID file is a regular file, so the write fails
    env.pid_file = Some(dir.path().join("worker.sh").join("nested.pid"));
    let sup = supervisor(&dir, Arc::new(PosixProbe), Arc::new(AcceptFallback));

    let outcome = sup.start(&env, LaunchMode::Background).await.unwrap();
    let StartOutcome::Background { process, readiness } = outcome else {
        panic!("unexpected outcome: {outcome:?}");
    };
    assert_eq!(readiness, Readiness::Ready);
    assert!(PosixProbe.is_running(process.pid));
    assert!(!env.pid_file_path(dir.path()).exists());

    // The launch still primed the cache for this session
    assert!(sup.cache().is_running(process.pid));

    // Status and stop are keyed by the PID file, which never landed
    assert_eq!(sup.status(&env).await.state, ProcessState::Stopped);
    assert_eq!(sup.stop(&env).await.unwrap(), StopOutcome::NotRunning);

    SignalTerminator.force_kill(process.pid).await.unwrap();
}
