//! Watch session behaviour, driven with synthetic events.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde_json::json;
use tempfile::TempDir;
use tokio::sync::{broadcast, mpsc};

use temple_build::render_once;
use temple_core::{OutputTarget, WatchSet};
use temple_renderer::{Render, TextRenderer};
use temple_watch::{watch, FsEvent, SessionStats, WatchError, WatchSession};

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Fixture {
            dir: TempDir::new().expect("tempdir"),
        }
    }

    fn write(&self, name: &str, body: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, body).expect("write file");
        fs::canonicalize(&path).expect("canonicalize")
    }

    fn out(&self) -> PathBuf {
        self.dir.path().join("out.txt")
    }

    fn output(&self) -> String {
        fs::read_to_string(self.out()).expect("read output")
    }

    fn set(&self, templates: Vec<PathBuf>, data: Option<PathBuf>) -> WatchSet {
        WatchSet::new(templates, data, OutputTarget::File(self.out())).expect("watch set")
    }
}

fn renderer() -> Arc<dyn Render> {
    Arc::new(TextRenderer)
}

fn session(set: WatchSet) -> WatchSession {
    WatchSession::new(set, renderer()).expect("session")
}

/// Feed `events` through the full loop and return once the queues close.
async fn run_events(session: WatchSession, events: Vec<FsEvent>) -> Result<SessionStats, WatchError> {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (error_tx, error_rx) = mpsc::unbounded_channel::<notify::Error>();
    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
    for event in events {
        event_tx.send(event).expect("queue event");
    }
    drop(event_tx);
    drop(error_tx);
    session.run(event_rx, error_rx, shutdown_rx).await
}

#[tokio::test]
async fn initial_rebuild_matches_one_shot_render() {
    let fx = Fixture::new();
    let a = fx.write("a.tmpl", "hello {% include \"b.tmpl\" %}");
    let b = fx.write("b.tmpl", "world");
    let set = fx.set(vec![a, b], None);

    let one_shot_out = fx.dir.path().join("one-shot.txt");
    let one_shot = WatchSet::new(
        set.templates().to_vec(),
        None,
        OutputTarget::File(one_shot_out.clone()),
    )
    .unwrap();
    render_once(&one_shot, &TextRenderer).expect("one-shot render");

    let stats = run_events(session(set), vec![]).await.expect("session");
    assert_eq!(stats.rebuilds, 1);
    assert_eq!(stats.failed, 0);
    assert_eq!(fx.output(), "hello world");
    assert_eq!(fx.output(), fs::read_to_string(one_shot_out).unwrap());
}

#[tokio::test]
async fn write_event_triggers_exactly_one_rebuild() {
    let fx = Fixture::new();
    let a = fx.write("a.tmpl", "v1");
    let mut session = session(fx.set(vec![a.clone()], None));

    session.rebuild().await.unwrap();
    assert_eq!(fx.output(), "v1");

    fx.write("a.tmpl", "v2");
    session.handle_event(FsEvent::write(&a)).await.unwrap();
    assert_eq!(fx.output(), "v2");
    assert_eq!(session.stats().rebuilds, 2);
}

#[tokio::test]
async fn non_write_event_triggers_nothing() {
    let fx = Fixture::new();
    let a = fx.write("a.tmpl", "v1");
    let mut session = session(fx.set(vec![a.clone()], None));
    session.rebuild().await.unwrap();

    fx.write("a.tmpl", "v2");
    session.handle_event(FsEvent::other(&a)).await.unwrap();

    assert_eq!(fx.output(), "v1");
    assert_eq!(session.stats().rebuilds, 1);
    assert_eq!(session.stats().ignored, 1);
}

#[tokio::test]
async fn events_on_unwatched_paths_are_ignored() {
    let fx = Fixture::new();
    let a = fx.write("a.tmpl", "v1");
    let stray = fx.write("stray.txt", "");

    let stats = run_events(session(fx.set(vec![a], None)), vec![FsEvent::write(stray)])
        .await
        .unwrap();
    assert_eq!(stats.rebuilds, 1);
    assert_eq!(stats.ignored, 1);
}

#[tokio::test]
async fn data_write_reloads_before_rebuild() {
    let fx = Fixture::new();
    let tpl = fx.write("a.tmpl", "{{ name }}");
    let data = fx.write("data.json", r#"{"name":"x"}"#);
    let mut session = session(fx.set(vec![tpl], Some(data.clone())));

    session.rebuild().await.unwrap();
    assert_eq!(fx.output(), "x");

    fx.write("data.json", r#"{"name":"y"}"#);
    session.handle_event(FsEvent::write(&data)).await.unwrap();

    assert_eq!(fx.output(), "y");
    assert_eq!(session.data(), &json!({"name": "y"}));
    assert_eq!(session.stats().reloads, 1);
}

#[tokio::test]
async fn failed_data_reload_keeps_data_and_skips_rebuild() {
    let fx = Fixture::new();
    let tpl = fx.write("a.tmpl", "{{ name }}");
    let data = fx.write("data.json", r#"{"name":"x"}"#);
    let mut session = session(fx.set(vec![tpl.clone()], Some(data.clone())));
    session.rebuild().await.unwrap();

    fx.write("data.json", "{ not json");
    session.handle_event(FsEvent::write(&data)).await.unwrap();

    assert_eq!(session.data(), &json!({"name": "x"}));
    assert_eq!(fx.output(), "x");
    assert_eq!(session.stats().rebuilds, 1);
    assert_eq!(session.stats().reload_failures, 1);

    // a template edit in between still renders with the last good data
    fx.write("a.tmpl", "<{{ name }}>");
    session.handle_event(FsEvent::write(&tpl)).await.unwrap();
    assert_eq!(fx.output(), "<x>");

    // the next data write retries the reload
    fx.write("data.json", r#"{"name":"z"}"#);
    session.handle_event(FsEvent::write(&data)).await.unwrap();
    assert_eq!(fx.output(), "<z>");
    assert_eq!(session.stats().reloads, 1);
}

#[tokio::test]
async fn render_failure_does_not_end_the_session() {
    let fx = Fixture::new();
    let a = fx.write("a.tmpl", "ok");
    let mut session = session(fx.set(vec![a.clone()], None));
    session.rebuild().await.unwrap();

    fx.write("a.tmpl", "{% if %}");
    session.handle_event(FsEvent::write(&a)).await.expect("failure is not fatal");
    assert_eq!(session.stats().failed, 1);

    fx.write("a.tmpl", "fixed");
    session.handle_event(FsEvent::write(&a)).await.unwrap();
    assert_eq!(fx.output(), "fixed");
    assert_eq!(session.stats().rebuilds, 3);
    assert_eq!(session.stats().failed, 1);
}

#[tokio::test]
async fn repeated_rebuild_is_byte_identical() {
    let fx = Fixture::new();
    let tpl = fx.write("a.tmpl", "{% for k, v in m %}{{ k }}={{ v }} {% endfor %}");
    let data = fx.write("data.json", r#"{"m":{"b":2,"a":1}}"#);
    let mut session = session(fx.set(vec![tpl.clone()], Some(data)));

    session.rebuild().await.unwrap();
    let first = fs::read(fx.out()).unwrap();
    session.handle_event(FsEvent::write(&tpl)).await.unwrap();
    assert_eq!(first, fs::read(fx.out()).unwrap());
}

#[tokio::test]
async fn every_write_in_a_burst_rebuilds() {
    let fx = Fixture::new();
    let a = fx.write("a.tmpl", "same");
    let burst = vec![FsEvent::write(&a); 5];

    let stats = run_events(session(fx.set(vec![a], None)), burst).await.unwrap();
    assert_eq!(stats.rebuilds, 6);
}

#[tokio::test]
async fn watcher_errors_are_logged_and_survived() {
    let fx = Fixture::new();
    let a = fx.write("a.tmpl", "v1");
    let session = session(fx.set(vec![a.clone()], None));

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (error_tx, error_rx) = mpsc::unbounded_channel();
    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
    error_tx.send(notify::Error::generic("queue overflow")).unwrap();
    drop(error_tx);
    event_tx.send(FsEvent::write(&a)).unwrap();
    drop(event_tx);

    let stats = session.run(event_rx, error_rx, shutdown_rx).await.unwrap();
    assert_eq!(stats.watcher_errors, 1);
    assert_eq!(stats.rebuilds, 2);
}

#[tokio::test]
async fn shutdown_signal_stops_the_loop() {
    let fx = Fixture::new();
    let a = fx.write("a.tmpl", "v1");
    let session = session(fx.set(vec![a], None));

    let (_event_tx, event_rx) = mpsc::unbounded_channel::<FsEvent>();
    let (_error_tx, error_rx) = mpsc::unbounded_channel::<notify::Error>();
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    let handle = tokio::spawn(session.run(event_rx, error_rx, shutdown_rx));
    shutdown_tx.send(()).unwrap();
    let stats = handle.await.unwrap().unwrap();
    assert_eq!(stats.rebuilds, 1);
}

#[tokio::test]
async fn unwritable_output_ends_the_session() {
    let fx = Fixture::new();
    let a = fx.write("a.tmpl", "v1");
    let set = WatchSet::new(
        vec![a],
        None,
        OutputTarget::File(fx.dir.path().join("missing-dir").join("out.txt")),
    )
    .unwrap();

    let err = run_events(session(set), vec![]).await.unwrap_err();
    assert!(matches!(err, WatchError::Build(_)), "got {err:?}");
}

#[test]
fn missing_template_fails_at_startup() {
    let fx = Fixture::new();
    let set = fx.set(vec![fx.dir.path().join("gone.tmpl")], None);
    let err = WatchSession::new(set, renderer()).err().expect("should fail");
    assert!(matches!(err, WatchError::Io { .. }));
}

#[test]
fn unreadable_data_fails_at_startup() {
    let fx = Fixture::new();
    let tpl = fx.write("a.tmpl", "x");
    let data = fx.write("data.json", "{ broken");
    let err = WatchSession::new(fx.set(vec![tpl], Some(data)), renderer())
        .err()
        .expect("should fail");
    assert!(matches!(err, WatchError::Data(_)));
}

#[tokio::test]
async fn non_canonical_event_paths_are_resolved() {
    let fx = Fixture::new();
    let a = fx.write("a.tmpl", "x");
    fs::create_dir(fx.dir.path().join("sub")).unwrap();
    let roundabout = fx.dir.path().join("sub").join("..").join("a.tmpl");
    assert_ne!(roundabout, a);

    let stats = run_events(session(fx.set(vec![a], None)), vec![FsEvent::write(roundabout)])
        .await
        .unwrap();
    assert_eq!(stats.rebuilds, 2);
    assert_eq!(stats.ignored, 0);
}

#[test]
fn watch_reports_startup_failure_before_registering() {
    let fx = Fixture::new();
    let set = fx.set(vec![fx.dir.path().join("gone.tmpl")], None);
    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);

    let err = tokio_test::block_on(watch(set, renderer(), shutdown_rx)).unwrap_err();
    assert!(matches!(err, WatchError::Io { .. }), "got {err:?}");
    assert!(!fx.out().exists());
}

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

#[tokio::test]
async fn session_logs_carry_the_entry_template() {
    let logs = Captured::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let fx = Fixture::new();
    let a = fx.write("entry.tmpl", "{% if %}");
    let stats = run_events(session(fx.set(vec![a], None)), vec![])
        .await
        .unwrap();
    assert_eq!(stats.failed, 1);

    let text = logs.text();
    let line = text
        .lines()
        .find(|line| line.contains("rebuild failed"))
        .unwrap_or_else(|| panic!("no failure line in:\n{text}"));
    assert!(line.contains("watch{entry="), "missing session span: {line}");
    assert!(line.contains("entry.tmpl"), "missing entry template: {line}");
}
