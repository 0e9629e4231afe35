// tests/file_set_watcher.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use dotwatch::fileset::{FileSet, WatchTarget};
use dotwatch::watch::{FileSetWatcher, NotifyEventSource, WaitingCallback, WatcherOptions};
use dotwatch_test_utils::{FakeEventSource, init_tracing, with_timeout};
use tokio_util::sync::CancellationToken;

fn options() -> WatcherOptions {
    WatcherOptions {
        debounce: Duration::from_millis(10),
        waiting_notice_delay: Duration::from_millis(40),
    }
}

fn watcher(source: &FakeEventSource, files: &[&str]) -> FileSetWatcher {
    let set = FileSet::from_files(files.iter().map(PathBuf::from));
    FileSetWatcher::new(Arc::new(set), Arc::new(source.clone()), options())
}

fn counting_callback(counter: &Arc<AtomicUsize>) -> WaitingCallback {
    let counter = Arc::clone(counter);
    Box::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    })
}

#[tokio::test]
async fn reports_first_member_and_ignores_outsiders() {
    init_tracing();
    let source = FakeEventSource::new();
    let w = watcher(&source, &["/proj/Program.cs", "/proj/app.csproj"]);

    source.emit("/proj/readme.md");
    source.emit("/elsewhere/Program.cs");
    source.emit("/proj/Program.cs");
    source.emit("/proj/app.csproj");

    let changed = with_timeout(w.wait_for_change(CancellationToken::new(), None))
        .await
        .unwrap();
    assert_eq!(changed.as_deref(), Some(Path::new("/proj/Program.cs")));
}

#[tokio::test]
async fn cancellation_resolves_to_none() {
    let source = FakeEventSource::new();
    let w = watcher(&source, &["/proj/Program.cs"]);
    let cancel = CancellationToken::new();

    let wait = tokio::spawn({
        let w = w.clone();
        let cancel = cancel.clone();
        async move { w.wait_for_change(cancel, None).await }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    cancel.cancel();

    let changed = with_timeout(wait).await.unwrap().unwrap();
    assert!(changed.is_none());
    assert_eq!(source.live_subscriptions(), 0);
}

#[tokio::test]
async fn waiting_callback_fires_once_for_a_long_wait() {
    let source = FakeEventSource::new();
    let w = watcher(&source, &["/proj/Program.cs"]);
    let fired = Arc::new(AtomicUsize::new(0));

    let wait = tokio::spawn({
        let w = w.clone();
        let callback = counting_callback(&fired);
        async move { w.wait_for_change(CancellationToken::new(), Some(callback)).await }
    });

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);

    source.emit("/proj/Program.cs");
    let changed = with_timeout(wait).await.unwrap().unwrap();
    assert_eq!(changed, Some(PathBuf::from("/proj/Program.cs")));
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn waiting_callback_is_skipped_when_change_comes_first() {
    let source = FakeEventSource::new();
    let w = watcher(&source, &["/proj/Program.cs"]);
    let fired = Arc::new(AtomicUsize::new(0));

    source.emit("/proj/Program.cs");
    let changed = with_timeout(
        w.wait_for_change(CancellationToken::new(), Some(counting_callback(&fired))),
    )
    .await
    .unwrap();

    assert!(changed.is_some());
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn burst_of_events_resolves_once_and_does_not_leak() {
    let source = FakeEventSource::new();
    let w = watcher(&source, &["/proj/a.cs", "/proj/b.cs"]);

    let wait = tokio::spawn({
        let w = w.clone();
        async move { w.wait_for_change(CancellationToken::new(), None).await }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    for _ in 0..5 {
        source.emit("/proj/a.cs");
        source.emit("/proj/b.cs");
    }

    let changed = with_timeout(wait).await.unwrap().unwrap();
    assert_eq!(changed, Some(PathBuf::from("/proj/a.cs")));
    assert_eq!(source.live_subscriptions(), 0);

    // A fresh wait starts clean: nothing from the burst is replayed.
    let cancel = CancellationToken::new();
    let next = tokio::spawn({
        let w = w.clone();
        let cancel = cancel.clone();
        async move { w.wait_for_change(cancel, None).await }
    });
    tokio::time::sleep(Duration::from_millis(40)).await;
    cancel.cancel();
    assert!(with_timeout(next).await.unwrap().unwrap().is_none());
}

#[tokio::test]
async fn subscribes_to_the_file_set_watch_targets() {
    let source = FakeEventSource::new();
    let set = FileSet::new(
        [PathBuf::from("/proj/Program.cs"), PathBuf::from("/proj/src/Lib.cs")],
        [PathBuf::from("/proj/wwwroot")],
    );
    let expected = set.watch_targets();
    let w = FileSetWatcher::new(Arc::new(set), Arc::new(source.clone()), options());

    source.emit("/proj/wwwroot/css/site.css");
    let changed = with_timeout(w.wait_for_change(CancellationToken::new(), None))
        .await
        .unwrap();

    assert_eq!(changed, Some(PathBuf::from("/proj/wwwroot/css/site.css")));
    assert_eq!(source.last_targets(), expected);
    assert!(expected.contains(&WatchTarget {
        path: PathBuf::from("/proj/wwwroot"),
        recursive: true,
    }));
}

#[tokio::test]
async fn notify_source_sees_a_real_write() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    let file = root.join("Program.cs");
    std::fs::write(&file, "class Program {}").unwrap();
    std::fs::write(root.join("notes.txt"), "ignored").unwrap();

    let set = FileSet::from_files([file.clone()]);
    let w = FileSetWatcher::new(Arc::new(set), Arc::new(NotifyEventSource), options());

    let wait = tokio::spawn({
        let w = w.clone();
        async move { w.wait_for_change(CancellationToken::new(), None).await }
    });
    tokio::time::sleep(Duration::from_millis(300)).await;
    std::fs::write(root.join("notes.txt"), "still ignored").unwrap();
    std::fs::write(&file, "class Program { static void Main() {} }").unwrap();

    let changed = with_timeout(wait).await.unwrap().unwrap();
    assert_eq!(changed, Some(file));
}

#[cfg(unix)]
#[tokio::test]
async fn aliased_event_paths_resolve_to_the_member() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    let real = root.join("real");
    std::fs::create_dir(&real).unwrap();
    let file = real.join("Program.cs");
    std::fs::write(&file, "class Program {}").unwrap();
    std::os::unix::fs::symlink(&real, root.join("alias")).unwrap();

    let source = FakeEventSource::new();
    let set = FileSet::from_files([file.clone()]);
    let w = FileSetWatcher::new(Arc::new(set), Arc::new(source.clone()), options());

    // The first path is gone; the second names the member through the link.
    source.emit(root.join("alias").join("deleted.cs"));
    source.emit(root.join("alias").join("Program.cs"));

    let changed = with_timeout(w.wait_for_change(CancellationToken::new(), None))
        .await
        .unwrap();
    assert_eq!(changed, Some(file));
}
