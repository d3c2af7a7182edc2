use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use metrics_l2met::{
    count, global_drainer, measure, sample, set_default_local_drainer, set_global_drainer,
    set_global_drainer_arc, time, with_local_drainer, Builder, Clock,
    LocalStoreDrain, LogDrain, LogOutput, MetricKind, Namespace, NullDrain,
};

fn capture() -> (LogOutput, Arc<Mutex<Vec<String>>>) {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink = lines.clone();
    let output = LogOutput::func(move |line| sink.lock().unwrap().push(line.to_owned()));
    (output, lines)
}

#[test]
fn local_store_keeps_every_observation() {
    const KEY: &str = "user.signup";

    let store = LocalStoreDrain::new();
    let _guard = set_default_local_drainer(store.clone());

    let root = Namespace::root();
    root.count(KEY, 1).unwrap();
    root.count(KEY, 1).unwrap();
    root.measure(KEY, 127, "ms").unwrap();

    let recorded = store.get(KEY);
    assert_eq!(recorded.len(), 3);
    assert_eq!(recorded.iter().filter(|m| m.kind() == MetricKind::Count).count(), 2);
    assert_eq!(recorded.iter().filter(|m| m.kind() == MetricKind::Measure).count(), 1);

    store.flush();
    assert!(store.get(KEY).is_empty());
    assert!(store.store().is_empty());
}

#[test]
fn namespaced_timer() {
    let (clock, mock) = Clock::mock();
    let store = LocalStoreDrain::new();

    with_local_drainer(store.clone(), || {
        let timer = Namespace::new("memcached").time_with_clock("get.time", clock);
        mock.increment(Duration::from_millis(527));
        timer.done().unwrap();
    });

    let recorded = store.get("memcached.get.time");
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].kind(), MetricKind::Measure);
    assert_eq!(recorded[0].value().as_i64().unwrap(), 527);
    assert_eq!(recorded[0].units(), "ms");
}

#[test]
fn log_lines_in_l2met_format() {
    let (output, lines) = capture();
    let drain = LogDrain::new()
        .with_formatter(metrics_l2met::L2metFormatter::with_source(""))
        .with_output(output);

    with_local_drainer(drain, || {
        let root = Namespace::root();
        root.count("user.signup", 1).unwrap();
        root.sample("goroutine", 1, "").unwrap();
        root.measure("request.time.2xx", 12.14, "ms").unwrap();
    });

    assert_eq!(
        *lines.lock().unwrap(),
        vec![
            "count#user.signup=1".to_owned(),
            "sample#goroutine=1".to_owned(),
            "measure#request.time.2xx=12.14ms".to_owned(),
        ]
    );
}

// The only test in this binary that touches global configuration.
#[test]
fn global_configuration() {
    let original = global_drainer();

    let (output, lines) = capture();
    Builder::new().with_source("web.1").with_namespace("app").with_log_output(output).install();

    count("user.signup", 1).unwrap();
    sample("goroutine", 12, "").unwrap();
    measure("request.time", 6, "ms").unwrap();
    assert!(time("request.time").done().is_ok());

    {
        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "source=web.1 count#app.user.signup=1");
        assert_eq!(lines[1], "source=web.1 sample#app.goroutine=12");
        assert_eq!(lines[2], "source=web.1 measure#app.request.time=6ms");
        assert!(lines[3].starts_with("source=web.1 measure#app.request.time="));
        assert!(lines[3].ends_with("ms"));
    }

    // A local drainer wins over the global one.
    let store = LocalStoreDrain::new();
    with_local_drainer(store.clone(), || count("user.signup", 1).unwrap());
    assert_eq!(store.get("app.user.signup").len(), 1);
    assert_eq!(lines.lock().unwrap().len(), 4);

    set_global_drainer(NullDrain);
    count("user.signup", 1).unwrap();
    assert_eq!(lines.lock().unwrap().len(), 4);

    Builder::new().with_source("").with_namespace("").install();
    set_global_drainer_arc(original);
}
