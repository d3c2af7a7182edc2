use std::{thread, time::Duration};

use log::Level;
use metrics_l2met::{Builder, LogOutput, Namespace};

fn main() {
    // Also forwards `log` records, which `LogOutput::Log` writes to.
    tracing_subscriber::fmt::init();

    Builder::new()
        .with_source("web.1")
        .with_namespace("app")
        .with_log_output(LogOutput::Stderr)
        .install();

    let memcached = Namespace::new("app.memcached");

    // Pretend to serve a handful of requests.
    for i in 0..5u64 {
        let timer = metrics_l2met::time("request.time");

        metrics_l2met::count("request.count", 1).expect("failed to drain count");
        memcached.count("hits", 1).expect("failed to drain count");
        memcached.sample("items", 100 + i, "").expect("failed to drain sample");
        thread::sleep(Duration::from_millis(10 * i));

        timer.done().expect("failed to drain timer");
    }

    // Route the same metrics through the `log` facade instead.
    Builder::new().with_log_output(LogOutput::Log(Level::Info)).install();
    metrics_l2met::sample("goroutine", 12, "").expect("failed to drain sample");
}
