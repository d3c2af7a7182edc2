use std::{thread, time::Duration};

use metrics_l2met::Namespace;
use metrics_l2met_statsd::StatsdBuilder;

fn main() {
    tracing_subscriber::fmt::init();

    StatsdBuilder::default()
        .with_remote_address("localhost:8125")
        .expect("failed to parse remote address")
        .with_template("{{.Name}}.{{.Source}}")
        .expect("failed to parse name template")
        .with_source("web1")
        .install()
        .expect("failed to install statsd drain");

    let memcached = Namespace::new("memcached");

    // Loop over and over, pretending to do some work.
    loop {
        let timer = memcached.time("get.time");
        thread::sleep(Duration::from_millis(25));

        if let Err(e) = timer.done() {
            eprintln!("failed to send timing: {}", e);
        }
        if let Err(e) = memcached.count("hits", 1) {
            eprintln!("failed to send count: {}", e);
        }

        thread::sleep(Duration::from_secs(1));
    }
}
