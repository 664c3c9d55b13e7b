use super::*;

use std::{
    io::{Read, Write},
    net::TcpListener,
    thread,
};

use crossbeam_channel::Receiver;

const EVENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Answers a single HTTP request with `status_line` and closes.
fn spawn_page_server(status_line: &'static str) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut request = [0u8; 1024];
            let _ = stream.read(&mut request);
            let response = format!("{status_line}\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok");
            let _ = stream.write_all(response.as_bytes());
        }
    });
    format!("http://{addr}/")
}

fn next_load_finished(ui_rx: &Receiver<UiEvent>) -> bool {
    loop {
        match ui_rx.recv_timeout(EVENT_TIMEOUT).expect("navigation event") {
            UiEvent::LoadFinished { success } => return success,
            UiEvent::LoadStarted => continue,
            _ => panic!("unexpected event from render host"),
        }
    }
}

#[test]
fn reachable_page_counts_as_loaded() {
    let url = spawn_page_server("HTTP/1.1 200 OK");
    let (ui_tx, ui_rx) = crossbeam_channel::unbounded();
    let mut host = ProbeRenderHost::new(ui_tx).expect("host");

    host.load_url(&url);
    assert!(matches!(ui_rx.recv_timeout(EVENT_TIMEOUT), Ok(UiEvent::LoadStarted)));
    assert!(next_load_finished(&ui_rx));
}

#[test]
fn server_error_counts_as_load_failure() {
    let url = spawn_page_server("HTTP/1.1 500 Internal Server Error");
    let (ui_tx, ui_rx) = crossbeam_channel::unbounded();
    let mut host = ProbeRenderHost::new(ui_tx).expect("host");

    host.load_url(&url);
    assert!(!next_load_finished(&ui_rx));
}

#[test]
fn closed_port_counts_as_load_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let (ui_tx, ui_rx) = crossbeam_channel::unbounded();
    let mut host = ProbeRenderHost::new(ui_tx).expect("host");
    host.load_url(&format!("http://{addr}/"));
    assert!(!next_load_finished(&ui_rx));
}

#[test]
fn released_host_ignores_navigation_and_scripts() {
    let (ui_tx, ui_rx) = crossbeam_channel::unbounded();
    let mut host = ProbeRenderHost::new(ui_tx).expect("host");

    host.run_script("void 0").expect("script before release");
    assert_eq!(host.injected_scripts(), ["void 0".to_string()]);

    host.release();
    host.release();
    assert!(host.run_script("void 0").is_err());
    host.load_url("http://127.0.0.1:9/");
    assert!(ui_rx.recv_timeout(Duration::from_millis(100)).is_err());
}

#[test]
fn load_outcome_waits_for_queue_space() {
    let url = spawn_page_server("HTTP/1.1 200 OK");
    let (ui_tx, ui_rx) = crossbeam_channel::bounded(1);
    ui_tx
        .try_send(UiEvent::BackendUnavailable("queue filler".to_string()))
        .expect("fill queue");
    let mut host = ProbeRenderHost::new(ui_tx).expect("host");

    // LoadStarted finds the queue full; the outcome must not be lost too
    host.load_url(&url);
    thread::sleep(Duration::from_millis(300));
    assert!(matches!(
        ui_rx.try_recv(),
        Ok(UiEvent::BackendUnavailable(_))
    ));
    assert!(next_load_finished(&ui_rx));
}
