use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use hwpcore::config::DaemonConfig;
use hwpcore::daemon::{self, state_file, transport};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::time::sleep;

// Mirrors the fixture builder in `src/holder/mod.rs`'s own tests: the
// smallest document the validator's own pipeline accepts.
fn write_binary_fixture(path: &Path, text: &str) {
    use hwpcore::parser::header::FileHeader;
    use hwpcore::parser::record::{self, HwpTag};
    use hwpcore::writer::build_container;

    let mut header = FileHeader::new_default();
    header.set_compressed(false);

    let mut mapping_counts = vec![0u32; 10];
    mapping_counts[9] = 1;
    let mut id_mappings_payload = Vec::new();
    for c in &mapping_counts {
        id_mappings_payload.extend_from_slice(&c.to_le_bytes());
    }
    let mut doc_info = Vec::new();
    doc_info.extend(record::build(HwpTag::IdMappings as u16, 0, &id_mappings_payload));
    doc_info.extend(record::build(HwpTag::FaceName as u16, 0, &vec![0u8; 7]));
    doc_info.extend(record::build(HwpTag::CharShape as u16, 0, &vec![0u8; 72]));
    doc_info.extend(record::build(HwpTag::ParaShape as u16, 0, &vec![0u8; 54]));
    doc_info.extend(record::build(HwpTag::Style as u16, 0, &vec![0u8; 12]));

    let mut para_header = vec![0u8; 12];
    let units: Vec<u8> = text.encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
    para_header[0..4].copy_from_slice(&((units.len() / 2) as u32 | 0x8000_0000).to_le_bytes());
    let mut section = Vec::new();
    section.extend(record::build(HwpTag::ParaHeader as u16, 0, &para_header));
    section.extend(record::build(HwpTag::ParaText as u16, 1, &units));
    section.extend(record::build(HwpTag::ParaCharShape as u16, 1, &[0u8; 8]));
    section.extend(record::build(HwpTag::ParaLineSeg as u16, 1, &[0u8; 4]));

    let bytes = build_container(&[
        ("FileHeader".to_string(), header.to_bytes()),
        ("DocInfo".to_string(), doc_info),
        ("BodyText/Section0".to_string(), section),
    ])
    .unwrap();
    let mut file = std::fs::File::create(path).unwrap();
    file.write_all(&bytes).unwrap();
}

async fn wait_for_state(path: &Path) -> state_file::StateFile {
    for _ in 0..100 {
        if let Ok(state) = state_file::StateFile::read(path) {
            return state;
        }
        sleep(Duration::from_millis(20)).await;
    }
    panic!("daemon never wrote its state file");
}

async fn request(stream: &mut TcpStream, token: &str, command: &str, args: Value) -> Value {
    let body = serde_json::to_vec(&json!({ "token": token, "command": command, "args": args })).unwrap();
    transport::write_frame(stream, &body).await.unwrap();
    let response = transport::read_frame(stream).await.unwrap();
    serde_json::from_slice(&response).unwrap()
}

#[tokio::test]
async fn full_round_trip_edit_flush_and_idle_exit() {
    let dir = tempfile::tempdir().unwrap();
    let doc_path = dir.path().join("doc.hwp");
    write_binary_fixture(&doc_path, "Hello");

    let state_path = state_file::path_for(&doc_path).unwrap();
    let _ = std::fs::remove_file(&state_path);

    let config = DaemonConfig {
        no_daemon: false,
        idle_timeout: Duration::from_millis(400),
        flush_debounce: Duration::from_millis(50),
    };
    let handle = tokio::spawn(daemon::run(doc_path.clone(), config));

    let state = wait_for_state(&state_path).await;
    let mut stream = TcpStream::connect(("127.0.0.1", state.port)).await.unwrap();

    let wrong_token = request(&mut stream, "not-the-token", "ping", json!({})).await;
    assert_eq!(wrong_token["success"], false);
    assert_eq!(wrong_token["error"], "Unauthorized: invalid token");

    let mut stream = TcpStream::connect(("127.0.0.1", state.port)).await.unwrap();
    let pong = request(&mut stream, &state.token, "ping", json!({})).await;
    assert_eq!(pong["success"], true);

    let mut stream = TcpStream::connect(("127.0.0.1", state.port)).await.unwrap();
    let edited = request(&mut stream, &state.token, "edit-text", json!({ "ref": "s0.p0", "text": "Changed" })).await;
    assert_eq!(edited["success"], true);

    // Give the debounced flush time to land on disk.
    sleep(Duration::from_millis(200)).await;
    let reopened = hwpcore::HwpReader::from_file(&doc_path).unwrap();
    assert_eq!(reopened.sections[0].paragraphs[0].text(), "Changed");

    // No further activity: the idle timer should fire and the daemon exits,
    // removing its state file.
    handle.await.unwrap().unwrap();
    assert!(!state_path.exists());
}

#[tokio::test]
async fn text_command_returns_plaintext_sections() {
    let dir = tempfile::tempdir().unwrap();
    let doc_path = dir.path().join("doc.hwp");
    write_binary_fixture(&doc_path, "Hi");

    let state_path = state_file::path_for(&doc_path).unwrap();
    let _ = std::fs::remove_file(&state_path);

    let config = DaemonConfig {
        no_daemon: false,
        idle_timeout: Duration::from_millis(300),
        flush_debounce: Duration::from_millis(30),
    };
    let handle = tokio::spawn(daemon::run(doc_path.clone(), config));
    let state = wait_for_state(&state_path).await;

    let mut stream = TcpStream::connect(("127.0.0.1", state.port)).await.unwrap();
    let text = request(&mut stream, &state.token, "text", json!({})).await;
    assert_eq!(text["success"], true);
    assert_eq!(text["data"][0], "Hi");

    handle.await.unwrap().unwrap();
}

/// Several connections opened at once, each editing the same paragraph, still
/// funnel through the single job queue in `daemon::event_loop`: every reply
/// must be a success and the document left behind must hold exactly one of
/// the values written, never a torn mix of two edits racing on the holder.
#[tokio::test]
async fn concurrent_connections_serialize_through_the_job_queue() {
    let dir = tempfile::tempdir().unwrap();
    let doc_path = dir.path().join("doc.hwp");
    write_binary_fixture(&doc_path, "Hello");

    let state_path = state_file::path_for(&doc_path).unwrap();
    let _ = std::fs::remove_file(&state_path);

    let config = DaemonConfig {
        no_daemon: false,
        idle_timeout: Duration::from_millis(500),
        flush_debounce: Duration::from_millis(50),
    };
    let handle = tokio::spawn(daemon::run(doc_path.clone(), config));
    let state = wait_for_state(&state_path).await;

    let candidates = ["one", "two", "three", "four"];
    let mut connections = tokio::task::JoinSet::new();
    for candidate in candidates {
        let port = state.port;
        let token = state.token.clone();
        connections.spawn(async move {
            let mut stream = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
            request(&mut stream, &token, "edit-text", json!({ "ref": "s0.p0", "text": candidate })).await
        });
    }
    while let Some(result) = connections.join_next().await {
        assert_eq!(result.unwrap()["success"], true);
    }

    sleep(Duration::from_millis(200)).await;
    let reopened = hwpcore::HwpReader::from_file(&doc_path).unwrap();
    let final_text = reopened.sections[0].paragraphs[0].text().to_string();
    assert!(candidates.contains(&final_text.as_str()), "unexpected final text: {final_text}");

    handle.await.unwrap().unwrap();
}
