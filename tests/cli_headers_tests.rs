//! End-to-end tests for the `headerio headers` and `headerio functions`
//! commands.

use std::process::Command;

/// Path to the headerio binary
fn headerio_bin() -> &'static str {
    env!("CARGO_BIN_EXE_headerio")
}

#[test]
fn headers_lists_the_board_headers() {
    let output = Command::new(headerio_bin())
        .args(["headers", "--board", "jetson-nano"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(
        output.status.code(),
        Some(0),
        "headers should succeed. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Jetson Nano Developer Kit"));
    assert!(stdout.contains("hdr40"));
    assert!(stdout.contains("40-pin Header (J41)"));
}

#[test]
fn headers_rejects_unknown_boards() {
    let output = Command::new(headerio_bin())
        .args(["headers", "--board", "toaster"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown board"));
    assert!(stderr.contains("jetson-nano"), "should list known boards");
}

#[test]
fn functions_lists_groups_with_pins() {
    let output = Command::new(headerio_bin())
        .args(["functions", "--board", "jetson-nano", "--header", "hdr40"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(
        output.status.code(),
        Some(0),
        "functions should succeed. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("spi1"));
    assert!(stdout.contains("pins 19,21,23,24,26"));
    assert!(stdout.contains("i2s4"));
    assert!(stdout.contains("pins 12,35,38,40"));
}

#[test]
fn functions_rejects_unknown_headers() {
    let output = Command::new(headerio_bin())
        .args(["functions", "--board", "jetson-nano", "--header", "hdr99"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown header"));
}

#[test]
fn xavier_nx_catalog_is_reachable() {
    let output = Command::new(headerio_bin())
        .args(["functions", "--board", "jetson-xavier-nx"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("40-pin Header (J12)"));
    assert!(stdout.contains("i2s5"));
}
