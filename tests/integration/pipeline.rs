//! End-to-end conversion: CSV file in, hex packet file out.

use chrono::{Local, TimeZone};
use dustlink_core::{TimestampMode, MAX_RECORDS};

use crate::*;

fn local_epoch(y: i32, mo: u32, d: u32, h: u32) -> u32 {
    Local
        .with_ymd_and_hms(y, mo, d, h, 0, 0)
        .earliest()
        .expect("unambiguous local time")
        .timestamp() as u32
}

#[test]
fn test_new_year_row_produces_expected_packet() {
    let scratch = Scratch::new("new-year").unwrap();
    let input = scratch
        .write_csv("in.csv", &["1,2024:01:01 00:00:00,12.3,50,Good".to_string()])
        .unwrap();
    let output = scratch.path("out.dat");

    let summary = convert_file(&input, &output, TimestampMode::Lenient).unwrap();
    assert_eq!(summary.packets, 1);

    let lines = read_lines(&output).unwrap();
    assert_eq!(lines.len(), 1);
    let pairs: Vec<&str> = lines[0].split(' ').collect();
    assert_eq!(pairs.len(), 16);

    let epoch = local_epoch(2024, 1, 1, 0).to_le_bytes();
    let pm25 = 12.3f32.to_bits().to_le_bytes();
    let mut expected = vec![0xAA, 0x10, 0x01];
    expected.extend_from_slice(&epoch);
    expected.extend_from_slice(&pm25);
    expected.extend_from_slice(&[0x32, 0x00, 0x47]);
    let sum: u32 = expected[1..].iter().map(|&b| u32::from(b)).sum();
    expected.push((sum as u8).wrapping_neg());
    expected.push(0xFF);

    let expected_line: Vec<String> = expected.iter().map(|b| format!("{b:02X}")).collect();
    assert_eq!(lines[0], expected_line.join(" "));
}

#[test]
fn test_output_file_ends_with_newline_per_packet() {
    let scratch = Scratch::new("newlines").unwrap();
    let rows: Vec<String> = (0..3).map(|h| row(1, h, 5.0, 50, "Good")).collect();
    let input = scratch.write_csv("in.csv", &rows).unwrap();
    let output = scratch.path("out.dat");

    convert_file(&input, &output, TimestampMode::Lenient).unwrap();

    let text = std::fs::read_to_string(&output).unwrap();
    assert_eq!(text.matches('\n').count(), 3);
    assert!(text.ends_with("FF\n"));
}

#[test]
fn test_cap_boundary_drops_row_10001() {
    let scratch = Scratch::new("cap").unwrap();
    let rows: Vec<String> = (0..=MAX_RECORDS as u32)
        .map(|i| row(i % 10 + 1, i % 24, 20.0, 100, "Moderate"))
        .collect();
    assert_eq!(rows.len(), 10_001);
    let input = scratch.write_csv("in.csv", &rows).unwrap();
    let output = scratch.path("out.dat");

    let summary = convert_file(&input, &output, TimestampMode::Lenient).unwrap();

    assert_eq!(summary.packets, 10_000);
    assert!(summary.truncated);
    assert_eq!(read_lines(&output).unwrap().len(), 10_000);
}

#[test]
fn test_four_field_row_is_skipped() {
    let scratch = Scratch::new("malformed").unwrap();
    let rows = vec![
        row(1, 0, 5.0, 50, "Good"),
        "2,2024:01:01 01:00:00,12.3,50".to_string(),
        row(3, 2, 5.0, 50, "Good"),
    ];
    let input = scratch.write_csv("in.csv", &rows).unwrap();
    let output = scratch.path("out.dat");

    let summary = convert_file(&input, &output, TimestampMode::Lenient).unwrap();

    assert_eq!(summary.packets, 2);
    assert_eq!(summary.skipped, 1);
    let ids: Vec<String> = read_lines(&output)
        .unwrap()
        .iter()
        .map(|l| l.split(' ').nth(2).unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["01", "03"]);
}

#[test]
fn test_each_category_gets_its_code() {
    let scratch = Scratch::new("codes").unwrap();
    let rows = vec![
        row(1, 0, 5.0, 50, "Good"),
        row(1, 1, 20.0, 100, "Moderate"),
        row(1, 2, 40.0, 150, "Unhealthy_S"),
        row(1, 3, 100.0, 200, "Unhealthy"),
        row(1, 4, 200.0, 300, "Very_Unhealthy"),
        row(1, 5, 400.0, 500, "Hazardous"),
        row(1, 6, 400.0, 500, "Smoke"),
    ];
    let input = scratch.write_csv("in.csv", &rows).unwrap();
    let output = scratch.path("out.dat");

    convert_file(&input, &output, TimestampMode::Lenient).unwrap();

    let codes: Vec<String> = read_lines(&output)
        .unwrap()
        .iter()
        .map(|l| l.split(' ').nth(13).unwrap().to_string())
        .collect();
    // G M U u V H X
    assert_eq!(codes, vec!["47", "4D", "55", "75", "56", "48", "58"]);
}

#[test]
fn test_epochs_follow_row_order() {
    let scratch = Scratch::new("monotonic").unwrap();
    let rows: Vec<String> = (0..24).map(|h| row(4, h, 8.0, 50, "Good")).collect();
    let input = scratch.write_csv("in.csv", &rows).unwrap();
    let output = scratch.path("out.dat");

    convert_file(&input, &output, TimestampMode::Lenient).unwrap();

    let epochs: Vec<u32> = read_lines(&output)
        .unwrap()
        .iter()
        .map(|l| {
            let b: Vec<u8> = l
                .split(' ')
                .skip(3)
                .take(4)
                .map(|p| u8::from_str_radix(p, 16).unwrap())
                .collect();
            u32::from_le_bytes([b[0], b[1], b[2], b[3]])
        })
        .collect();
    assert!(epochs.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_strict_mode_drops_bad_timestamps() {
    let scratch = Scratch::new("strict").unwrap();
    let rows = vec![
        "1,2024/01/01 00:00,12.3,50,Good".to_string(),
        row(2, 0, 12.3, 50, "Good"),
    ];
    let input = scratch.write_csv("in.csv", &rows).unwrap();

    let lenient = convert_file(&input, &scratch.path("lenient.dat"), TimestampMode::Lenient).unwrap();
    let strict = convert_file(&input, &scratch.path("strict.dat"), TimestampMode::Strict).unwrap();

    assert_eq!(lenient.packets, 2);
    assert_eq!(strict.packets, 1);
    assert_eq!(strict.skipped, 1);
}

#[test]
fn test_header_only_input_produces_empty_output() {
    let scratch = Scratch::new("empty").unwrap();
    let input = scratch.write_csv("in.csv", &[]).unwrap();
    let output = scratch.path("out.dat");

    let summary = convert_file(&input, &output, TimestampMode::Lenient).unwrap();

    assert_eq!(summary.packets, 0);
    assert!(output.exists());
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "");
}

#[test]
fn test_wide_id_and_negative_aqi_are_truncated_not_dropped() {
    let scratch = Scratch::new("truncate").unwrap();
    let rows = vec![
        "256,2024:01:01 00:00:00,12.3,50,Good".to_string(),
        "1,2024:01:01 01:00:00,12.3,-1,Good".to_string(),
    ];
    let input = scratch.write_csv("in.csv", &rows).unwrap();
    let output = scratch.path("out.dat");

    let summary = convert_file(&input, &output, TimestampMode::Lenient).unwrap();

    assert_eq!(summary.packets, 2);
    assert_eq!(summary.skipped, 0);
    let lines = read_lines(&output).unwrap();
    // id 256 -> 0x00; AQI -1 -> 0xFFFF.
    assert_eq!(lines[0].split(' ').nth(2), Some("00"));
    let aqi: Vec<&str> = lines[1].split(' ').skip(11).take(2).collect();
    assert_eq!(aqi, vec!["FF", "FF"]);
}
