// SPDX-FileCopyrightText: 2026 Obscodec Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Round-trip integration tests.
//!
//! Tests cover:
//! - Writing observations and reading them back in the same format
//! - Cross-format conversion (CoViS3D XML to PCD and back)
//! - Wanderer line dumps feeding PCD and XML writers
//! - f32 on-disk precision and empty-stream edge cases

use std::fs;
use std::path::PathBuf;

use obscodec::io::formats::covis3d::Covis3dXmlWriter;
use obscodec::io::formats::pcd::{PcdReader, PcdWriter};
use obscodec::io::registry::{create_writer, open_reader, open_reader_auto};
use obscodec::{FormatTag, KernelEncoding, Observation, ObservationReader, ObservationWriter};

// ============================================================================
// Test Fixtures
// ============================================================================

/// Get a temporary directory for test files
fn temp_dir() -> PathBuf {
    let random = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .subsec_nanos();
    std::env::temp_dir().join(format!(
        "obscodec_roundtrip_{}_{}",
        std::process::id(),
        random
    ))
}

/// Create a temporary file path with cleanup guard
fn temp_path(name: &str) -> (PathBuf, CleanupGuard) {
    let dir = temp_dir();
    fs::create_dir_all(&dir).ok();
    let path = dir.join(name);
    let guard = CleanupGuard(dir);
    (path, guard)
}

/// Cleanup guard for test temporary files
struct CleanupGuard(PathBuf);

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

/// A sample observation with f32-exact component values.
fn sample(tag: FormatTag, seed: u32) -> Observation {
    let s = seed as f64;
    let mut obs = Observation::new(tag);
    obs.kernel.position = [s, s + 0.5, -s];
    obs.kernel.orientation = [0.5, -0.5, 0.5, -0.5];
    obs.kernel.weight = 0.25 * (seed + 1) as f64;
    obs
}

fn write_all(writer: &mut dyn ObservationWriter, records: &[Observation]) {
    writer.init().unwrap();
    for obs in records {
        writer.write_observation(obs).unwrap();
    }
    writer.write_buffer().unwrap();
}

fn read_all(mut reader: &mut dyn ObservationReader) -> Vec<Observation> {
    ObservationReader::observations(&mut reader)
        .map(|r| r.unwrap())
        .collect()
}

// ============================================================================
// Same-Format Round Trips
// ============================================================================

#[test]
fn test_round_trip_covis3d_xml() {
    let (path, _guard) = temp_path("scene.xml");
    let records: Vec<_> = (0..4).map(|i| sample(FormatTag::Covis3d, i)).collect();

    let mut writer = create_writer(FormatTag::Covis3d, &path).unwrap();
    write_all(writer.as_mut(), &records);

    let mut reader = open_reader(FormatTag::Covis3d, &path).unwrap();
    assert_eq!(reader.format(), FormatTag::Covis3d);
    assert_eq!(read_all(reader.as_mut()), records);
}

#[test]
fn test_round_trip_pcd_ascii() {
    let (path, _guard) = temp_path("cloud.pcd");
    let records: Vec<_> = (0..4).map(|i| sample(FormatTag::Pcd, i)).collect();

    let mut writer = create_writer(FormatTag::Pcd, &path).unwrap();
    write_all(writer.as_mut(), &records);

    let mut reader = open_reader(FormatTag::Pcd, &path).unwrap();
    assert_eq!(read_all(reader.as_mut()), records);
}

#[test]
fn test_round_trip_pcd_binary() {
    let (path, _guard) = temp_path("cloud_binary.pcd");
    let records: Vec<_> = (0..4).map(|i| sample(FormatTag::Pcd, i)).collect();

    let mut writer = PcdWriter::new(&path).with_encoding(KernelEncoding::Binary);
    write_all(&mut writer, &records);

    let mut reader = PcdReader::open(&path).unwrap();
    assert_eq!(reader.header().unwrap().encoding, KernelEncoding::Binary);
    assert_eq!(read_all(&mut reader), records);
}

#[test]
fn test_round_trip_descriptor_preserved_in_xml() {
    let (path, _guard) = temp_path("descriptor.xml");
    let mut obs = sample(FormatTag::Covis3d, 1);
    obs.descriptor = vec![0.5, 1.5, -2.0];

    let mut writer = create_writer(FormatTag::Covis3d, &path).unwrap();
    write_all(writer.as_mut(), std::slice::from_ref(&obs));

    let mut reader = open_reader(FormatTag::Covis3d, &path).unwrap();
    let got = read_all(reader.as_mut());
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].descriptor, obs.descriptor);
}

// ============================================================================
// Cross-Format Conversion
// ============================================================================

#[test]
fn test_convert_xml_to_pcd() {
    let (xml_path, _g1) = temp_path("source.xml");
    let (pcd_path, _g2) = temp_path("target.pcd");
    let records: Vec<_> = (0..3).map(|i| sample(FormatTag::Covis3d, i)).collect();

    let mut writer = create_writer(FormatTag::Covis3d, &xml_path).unwrap();
    write_all(writer.as_mut(), &records);

    let mut reader = open_reader_auto(&xml_path).unwrap();
    let mut pcd_writer = create_writer(FormatTag::Pcd, &pcd_path).unwrap();
    pcd_writer.init().unwrap();
    for obs in reader.observations() {
        let obs = obs.unwrap();
        pcd_writer
            .write_observation(&obs.retagged(FormatTag::Pcd))
            .unwrap();
    }
    pcd_writer.write_buffer().unwrap();

    let mut back = open_reader_auto(&pcd_path).unwrap();
    assert_eq!(back.format(), FormatTag::Pcd);
    let got = read_all(back.as_mut());
    assert_eq!(got.len(), records.len());
    for (got, expected) in got.iter().zip(records.iter()) {
        assert_eq!(got.kernel, expected.kernel);
    }
}

#[test]
fn test_convert_pcd_to_xml() {
    let (pcd_path, _g1) = temp_path("source.pcd");
    let (xml_path, _g2) = temp_path("target.xml");
    let records: Vec<_> = (0..3).map(|i| sample(FormatTag::Pcd, i)).collect();

    let mut writer = PcdWriter::new(&pcd_path).with_encoding(KernelEncoding::Binary);
    write_all(&mut writer, &records);

    let mut reader = open_reader_auto(&pcd_path).unwrap();
    let mut xml_writer = Covis3dXmlWriter::new(&xml_path);
    xml_writer.init().unwrap();
    for obs in reader.observations() {
        let obs = obs.unwrap();
        xml_writer
            .write_observation(&obs.retagged(FormatTag::Covis3d))
            .unwrap();
    }
    xml_writer.write_buffer().unwrap();

    let mut back = open_reader_auto(&xml_path).unwrap();
    assert_eq!(back.format(), FormatTag::Covis3d);
    let got = read_all(back.as_mut());
    for (got, expected) in got.iter().zip(records.iter()) {
        assert_eq!(got.kernel, expected.kernel);
    }
}

#[test]
fn test_convert_wanderer_to_pcd() {
    let (src_path, _g1) = temp_path("poses.covis3d");
    let (pcd_path, _g2) = temp_path("poses.pcd");
    fs::write(
        &src_path,
        "# wanderer dump\n1 2 3 1 0 0 0 0.5\n4 5 6 0.5 -0.5 0.5 -0.5 0.25\n",
    )
    .unwrap();

    let mut reader = open_reader_auto(&src_path).unwrap();
    assert_eq!(reader.format(), FormatTag::Covis3d);

    let mut writer = create_writer(FormatTag::Pcd, &pcd_path).unwrap();
    writer.init().unwrap();
    for obs in reader.observations() {
        let obs = obs.unwrap();
        writer.write_observation(&obs.retagged(FormatTag::Pcd)).unwrap();
    }
    writer.write_buffer().unwrap();

    let mut back = open_reader(FormatTag::Pcd, &pcd_path).unwrap();
    let got = read_all(back.as_mut());
    assert_eq!(got.len(), 2);
    assert_eq!(got[0].kernel.position, [1.0, 2.0, 3.0]);
    assert_eq!(got[1].kernel.orientation, [0.5, -0.5, 0.5, -0.5]);
    assert_eq!(got[1].kernel.weight, 0.25);
}

// ============================================================================
// Precision and Edge Cases
// ============================================================================

#[test]
fn test_on_disk_precision_is_f32() {
    let (path, _guard) = temp_path("precision.pcd");
    let mut obs = Observation::new(FormatTag::Pcd);
    // Not exactly representable in f32
    obs.kernel.position = [0.1, 0.2, 0.3];

    let mut writer = create_writer(FormatTag::Pcd, &path).unwrap();
    write_all(writer.as_mut(), std::slice::from_ref(&obs));

    let mut reader = open_reader(FormatTag::Pcd, &path).unwrap();
    let got = read_all(reader.as_mut());
    for (got, original) in got[0].kernel.position.iter().zip(obs.kernel.position) {
        assert_eq!(*got, original as f32 as f64);
        assert_ne!(*got, original);
    }
}

#[test]
fn test_empty_stream_round_trips() {
    for tag in FormatTag::ALL {
        let (path, _guard) = temp_path("empty.out");
        let mut writer = create_writer(tag, &path).unwrap();
        write_all(writer.as_mut(), &[]);

        let mut reader = open_reader(tag, &path).unwrap();
        assert!(reader.next_observation().unwrap().is_none());
        assert!(reader.next_observation().unwrap().is_none());
    }
}

#[test]
fn test_reset_replays_stream_after_partial_read() {
    let (path, _guard) = temp_path("replay.xml");
    let records: Vec<_> = (0..3).map(|i| sample(FormatTag::Covis3d, i)).collect();

    let mut writer = create_writer(FormatTag::Covis3d, &path).unwrap();
    write_all(writer.as_mut(), &records);

    let mut reader = open_reader(FormatTag::Covis3d, &path).unwrap();
    reader.next_observation().unwrap();
    reader.reset().unwrap();
    assert_eq!(read_all(reader.as_mut()), records);
}

#[test]
fn test_repeated_commits_are_idempotent() {
    for tag in FormatTag::ALL {
        let (path, _guard) = temp_path("commits.out");
        let mut writer = create_writer(tag, &path).unwrap();
        writer.init().unwrap();
        writer.write_observation(&sample(tag, 7)).unwrap();
        writer.write_buffer().unwrap();
        writer.write_buffer().unwrap();
        writer.write_buffer().unwrap();

        let mut reader = open_reader(tag, &path).unwrap();
        assert_eq!(read_all(reader.as_mut()).len(), 1);
    }
}

#[test]
fn test_incremental_commits_extend_file() {
    let (path, _guard) = temp_path("incremental.pcd");
    let mut writer = create_writer(FormatTag::Pcd, &path).unwrap();
    writer.init().unwrap();

    writer.write_observation(&sample(FormatTag::Pcd, 0)).unwrap();
    writer.write_buffer().unwrap();

    let mut reader = open_reader(FormatTag::Pcd, &path).unwrap();
    assert_eq!(read_all(reader.as_mut()).len(), 1);

    writer.write_observation(&sample(FormatTag::Pcd, 1)).unwrap();
    writer.write_buffer().unwrap();

    let mut reader = open_reader(FormatTag::Pcd, &path).unwrap();
    let got = read_all(reader.as_mut());
    assert_eq!(got.len(), 2);
    assert_eq!(got[0].kernel, sample(FormatTag::Pcd, 0).kernel);
    assert_eq!(got[1].kernel, sample(FormatTag::Pcd, 1).kernel);
}
