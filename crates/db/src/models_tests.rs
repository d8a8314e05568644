// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use super::*;

#[test]
fn decodes_all_mandatory_blobs() {
    let graph = BASE64.encode("graph-data");
    let rk = BASE64.encode("rk-data");
    let plat = BASE64.encode("plat-data");
    let ss = BASE64.encode("sample-sheet-data");
    let blobs = ConfigBlobs::decode(&graph, &rk, &plat, &ss, None).unwrap();
    assert_eq!(blobs.graph, b"graph-data");
    assert_eq!(blobs.resource_kit, b"rk-data");
    assert_eq!(blobs.platform, b"plat-data");
    assert_eq!(blobs.sample_sheet, b"sample-sheet-data");
    assert!(blobs.startup_script.is_none());
}

#[test]
fn decodes_optional_startup_script_when_present() {
    let b64 = |s: &str| BASE64.encode(s);
    let startup = b64("#!/bin/sh\necho hi\n");
    let blobs = ConfigBlobs::decode(&b64("g"), &b64("r"), &b64("p"), &b64("s"), Some(&startup)).unwrap();
    assert_eq!(blobs.startup_script.unwrap(), b"#!/bin/sh\necho hi\n");
}

#[test]
fn rejects_invalid_base64() {
    let err = ConfigBlobs::decode("not base64!!", "", "", "", None).unwrap_err();
    assert!(matches!(err, DbError::Base64 { field: "graph", .. }));
}

#[test]
fn qc_stat_dedup_key_matches_original_ordering() {
    let stat = QcStatRow {
        sample: "sample1".into(),
        metric: "pct_mapped".into(),
        value: "98.1".into(),
        task_id: "align".into(),
        source_file: "qc.json".into(),
        notes: String::new(),
    };
    assert_eq!(stat.dedup_key(), "sample1_pct_mapped_align_qc.json");
}
