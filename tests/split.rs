use std::fs;
use std::path::{Path, PathBuf};

use jsonl_split::{split_jsonl, ChunkWriter, SplitConfig, SplitError};
use tempfile::TempDir;

const KIB: u64 = 1024;

fn temp_workspace() -> TempDir {
    tempfile::tempdir().expect("create tempdir")
}

fn writer(budget: u64) -> ChunkWriter {
    let cfg = SplitConfig::builder()
        .max_chunk_bytes(budget)
        .build()
        .expect("valid budget");
    ChunkWriter::new(cfg)
}

// One JSON object per line, padded so the whole line (newline included) is `len` bytes.
fn record(id: usize, len: usize) -> String {
    let head = format!("{{\"id\":{id},\"text\":\"");
    let tail = "\"}\n";
    let pad = len - head.len() - tail.len();
    format!("{head}{}{tail}", "x".repeat(pad))
}

fn write_records(path: &Path, count: usize, len: usize) -> Vec<u8> {
    let content: String = (0..count).map(|i| record(i, len)).collect();
    fs::write(path, &content).expect("write input");
    content.into_bytes()
}

fn concat(paths: &[PathBuf]) -> Vec<u8> {
    paths
        .iter()
        .flat_map(|p| fs::read(p).expect("read chunk"))
        .collect()
}

#[test]
fn small_input_is_copied_under_original_name() {
    let ws = temp_workspace();
    let input = ws.path().join("data.jsonl");
    let original = write_records(&input, 10, KIB as usize);
    let out = ws.path().join("out");

    let report = writer(80 * KIB).split(&input, &out).expect("split");
    assert!(report.short_circuit);
    assert_eq!(report.paths(), vec![out.join("data.jsonl")]);
    assert_eq!(fs::read(out.join("data.jsonl")).unwrap(), original);
}

#[test]
fn large_input_is_cut_at_line_boundaries() {
    let ws = temp_workspace();
    let input = ws.path().join("data.jsonl");
    let original = write_records(&input, 200, KIB as usize);
    let out = ws.path().join("out");

    let report = writer(80 * KIB).split(&input, &out).expect("split");
    assert!(!report.short_circuit);

    let names: Vec<_> = report
        .paths()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec!["data_part001.jsonl", "data_part002.jsonl", "data_part003.jsonl"]
    );
    let lines: Vec<_> = report.chunks.iter().map(|c| c.lines).collect();
    assert_eq!(lines, vec![Some(80), Some(80), Some(40)]);
    assert_eq!(report.chunks[0].bytes, 80 * KIB);
    assert_eq!(concat(&report.paths()), original);
}

#[test]
fn oversized_line_gets_its_own_chunk() {
    let ws = temp_workspace();
    let input = ws.path().join("huge.jsonl");
    let original = write_records(&input, 1, 150 * KIB as usize);
    let out = ws.path().join("out");

    let report = writer(80 * KIB).split(&input, &out).expect("split");
    assert_eq!(report.paths(), vec![out.join("huge_part001.jsonl")]);
    assert_eq!(report.oversized().count(), 1);
    assert_eq!(fs::read(out.join("huge_part001.jsonl")).unwrap(), original);
}

#[test]
fn oversized_line_between_small_lines_stands_alone() {
    let ws = temp_workspace();
    let input = ws.path().join("mixed.jsonl");
    let content = format!("{}{}{}", record(0, 100), record(1, 1000), record(2, 100));
    fs::write(&input, &content).unwrap();

    let report = writer(300).split(&input, ws.path().join("out")).expect("split");
    let sizes: Vec<_> = report.chunks.iter().map(|c| c.bytes).collect();
    assert_eq!(sizes, vec![100, 1000, 100]);
    assert_eq!(report.oversized().count(), 1);
    assert_eq!(concat(&report.paths()), content.as_bytes());
}

#[test]
fn every_chunk_respects_budget_and_reconstructs_input() {
    let ws = temp_workspace();
    let input = ws.path().join("uneven.jsonl");
    let content: String = (0..300).map(|i| record(i, 40 + (i * 37) % 200)).collect();
    fs::write(&input, &content).unwrap();

    for budget in [239, 500, 1024, 4096] {
        let out = ws.path().join(format!("out_{budget}"));
        let report = writer(budget).split(&input, &out).expect("split");
        assert!(report.chunks.iter().all(|c| c.bytes <= budget));
        assert_eq!(concat(&report.paths()), content.as_bytes());

        let indices: Vec<_> = report.chunks.iter().map(|c| c.index).collect();
        assert_eq!(indices, (1..=report.chunks.len()).collect::<Vec<_>>());
        for chunk in &report.chunks {
            let bytes = fs::read(&chunk.path).unwrap();
            assert_eq!(bytes.last(), Some(&b'\n'), "chunk ends on a line boundary");
        }
    }
}

#[test]
fn empty_input_is_copied_as_empty_file() {
    let ws = temp_workspace();
    let input = ws.path().join("empty.jsonl");
    fs::write(&input, b"").unwrap();
    let out = ws.path().join("out");

    let paths = split_jsonl(&input, &out, 80).expect("split");
    assert_eq!(paths, vec![out.join("empty.jsonl")]);
    assert!(fs::read(&paths[0]).unwrap().is_empty());
}

#[test]
fn missing_input_fails_before_creating_output() {
    let ws = temp_workspace();
    let out = ws.path().join("out");

    let err = split_jsonl(ws.path().join("nope.jsonl"), &out, 80).expect_err("must fail");
    assert!(matches!(err, SplitError::NotFound { .. }));
    assert!(!out.exists());
}

#[test]
fn directory_input_is_not_found() {
    let ws = temp_workspace();
    let err = split_jsonl(ws.path(), ws.path().join("out"), 80).expect_err("must fail");
    assert!(matches!(err, SplitError::NotFound { .. }));
}

#[test]
fn zero_budget_is_rejected_before_io() {
    let ws = temp_workspace();
    let out = ws.path().join("out");
    let err = split_jsonl(ws.path().join("nope.jsonl"), &out, 0).expect_err("must fail");
    assert!(matches!(err, SplitError::InvalidConfig(_)));
    assert!(!out.exists());
}

#[test]
fn nested_output_dir_is_created() {
    let ws = temp_workspace();
    let input = ws.path().join("data.jsonl");
    write_records(&input, 4, 64);
    let out = ws.path().join("a").join("b").join("c");

    let report = writer(128).split(&input, &out).expect("split");
    assert_eq!(report.chunks.len(), 2);
    assert!(out.join("data_part002.jsonl").exists());
}

#[test]
fn existing_chunk_files_are_overwritten_and_others_kept() {
    let ws = temp_workspace();
    let input = ws.path().join("data.jsonl");
    let original = write_records(&input, 4, 64);
    let out = ws.path().join("out");
    fs::create_dir(&out).unwrap();
    fs::write(out.join("data_part001.jsonl"), b"stale").unwrap();
    fs::write(out.join("unrelated.txt"), b"keep me").unwrap();

    let report = writer(128).split(&input, &out).expect("split");
    assert_eq!(concat(&report.paths()), original);
    assert_eq!(fs::read(out.join("unrelated.txt")).unwrap(), b"keep me");
}

#[test]
fn non_utf8_bytes_pass_through_untouched() {
    let ws = temp_workspace();
    let input = ws.path().join("raw.jsonl");
    let content: Vec<u8> = [
        &b"{\"a\":\"\xff\xfe\"}\n"[..],
        &b"{\"b\":1}\n"[..],
        &b"\x80\x81\n"[..],
    ]
    .concat();
    fs::write(&input, &content).unwrap();

    let report = writer(12).split(&input, ws.path().join("out")).expect("split");
    assert_eq!(report.chunks.len(), 2);
    assert_eq!(concat(&report.paths()), content);
}

#[test]
fn input_exactly_at_budget_is_copied_one_byte_over_is_split() {
    let ws = temp_workspace();
    let input = ws.path().join("edge.jsonl");
    let content = format!("{}{}", record(0, 64), record(1, 64));
    fs::write(&input, &content).unwrap();

    let at_budget = ws.path().join("at_budget");
    let report = writer(128).split(&input, &at_budget).expect("split");
    assert!(report.short_circuit);
    assert_eq!(report.paths(), vec![at_budget.join("edge.jsonl")]);

    let over_budget = ws.path().join("over_budget");
    let report = writer(127).split(&input, &over_budget).expect("split");
    assert!(!report.short_circuit);
    assert_eq!(
        report.paths(),
        vec![
            over_budget.join("edge_part001.jsonl"),
            over_budget.join("edge_part002.jsonl"),
        ]
    );
    assert_eq!(concat(&report.paths()), content.as_bytes());
}
