//! Drives the built binary:
//! 1. `summary --json` on a `.sol` file
//! 2. `fuse` writing a snapshot
//! 3. a bad input reported with a non-zero exit code

use std::path::Path;
use std::process::Command;

const PAIR: &str = "\
MATERIAL,steel,210000,0.3
SECTION,RodSect,bar,steel,2
NODE,1,0,0,0
NODE,2,1,0,0
NODE,3,1,0,0
NODE,4,2,0,0
ELEMENT,1,ROD2N,bar,1,2
ELEMENT,2,ROD2N,bar,3,4
";

fn fem_cli(args: &[&Path]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_fem-cli"))
        .args(args)
        .output()
        .expect("run fem-cli")
}

#[test]
fn summary_json_lists_meshes() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = dir.path().join("pair.sol");
    std::fs::write(&input, PAIR).expect("write input");

    let out = fem_cli(&[Path::new("summary"), &input, Path::new("--json")]);
    assert!(out.status.success());
    let stats: serde_json::Value = serde_json::from_slice(&out.stdout).expect("json");
    assert_eq!(stats[0]["name"], "Mesh-1");
    assert_eq!(stats[0]["num_nodes"], 4);
    assert_eq!(stats[0]["family_counts"]["Rod2N"], 2);
}

#[test]
fn fuse_writes_snapshot() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = dir.path().join("pair.sol");
    let output = dir.path().join("fused.mdl");
    std::fs::write(&input, PAIR).expect("write input");

    let out = fem_cli(&[Path::new("fuse"), &input, &output]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(String::from_utf8_lossy(&out.stdout).contains("merged 1 nodes"));

    let model = fem_io::load_snapshot(&output).expect("snapshot");
    let mesh = model.mesh("Mesh-1").expect("mesh");
    assert_eq!(mesh.nodes.len(), 3);
    assert_eq!(mesh.elements[&2].nodes, vec![2, 4]);
}

#[test]
fn malformed_input_fails() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = dir.path().join("bad.sol");
    std::fs::write(&input, "NODE,1,0,0\n").expect("write input");

    let out = fem_cli(&[Path::new("summary"), &input]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("line 1"));
}
