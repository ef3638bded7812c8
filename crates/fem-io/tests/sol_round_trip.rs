//! `.sol` interchange scenarios:
//! 1. Compact set encoding on write and its expansion on read
//! 2. read -> write -> read reproduces model and text
//! 3. File round trip through a temporary directory
//! 4. Malformed input reports the offending line
//! 5. Meshes edited after reading still write out every element

use fem_io::{IoError, WriterOptions, read_file, read_str, write_file, write_mesh};
use fem_model::{DEFAULT_ELEMENTSET, LoadTarget, ResultKind, SolutionType, topology};
use fem_sol::{decode_id_members, encode_id_ranges};

const FRAME: &str = "\
# portal frame, two columns and a girder
MATERIAL,steel,210000,0.3,7.85e-9
SECTION,BeamSect,col,steel,12.5,40.2,18.1,CrossSection,Rectangle,5,2.5,0,0
SECTION,RodSect,brace,steel,3.5
NODE,1,0,0,0
NODE,2,0,0,3
NODE,3,4,0,3
NODE,4,4,0,0
NODE,5,2,0,3
NODE,7,9,9,9
ELEMENT,1,BEAM2N,col,1,2
ELEMENT,2,BEAM2N,col,2,5
ELEMENT,3,BEAM2N,col,5,3
ELEMENT,4,BEAM2N,col,3,4
ELEMENT,5,ROD2N,brace,1,3
BEAMORIENT,1,0,0,1,1,0,0
BEAMORIENT,4,0,0,-1,1,0,0
SET_NODES,1,1,4
SET_NODES,2,1,2,3,4,5,7
SET_ELEMENTS,10,1 - 4
SET_ELEMENTS,20,5
SOLUTION,Static-1,Static
BOUNDARIES,feet
LOADS,wind,self
RESULTS,DISPLACEMENT
STRESS
SOLUTION,Modes,ModalDynamic
DAMPING,0.1,0.002
TABLE,sweep,0,0,100,1
LOADS,shake
RESULTS
MODESHAPES
BOUNDARY,Static-1,feet,Displacement,1,0,(1 2 3 4 5 6)
LOAD,Static-1,wind,Force,2,1.5,1,0,0
LOAD,Static-1,self,Gravity,10,9.81,0,0,-1
LOAD,Modes,shake,DynamicForce,1,2,0,1,0,sweep
";

#[test]
fn sets_are_written_compactly_and_read_back_in_full() {
    let model = read_str(FRAME).expect("read frame");
    let nodes: Vec<i32> = model.nodesets[&2].nodes.iter().copied().collect();
    assert_eq!(nodes, vec![1, 2, 3, 4, 5, 7]);
    assert_eq!(encode_id_ranges(&nodes), "1 - 5, 7");
    assert_eq!(
        decode_id_members(&["1 - 5", "7"]).expect("decode"),
        vec![1, 2, 3, 4, 5, 7]
    );

    let text = write_mesh(&model, "Mesh-1", &WriterOptions::default()).expect("write");
    assert!(text.lines().any(|l| l == "SET_NODES,2,1 - 5, 7"));
    assert!(text.lines().any(|l| l == "SET_ELEMENTS,10,1 - 4"));
}

#[test]
fn reader_builds_one_mesh_with_everything_attached() {
    let model = read_str(FRAME).expect("read frame");
    assert_eq!(model.meshes.len(), 1);
    let mesh = model.mesh("Mesh-1").expect("mesh");
    assert_eq!(mesh.nodes.len(), 6);
    assert_eq!(mesh.elements.len(), 5);

    let frame = mesh.elements[&1].orientation.clone().expect("frame");
    assert_eq!(frame.z_vec, [0.0, 1.0, 0.0]);
    assert_eq!(frame.length, 3.0);

    let statics = model.solution("Mesh-1", "Static-1").expect("static");
    assert_eq!(statics.kind, SolutionType::Static);
    assert_eq!(
        statics.results,
        vec![ResultKind::Displacement, ResultKind::Stress]
    );
    assert_eq!(statics.loads["self"].target, LoadTarget::Elementset(10));
    assert_eq!(statics.boundaries["feet"].dofs, vec![1, 2, 3, 4, 5, 6]);

    let modes = model.solution("Mesh-1", "Modes").expect("modes");
    assert_eq!(modes.damping.map(|d| d.beta), Some(0.002));
    assert_eq!(modes.tables["sweep"].points, vec![(0.0, 0.0), (100.0, 1.0)]);
    assert_eq!(modes.loads["shake"].table.as_deref(), Some("sweep"));
}

#[test]
fn write_then_read_is_identity() {
    let options = WriterOptions::default();
    let first = read_str(FRAME).expect("read frame");
    let text = write_mesh(&first, "Mesh-1", &options).expect("write");
    let second = read_str(&text).expect("read written text");
    assert_eq!(second, first);
    let again = write_mesh(&second, "Mesh-1", &options).expect("write again");
    assert_eq!(again, text);
}

#[test]
fn file_round_trip() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("out").join("frame.sol");
    let model = read_str(FRAME).expect("read frame");
    let options = WriterOptions {
        header: Some("written by the round trip test".to_string()),
        precision: None,
    };
    write_file(&model, "Mesh-1", &path, &options).expect("write file");
    let raw = std::fs::read_to_string(&path).expect("read back");
    assert!(raw.starts_with("# written by the round trip test\n"));
    assert_eq!(read_file(&path).expect("parse file"), model);
}

#[test]
fn malformed_record_reports_its_line() {
    let broken = FRAME.replace("NODE,5,2,0,3", "NODE,5,2,zero,3");
    match read_str(&broken) {
        Err(IoError::MalformedRecord { line, message }) => {
            assert_eq!(line, 9);
            assert!(message.contains("zero"), "{message}");
        }
        other => panic!("expected MalformedRecord, got {other:?}"),
    }
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    assert!(matches!(
        read_file(dir.path().join("absent.sol")),
        Err(IoError::Io(_))
    ));
}

const BAR: &str = "\
MATERIAL,steel,210000,0.3,7.85e-9
SECTION,RodSect,bar,steel,2
NODE,1,0,0,0
NODE,2,1,0,0
ELEMENT,1,ROD2N,bar,1,2
SET_NODES,1,1
SET_ELEMENTS,10,1
SOLUTION,s,Static
MESHES,10
BOUNDARIES,fix
BOUNDARY,s,fix,Displacement,1,0,(1 2 3)
";

fn element_ids(model: &fem_model::Model) -> Vec<i32> {
    let mesh = model.mesh("Mesh-1").expect("mesh");
    mesh.elements.keys().copied().collect()
}

#[test]
fn copied_elements_survive_write_and_read() {
    let mut model = read_str(BAR).expect("read bar");
    let mesh = model.mesh_mut("Mesh-1").expect("mesh");
    topology::copy_elements(mesh, &[1], [0.0, 1.0, 0.0]).expect("copy");

    let text = write_mesh(&model, "Mesh-1", &WriterOptions::default()).expect("write");
    assert!(text.lines().any(|l| l == "SET_ELEMENTS,999,2"));
    assert!(text.lines().any(|l| l == "MESHES,10,999"));
    let back = read_str(&text).expect("read written text");
    assert_eq!(element_ids(&back), vec![1, 2]);
    assert_eq!(back.mesh("Mesh-1").expect("mesh").nodes.len(), 4);
}

#[test]
fn split_elements_survive_write_and_read() {
    // Set 10 still lists the retired element, so it is left out of the file
    // and the pieces land in the default set.
    let mut model = read_str(BAR).expect("read bar");
    let mesh = model.mesh_mut("Mesh-1").expect("mesh");
    topology::split_beams(mesh, &[1], 2).expect("split");
    let text = write_mesh(&model, "Mesh-1", &WriterOptions::default()).expect("write");
    assert!(!text.lines().any(|l| l.starts_with("SET_ELEMENTS,10")));
    assert!(text.lines().any(|l| l == "MESHES,999"));
    let back = read_str(&text).expect("read written text");
    assert_eq!(element_ids(&back), vec![2, 3]);
    assert!(back.elementsets[&DEFAULT_ELEMENTSET].elements.contains(&3));

    // Splitting through the model carries set 10 along.
    let mut model = read_str(BAR).expect("read bar");
    model.split_beams("Mesh-1", &[1], 2).expect("split");
    let text = write_mesh(&model, "Mesh-1", &WriterOptions::default()).expect("write");
    assert!(text.lines().any(|l| l == "MESHES,10"));
    let back = read_str(&text).expect("read written text");
    assert_eq!(element_ids(&back), vec![2, 3]);
    let members: Vec<i32> = back.elementsets[&10].elements.iter().copied().collect();
    assert_eq!(members, vec![2, 3]);
    assert!(!back.elementsets.contains_key(&DEFAULT_ELEMENTSET));
}
