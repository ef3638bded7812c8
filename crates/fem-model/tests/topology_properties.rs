//! Properties every topology operation must keep:
//! arity, mirror round trips, midpoint sharing, renumber round trips and
//! refused fuses.

use std::collections::BTreeSet;

use fem_model::topology::{
    self, ExtrudeParams, convert_elements, extrude_elements, fuse_nodes, mirror_copy_elements,
    renumber_nodes, split_beams,
};
use fem_model::{ElementFamily, Mesh, ModelError, Plane, Point};

fn add_hex(mesh: &mut Mesh, id: i32, origin: Point) -> Vec<i32> {
    let offsets = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 1.0],
        [1.0, 1.0, 1.0],
        [0.0, 1.0, 1.0],
    ];
    let mut nodes = Vec::new();
    for o in offsets {
        let node = mesh.next_node_id();
        mesh.create_node(node, origin[0] + o[0], origin[1] + o[1], origin[2] + o[2]).expect("node");
        nodes.push(node);
    }
    mesh.create_element(id, ElementFamily::Hex8N, nodes.clone()).expect("hex");
    nodes
}

fn two_tets() -> Mesh {
    let mut mesh = Mesh::new("tets");
    let points = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 1.0, 1.0],
    ];
    for (k, p) in points.iter().enumerate() {
        mesh.create_node(k as i32 + 1, p[0], p[1], p[2]).expect("node");
    }
    mesh.create_element(1, ElementFamily::Tet4N, vec![1, 2, 3, 4]).expect("tet");
    mesh.create_element(2, ElementFamily::Tet4N, vec![2, 3, 4, 5]).expect("tet");
    mesh
}

fn assert_arity(mesh: &Mesh) {
    for element in mesh.elements.values() {
        assert_eq!(
            element.nodes.len(),
            element.family.arity(),
            "element {} ({})",
            element.id,
            element.family
        );
    }
    assert!(mesh.validate().is_ok());
}

#[test]
fn arity_holds_after_every_operation() {
    let mut mesh = Mesh::new("mixed");
    add_hex(&mut mesh, 1, [0.0, 0.0, 0.0]);
    add_hex(&mut mesh, 2, [2.0, 0.0, 0.0]);
    let a = mesh.next_node_id();
    mesh.create_node(a, 0.0, 0.0, 5.0).expect("node");
    mesh.create_node(a + 1, 4.0, 0.0, 5.0).expect("node");
    mesh.create_element(3, ElementFamily::Beam2N, vec![a, a + 1]).expect("beam");
    assert_arity(&mesh);

    topology::copy_elements(&mut mesh, &[1], [0.0, 0.0, 3.0]).expect("copy");
    assert_arity(&mesh);
    mirror_copy_elements(&mut mesh, &[1, 3], Plane::XZ).expect("mirror");
    assert_arity(&mesh);
    let params = ExtrudeParams {
        direction: [1.0, 0.0, 0.0],
        count: 2,
        ..ExtrudeParams::default()
    };
    extrude_elements(&mut mesh, &[2], &params).expect("extrude");
    assert_arity(&mesh);
    split_beams(&mut mesh, &[3], 4).expect("split");
    assert_arity(&mesh);
    convert_elements(&mut mesh, &[1, 2], ElementFamily::Hex20N).expect("elevate");
    assert_arity(&mesh);
    convert_elements(&mut mesh, &[1], ElementFamily::Tet10N).expect("split hex");
    assert_arity(&mesh);
}

#[test]
fn mirror_twice_restores_coordinates_and_order() {
    let mut hex = Mesh::new("hex");
    add_hex(&mut hex, 1, [0.5, 0.25, 2.0]);
    let cases = [(ElementFamily::Hex8N, hex), (ElementFamily::Tet4N, two_tets())];
    for (family, base) in cases {
        for plane in [Plane::XY, Plane::XZ, Plane::YZ] {
            for quadratic in [false, true] {
                let mut mesh = base.clone();
                if quadratic {
                    let target = family.quadratic().expect("quadratic sibling");
                    let all: Vec<i32> = mesh.elements.keys().copied().collect();
                    convert_elements(&mut mesh, &all, target).expect("elevate");
                }
                let originals: Vec<i32> = mesh.elements.keys().copied().collect();
                let first = mirror_copy_elements(&mut mesh, &originals, plane).expect("mirror");
                let second = mirror_copy_elements(&mut mesh, &first.created_elements, plane)
                    .expect("mirror back");
                assert!(first.is_clean() && second.is_clean());

                for (orig, back) in originals.iter().zip(&second.created_elements) {
                    let a = &mesh.elements[orig];
                    let b = &mesh.elements[back];
                    assert_eq!(a.family, b.family);
                    for (na, nb) in a.nodes.iter().zip(&b.nodes) {
                        let pa = mesh.coords(*na).expect("coords");
                        let pb = mesh.coords(*nb).expect("coords");
                        assert_eq!(pa, pb, "{} about {plane:?}", a.family);
                    }
                }
            }
        }
    }
}

#[test]
fn elevation_creates_one_midpoint_per_edge() {
    let mut mesh = two_tets();
    let before = mesh.nodes.len();
    let report = convert_elements(&mut mesh, &[1, 2], ElementFamily::Tet10N).expect("elevate");

    let mut edges = BTreeSet::new();
    for element in mesh.elements.values() {
        let family = element.family;
        for &(a, b) in family.mid_edges() {
            let (p, q) = (element.nodes[a], element.nodes[b]);
            edges.insert((p.min(q), p.max(q)));
        }
    }
    // 6 + 6 edges, three of them on the shared face
    assert_eq!(edges.len(), 9);
    assert_eq!(report.created_nodes.len(), 9);
    assert_eq!(mesh.nodes.len(), before + 9);

    let e1 = &mesh.elements[&1];
    let e2 = &mesh.elements[&2];
    // edge 2-3 is the first edge of tet 2 and the second edge of tet 1
    assert_eq!(e1.nodes[5], e2.nodes[4]);
    let mid = mesh.coords(e1.nodes[5]).expect("coords");
    assert_eq!(mid, [0.5, 0.5, 0.0]);
}

#[test]
fn renumber_round_trip_restores_mapping() {
    let mut mesh = two_tets();
    let original = mesh.clone();
    let selection = [2, 3, 4];

    renumber_nodes(&mut mesh, &selection, 100).expect("move away");
    assert!(mesh.get_node(2).is_none());
    assert_eq!(mesh.elements[&2].nodes, vec![100, 101, 102, 5]);
    renumber_nodes(&mut mesh, &[100, 101, 102], 2).expect("move back");
    assert_eq!(mesh, original);
}

#[test]
fn fuse_refuses_collapsing_an_element() {
    let mut mesh = Mesh::new("fuse");
    mesh.create_node(1, 0.0, 0.0, 0.0).expect("node");
    mesh.create_node(2, 0.0, 0.0, 1e-8).expect("node");
    mesh.create_node(3, 5.0, 0.0, 0.0).expect("node");
    mesh.create_node(4, 5.0, 0.0, 1e-8).expect("node");
    mesh.create_node(6, 6.0, 0.0, 0.0).expect("node");
    mesh.create_node(7, 4.0, 0.0, 0.0).expect("node");
    mesh.create_element(1, ElementFamily::Rod2N, vec![1, 2]).expect("rod");
    mesh.create_element(2, ElementFamily::Rod2N, vec![3, 6]).expect("rod");
    mesh.create_element(3, ElementFamily::Rod2N, vec![7, 4]).expect("rod");
    let untouched = mesh.elements[&1].clone();

    let report = fuse_nodes(&mut mesh, &[1, 2, 3, 4], 1e-6).expect("fuse");

    assert_eq!(
        report.refused,
        vec![ModelError::DegenerateFuse {
            element: 1,
            kept: 1,
            dropped: 2
        }]
    );
    assert_eq!(mesh.elements[&1], untouched);
    assert!(mesh.get_node(1).is_some() && mesh.get_node(2).is_some());

    assert_eq!(report.merged.get(&4), Some(&3));
    assert_eq!(mesh.elements[&3].nodes, vec![7, 3]);
    assert!(mesh.get_node(4).is_none());
}
