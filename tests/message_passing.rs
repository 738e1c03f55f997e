use ndarray::{array, Array2, Array3, Axis};
use topo_mp::base::FnMessage;
use topo_mp::prelude::*;

fn example_neighborhood() -> SparseNeighborhood {
    SparseNeighborhood::new(
        vec![0, 0, 0, 1, 1, 2],
        vec![0, 1, 2, 1, 2, 2],
        vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        (3, 3),
    )
    .unwrap()
}

fn example_x() -> Array2<f32> {
    array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]
}

fn custom_message(x: &Array2<f32>) -> Array2<f32> {
    x.clone()
}

#[test]
fn test_reset_parameters() {
    let gain = 1.0;
    let mut mp = MessagePassing::new(MessagePassingConfig::default());

    mp.set_initialization("invalid");
    assert!(matches!(mp.reset_parameters(gain), Err(TopoError::Initialization(_))));

    mp.set_initialization("xavier_uniform");
    mp.set_weight(Array2::zeros((3, 3)));
    mp.reset_parameters(gain).unwrap();
    let w = mp.weight().unwrap();
    assert_eq!(w.dim(), (3, 3));
    let bound = (6.0_f32 / 6.0).sqrt();
    assert!(w.iter().all(|v| v.abs() <= bound));

    mp.set_initialization("xavier_normal");
    mp.set_weight(Array2::zeros((3, 3)));
    mp.reset_parameters(gain).unwrap();
    assert_eq!(mp.weight().unwrap().dim(), (3, 3));
}

#[test]
fn test_propagate() {
    let mut mp = MessagePassing::with_message(MessagePassingConfig::default(), FnMessage(custom_message));
    let result = mp.propagate(&example_x(), &example_neighborhood()).unwrap();
    assert_eq!(result.dim(), (3, 2));
}

#[test]
fn test_sparsify_message() {
    let x = example_x();
    let mut mp = MessagePassing::with_message(MessagePassingConfig::default(), FnMessage(custom_message));
    mp.propagate(&x, &example_neighborhood()).unwrap();

    let x_sparse = mp.sparsify_message(&x).unwrap();
    let expected = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0], [3.0, 4.0], [5.0, 6.0], [5.0, 6.0]];
    assert_eq!(x_sparse, expected);
}

#[test]
fn test_get_x_i() {
    let x: Array3<f32> = array![[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]];
    let mut mp = MessagePassing::new(MessagePassingConfig::default());
    mp.set_index(NeighborhoodIndex::new(vec![1, 2, 0], vec![0, 1, 2], (3, 3)).unwrap());

    let expected = array![[4.0, 5.0, 6.0], [7.0, 8.0, 9.0], [1.0, 2.0, 3.0]];

    let batched = mp.get_x_i_batched(&x).unwrap();
    assert_eq!(batched.index_axis(Axis(0), 0), expected);

    let flat = mp.get_x_i(&x.index_axis(Axis(0), 0).to_owned()).unwrap();
    assert_eq!(flat, expected);
}

#[test]
fn test_aggregate() {
    let x = example_x();
    let neighborhood = example_neighborhood();
    let neighborhood_values = neighborhood.coalesce().values();

    let mut mp = MessagePassing::with_message(MessagePassingConfig::default(), FnMessage(custom_message));
    mp.propagate(&x, &neighborhood).unwrap();

    let x = mp.sparsify_message(&x).unwrap();
    let x = x * &neighborhood_values.insert_axis(Axis(1));
    let result = mp.aggregate(&x).unwrap();

    assert_eq!(result, array![[22.0, 28.0], [37.0, 46.0], [30.0, 36.0]]);
}

#[test]
fn test_forward() {
    let mut mp = MessagePassing::with_message(MessagePassingConfig::default(), FnMessage(custom_message));
    let result = mp.forward(&example_x(), &example_neighborhood()).unwrap();

    assert_eq!(result.dim(), (3, 2));
    assert_eq!(result, array![[22.0, 28.0], [37.0, 46.0], [30.0, 36.0]]);
}

#[test]
fn test_uncoalesced_neighborhood() {
    // Same matrix as the example, with entries shuffled and (0, 2) split in two
    let neighborhood = SparseNeighborhood::new(
        vec![2, 1, 0, 0, 1, 0, 0],
        vec![2, 2, 2, 0, 1, 1, 2],
        vec![6.0, 5.0, 1.0, 1.0, 4.0, 2.0, 2.0],
        (3, 3),
    )
    .unwrap();
    let mut mp = MessagePassing::new(MessagePassingConfig::default());

    let result = mp.propagate(&example_x(), &neighborhood).unwrap();
    assert_eq!(result, array![[22.0, 28.0], [37.0, 46.0], [30.0, 36.0]]);
    assert_eq!(mp.index().unwrap().num_edges(), 6);
}

#[test]
fn test_propagate_idempotent() {
    let mut mp = MessagePassing::new(MessagePassingConfig::default());
    let first = mp.propagate(&example_x(), &example_neighborhood()).unwrap();
    let second = mp.propagate(&example_x(), &example_neighborhood()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_incidence_to_higher_rank() {
    // Triangle boundary (nodes x edges): node features go onto edges through
    // the coboundary, then back onto nodes through the boundary.
    let boundary = SparseNeighborhood::from_dense(&array![
        [-1.0, 0.0, -1.0],
        [1.0, -1.0, 0.0],
        [0.0, 1.0, 1.0]
    ]);
    let x_nodes = array![[1.0], [2.0], [4.0]];
    let mut mp = MessagePassing::new(MessagePassingConfig::default());

    let x_edges = mp.propagate(&x_nodes, &boundary.transpose()).unwrap();
    assert_eq!(x_edges, array![[1.0], [2.0], [3.0]]);

    let back = mp.propagate(&x_edges, &boundary).unwrap();
    assert_eq!(back.dim(), (3, 1));
    assert_eq!(back, boundary.to_dense().dot(&x_edges));
}

#[test]
fn test_loaded_neighborhood_is_recoalesced() {
    // Stored as "coalesced" but holds an unsorted duplicate
    let json = r#"{"rows":[1,0,0],"cols":[0,0,0],"values":[1.0,2.0,3.0],"shape":[2,1],"coalesced":true}"#;
    let neighborhood: SparseNeighborhood = serde_json::from_str(json).unwrap();
    let mut mp = MessagePassing::new(MessagePassingConfig::default());

    let result = mp.propagate(&array![[1.0]], &neighborhood).unwrap();
    assert_eq!(result, array![[5.0], [1.0]]);
    assert_eq!(mp.target_index_i().unwrap(), &[0, 1]);
    assert_eq!(mp.index().unwrap().num_edges(), 2);
}

#[test]
fn test_loaded_index_with_extra_values_rejected() {
    let json = r#"{
        "target_index_i": [0, 1],
        "source_index_j": [0, 0],
        "values": {"v": 1, "dim": [3], "data": [1.0, 1.0, 1.0]},
        "num_targets": 2,
        "num_sources": 1
    }"#;
    assert!(serde_json::from_str::<NeighborhoodIndex>(json).is_err());
}

#[test]
fn test_reset_parameters_overflowing_gain() {
    let mut mp = MessagePassing::new(MessagePassingConfig::default().with_seed(0))
        .with_weight(Array2::zeros((1, 1)));

    assert!(matches!(mp.reset_parameters(f32::MAX), Err(TopoError::Initialization(_))));
    assert_eq!(mp.weight().unwrap(), &Array2::<f32>::zeros((1, 1)));
}
