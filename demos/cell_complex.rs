use ndarray::array;
use topo_mp::prelude::*;
use topo_mp::utils::save_json;

fn main() -> topo_mp::Result<()> {
    // Two triangles sharing an edge: 4 nodes, 5 edges, 2 faces
    let node_adjacency = SparseNeighborhood::from_dense(&array![
        [0.0, 1.0, 1.0, 0.0],
        [1.0, 0.0, 1.0, 1.0],
        [1.0, 1.0, 0.0, 1.0],
        [0.0, 1.0, 1.0, 0.0]
    ]);
    let edge_to_face = SparseNeighborhood::from_dense(&array![
        [1.0, 1.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 1.0, 1.0]
    ]);

    let x_0 = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0], [0.5, -0.5]];
    let x_1 = array![[1.0, 2.0], [0.0, 1.0], [3.0, 0.0], [1.0, 1.0], [-1.0, 2.0]];

    let config = MessagePassingConfig::default().with_seed(7).with_verbose(true);

    let mut mp = MessagePassing::new(config.clone());
    let smoothed = mp.forward(&x_0, &node_adjacency)?;
    println!("Node features after one hop:\n{}", smoothed);

    let mut layer = ConvCxnLayer::new(2, 3, config.clone())?;
    let scores = layer.forward(&x_0, &x_1, &x_1, &node_adjacency, &edge_to_face)?;
    println!("Class scores: {}", scores);

    let path = std::env::temp_dir().join("topo_mp_demo_config.json");
    save_json(&config, &path)?;
    println!("Config written to {}", path.display());

    Ok(())
}
