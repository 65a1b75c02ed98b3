mod network;

pub use network::{
    BRANCH_ROAD, FORTALEZA_NETWORK, LCSS_NETWORK, MAIN_ROAD, NetworkBuilder, NetworkGraph,
    SIDE_ROAD, VertexId, next_to_road_edge, road_edge,
};
