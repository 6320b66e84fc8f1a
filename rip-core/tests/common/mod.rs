pub mod topologies;
pub mod virtual_network;
