//! Output socket and response transmission.

use std::net::Ipv4Addr;

use anyhow::Context;
use log::{debug, error};
use tokio::net::UdpSocket;

use rip_core::neighbour::Neighbour;
use rip_core::table::RoutingTable;
use rip_core::update::build_response;
use rip_core::wire::encode_response;
use rip_core::RouterId;

pub struct Sender {
    socket: UdpSocket,
    local_id: RouterId,
    /// Config order, which is also the order packets go out in.
    neighbours: Vec<Neighbour>,
}

impl Sender {
    pub async fn bind(
        port: u16,
        local_id: RouterId,
        neighbours: Vec<Neighbour>,
    ) -> anyhow::Result<Sender> {
        let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, port))
            .await
            .with_context(|| format!("could not bind output socket to port {port}"))?;
        Ok(Sender {
            socket,
            local_id,
            neighbours,
        })
    }

    /// Sends one freshly assembled response to every neighbour. Failures
    /// are per-packet: an oversized table or a send error costs one
    /// neighbour one update, nothing more.
    pub async fn send_updates(&self, table: &RoutingTable) {
        for neighbour in &self.neighbours {
            let entries = build_response(table, neighbour.id);
            let packet = match encode_response(self.local_id, &entries) {
                Ok(packet) => packet,
                Err(e) => {
                    error!("response to router {} not sent: {e}", neighbour.id);
                    continue;
                }
            };

            match self
                .socket
                .send_to(&packet, (Ipv4Addr::LOCALHOST, neighbour.input_port))
                .await
            {
                Ok(_) => debug!(
                    "sent {} entries to router {} on port {}",
                    entries.len(),
                    neighbour.id,
                    neighbour.input_port
                ),
                Err(e) => error!("could not send response to router {}: {e}", neighbour.id),
            }
        }
    }
}
