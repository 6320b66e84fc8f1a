//! Input sockets and packet ingest.
//!
//! One non-blocking UDP socket per configured input port, multiplexed by a
//! bounded readiness wait. Everything that can go wrong with a single
//! datagram is logged and skipped; only binding is fatal.

use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};

use anyhow::Context;
use futures::future::select_all;
use log::{debug, error, warn};
use tokio::net::UdpSocket;
use tokio::time::timeout;

use rip_core::table::RoutingTable;
use rip_core::update::apply_response;
use rip_core::wire::{self, decode_response};

pub struct Receiver {
    sockets: Vec<UdpSocket>,
    buf: [u8; wire::MAX_RESPONSE_PACKET_SIZE],
}

impl Receiver {
    pub async fn bind(ports: &[u16]) -> anyhow::Result<Receiver> {
        let mut sockets = Vec::with_capacity(ports.len());
        for &port in ports {
            let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, port))
                .await
                .with_context(|| format!("could not bind input socket to port {port}"))?;
            sockets.push(socket);
        }
        Ok(Receiver {
            sockets,
            buf: [0; wire::MAX_RESPONSE_PACKET_SIZE],
        })
    }

    /// Waits up to `wait` for any input socket to become readable, then
    /// reads one datagram from every socket that has one and applies it to
    /// the table. Returns without error on timeout; the caller's tick
    /// continues with the timer phase either way.
    pub async fn wait_for_messages(&mut self, table: &mut RoutingTable, wait: Duration) {
        // input-ports is mandatory and non-empty, so there is always at
        // least one readiness future to wait on
        let readiness = select_all(self.sockets.iter().map(|s| Box::pin(s.readable())));
        match timeout(wait, readiness).await {
            Err(_elapsed) => return,
            Ok((Err(e), _, _)) => {
                error!("error waiting for readable input sockets: {e}");
                return;
            }
            Ok((Ok(()), _, _)) => {}
        }

        let now = Instant::now();
        for socket in &self.sockets {
            match socket.try_recv_from(&mut self.buf) {
                Ok((len, from)) => process_datagram(table, &self.buf[..len], from, now),
                Err(e) if e.kind() == ErrorKind::WouldBlock => {}
                Err(e) => warn!("could not receive from input socket: {e}"),
            }
        }
    }
}

/// Validates one datagram's header and hands its entries to the update rule.
fn process_datagram(table: &mut RoutingTable, datagram: &[u8], from: SocketAddr, now: Instant) {
    let response = match decode_response(datagram) {
        Ok(response) => response,
        Err(e) => {
            warn!("discarding datagram from {from}: {e}");
            return;
        }
    };

    if response.command != wire::RESPONSE_COMMAND {
        warn!("discarding packet from {from}: command {} is not a response", response.command);
        return;
    }
    if response.version != wire::RIP_VERSION {
        warn!("discarding packet from {from}: unsupported version {}", response.version);
        return;
    }
    // only pre-declared neighbours may steer the table
    if !table.is_neighbour(response.sender_id) {
        warn!("discarding response from router {}: not a neighbour", response.sender_id);
        return;
    }

    debug!(
        "response from router {} with {} entries",
        response.sender_id,
        response.entries.len()
    );
    for rejection in apply_response(table, response.sender_id, &response.entries, now) {
        warn!("skipping entry from router {}: {rejection}", response.sender_id);
    }
    debug!("routing table is now:\n{}", table.render(now));
}
