//! Display-name lookup for responders
//!
//! Two backends answer the same reverse multicast-DNS question: the embedded
//! [`MdnsResolver`] speaks the protocol itself, while [`DigResolver`] shells
//! out to `dig`. Neither bounds its own run time; the scan wraps every lookup
//! in its configured resolve timeout.

use arpscan_core::{Error, Result};
use async_trait::async_trait;
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name, RData, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::sync::atomic::{AtomicU16, Ordering};
use tokio::net::UdpSocket;
use tokio::process::Command;
use tracing::trace;

/// Multicast DNS group queried for reverse lookups
pub const MDNS_GROUP: Ipv4Addr = Ipv4Addr::new(224, 0, 0, 251);

/// Multicast DNS port
pub const MDNS_PORT: u16 = 5353;

/// Largest multicast DNS message we expect to receive
const MAX_MDNS_PACKET: usize = 9000;

static NEXT_QUERY_ID: AtomicU16 = AtomicU16::new(1);

/// Looks up a human-readable name for an address
#[async_trait]
pub trait NameResolver: Send + Sync {
    async fn resolve(&self, ip: Ipv4Addr) -> Result<String>;
}

/// Reverse lookup over multicast DNS without external tools.
///
/// Sends one PTR query for `d.c.b.a.in-addr.arpa.` from an ephemeral port.
/// Responders answer such one-shot queries with a unicast reply, so the
/// lookup reads replies until one carries a PTR answer for that name.
#[derive(Debug, Clone)]
pub struct MdnsResolver {
    server: SocketAddr,
}

impl Default for MdnsResolver {
    fn default() -> Self {
        Self {
            server: SocketAddr::from((MDNS_GROUP, MDNS_PORT)),
        }
    }
}

impl MdnsResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Query `server` instead of the multicast group
    pub fn with_server(mut self, server: SocketAddr) -> Self {
        self.server = server;
        self
    }
}

#[async_trait]
impl NameResolver for MdnsResolver {
    async fn resolve(&self, ip: Ipv4Addr) -> Result<String> {
        let name = reverse_name(ip)?;
        let query = build_ptr_query(&name, NEXT_QUERY_ID.fetch_add(1, Ordering::Relaxed))?;

        let socket = UdpSocket::bind(("0.0.0.0", 0))
            .await
            .map_err(|e| Error::Resolve(format!("failed to bind mDNS socket: {}", e)))?;
        socket
            .send_to(&query, self.server)
            .await
            .map_err(|e| Error::Resolve(format!("failed to query {}: {}", self.server, e)))?;

        let mut buf = vec![0u8; MAX_MDNS_PACKET];
        loop {
            let (len, from) = socket
                .recv_from(&mut buf)
                .await
                .map_err(|e| Error::Resolve(format!("mDNS receive failed: {}", e)))?;

            match ptr_answer(&buf[..len], &name) {
                Some(host) => {
                    trace!(ip = %ip, name = %host, %from, "Resolved");
                    return Ok(host);
                }
                None => trace!(%from, len, "Ignoring mDNS packet without a matching answer"),
            }
        }
    }
}

/// `10.0.0.7` becomes `7.0.0.10.in-addr.arpa.`
fn reverse_name(ip: Ipv4Addr) -> Result<Name> {
    let o = ip.octets();
    let domain = format!("{}.{}.{}.{}.in-addr.arpa.", o[3], o[2], o[1], o[0]);
    Name::from_str(&domain)
        .map_err(|e| Error::PacketConstruction(format!("bad reverse name {}: {}", domain, e)))
}

fn build_ptr_query(name: &Name, id: u16) -> Result<Vec<u8>> {
    let mut query = Query::new();
    query.set_name(name.clone());
    query.set_query_type(RecordType::PTR);
    query.set_query_class(DNSClass::IN);

    let mut message = Message::new(id, MessageType::Query, OpCode::Query);
    message.add_query(query);
    encode(&message)
}

fn encode(message: &Message) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(512);
    let mut encoder = BinEncoder::new(&mut buf);
    message
        .emit(&mut encoder)
        .map_err(|e| Error::PacketConstruction(format!("failed to encode DNS message: {}", e)))?;
    Ok(buf)
}

/// First PTR answer for `name`, without the trailing root dot
fn ptr_answer(packet: &[u8], name: &Name) -> Option<String> {
    let message = Message::from_vec(packet).ok()?;
    message
        .answers()
        .iter()
        .filter(|record| record.name() == name)
        .find_map(|record| match record.data() {
            RData::PTR(ptr) => Some(ptr.to_utf8().trim_end_matches('.').to_string()),
            _ => None,
        })
}

/// Reverse multicast-DNS lookup by running `dig`.
///
/// Equivalent to `dig +short -x <ip> @224.0.0.251 -p 5353`. The child is
/// killed when the lookup future is dropped, so the caller's timeout also
/// ends the process.
#[derive(Debug, Clone)]
pub struct DigResolver {
    program: String,
}

impl Default for DigResolver {
    fn default() -> Self {
        Self {
            program: "dig".to_string(),
        }
    }
}

impl DigResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a different executable instead of `dig` from `PATH`
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn command(&self, ip: Ipv4Addr) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("+short")
            .arg("-x")
            .arg(ip.to_string())
            .arg(format!("@{}", MDNS_GROUP))
            .arg("-p")
            .arg(MDNS_PORT.to_string())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl NameResolver for DigResolver {
    async fn resolve(&self, ip: Ipv4Addr) -> Result<String> {
        let output = self
            .command(ip)
            .output()
            .await
            .map_err(|e| Error::Resolve(format!("failed to run {}: {}", self.program, e)))?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        let name = clean_answer(&text);

        if !output.status.success() {
            return Err(Error::Resolve(format!(
                "{} exited with {}: {}",
                self.program, output.status, name
            )));
        }

        trace!(ip = %ip, name = %name, "Resolved");
        Ok(name.to_string())
    }
}

/// Strip the trailing root dot and newlines `dig +short` leaves on an answer
fn clean_answer(raw: &str) -> &str {
    raw.trim_end_matches(&['.', '\n'][..])
}
