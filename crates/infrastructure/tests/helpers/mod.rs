#![allow(dead_code)]
pub mod dns_server_mock;

pub use dns_server_mock::{
    closed_tcp_port, closed_udp_port, free_udp_port, sample_query, MockTcpServer, MockUdpServer,
};
