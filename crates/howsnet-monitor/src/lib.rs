//! # howsnet-monitor
//!
//! 샘플러 어댑터.
//! 참조 호스트로의 TCP 연결 수립 시간과 전체 네트워크 인터페이스의
//! 누적 송수신 바이트를 수집한다.

pub mod byte_counter;
pub mod tcp_probe;

pub use byte_counter::SysInfoByteCounter;
pub use tcp_probe::TcpConnectProbe;
