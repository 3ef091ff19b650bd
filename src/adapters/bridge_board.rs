//! Bridge board adapter.
//!
//! Groups the network adapter, the signal sampler, the serial link and
//! the clock so the bridge service can take them as one
//! [`BridgeHardware`](crate::app::ports::BridgeHardware) value.

use crate::app::ports::{
    ClockPort, ConnectivityError, NetworkPort, SerialPort, SignalInPort,
};

pub struct BridgeBoard<N, I, S, C> {
    pub network: N,
    pub signal: I,
    pub serial: S,
    pub clock: C,
}

impl<N, I, S, C> BridgeBoard<N, I, S, C> {
    pub fn new(network: N, signal: I, serial: S, clock: C) -> Self {
        Self {
            network,
            signal,
            serial,
            clock,
        }
    }
}

impl<N: NetworkPort, I, S, C> NetworkPort for BridgeBoard<N, I, S, C> {
    fn join_or_provision(&mut self, timeout_secs: u32) -> bool {
        self.network.join_or_provision(timeout_secs)
    }

    fn is_connected(&self) -> bool {
        self.network.is_connected()
    }

    fn reset_credentials(&mut self) -> Result<(), ConnectivityError> {
        self.network.reset_credentials()
    }
}

impl<N, I: SignalInPort, S, C> SignalInPort for BridgeBoard<N, I, S, C> {
    fn sample_signal(&mut self) -> u8 {
        self.signal.sample_signal()
    }
}

impl<N, I, S: SerialPort, C> SerialPort for BridgeBoard<N, I, S, C> {
    fn read_byte(&mut self) -> Option<u8> {
        self.serial.read_byte()
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.serial.write_bytes(bytes);
    }
}

impl<N, I, S, C: ClockPort> ClockPort for BridgeBoard<N, I, S, C> {
    fn uptime_ms(&self) -> u32 {
        self.clock.uptime_ms()
    }

    fn unix_time(&self) -> Option<u64> {
        self.clock.unix_time()
    }
}
