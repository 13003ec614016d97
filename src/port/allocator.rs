use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::collections::BTreeSet;

/// Leases host ports from an inclusive range.
///
/// # Thread Safety
///
/// The check-and-mark step of [`lease`](Self::lease) runs under a single
/// `Mutex`, so concurrent callers never receive the same port. Share one
/// allocator between orchestrations with `Arc<PortAllocator>`.
///
/// No ordering is promised for which free port a lease returns.
#[derive(Debug)]
pub struct PortAllocator {
    start: u16,
    end: u16,
    /// Ports currently held by a caller
    leased: Mutex<BTreeSet<u16>>,
}

impl PortAllocator {
    /// Create an allocator over `start..=end`.
    pub fn new(start: u16, end: u16) -> Result<Self> {
        if start == 0 {
            return Err(Error::Config(
                "Port range must not include port 0".to_string(),
            ));
        }
        if start > end {
            return Err(Error::Config(format!(
                "Invalid port range {}-{}: start is after end",
                start, end
            )));
        }
        Ok(Self {
            start,
            end,
            leased: Mutex::new(BTreeSet::new()),
        })
    }

    /// Lease one free port.
    ///
    /// Fails with [`Error::PortRangeExhausted`] when every port in range is leased.
    pub fn lease(&self) -> Result<u16> {
        let mut leased = self.leased.lock();
        let port = (self.start..=self.end)
            .find(|port| !leased.contains(port))
            .ok_or(Error::PortRangeExhausted {
                start: self.start,
                end: self.end,
            })?;
        leased.insert(port);
        tracing::debug!("Leased host port {}", port);
        Ok(port)
    }

    /// Lease `count` ports at once, or none at all.
    pub fn lease_many(&self, count: usize) -> Result<Vec<u16>> {
        let mut leased = self.leased.lock();
        let ports: Vec<u16> = (self.start..=self.end)
            .filter(|port| !leased.contains(port))
            .take(count)
            .collect();

        if ports.len() < count {
            return Err(Error::PortRangeExhausted {
                start: self.start,
                end: self.end,
            });
        }

        leased.extend(ports.iter().copied());
        tracing::debug!("Leased host ports {:?}", ports);
        Ok(ports)
    }

    /// Return a port to the pool. Releasing a port that is not leased is a no-op.
    pub fn release(&self, port: u16) {
        if self.leased.lock().remove(&port) {
            tracing::debug!("Released host port {}", port);
        }
    }

    pub fn is_leased(&self, port: u16) -> bool {
        self.leased.lock().contains(&port)
    }

    /// Snapshot of the currently leased ports.
    pub fn leased_ports(&self) -> Vec<u16> {
        self.leased.lock().iter().copied().collect()
    }

    /// Number of ports that can still be leased.
    pub fn available(&self) -> usize {
        self.capacity() - self.leased.lock().len()
    }

    /// Total number of ports in the range.
    pub fn capacity(&self) -> usize {
        usize::from(self.end - self.start) + 1
    }

    pub fn range(&self) -> (u16, u16) {
        (self.start, self.end)
    }
}
