use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;
use testnet::{Error, PortAllocator};

#[test]
fn test_concurrent_leases_never_collide() {
    let allocator = Arc::new(PortAllocator::new(30000, 30399).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let allocator = Arc::clone(&allocator);
            thread::spawn(move || {
                (0..50)
                    .map(|_| allocator.lease().expect("range is large enough"))
                    .collect::<Vec<u16>>()
            })
        })
        .collect();

    let mut all = Vec::new();
    for handle in handles {
        all.extend(handle.join().unwrap());
    }

    let unique: BTreeSet<u16> = all.iter().copied().collect();
    assert_eq!(all.len(), 400);
    assert_eq!(unique.len(), 400);
    assert!(unique.iter().all(|p| (30000..=30399).contains(p)));
    assert_eq!(allocator.available(), 0);
}

#[test]
fn test_concurrent_lease_and_release() {
    let allocator = Arc::new(PortAllocator::new(31000, 31015).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let allocator = Arc::clone(&allocator);
            thread::spawn(move || {
                for _ in 0..500 {
                    let ports = allocator.lease_many(4).expect("each thread holds at most 4");
                    for port in ports {
                        allocator.release(port);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert!(allocator.leased_ports().is_empty());
}

#[test]
fn test_released_port_can_be_leased_again() {
    let allocator = PortAllocator::new(32000, 32000).unwrap();
    let port = allocator.lease().unwrap();
    assert!(matches!(allocator.lease(), Err(Error::PortRangeExhausted { .. })));

    allocator.release(port);
    assert_eq!(allocator.lease().unwrap(), port);
}

#[test]
fn test_release_is_idempotent_and_ignores_foreign_ports() {
    let allocator = PortAllocator::new(33000, 33001).unwrap();
    let port = allocator.lease().unwrap();

    allocator.release(port);
    allocator.release(port);
    allocator.release(12345);

    assert_eq!(allocator.available(), 2);
}

#[test]
fn test_invalid_ranges() {
    assert!(PortAllocator::new(0, 10).is_err());
    assert!(PortAllocator::new(2000, 1000).is_err());
    assert_eq!(PortAllocator::new(65535, 65535).unwrap().capacity(), 1);
}
