use crate::scratch::ScratchPool;

#[test]
fn test_lease_returns_buffer_on_drop() {
    let pool = ScratchPool::new(4);
    assert_eq!(pool.idle_1d(), 0);
    {
        let mut lease = pool.lease_1d(8);
        assert_eq!(lease.len(), 8);
        lease[0] = 42.0;
    }
    assert_eq!(pool.idle_1d(), 1);
}

#[test]
fn test_reused_buffer_is_zeroed() {
    let pool = ScratchPool::new(4);
    {
        let mut lease = pool.lease_1d(8);
        lease.fill(9.0);
    }
    let lease = pool.lease_1d(8);
    assert_eq!(pool.idle_1d(), 0);
    assert!(lease.iter().all(|&v| v == 0.0));
}

#[test]
fn test_shape_mismatch_allocates_fresh() {
    let pool = ScratchPool::new(4);
    drop(pool.lease_1d(8));
    // Different length leaves the idle buffer in place
    let lease = pool.lease_1d(16);
    assert_eq!(lease.len(), 16);
    assert_eq!(pool.idle_1d(), 1);
}

#[test]
fn test_2d_lease_round_trip() {
    let pool = ScratchPool::new(4);
    {
        let mut lease = pool.lease_2d((3, 5));
        assert_eq!(lease.dim(), (3, 5));
        lease[[2, 4]] = 1.0;
    }
    assert_eq!(pool.idle_2d(), 1);
    let lease = pool.lease_2d((3, 5));
    assert!(lease.iter().all(|&v| v == 0.0));
}

#[test]
fn test_pool_size_cap() {
    let pool = ScratchPool::new(1);
    let a = pool.lease_1d(4);
    let b = pool.lease_1d(4);
    drop(a);
    drop(b);
    // The second buffer is discarded once the pool is full
    assert_eq!(pool.idle_1d(), 1);
}

#[test]
fn test_concurrent_leases_are_distinct() {
    let pool = ScratchPool::new(4);
    let mut a = pool.lease_1d(4);
    let mut b = pool.lease_1d(4);
    a.fill(1.0);
    b.fill(2.0);
    assert!(a.iter().all(|&v| v == 1.0));
    assert!(b.iter().all(|&v| v == 2.0));
}
