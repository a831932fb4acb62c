use elvis_tcp::tcp::wrapping::{unwrap, wrap};
use elvis_tcp::tcp::WrappingU32;
use rand::{rngs::SmallRng, Rng, SeedableRng};

const HALF_CYCLE: u64 = 1 << 31;

#[test]
fn round_trip_near_checkpoint() {
    let mut rng = SmallRng::seed_from_u64(0x5eed);
    for _ in 0..100_000 {
        let isn = WrappingU32::new(rng.gen());
        let checkpoint: u64 = rng.gen_range(0..1 << 48);
        let lowest = checkpoint.saturating_sub(HALF_CYCLE);
        let n = rng.gen_range(lowest..checkpoint + HALF_CYCLE);
        assert_eq!(unwrap(wrap(n, isn), isn, checkpoint), n);
    }
}

#[test]
fn unwrap_is_total() {
    let mut rng = SmallRng::seed_from_u64(7);
    for _ in 0..100_000 {
        let n = WrappingU32::new(rng.gen());
        let isn = WrappingU32::new(rng.gen());
        let checkpoint: u64 = rng.gen();
        let absolute = unwrap(n, isn, checkpoint);
        // Whatever it picks still wraps back to `n`
        assert_eq!(wrap(absolute, isn), n);
    }
}

#[test]
fn extreme_checkpoints() {
    let isn = WrappingU32::new(0);
    assert_eq!(unwrap(WrappingU32::new(0), isn, u64::MAX), u64::MAX - u32::MAX as u64);
    assert_eq!(unwrap(WrappingU32::new(u32::MAX), isn, u64::MAX), u64::MAX);
    assert_eq!(unwrap(WrappingU32::new(u32::MAX), isn, 0), u32::MAX as u64);
}
