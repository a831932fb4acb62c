use anyhow::{ensure, Result};
use elvis_tcp::{
    loopback::Loopback,
    tcp::{ReceiverState, SenderState, TcpConfig, WrappingU32},
};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use std::time::Duration;

const TICK: Duration = Duration::from_millis(1);

fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut data = vec![0; len];
    SmallRng::seed_from_u64(seed).fill(&mut data[..]);
    data
}

/// Writes `data` as the outgoing stream accepts it and steps until the
/// connection is finished, taking the link down whenever `link_down` says so.
fn run(
    loopback: &mut Loopback,
    data: &[u8],
    mut link_down: impl FnMut(u64) -> bool,
) -> Result<Vec<u8>> {
    let mut written = 0;
    let mut received = vec![];
    let mut step = 0;
    if data.is_empty() {
        loopback.close();
    }
    while !loopback.is_finished() {
        if written < data.len() {
            written += loopback.write(&data[written..]);
            if written == data.len() {
                loopback.close();
            }
        }
        loopback.set_link_up(!link_down(step));
        loopback.step(TICK)?;
        received.extend(loopback.read());
        step += 1;
    }
    Ok(received)
}

#[test]
#[ntest::timeout(10_000)]
fn bulk_transfer_through_small_buffers() {
    let config = TcpConfig {
        rt_timeout: Duration::from_millis(20),
        recv_capacity: 1500,
        send_capacity: 3000,
        max_payload_size: 500,
        ..Default::default()
    };
    let mut loopback = Loopback::new(config).unwrap();
    let data = random_bytes(100_000, 1);

    let received = run(&mut loopback, &data, |_| false).unwrap();
    assert!(received == data, "received bytes differ from those sent");
    assert_eq!(loopback.sender().state(), SenderState::FinAcked);
    assert_eq!(loopback.receiver().state(), ReceiverState::FinReceived);
    assert_eq!(loopback.stats().segments_lost, 0);
}

#[test]
#[ntest::timeout(10_000)]
fn transfer_survives_a_flaky_link() {
    let config = TcpConfig {
        rt_timeout: Duration::from_millis(5),
        recv_capacity: 4000,
        send_capacity: 4000,
        max_payload_size: 300,
        ..Default::default()
    };
    let mut loopback = Loopback::new(config).unwrap();
    let data = random_bytes(20_000, 2);

    // Down for two steps out of every seven
    let received = run(&mut loopback, &data, |step| step % 7 < 2).unwrap();
    assert!(received == data, "received bytes differ from those sent");
    assert!(loopback.stats().segments_lost > 0);
    assert!(loopback.stats().retransmissions > 0);
}

#[test]
fn sequence_numbers_wrap_mid_transfer() -> Result<()> {
    let config = TcpConfig {
        fixed_isn: Some(WrappingU32::new(u32::MAX - 1000)),
        max_payload_size: 400,
        ..Default::default()
    };
    let mut loopback = Loopback::new(config)?;
    let data = random_bytes(5000, 3);

    let received = run(&mut loopback, &data, |_| false)?;
    ensure!(received == data, "received bytes differ from those sent");
    assert_eq!(
        loopback.sender().next_seqno(),
        WrappingU32::new(u32::MAX - 1000) + 5002
    );
    assert_eq!(
        loopback.receiver().ackno(),
        Some(loopback.sender().next_seqno())
    );
    Ok(())
}

#[test]
fn empty_stream() -> Result<()> {
    let mut loopback = Loopback::new(TcpConfig::default())?;
    let received = run(&mut loopback, &[], |_| false)?;
    assert!(received.is_empty());
    assert_eq!(loopback.stats().segments_sent, 1);
    Ok(())
}
