use traits_core::{TraitStore, HEADER_SIZE, MAX_KEYS};
use traits_frame::{FrameConfig, MetaFrame};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    // A frame with the stock XDP headroom and a small UDP payload.
    let config = FrameConfig::default();
    let mut frame = MetaFrame::new(&config, b"\x45\x00\x00\x1c demo")?;

    let mut traits = frame.traits()?;
    for key in 0..MAX_KEYS {
        traits.set_u16(key, ((key << 8) | key) as u16)?;
    }
    tracing::info!("Scenario: 64 traits stored, {} bytes in use", traits.measure());
    assert_eq!(traits.measure(), HEADER_SIZE + 128);

    for key in (0..MAX_KEYS).step_by(2) {
        traits.delete(key)?;
    }
    tracing::info!("Scenario: even keys deleted, {} bytes in use", traits.measure());

    let region = traits.into_inner();
    let traits = TraitStore::attach(region)?;
    for (key, value) in &traits {
        tracing::debug!("Scenario: key {} = {:02x?}", key, value);
    }

    println!("{:?}", frame);
    Ok(())
}
