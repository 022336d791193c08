use anyhow::Context;

fn main() -> anyhow::Result<()> {
    pixelboard::run().context("pixelboard terminated")
}
