use anyhow::Context;

use tiercc::driver;

fn main() -> anyhow::Result<()> {
    driver::run().context("compilation failed")?;

    Ok(())
}
