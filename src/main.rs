use anyhow::Result;
use std::io;

use mailsum::app;
use mailsum::config::Config;

fn main() -> Result<()> {
    let config = Config::load();

    let stdin = io::stdin();
    let days = app::prompt_days(&mut stdin.lock(), &mut io::stdout())?;

    app::run(&config, days)
}
