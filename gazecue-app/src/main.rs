use anyhow::Result;

mod app;
mod audio;

use app::App;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    App::new()?.run()
}
